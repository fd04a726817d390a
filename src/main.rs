// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tactics Board
//!
//! A desktop basketball tactics board: drag the ball and ten players around
//! a court, capture the layouts as frames, and play them back as a smooth
//! animation or record them to video.

mod app;
mod board;
mod config;
mod error;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::TacticsBoardApp;
use config::{BoardConfig, CONFIG_FILE};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = BoardConfig::load_or_default(Path::new(CONFIG_FILE));
    let canvas = config.court.canvas_size();

    // Leave room for the menu, toolbar and status bar around the court
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([canvas.width as f32 + 240.0, canvas.height as f32 + 100.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("Tactics Board"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Tactics Board",
        options,
        Box::new(move |cc| Ok(Box::new(TacticsBoardApp::new(&cc.egui_ctx, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
