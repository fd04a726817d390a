// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the frame and playback controls.
//!
//! Every editing button is disabled while playback runs; the engine itself
//! only guards against starting a second playback.

/// Button pressed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Capture,
    DiscardLast,
    Play,
    Record,
    Clear,
}

/// Display the toolbar and report which button was pressed.
pub fn show(ui: &mut egui::Ui, playing: bool, frame_count: usize) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let idle = !playing;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui
            .add_enabled(idle, egui::Button::new("+ Capture"))
            .on_hover_text("Capture the current layout as a new frame (Enter)")
            .clicked()
        {
            action = ToolbarAction::Capture;
        }
        if ui
            .add_enabled(idle && frame_count > 0, egui::Button::new("− Remove"))
            .on_hover_text("Remove the last frame and go back to the one before (Backspace)")
            .clicked()
        {
            action = ToolbarAction::DiscardLast;
        }

        ui.separator();

        if ui
            .add_enabled(idle, egui::Button::new("▶ Play"))
            .on_hover_text("Animate the captured frames in order (Space)")
            .clicked()
        {
            action = ToolbarAction::Play;
        }
        if ui
            .add_enabled(idle, egui::Button::new("● Record"))
            .on_hover_text("Play and save the animation as an MP4 video")
            .clicked()
        {
            action = ToolbarAction::Record;
        }

        ui.separator();

        if ui
            .add_enabled(idle, egui::Button::new("✖ Clear"))
            .on_hover_text("Back to the starting layout")
            .clicked()
        {
            action = ToolbarAction::Clear;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("{} frames", frame_count));
            if playing {
                ui.spinner();
            }
        });
    });

    action
}
