// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the pose store, drag controller and playback
//! engine, routes canvas and toolbar input to them, and reports every
//! outcome through the status feed.

use crate::board::drag::DragController;
use crate::board::notify::{NotificationSink, StatusFeed};
use crate::board::playback::{PlaybackCompletion, PlaybackEngine, PlaybackOutcome, Scene, TickScheduler};
use crate::board::recording::{RecordingRenderer, RecordingSession};
use crate::board::store::PoseStore;
use crate::config::BoardConfig;
use crate::io::serialization::{export_json, import_into, timestamped_file_name};
use crate::io::video::FfmpegVideoSink;
use crate::models::court::CourtKind;
use crate::render::raster::SceneRasterizer;
use crate::ui::canvas::{self, CanvasAction, CanvasSurface, CanvasView};
use crate::ui::toolbar::{self, ToolbarAction};
use image::RgbaImage;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

/// How long the final playback scene stays up before the live pose returns.
const END_HOLD: Duration = Duration::from_millis(1500);

/// Schedules playback ticks on the egui repaint loop: one pending tick per
/// repaint request.
struct RepaintScheduler {
    ctx: egui::Context,
    pending: bool,
}

impl RepaintScheduler {
    fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl TickScheduler for RepaintScheduler {
    fn schedule_next_tick(&mut self) {
        self.pending = true;
        self.ctx.request_repaint();
    }
}

/// Court image decoded on a background thread.
struct LoadedCourtImage {
    court: CourtKind,
    image: RgbaImage,
}

/// Main application state.
pub struct TacticsBoardApp {
    config: BoardConfig,

    /// Court currently shown
    court: CourtKind,

    store: PoseStore,
    drag: DragController,
    engine: PlaybackEngine,
    scheduler: RepaintScheduler,

    /// What playback last rendered
    surface: CanvasSurface,

    /// Completion signal of the running playback
    completion: Option<PlaybackCompletion>,

    /// Open video recording, if playback is being recorded
    recording: Option<RecordingSession>,

    status: StatusFeed,

    /// Store revision the view last saw
    seen_revision: u64,

    court_image: Option<RgbaImage>,
    court_texture: Option<egui::TextureHandle>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedCourtImage, String>>>,
}

impl TacticsBoardApp {
    /// Create a new application instance.
    pub fn new(ctx: &egui::Context, config: BoardConfig) -> Self {
        let court = config.court;
        let store = PoseStore::new(court.initial_pose(config.marker_size));
        let mut app = Self {
            drag: DragController::new(config.marker_size, court.canvas_size(), config.clamp_mouse),
            engine: PlaybackEngine::new(config.transition_steps),
            scheduler: RepaintScheduler {
                ctx: ctx.clone(),
                pending: false,
            },
            surface: CanvasSurface::default(),
            completion: None,
            recording: None,
            status: StatusFeed::new(),
            seen_revision: store.revision(),
            court_image: None,
            court_texture: None,
            image_loader: None,
            store,
            court,
            config,
        };
        app.load_court_image();
        app
    }

    /// Start a new session on `court`.
    fn switch_court(&mut self, court: CourtKind) {
        if court == self.court || self.engine.is_playing() {
            return;
        }
        self.court = court;
        self.store = PoseStore::new(court.initial_pose(self.config.marker_size));
        self.seen_revision = self.store.revision();
        self.drag = DragController::new(self.config.marker_size, court.canvas_size(), self.config.clamp_mouse);
        self.surface.clear();
        self.load_court_image();
        self.status.notify(format!("{} selected", court.label()));
    }

    /// Decode the configured court image for the current court, if any.
    fn load_court_image(&mut self) {
        self.court_image = None;
        self.court_texture = None;
        self.image_loader = None;
        let Some(path) = self.config.court_image(self.court).map(|p| p.to_path_buf()) else {
            return;
        };

        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        let court = self.court;
        std::thread::spawn(move || {
            let result = crate::io::media::load_image(&path)
                .map(|image| LoadedCourtImage { court, image })
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
        });
    }

    fn poll_court_image(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.image_loader else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("image loader stopped".to_string()),
        };
        self.image_loader = None;

        match result {
            Ok(loaded) if loaded.court == self.court => {
                let size = [loaded.image.width() as usize, loaded.image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, loaded.image.as_raw());
                self.court_texture = Some(ctx.load_texture("court", color_image, egui::TextureOptions::LINEAR));
                self.court_image = Some(loaded.image);
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to load court image: {}", e);
                self.status.notify("Court image could not be loaded, drawing lines instead".to_string());
            }
        }
    }

    fn capture(&mut self) {
        if let Some(n) = self.store.capture() {
            self.status.notify(format!("frame {} captured", n));
        }
    }

    fn discard_last(&mut self) {
        self.drag.end_drag();
        if let Some(n) = self.store.discard_last() {
            self.status.notify(format!("frame {} removed", n));
        }
    }

    fn clear(&mut self) {
        self.drag.end_drag();
        self.store.reset();
        self.status.notify("Frames cleared".to_string());
    }

    fn play(&mut self) {
        self.drag.end_drag();
        match self.engine.play(self.store.frames(), &mut self.scheduler) {
            Ok(completion) => self.completion = Some(completion),
            Err(rejected) => {
                log::warn!("Play rejected: {}", rejected);
                self.status.notify(rejected.to_string());
            }
        }
    }

    fn record(&mut self) {
        self.drag.end_drag();
        let file_name = timestamped_file_name(chrono::Local::now(), "mp4");
        let sink = Box::new(FfmpegVideoSink::new(self.config.output_dir.join(file_name)));
        let rasterizer = match SceneRasterizer::new(
            self.court.canvas_size(),
            self.court,
            self.config.marker_size,
            self.court_image.as_ref(),
        ) {
            Ok(rasterizer) => rasterizer,
            Err(e) => {
                log::error!("Recording not started: {}", e);
                self.status.notify(format!("Recording not started: {}", e));
                return;
            }
        };

        match RecordingSession::start(
            sink,
            rasterizer,
            self.config.video_fps,
            &mut self.engine,
            self.store.frames(),
            &mut self.scheduler,
        ) {
            Ok((session, completion)) => {
                self.recording = Some(session);
                self.completion = Some(completion);
            }
            Err(e) => {
                log::error!("Recording not started: {}", e);
                self.status.notify(format!("Recording not started: {}", e));
            }
        }
    }

    fn export(&mut self) {
        let file_name = timestamped_file_name(chrono::Local::now(), "json");
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Tactics board", &["json"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        match export_json(&self.store.export_all(), &path) {
            Ok(()) => {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                self.status.notify(format!("{} saved", name));
            }
            Err(e) => {
                log::error!("Failed to export frames: {:#}", e);
                self.status.notify(format!("Export failed: {:#}", e));
            }
        }
    }

    fn import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Tactics board", &["json"])
            .pick_file()
        else {
            return;
        };

        self.drag.end_drag();
        let report = import_into(&mut self.store, &path);
        self.status.notify(report.message);
    }

    /// Run the scheduled playback tick, then collect the outcome if the run
    /// ended. The recording is closed only after that terminal tick.
    fn drive_playback(&mut self) {
        if self.scheduler.take_pending() {
            let mut renderer = RecordingRenderer {
                display: &mut self.surface,
                recording: self.recording.as_mut(),
            };
            self.engine.tick(&mut renderer, &mut self.scheduler);
        }

        let Some(completion) = &self.completion else {
            return;
        };
        let outcome = match completion.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => PlaybackOutcome::Cancelled,
        };
        self.completion = None;

        match outcome {
            PlaybackOutcome::Completed { ticks } => {
                log::info!("Playback completed in {} ticks", ticks);
                self.surface.hold_until(Instant::now() + END_HOLD);
            }
            PlaybackOutcome::Cancelled => {
                self.surface.clear();
                self.status.notify("Playback cancelled".to_string());
            }
            PlaybackOutcome::Failed(e) => {
                self.surface.clear();
                log::error!("Playback failed: {}", e);
                self.status.notify(format!("Playback stopped: {}", e));
            }
        }

        if let Some(session) = self.recording.take() {
            let frames = session.frames_written();
            match session.finish() {
                Ok(path) => {
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    self.status.notify(format!("{} saved ({} video frames)", name, frames));
                }
                Err(e) => {
                    log::error!("Recording failed: {}", e);
                    self.status.notify(format!("Recording failed: {}", e));
                }
            }
        }
    }

    /// Stop playback and close any open recording before the window goes.
    fn shutdown(&mut self) {
        self.engine.cancel();
        if let Some(session) = self.recording.take() {
            match session.finish() {
                Ok(path) => log::info!("Recording saved to {}", path.display()),
                Err(e) => log::error!("Recording failed: {}", e),
            }
        }
    }

    fn handle_canvas(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::StartDrag(point) => {
                if let Some(key) = self.drag.hit_test(self.store.live(), point) {
                    self.drag.begin_drag(key);
                }
            }
            CanvasAction::Drag(point, kind) => {
                self.drag.update_position(&mut self.store, point, kind);
            }
            CanvasAction::StopDrag => self.drag.end_drag(),
            CanvasAction::None => {}
        }
    }
}

impl eframe::App for TacticsBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_court_image(ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }

        self.drive_playback();

        if self.store.revision() != self.seen_revision {
            self.seen_revision = self.store.revision();
            self.surface.clear();
        }

        let now = Instant::now();
        self.status.expire(now);
        let holding = self.surface.expire(now);
        if holding || !self.status.is_empty() || self.image_loader.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        let playing = self.engine.is_playing();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add_enabled(!playing, egui::Button::new("Open Frames...")).clicked() {
                        self.import();
                        ui.close_menu();
                    }
                    let can_export = !playing && self.store.frame_count() > 0;
                    if ui.add_enabled(can_export, egui::Button::new("Save Frames...")).clicked() {
                        self.export();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Court", |ui| {
                    for court in [CourtKind::Full, CourtKind::Half] {
                        if ui
                            .add_enabled(!playing, egui::SelectableLabel::new(self.court == court, court.label()))
                            .clicked()
                        {
                            self.switch_court(court);
                            ui.close_menu();
                        }
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, playing, self.store.frame_count()))
            .inner;

        // Status messages
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.court.label());
                for message in self.status.messages() {
                    ui.separator();
                    ui.label(message);
                }
            });
        });

        if !playing && !ctx.wants_keyboard_input() {
            let (enter, back, space) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::Enter),
                    i.key_pressed(egui::Key::Backspace) || i.key_pressed(egui::Key::Delete),
                    i.key_pressed(egui::Key::Space),
                )
            });
            if enter {
                self.capture();
            }
            if back {
                self.discard_last();
            }
            if space {
                self.play();
            }
        }

        match toolbar_action {
            ToolbarAction::Capture => self.capture(),
            ToolbarAction::DiscardLast => self.discard_last(),
            ToolbarAction::Play => self.play(),
            ToolbarAction::Record => self.record(),
            ToolbarAction::Clear => self.clear(),
            ToolbarAction::None => {}
        }

        // Main canvas (center)
        let live_scene;
        let scene = match self.surface.scene() {
            Some(scene) => scene,
            None => {
                live_scene = Scene::still(self.store.live().clone());
                &live_scene
            }
        };
        let view = CanvasView {
            scene,
            court: self.court,
            canvas: self.court.canvas_size(),
            marker_size: self.config.marker_size,
            court_texture: self.court_texture.as_ref(),
            interactive: !self.engine.is_playing() && self.surface.shows_live(),
        };
        let (canvas_action, visible) = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, &view))
            .inner;

        self.surface.set_visible(visible);
        self.handle_canvas(canvas_action);
        if self.drag.active().is_some() {
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
        }
    }
}
