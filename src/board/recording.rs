// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording playback to a video file.
//!
//! A recording session is opened strictly before playback starts and closed
//! strictly after playback reaches a terminal state. While it is open, every
//! scene the engine renders is rasterized and pushed to a [`VideoSink`].

use super::playback::{PlayRejected, PlaybackCompletion, PlaybackEngine, Renderer, Scene, TickScheduler};
use crate::error::{BoardError, Result};
use crate::models::pose::Pose;
use crate::render::raster::SceneRasterizer;
use image::RgbaImage;
use std::path::PathBuf;

/// Stream parameters handed to a sink before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Consumes raw frames and produces a single video artifact.
pub trait VideoSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, config: VideoConfig) -> Result<()>;
    /// Push one frame, in display order.
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<()>;
    /// Close the stream and return where the video was written.
    fn finish(&mut self) -> Result<PathBuf>;
}

/// Why a recording did not start.
#[derive(Debug, thiserror::Error)]
pub enum RecordStartError {
    #[error("{0}")]
    Rejected(PlayRejected),
    #[error(transparent)]
    Sink(#[from] BoardError),
}

/// An open recording: the sink plus the rasterizer feeding it.
pub struct RecordingSession {
    sink: Box<dyn VideoSink>,
    rasterizer: SceneRasterizer,
    frames_written: u64,
    error: Option<BoardError>,
}

impl RecordingSession {
    /// Start the sink, then start playback.
    ///
    /// Playback preconditions are checked before the sink is touched, so a
    /// rejected play never leaves an empty video behind.
    pub fn start(
        mut sink: Box<dyn VideoSink>,
        rasterizer: SceneRasterizer,
        fps: u32,
        engine: &mut PlaybackEngine,
        frames: &[Pose],
        scheduler: &mut dyn TickScheduler,
    ) -> std::result::Result<(Self, PlaybackCompletion), RecordStartError> {
        engine.can_play(frames).map_err(RecordStartError::Rejected)?;

        let canvas = rasterizer.canvas();
        sink.begin(VideoConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        })?;
        log::info!("Recording started ({}x{} @ {} fps)", canvas.width, canvas.height, fps);

        let completion = match engine.play(frames, scheduler) {
            Ok(completion) => completion,
            Err(rejected) => {
                if let Err(e) = sink.finish() {
                    log::warn!("Discarding recording failed: {}", e);
                }
                return Err(RecordStartError::Rejected(rejected));
            }
        };

        let session = Self {
            sink,
            rasterizer,
            frames_written: 0,
            error: None,
        };
        Ok((session, completion))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn record(&mut self, scene: &Scene) -> Result<()> {
        let frame = self.rasterizer.rasterize(scene)?;
        self.sink.push_frame(&frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Close the sink. Consumes the session, so each recording produces at
    /// most one file.
    pub fn finish(mut self) -> Result<PathBuf> {
        let finished = self.sink.finish();
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let path = finished?;
        log::info!("Recording finished: {} frames to {}", self.frames_written, path.display());
        Ok(path)
    }
}

/// Renderer that draws to the display and, while a recording is open, into
/// the recording as well.
pub struct RecordingRenderer<'a> {
    pub display: &'a mut dyn Renderer,
    pub recording: Option<&'a mut RecordingSession>,
}

impl Renderer for RecordingRenderer<'_> {
    fn render(&mut self, scene: &Scene) -> Result<()> {
        self.display.render(scene)?;
        if let Some(session) = self.recording.as_deref_mut() {
            if let Err(e) = session.record(scene) {
                // Surface the encoder failure when the session is finished;
                // the render pass itself aborts now.
                let message = e.to_string();
                session.error.get_or_insert(e);
                return Err(BoardError::encoder(message));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::playback::PlaybackOutcome;
    use crate::models::court::CourtKind;
    use crate::models::object::ObjectKey;
    use crate::models::pose::Position;
    use crate::util::geometry::CanvasSize;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SinkLog {
        config: Option<VideoConfig>,
        frames: usize,
        finished: usize,
        events: Vec<&'static str>,
    }

    struct MemorySink {
        log: Rc<RefCell<SinkLog>>,
        fail_begin: bool,
    }

    impl VideoSink for MemorySink {
        fn begin(&mut self, config: VideoConfig) -> Result<()> {
            if self.fail_begin {
                return Err(BoardError::encoder("ffmpeg not found"));
            }
            let mut log = self.log.borrow_mut();
            log.config = Some(config);
            log.events.push("begin");
            Ok(())
        }

        fn push_frame(&mut self, frame: &RgbaImage) -> Result<()> {
            let mut log = self.log.borrow_mut();
            assert_eq!(Some(frame.dimensions()), log.config.map(|c| (c.width, c.height)));
            log.frames += 1;
            Ok(())
        }

        fn finish(&mut self) -> Result<PathBuf> {
            let mut log = self.log.borrow_mut();
            log.finished += 1;
            log.events.push("finish");
            Ok(PathBuf::from("tactics-board_test.mp4"))
        }
    }

    #[derive(Default)]
    struct Display {
        scenes: usize,
        events: Option<Rc<RefCell<SinkLog>>>,
    }

    impl Renderer for Display {
        fn render(&mut self, _scene: &Scene) -> Result<()> {
            if self.scenes == 0 {
                if let Some(log) = &self.events {
                    log.borrow_mut().events.push("first scene");
                }
            }
            self.scenes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct QueueScheduler {
        pending: usize,
    }

    impl TickScheduler for QueueScheduler {
        fn schedule_next_tick(&mut self) {
            self.pending += 1;
        }
    }

    fn frames(n: usize) -> Vec<Pose> {
        (0..n)
            .map(|i| {
                [(ObjectKey::Ball, Position::new(10.0 * i as f64, 20.0))]
                    .into_iter()
                    .collect()
            })
            .collect()
    }

    fn rasterizer() -> SceneRasterizer {
        SceneRasterizer::new(CanvasSize::new(64, 48), CourtKind::Half, 10.0, None).unwrap()
    }

    #[test]
    fn test_records_every_rendered_scene() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = Box::new(MemorySink {
            log: log.clone(),
            fail_begin: false,
        });
        let mut engine = PlaybackEngine::new(5);
        let mut scheduler = QueueScheduler::default();
        let mut display = Display {
            events: Some(log.clone()),
            ..Default::default()
        };

        let (mut session, completion) =
            RecordingSession::start(sink, rasterizer(), 30, &mut engine, &frames(3), &mut scheduler).unwrap();
        while scheduler.pending > 0 {
            scheduler.pending -= 1;
            let mut renderer = RecordingRenderer {
                display: &mut display,
                recording: Some(&mut session),
            };
            engine.tick(&mut renderer, &mut scheduler);
        }
        assert!(matches!(completion.try_recv(), Ok(PlaybackOutcome::Completed { .. })));
        let written = session.frames_written();
        let path = session.finish().unwrap();

        let log = log.borrow();
        assert_eq!(path, PathBuf::from("tactics-board_test.mp4"));
        assert_eq!(log.config, Some(VideoConfig { width: 64, height: 48, fps: 30 }));
        assert_eq!(log.frames as u64, written);
        assert_eq!(log.frames, display.scenes);
        assert_eq!(log.finished, 1);
        assert_eq!(log.events, vec!["begin", "first scene", "finish"]);
    }

    #[test]
    fn test_rejected_play_never_opens_sink() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = Box::new(MemorySink {
            log: log.clone(),
            fail_begin: false,
        });
        let mut engine = PlaybackEngine::default();
        let mut scheduler = QueueScheduler::default();

        let result = RecordingSession::start(sink, rasterizer(), 30, &mut engine, &frames(2), &mut scheduler);

        assert!(matches!(
            result,
            Err(RecordStartError::Rejected(PlayRejected::NotEnoughFrames { have: 2 }))
        ));
        assert!(log.borrow().events.is_empty());
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_sink_failure_keeps_engine_idle() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = Box::new(MemorySink {
            log,
            fail_begin: true,
        });
        let mut engine = PlaybackEngine::default();
        let mut scheduler = QueueScheduler::default();

        let result = RecordingSession::start(sink, rasterizer(), 30, &mut engine, &frames(3), &mut scheduler);

        assert!(matches!(result, Err(RecordStartError::Sink(BoardError::Encoder(_)))));
        assert!(!engine.is_playing());
        assert_eq!(scheduler.pending, 0);
    }
}
