// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame-to-frame playback.
//!
//! Playback walks the captured frames pairwise starting at frame 1 (the
//! starting layout is never animated from). Each transition interpolates
//! every marker linearly over a fixed number of steps. An axis that reaches
//! or passes its target is pinned to the exact target value, and the engine
//! only moves on to the next pair once every marker has arrived.
//!
//! The engine never waits on a clock. Each call to [`PlaybackEngine::tick`]
//! renders one scene and asks the [`TickScheduler`] for at most one more
//! tick, so the UI drives it from its repaint loop and tests drive it from a
//! plain loop.

use crate::error::BoardError;
use crate::models::object::ObjectKey;
use crate::models::pose::{Pose, Position};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Ticks used to animate one transition.
pub const DEFAULT_TRANSITION_STEPS: u32 = 100;

/// Fewest frames (including the starting layout) that can be played.
pub const MIN_PLAYABLE_FRAMES: usize = 3;

/// Text drawn over a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Transition from frame `from` to frame `to`.
    Transition { from: usize, to: usize },
    /// Playback reached the last frame.
    End,
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overlay::Transition { from, to } => write!(f, "{from} → {to}"),
            Overlay::End => write!(f, "END"),
        }
    }
}

/// Everything a renderer needs for one picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub pose: Pose,
    pub overlay: Option<Overlay>,
}

impl Scene {
    pub fn still(pose: Pose) -> Self {
        Self { pose, overlay: None }
    }
}

/// Draws scenes. The engine never owns a drawing surface itself.
pub trait Renderer {
    fn render(&mut self, scene: &Scene) -> Result<(), BoardError>;
}

/// Requests one more call to [`PlaybackEngine::tick`].
pub trait TickScheduler {
    fn schedule_next_tick(&mut self);
}

/// Why `play` did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRejected {
    AlreadyRunning,
    NotEnoughFrames { have: usize },
}

impl fmt::Display for PlayRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayRejected::AlreadyRunning => write!(f, "playback is already running"),
            PlayRejected::NotEnoughFrames { have } => write!(
                f,
                "capture at least {} frames to play (have {})",
                MIN_PLAYABLE_FRAMES - 1,
                have.saturating_sub(1)
            ),
        }
    }
}

/// How a playback run ended.
#[derive(Debug)]
pub enum PlaybackOutcome {
    Completed { ticks: u64 },
    Cancelled,
    Failed(BoardError),
}

/// Receives the outcome of a single playback run.
pub type PlaybackCompletion = Receiver<PlaybackOutcome>;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Nothing is playing.
    Idle,
    /// A scene was rendered and another tick was scheduled.
    Running,
    /// The run ended on this tick.
    Finished,
}

struct Run {
    frames: Vec<Pose>,
    index: usize,
    step: u32,
    current: Pose,
    deltas: BTreeMap<ObjectKey, (f64, f64)>,
    ticks: u64,
    done: Sender<PlaybackOutcome>,
}

/// Idle/playing state machine that animates a frame sequence.
pub struct PlaybackEngine {
    steps: u32,
    run: Option<Run>,
    cancel_requested: bool,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_STEPS)
    }
}

impl PlaybackEngine {
    pub fn new(steps: u32) -> Self {
        Self {
            steps: steps.max(1),
            run: None,
            cancel_requested: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.run.is_some()
    }

    /// Check the preconditions of [`play`](Self::play) without starting.
    pub fn can_play(&self, frames: &[Pose]) -> Result<(), PlayRejected> {
        if self.is_playing() {
            return Err(PlayRejected::AlreadyRunning);
        }
        if frames.len() < MIN_PLAYABLE_FRAMES {
            return Err(PlayRejected::NotEnoughFrames { have: frames.len() });
        }
        Ok(())
    }

    /// Start animating a snapshot of `frames` from the 1 → 2 transition.
    ///
    /// Returns immediately; the first scene is rendered by the next tick.
    pub fn play(
        &mut self,
        frames: &[Pose],
        scheduler: &mut dyn TickScheduler,
    ) -> Result<PlaybackCompletion, PlayRejected> {
        self.can_play(frames)?;

        let (done, completion) = channel();
        self.cancel_requested = false;
        self.run = Some(Run {
            frames: frames.to_vec(),
            index: 1,
            step: 0,
            current: frames[1].clone(),
            deltas: BTreeMap::new(),
            ticks: 0,
            done,
        });
        log::info!("Playback started over {} frames", frames.len() - 1);
        scheduler.schedule_next_tick();
        Ok(completion)
    }

    /// Stop at the next tick. Nothing happens if idle.
    pub fn cancel(&mut self) {
        if self.is_playing() {
            self.cancel_requested = true;
        }
    }

    /// Advance playback by one tick.
    pub fn tick(&mut self, renderer: &mut dyn Renderer, scheduler: &mut dyn TickScheduler) -> TickStatus {
        let steps = self.steps as f64;
        let Some(run) = self.run.as_mut() else {
            return TickStatus::Idle;
        };

        if self.cancel_requested {
            log::info!("Playback cancelled at frame {}", run.index);
            return self.finish(PlaybackOutcome::Cancelled);
        }

        let Some(target) = run.frames.get(run.index + 1) else {
            let end = Scene {
                pose: run.frames[run.index].clone(),
                overlay: Some(Overlay::End),
            };
            if let Err(e) = renderer.render(&end) {
                return self.finish(PlaybackOutcome::Failed(e));
            }
            let ticks = run.ticks;
            log::info!("Playback finished after {} ticks", ticks);
            return self.finish(PlaybackOutcome::Completed { ticks });
        };

        if run.step == 0 {
            let from = &run.frames[run.index];
            run.current = from.clone();
            run.deltas = from
                .iter()
                .filter_map(|(key, start)| {
                    let end = target.get(*key)?;
                    Some((*key, ((end.x - start.x) / steps, (end.y - start.y) / steps)))
                })
                .collect();
        } else {
            for (key, (dx, dy)) in &run.deltas {
                if let Some(pos) = run.current.get(*key) {
                    let next = Position {
                        x: pos.x + dx,
                        y: pos.y + dy,
                        color: pos.color.clone(),
                    };
                    run.current.insert(*key, next);
                }
            }
        }

        // Past the step budget every object is pinned to its target, even if
        // float rounding has stalled the accumulated position.
        let budget_spent = run.step as f64 >= steps;
        let mut shown = Pose::new();
        let mut arrived = 0;
        for (key, pos) in run.current.iter() {
            let (Some(end), Some(&(dx, dy))) = (target.get(*key), run.deltas.get(key)) else {
                // Objects missing from the next frame stay where they are.
                shown.insert(*key, pos.clone());
                arrived += 1;
                continue;
            };
            let x_done = budget_spent || axis_arrived(dx, pos.x, end.x);
            let y_done = budget_spent || axis_arrived(dy, pos.y, end.y);
            if x_done && y_done {
                arrived += 1;
            }
            shown.insert(
                *key,
                Position {
                    x: if x_done { end.x } else { pos.x },
                    y: if y_done { end.y } else { pos.y },
                    color: end.color.clone(),
                },
            );
        }

        let scene = Scene {
            pose: shown,
            overlay: Some(Overlay::Transition {
                from: run.index,
                to: run.index + 1,
            }),
        };
        if let Err(e) = renderer.render(&scene) {
            log::error!("Playback aborted at frame {}: {}", run.index, e);
            return self.finish(PlaybackOutcome::Failed(e));
        }

        run.ticks += 1;
        run.step += 1;
        if arrived == run.current.len() {
            log::debug!("Transition {} → {} done in {} ticks", run.index, run.index + 1, run.step);
            run.index += 1;
            run.step = 0;
        }
        scheduler.schedule_next_tick();
        TickStatus::Running
    }

    fn finish(&mut self, outcome: PlaybackOutcome) -> TickStatus {
        self.cancel_requested = false;
        if let Some(run) = self.run.take() {
            // The caller may have dropped the receiver; the outcome is then unobserved.
            let _ = run.done.send(outcome);
        }
        TickStatus::Finished
    }
}

/// Whether a value moving by `delta` per step has reached or passed `target`.
fn axis_arrived(delta: f64, value: f64, target: f64) -> bool {
    (delta >= 0.0 && value >= target) || (delta <= 0.0 && value <= target)
}
