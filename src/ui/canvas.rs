// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board canvas.
//!
//! This module draws the court and its markers scaled to fit the central
//! panel, turns pointer input into canvas-space drag actions, and provides
//! the surface the playback engine renders into.

use crate::board::drag::PointerKind;
use crate::board::playback::{Renderer, Scene};
use crate::error::{BoardError, Result};
use crate::models::court::{CourtKind, CourtMark, PARQUET_RGB};
use crate::models::object::ObjectKey;
use crate::render::raster::{marker_rgb, overlay_anchor};
use crate::util::geometry::{canvas_to_screen, screen_to_canvas, CanvasSize, Point};
use std::time::Instant;

/// Result of canvas interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    None,
    StartDrag(Point),
    Drag(Point, PointerKind),
    StopDrag,
}

/// Latest scene handed over by playback, shown instead of the live pose.
///
/// Pointer input is only mapped onto the board while the live pose is on
/// screen, so a held playback scene is never picked through.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    scene: Option<Scene>,
    visible: bool,
    release_at: Option<Instant>,
}

impl CanvasSurface {
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Whether the live pose is what the board shows.
    pub fn shows_live(&self) -> bool {
        self.scene.is_none()
    }

    /// Go back to showing the live pose.
    pub fn clear(&mut self) {
        self.scene = None;
        self.release_at = None;
    }

    /// Keep the current scene up until `at`.
    pub fn hold_until(&mut self, at: Instant) {
        if self.scene.is_some() {
            self.release_at = Some(at);
        }
    }

    /// Drop a held scene whose time is up. Returns `true` while a scene is
    /// still held.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.release_at {
            Some(at) if now >= at => {
                self.clear();
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl Renderer for CanvasSurface {
    fn render(&mut self, scene: &Scene) -> Result<()> {
        if !self.visible {
            return Err(BoardError::render_target("board canvas is not visible"));
        }
        self.scene = Some(scene.clone());
        self.release_at = None;
        Ok(())
    }
}

/// Everything needed to draw one frame of the canvas.
pub struct CanvasView<'a> {
    pub scene: &'a Scene,
    pub court: CourtKind,
    pub canvas: CanvasSize,
    pub marker_size: f64,
    pub court_texture: Option<&'a egui::TextureHandle>,
    pub interactive: bool,
}

/// Display the board and handle pointer input. Returns the action and
/// whether the canvas had a drawable area this frame.
pub fn show(ui: &mut egui::Ui, view: &CanvasView<'_>) -> (CanvasAction, bool) {
    let available = ui.available_size();
    let (response, painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());

    let scale = view
        .canvas
        .fit_scale(response.rect.width() as f64, response.rect.height() as f64);
    let display = egui::vec2(
        (view.canvas.width as f64 * scale) as f32,
        (view.canvas.height as f64 * scale) as f32,
    );
    let board_rect = egui::Rect::from_center_size(response.rect.center(), display);
    let visible = board_rect.width() >= 1.0 && board_rect.height() >= 1.0;
    if !visible {
        return (CanvasAction::None, false);
    }
    let origin = Point::new(board_rect.min.x as f64, board_rect.min.y as f64);
    let to_screen = |p: Point| {
        let (x, y) = canvas_to_screen(p, origin, scale);
        egui::pos2(x as f32, y as f32)
    };

    // Court
    let [r, g, b] = PARQUET_RGB;
    painter.rect_filled(board_rect, 0.0, egui::Color32::from_rgb(r, g, b));
    match view.court_texture {
        Some(texture) => {
            painter.image(
                texture.id(),
                board_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            let stroke = egui::Stroke::new((2.0 * scale) as f32, egui::Color32::WHITE);
            for mark in view.court.marks() {
                draw_mark(&painter, mark, &to_screen, stroke);
            }
        }
    }

    // Markers
    let radius = (view.marker_size / 2.0 * scale) as f32;
    for (key, pos) in view.scene.pose.iter() {
        let center = to_screen(pos.point());
        let [r, g, b] = marker_rgb(*key, pos);
        painter.circle_filled(center, radius, egui::Color32::from_rgb(r, g, b));
        let outline = match key {
            ObjectKey::Ball => egui::Color32::from_gray(32),
            ObjectKey::Player(..) => egui::Color32::WHITE,
        };
        painter.circle_stroke(center, radius - 1.0, egui::Stroke::new(1.5, outline));

        let badge = key.badge();
        if !badge.is_empty() {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                badge,
                egui::FontId::proportional(radius * 0.9),
                egui::Color32::WHITE,
            );
        }
    }

    // Transition label
    if let Some(overlay) = view.scene.overlay {
        painter.text(
            to_screen(overlay_anchor(overlay)),
            egui::Align2::LEFT_BOTTOM,
            overlay.to_string(),
            egui::FontId::proportional((24.0 * scale) as f32),
            egui::Color32::WHITE,
        );
    }

    if !view.interactive {
        return (CanvasAction::None, true);
    }

    let to_canvas = |pos: egui::Pos2| screen_to_canvas(pos.x as f64, pos.y as f64, origin, scale);
    let (pressed, released, down, moved, press_origin, latest, touch) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.primary_down(),
            i.pointer.is_moving(),
            i.pointer.press_origin(),
            i.pointer.latest_pos(),
            i.any_touches(),
        )
    });
    let kind = if touch { PointerKind::Touch } else { PointerKind::Mouse };

    let action = if pressed {
        match press_origin {
            Some(pos) if board_rect.contains(pos) => CanvasAction::StartDrag(to_canvas(pos)),
            _ => CanvasAction::None,
        }
    } else if released {
        CanvasAction::StopDrag
    } else if down && moved {
        match latest {
            Some(pos) => CanvasAction::Drag(to_canvas(pos), kind),
            None => CanvasAction::None,
        }
    } else {
        CanvasAction::None
    };

    (action, true)
}

fn draw_mark(painter: &egui::Painter, mark: CourtMark, to_screen: &impl Fn(Point) -> egui::Pos2, stroke: egui::Stroke) {
    match mark {
        CourtMark::Segment { from, to } => {
            painter.line_segment([to_screen(from), to_screen(to)], stroke);
        }
        CourtMark::Arc {
            center,
            radius,
            start,
            end,
        } => {
            let segments = 48;
            let points: Vec<egui::Pos2> = (0..=segments)
                .map(|i| {
                    let a = start + (end - start) * i as f64 / segments as f64;
                    to_screen(Point::new(center.x + radius * a.cos(), center.y + radius * a.sin()))
                })
                .collect();
            painter.add(egui::Shape::line(points, stroke));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::Pose;
    use std::time::Duration;

    #[test]
    fn test_surface_requires_visible_canvas() {
        let mut surface = CanvasSurface::default();
        let scene = Scene::still(Pose::new());

        assert!(matches!(
            surface.render(&scene),
            Err(BoardError::RenderTargetUnavailable(_))
        ));
        assert!(surface.scene().is_none());

        surface.set_visible(true);
        surface.render(&scene).unwrap();
        assert_eq!(surface.scene(), Some(&scene));

        surface.clear();
        assert!(surface.scene().is_none());
    }

    #[test]
    fn test_finished_scene_is_held_then_released() {
        let mut surface = CanvasSurface::default();
        surface.set_visible(true);
        let now = Instant::now();

        // Nothing to hold while the live pose is shown.
        surface.hold_until(now + Duration::from_secs(1));
        assert!(!surface.expire(now));

        surface.render(&Scene::still(Pose::new())).unwrap();
        assert!(!surface.shows_live());
        surface.hold_until(now + Duration::from_secs(1));

        assert!(surface.expire(now));
        assert!(!surface.shows_live());
        assert!(!surface.expire(now + Duration::from_secs(1)));
        assert!(surface.shows_live());
    }
}
