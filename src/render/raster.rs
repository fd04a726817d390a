// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Off-screen scene rendering.
//!
//! Recording needs real pixels rather than egui shapes, so scenes are drawn
//! here with `vello_cpu` at canvas resolution: court floor, court image or
//! painted lines, markers, then the overlay label. The floor is opaque, so
//! the premultiplied pixmap bytes are also valid straight RGBA.

use super::text::LabelText;
use crate::board::playback::{Overlay, Scene};
use crate::error::{BoardError, Result};
use crate::models::court::{CourtKind, CourtMark, PARQUET_RGB};
use crate::models::object::ObjectKey;
use crate::models::pose::Position;
use crate::util::color::parse_hex_rgb;
use crate::util::geometry::{CanvasSize, Point};
use image::{imageops, RgbaImage};
use std::sync::Arc;
use vello_cpu::kurbo::{self, Shape};
use vello_cpu::peniko::Color;

pub const BALL_RGB: [u8; 3] = [0xe8, 0x73, 0x1a];
const LINE_WIDTH: f64 = 2.0;
const LABEL_SIZE: f32 = 24.0;
const WHITE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
const TOLERANCE: f64 = 0.1;

/// Where the overlay label sits: its bottom-left corner, in canvas coordinates.
pub fn overlay_anchor(overlay: Overlay) -> Point {
    match overlay {
        Overlay::Transition { .. } => Point::new(50.0, 40.0),
        Overlay::End => Point::new(130.0, 40.0),
    }
}

/// Fill colour of a marker: its own colour when set, otherwise the team's.
pub fn marker_rgb(key: ObjectKey, position: &Position) -> [u8; 3] {
    if let Some(rgb) = position.color.as_deref().and_then(parse_hex_rgb) {
        return rgb;
    }
    match key {
        ObjectKey::Ball => BALL_RGB,
        ObjectKey::Player(team, _) => team.rgb(),
    }
}

/// Draws scenes into RGBA images of a fixed size.
pub struct SceneRasterizer {
    canvas: CanvasSize,
    court: CourtKind,
    marker_size: f64,
    background: Option<vello_cpu::Image>,
    ctx: Option<vello_cpu::RenderContext>,
    text: LabelText,
}

impl SceneRasterizer {
    /// `background`, when given, is stretched to the canvas once up front.
    pub fn new(canvas: CanvasSize, court: CourtKind, marker_size: f64, background: Option<&RgbaImage>) -> Result<Self> {
        let background = match background {
            Some(img) if canvas.width > 0 && canvas.height > 0 => {
                let scaled = imageops::resize(img, canvas.width, canvas.height, imageops::FilterType::Triangle);
                Some(image_paint(&scaled)?)
            }
            _ => None,
        };
        Ok(Self {
            canvas,
            court,
            marker_size,
            background,
            ctx: None,
            text: LabelText::with_bundled_font()?,
        })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn rasterize(&mut self, scene: &Scene) -> Result<RgbaImage> {
        let (width, height) = pixmap_size(self.canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        self.draw_court(&mut ctx);
        self.draw_markers(&mut ctx, scene);
        if let Some(overlay) = scene.overlay {
            let label = overlay.to_string();
            let (_, label_height) = self.text.measure(&label, LABEL_SIZE, WHITE);
            let anchor = overlay_anchor(overlay);
            self.text.draw(
                &mut ctx,
                &label,
                LABEL_SIZE,
                WHITE,
                Point::new(anchor.x, anchor.y - label_height),
            );
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        RgbaImage::from_raw(self.canvas.width, self.canvas.height, pixmap.data_as_u8_slice().to_vec())
            .ok_or_else(|| BoardError::render_target("rendered frame has the wrong size"))
    }

    fn draw_court(&self, ctx: &mut vello_cpu::RenderContext) {
        let full = kurbo::Rect::new(0.0, 0.0, self.canvas.width as f64, self.canvas.height as f64);
        ctx.set_transform(kurbo::Affine::IDENTITY);
        ctx.set_paint(solid(PARQUET_RGB));
        ctx.fill_rect(&full);

        match &self.background {
            Some(paint) => {
                ctx.set_paint(paint.clone());
                ctx.fill_rect(&full);
            }
            None => {
                ctx.set_paint(solid([0xff, 0xff, 0xff]));
                ctx.set_stroke(kurbo::Stroke::new(LINE_WIDTH));
                for mark in self.court.marks() {
                    ctx.stroke_path(&mark_path(mark));
                }
            }
        }
    }

    fn draw_markers(&mut self, ctx: &mut vello_cpu::RenderContext, scene: &Scene) {
        let radius = self.marker_size / 2.0;
        let badge_size = (self.marker_size * 0.45) as f32;
        for (key, pos) in scene.pose.iter() {
            let center = kurbo::Point::new(pos.x, pos.y);
            ctx.set_paint(solid(marker_rgb(*key, pos)));
            ctx.fill_path(&kurbo::Circle::new(center, radius).to_path(TOLERANCE));

            let outline = match key {
                ObjectKey::Ball => [0x20, 0x20, 0x20],
                ObjectKey::Player(..) => [0xff, 0xff, 0xff],
            };
            ctx.set_paint(solid(outline));
            ctx.set_stroke(kurbo::Stroke::new(1.5));
            ctx.stroke_path(&kurbo::Circle::new(center, radius - 1.0).to_path(TOLERANCE));

            let badge = key.badge();
            if !badge.is_empty() {
                let (w, h) = self.text.measure(&badge, badge_size, WHITE);
                let top_left = Point::new(pos.x - w / 2.0, pos.y - h / 2.0);
                self.text.draw(ctx, &badge, badge_size, WHITE, top_left);
            }
        }
    }
}

fn solid([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn pixmap_size(canvas: CanvasSize) -> Result<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(BoardError::render_target(format!(
            "canvas has no area ({}x{})",
            canvas.width, canvas.height
        )));
    }
    let width = u16::try_from(canvas.width)
        .map_err(|_| BoardError::render_target(format!("canvas width {} is too large", canvas.width)))?;
    let height = u16::try_from(canvas.height)
        .map_err(|_| BoardError::render_target(format!("canvas height {} is too large", canvas.height)))?;
    Ok((width, height))
}

fn mark_path(mark: CourtMark) -> kurbo::BezPath {
    match mark {
        CourtMark::Segment { from, to } => {
            kurbo::Line::new((from.x, from.y), (to.x, to.y)).to_path(TOLERANCE)
        }
        CourtMark::Arc {
            center,
            radius,
            start,
            end,
        } => kurbo::Arc::new(
            (center.x, center.y),
            (radius, radius),
            start,
            end - start,
            0.0,
        )
        .to_path(TOLERANCE),
    }
}

/// Image paint from straight RGBA pixels, premultiplied as vello expects.
fn image_paint(img: &RgbaImage) -> Result<vello_cpu::Image> {
    let (width, height) = pixmap_size(CanvasSize::new(img.width(), img.height()))?;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = img
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let premul = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([premul(r), premul(g), premul(b), a])
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, width, height, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::object::Team;
    use crate::models::pose::Pose;
    use image::Rgba;

    fn rasterizer() -> SceneRasterizer {
        SceneRasterizer::new(CanvasSize::new(120, 100), CourtKind::Half, 40.0, None).unwrap()
    }

    fn pixel(img: &RgbaImage, x: u32, y: u32) -> [u8; 3] {
        let p = img.get_pixel(x, y).0;
        [p[0], p[1], p[2]]
    }

    fn white_pixels(img: &RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(img, x, y).iter().all(|&c| c > 0xf0))
            .count()
    }

    #[test]
    fn test_marker_drawn_at_position() {
        let pose: Pose = [(ObjectKey::red(1), Position::new(60.0, 70.0))].into_iter().collect();
        let img = rasterizer().rasterize(&Scene::still(pose)).unwrap();

        assert_eq!(img.dimensions(), (120, 100));
        // left of the badge, inside the disc
        assert_eq!(pixel(&img, 46, 70), Team::Red.rgb());
        assert_eq!(pixel(&img, 115, 95), PARQUET_RGB);
        assert_eq!(img.get_pixel(115, 95).0[3], 255);
    }

    #[test]
    fn test_custom_color_wins() {
        let pos = Position {
            x: 0.0,
            y: 0.0,
            color: Some("#00ff00".to_string()),
        };
        assert_eq!(marker_rgb(ObjectKey::blue(2), &pos), [0, 255, 0]);
        assert_eq!(marker_rgb(ObjectKey::Ball, &Position::new(0.0, 0.0)), BALL_RGB);
    }

    #[test]
    fn test_overlay_is_drawn() {
        let mut r = rasterizer();
        let plain = r.rasterize(&Scene::still(Pose::new())).unwrap();
        let labelled = r
            .rasterize(&Scene {
                pose: Pose::new(),
                overlay: Some(Overlay::Transition { from: 1, to: 2 }),
            })
            .unwrap();

        assert_ne!(plain, labelled);
        assert!(white_pixels(&labelled, 50, 10, 120, 40) > white_pixels(&plain, 50, 10, 120, 40));
        // nothing is written outside the label box
        assert_eq!(pixel(&labelled, 10, 90), pixel(&plain, 10, 90));
    }

    #[test]
    fn test_rasterizer_is_reusable_between_frames() {
        let mut r = rasterizer();
        let scene = Scene::still([(ObjectKey::Ball, Position::new(30.0, 30.0))].into_iter().collect());

        let first = r.rasterize(&scene).unwrap();
        let second = r.rasterize(&scene).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_canvas_is_unavailable() {
        let mut r = SceneRasterizer::new(CanvasSize::new(0, 0), CourtKind::Full, 40.0, None).unwrap();
        assert!(matches!(
            r.rasterize(&Scene::still(Pose::new())),
            Err(BoardError::RenderTargetUnavailable(_))
        ));
    }

    #[test]
    fn test_background_is_scaled_to_canvas() {
        let bg = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let mut r = SceneRasterizer::new(CanvasSize::new(120, 100), CourtKind::Full, 40.0, Some(&bg)).unwrap();
        let img = r.rasterize(&Scene::still(Pose::new())).unwrap();

        assert_eq!(pixel(&img, 119, 99), [1, 2, 3]);
    }
}
