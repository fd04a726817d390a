// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label text for recorded frames.
//!
//! Labels are shaped with Parley from a single embedded font and drawn as
//! glyph runs into a `vello_cpu` render context. Layouts are cached per
//! text, size and colour, since the same handful of labels repeats every frame.

use crate::error::{BoardError, Result};
use crate::util::geometry::Point;
use std::borrow::Cow;
use std::collections::HashMap;
use vello_cpu::kurbo::Affine;

/// egui ships this font; its coverage includes the arrow used in transition labels.
const LABEL_FONT: &str = "Hack";

/// RGBA brush carried through Parley layouts.
pub type TextBrush = [u8; 4];

type LayoutKey = (String, u32, TextBrush);

pub struct LabelText {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
    layouts: HashMap<LayoutKey, parley::Layout<TextBrush>>,
}

impl LabelText {
    /// Use the monospace font bundled with egui.
    pub fn with_bundled_font() -> Result<Self> {
        let fonts = egui::FontDefinitions::default();
        let data = fonts
            .font_data
            .get(LABEL_FONT)
            .ok_or_else(|| BoardError::render_target(format!("font {} is not bundled", LABEL_FONT)))?;
        Self::from_font_bytes(data.font.to_vec())
    }

    pub fn from_font_bytes(font_bytes: Vec<u8>) -> Result<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| BoardError::render_target("no font family in label font"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BoardError::render_target("label font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
            layouts: HashMap::new(),
        })
    }

    /// Width and height of `text` laid out at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f32, brush: TextBrush) -> (f64, f64) {
        let layout = self.layout(text, size_px, brush);
        (layout.width() as f64, layout.height() as f64)
    }

    /// Fill `text` with its top-left corner at `top_left`.
    pub fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        brush: TextBrush,
        top_left: Point,
    ) {
        self.layout(text, size_px, brush);
        let Some(layout) = self.layouts.get(&(text.to_string(), size_px.to_bits(), brush)) else {
            return;
        };

        ctx.set_transform(Affine::translate((top_left.x, top_left.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let [r, g, b, a] = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(Affine::IDENTITY);
    }

    fn layout(&mut self, text: &str, size_px: f32, brush: TextBrush) -> &parley::Layout<TextBrush> {
        let font_ctx = &mut self.font_ctx;
        let layout_ctx = &mut self.layout_ctx;
        let family = &self.family;
        self.layouts
            .entry((text.to_string(), size_px.to_bits(), brush))
            .or_insert_with(|| {
                let mut builder = layout_ctx.ranged_builder(font_ctx, text, 1.0, true);
                builder.push_default(parley::style::StyleProperty::FontStack(parley::style::FontStack::Source(
                    Cow::Owned(family.clone()),
                )));
                builder.push_default(parley::style::StyleProperty::FontSize(size_px));
                builder.push_default(parley::style::StyleProperty::Brush(brush));
                let mut layout: parley::Layout<TextBrush> = builder.build(text);
                layout.break_all_lines(None);
                layout
            })
    }
}
