use egui::{Align2, Color32, FontId, Painter, Pos2, Rect};

use crate::avatar::{Glyph, GlyphColor, Surface};

/// Avatar surface backed by an egui painter clipped to one rect.
pub struct PainterSurface {
    painter: Painter,
    rect: Rect,
    font: FontId,
}

impl PainterSurface {
    pub fn new(painter: Painter, rect: Rect, glyph_size: f32) -> Self {
        Self {
            painter,
            rect,
            font: FontId::monospace(glyph_size.max(1.0)),
        }
    }
}

impl Surface for PainterSurface {
    fn size(&self) -> Option<(f32, f32)> {
        // a panel collapsed to nothing has no usable area yet
        let (w, h) = (self.rect.width(), self.rect.height());
        if w >= 1.0 && h >= 1.0 { Some((w, h)) } else { None }
    }

    fn clear(&mut self) {
        self.painter.rect_filled(self.rect, 0.0, Color32::BLACK);
    }

    fn draw_glyph(&mut self, x: f32, y: f32, glyph: Glyph, color: GlyphColor, opacity: f32) {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let pos = Pos2::new(self.rect.min.x + x, self.rect.min.y + y);
        self.painter.text(
            pos,
            Align2::CENTER_CENTER,
            glyph.as_char(),
            self.font.clone(),
            Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha),
        );
    }
}
