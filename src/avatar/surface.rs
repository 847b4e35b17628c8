use crate::avatar::particle::{Glyph, GlyphColor};

/// Drawing target for the avatar. Implementations must tolerate being used
/// before the underlying surface exists: `size()` returns `None` until then.
pub trait Surface {
    fn size(&self) -> Option<(f32, f32)>;
    fn clear(&mut self);
    fn draw_glyph(&mut self, x: f32, y: f32, glyph: Glyph, color: GlyphColor, opacity: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub x: f32,
    pub y: f32,
    pub glyph: Glyph,
    pub color: GlyphColor,
    pub opacity: f32,
}

/// In-memory surface holding the draw calls of the current frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Option<(f32, f32)>,
    calls: Vec<DrawCall>,
    clears: u64,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Some((width, height)),
            ..Default::default()
        }
    }

    /// A surface that has not been laid out yet.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_size(&mut self, size: Option<(f32, f32)>) {
        self.size = size;
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Option<(f32, f32)> {
        self.size
    }

    fn clear(&mut self) {
        self.calls.clear();
        self.clears += 1;
    }

    fn draw_glyph(&mut self, x: f32, y: f32, glyph: Glyph, color: GlyphColor, opacity: f32) {
        self.calls.push(DrawCall {
            x,
            y,
            glyph,
            color,
            opacity,
        });
    }
}
