//! Particle avatar: silhouette sampling, per-frame animation, drawing seam.

pub mod animator;
pub mod body;
pub mod particle;
pub mod surface;

pub use animator::{Animator, AnimatorParams, FrameOutcome};
pub use body::BodyField;
pub use particle::{Glyph, GlyphColor, Particle, Region};
pub use surface::{DrawCall, RecordingSurface, Surface};
