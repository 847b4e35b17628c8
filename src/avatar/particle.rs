/// Anatomical zone a particle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Head,
    Torso,
    LeftArm,
    RightArm,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Head,
        Region::Torso,
        Region::LeftArm,
        Region::RightArm,
    ];

    /// Nominal share of the particle budget.
    pub fn share(self) -> f32 {
        match self {
            Region::Head => 0.25,
            Region::Torso => 0.40,
            Region::LeftArm | Region::RightArm => 0.175,
        }
    }

    pub fn color(self) -> GlyphColor {
        match self {
            Region::Head => GlyphColor::HEAD,
            _ => GlyphColor::BODY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Zero,
    One,
}

impl Glyph {
    pub fn flipped(self) -> Self {
        match self {
            Glyph::Zero => Glyph::One,
            Glyph::One => Glyph::Zero,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Glyph::Zero => '0',
            Glyph::One => '1',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl GlyphColor {
    pub const HEAD: GlyphColor = GlyphColor {
        r: 50,
        g: 255,
        b: 100,
    };
    pub const BODY: GlyphColor = GlyphColor { r: 0, g: 255, b: 65 };
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Position at generation time. Not read after init.
    pub origin_x: f32,
    pub origin_y: f32,
    pub glyph: Glyph,
    pub region: Region,
    /// Angular speed of the idle blink (rad/s), always > 0.
    pub phase_speed: f32,
    /// Phase offset in [0, 2π).
    pub phase_offset: f32,
    /// Opacity computed on the last frame.
    pub opacity: f32,
}

impl Particle {
    pub fn new(
        x: f32,
        y: f32,
        glyph: Glyph,
        region: Region,
        phase_speed: f32,
        phase_offset: f32,
    ) -> Self {
        Self {
            x,
            y,
            origin_x: x,
            origin_y: y,
            glyph,
            region,
            phase_speed,
            phase_offset,
            opacity: 0.0,
        }
    }
}
