use bon::Builder;

/// Color representation for face elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// One ring of tick marks. Lengths and widths are fractions of the face
/// radius; the marks sit at the outer edge of the primary band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSpec {
    pub count: u32,
    pub length_fraction: f64,
    pub width_fraction: f64,
}

impl TickSpec {
    /// Sixty minute marks.
    pub const fn minutes() -> Self {
        Self {
            count: 60,
            length_fraction: 0.06,
            width_fraction: 0.01,
        }
    }

    /// Twelve hour marks.
    pub const fn hours() -> Self {
        Self {
            count: 12,
            length_fraction: 0.1,
            width_fraction: 0.02,
        }
    }
}

/// Every proportion and color of the face. All linear dimensions are
/// fractions of the radius, so the whole face scales with one parameter.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct FaceStyle {
    /// Fraction of the radius spanned by the primary time band.
    #[builder(default = 0.8)]
    pub face_proportion: f64,
    /// Fraction of the radius spanned by the last-minute band.
    #[builder(default = 0.5)]
    pub last_minute_proportion: f64,

    // Colors
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background: Color,
    #[builder(default = Color::new(0xdd, 0xdd, 0xdd))]
    pub initial_band: Color,
    #[builder(default = Color::new(0xfb, 0x00, 0x00))]
    pub elapsed_band: Color,
    #[builder(default = Color::new(0xc7, 0x00, 0x00))]
    pub last_minute_band: Color,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub ink: Color,

    // Labels
    #[builder(default = "BAYO's Timer".to_string())]
    pub branding: String,
    #[builder(default = 0.2)]
    pub time_font_fraction: f64,
    #[builder(default = 0.1)]
    pub numeral_font_fraction: f64,
    #[builder(default = 0.05)]
    pub branding_font_fraction: f64,
    #[builder(default = 0.15)]
    pub time_offset_fraction: f64,
    #[builder(default = 0.3)]
    pub branding_offset_fraction: f64,

    // Static face
    #[builder(default = TickSpec::minutes())]
    pub minute_marks: TickSpec,
    #[builder(default = TickSpec::hours())]
    pub hour_marks: TickSpec,
    #[builder(default = 0.9)]
    pub numeral_ring_fraction: f64,
    #[builder(default = 0.03)]
    pub pin_fraction: f64,
}

impl Default for FaceStyle {
    fn default() -> Self {
        Self::builder().build()
    }
}
