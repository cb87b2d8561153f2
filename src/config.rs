use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;
use rusttype::Font;

use crate::error::RingError;
use crate::model::ProgressStyle;

/// RGB color used for every element of the ring
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
}

impl FromStr for Color {
    type Err = RingError;

    /// Parses `RRGGBB`, with or without a leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(RingError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| RingError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_MINIMUM: i32 = 0;
pub const DEFAULT_MAXIMUM: i32 = 100;
pub const DEFAULT_VALUE: i32 = 0;
pub const DEFAULT_STEP: i32 = 1;
pub const DEFAULT_MARQUEE_ANIMATION_SPEED: Duration = Duration::from_millis(100);
pub const DEFAULT_LOCK_ASPECT_RATIO: bool = false;

/// Cadet blue
pub const DEFAULT_PROGRESS_COLOR: Color = Color::new(0x5f, 0x9e, 0xa0);
/// White smoke, used for the ring band and the inner face
pub const RING_COLOR: Color = Color::new(0xf5, 0xf5, 0xf5);
pub const BORDER_COLOR: Color = Color::new(0xff, 0xff, 0xff);

pub const DEFAULT_FONT_SIZE: f32 = 24.0;

// ============================================================================
// WINDOW + WIDGET CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Builder)]
pub struct ProgressRingConfig {
    #[builder(default = "Ring Progress".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 300)]
    pub window_width: u32,
    #[builder(default = 300)]
    pub window_height: u32,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background_color: Color,

    // Widget state
    #[builder(default = (DEFAULT_MINIMUM, DEFAULT_MAXIMUM))]
    pub range: (i32, i32),
    #[builder(default = DEFAULT_VALUE)]
    pub value: i32,
    #[builder(default = DEFAULT_STEP)]
    pub step: i32,
    #[builder(default = ProgressStyle::Continuous)]
    pub style: ProgressStyle,
    #[builder(default = DEFAULT_MARQUEE_ANIMATION_SPEED.as_millis() as u64)]
    pub marquee_speed_ms: u64,
    #[builder(default = DEFAULT_PROGRESS_COLOR)]
    pub progress_color: Color,
    #[builder(default = DEFAULT_LOCK_ASPECT_RATIO)]
    pub lock_aspect_ratio: bool,

    // Font configuration; without font data the percentage label is skipped
    pub font_data: Option<Vec<u8>>,
    #[builder(default = DEFAULT_FONT_SIZE)]
    pub font_size: f32,
}

impl Default for ProgressRingConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProgressRingConfig {
    pub fn marquee_speed(&self) -> Duration {
        Duration::from_millis(self.marquee_speed_ms)
    }

    /// Parses the configured font bytes, if any.
    pub fn font(&self) -> Result<Option<Font<'static>>, RingError> {
        self.font_data
            .as_ref()
            .map(|data| Font::try_from_vec(data.clone()).ok_or(RingError::InvalidFont))
            .transpose()
    }
}

/// Reads a TrueType/OpenType file and validates it can be parsed.
pub fn load_font_data(path: &Path) -> Result<Vec<u8>, RingError> {
    let data = std::fs::read(path).map_err(|source| RingError::FontIo {
        path: path.to_path_buf(),
        source,
    })?;
    if Font::try_from_bytes(&data).is_none() {
        return Err(RingError::InvalidFont);
    }
    Ok(data)
}
