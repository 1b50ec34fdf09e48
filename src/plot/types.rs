//! Shared plot types: colors, bands and rendered output.

use plotters::style::RGBColor;

use crate::error::{ChartError, ChartResult};

/// Number of vertical slices the band background is sampled into.
pub const BACKGROUND_SLICES: usize = 256;

pub const BORDER_COLOR: RGBColor = RGBColor(0, 0, 0);
pub const BACKGROUND_COLOR: RGBColor = RGBColor(255, 255, 255);

/// Largest figure side in pixels.
pub const MAX_FIGURE_SIDE: u32 = 16_384;

/// Both sides must be non-zero and at most `MAX_FIGURE_SIDE`.
pub fn check_figure_size(width: u32, height: u32) -> ChartResult<()> {
    let valid = |side: u32| (1..=MAX_FIGURE_SIDE).contains(&side);
    if !valid(width) || !valid(height) {
        return Err(ChartError::render(format!(
            "figure size {}x{} outside 1..={}",
            width, height, MAX_FIGURE_SIDE
        )));
    }
    Ok(())
}

/// Parse a `#RRGGBB` (or bare `RRGGBB`) hex literal.
pub fn parse_hex(hex: &str) -> ChartResult<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChartError::color(format!("expected #RRGGBB, got {:?}", hex)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|e| ChartError::color(format!("{:?}: {}", hex, e)))
    };
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// A contiguous region of fixed width along a linear axis with one base color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub color: RGBColor,
    pub width: f64,
}

impl Band {
    pub fn new(color: RGBColor, width: f64) -> Self {
        Self { color, width }
    }

    pub fn from_hex(hex: &str, width: f64) -> ChartResult<Self> {
        Ok(Self::new(parse_hex(hex)?, width))
    }
}

/// A rendered chart image.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub file_name: String,
    pub png_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
