//! Rendering support shared by the charts: text, image overlays, PNG encoding.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageEncoder, RgbaImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use tracing::debug;

use crate::config::{OutputConfig, StyleConfig};
use crate::error::{ChartError, ChartResult};
use crate::plot::types::check_figure_size;

/// Line spacing relative to font size for multi-line labels.
const LINE_SPACING: f64 = 1.2;

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Register the configured font files with plotters under
/// `style.font_family`. Without a bold file the regular face serves both.
pub fn register_fonts(style: &StyleConfig, output: &OutputConfig) -> ChartResult<()> {
    let regular = read_font(&output.asset(&style.font_file))?;
    let bold = match &style.bold_font_file {
        Some(path) => read_font(&output.asset(path))?,
        None => regular,
    };
    register(&style.font_family, FontStyle::Normal, regular)?;
    register(&style.font_family, FontStyle::Bold, bold)?;
    debug!(family = %style.font_family, "registered fonts");
    Ok(())
}

/// Font data must outlive the plotters registry, which is process-wide.
fn read_font(path: &Path) -> ChartResult<&'static [u8]> {
    let bytes = std::fs::read(path)
        .map_err(|e| ChartError::asset(format!("font {}: {}", path.display(), e)))?;
    Ok(Box::leak(bytes.into_boxed_slice()))
}

fn register(family: &str, style: FontStyle, bytes: &'static [u8]) -> ChartResult<()> {
    plotters::style::register_font(family, style, bytes)
        .map_err(|_| ChartError::asset(format!("font {:?}: invalid font data", family)))
}

/// Centered text style in `color`.
pub fn text_style<'a>(family: &'a str, size: u32, bold: bool, color: &RGBColor) -> TextStyle<'a> {
    let font = if bold {
        (family, size, FontStyle::Bold).into_font()
    } else {
        (family, size).into_font()
    };
    font.color(color).pos(Pos::new(HPos::Center, VPos::Center))
}

/// Draw `text` centered on `center`, one row per `\n`.
pub fn draw_text_lines(
    canvas: &Canvas<'_>,
    text: &str,
    center: (i32, i32),
    size: u32,
    style: &TextStyle<'_>,
) -> ChartResult<()> {
    let lines: Vec<&str> = text.lines().collect();
    let line_height = size as f64 * LINE_SPACING;
    let top = center.1 as f64 - line_height * (lines.len() as f64 - 1.0) / 2.0;

    for (i, line) in lines.iter().enumerate() {
        let y = (top + line_height * i as f64).round() as i32;
        canvas
            .draw(&Text::new(line.to_string(), (center.0, y), style.clone()))
            .map_err(|e| ChartError::render(format!("text {:?}: {}", line, e)))?;
    }
    Ok(())
}

/// Load an image asset. Missing or undecodable files fail immediately.
pub fn load_image(path: &Path) -> ChartResult<RgbaImage> {
    if !path.is_file() {
        return Err(ChartError::asset(format!("missing image {}", path.display())));
    }
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| ChartError::asset(format!("{}: {}", path.display(), e)))
}

/// An image placed on the finished chart, fitted into `bounds` around
/// `center` with its aspect ratio kept.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: RgbaImage,
    pub center: (i32, i32),
    pub bounds: (u32, u32),
}

impl Overlay {
    /// Pixel size after fitting into the bounds.
    pub fn fitted_size(&self) -> (u32, u32) {
        let (iw, ih) = self.image.dimensions();
        if iw == 0 || ih == 0 {
            return (0, 0);
        }
        let scale = (self.bounds.0 as f64 / iw as f64).min(self.bounds.1 as f64 / ih as f64);
        (
            ((iw as f64 * scale).round() as u32).max(1),
            ((ih as f64 * scale).round() as u32).max(1),
        )
    }
}

/// Alpha-blend `overlay` onto an RGB buffer. Pixels outside the buffer are
/// dropped.
pub fn composite_overlay(rgb: &mut [u8], width: u32, height: u32, overlay: &Overlay) {
    let (w, h) = overlay.fitted_size();
    if w == 0 || h == 0 {
        return;
    }
    let scaled = image::imageops::resize(&overlay.image, w, h, FilterType::Triangle);
    let left = overlay.center.0 - (w / 2) as i32;
    let top = overlay.center.1 - (h / 2) as i32;

    for (x, y, px) in scaled.enumerate_pixels() {
        let bx = left + x as i32;
        let by = top + y as i32;
        if bx < 0 || by < 0 || bx >= width as i32 || by >= height as i32 {
            continue;
        }
        let alpha = px.0[3] as u32;
        if alpha == 0 {
            continue;
        }
        let offset = ((by as u32 * width + bx as u32) * 3) as usize;
        for c in 0..3 {
            let dst = rgb[offset + c] as u32;
            let src = px.0[c] as u32;
            rgb[offset + c] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
        }
    }
}

/// Zeroed RGB buffer for a `width` x `height` figure.
pub fn pixel_buffer(width: u32, height: u32) -> ChartResult<Vec<u8>> {
    check_figure_size(width, height)?;
    Ok(vec![0u8; width as usize * height as usize * 3])
}

/// Encode a raw RGB pixel buffer to PNG.
pub fn encode_rgb_to_png(rgb: &[u8], width: u32, height: u32) -> ChartResult<Vec<u8>> {
    let mut png = Vec::new();
    let encoder = PngEncoder::new(&mut png);
    encoder
        .write_image(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| ChartError::encode(format!("PNG encode: {}", e)))?;
    Ok(png)
}
