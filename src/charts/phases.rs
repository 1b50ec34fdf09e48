//! "Four Phases of AGI": a mock capabilities step line over blended phase bands.

use std::path::PathBuf;

use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::{OutputConfig, StyleConfig};
use crate::error::{ChartError, ChartResult};
use crate::plot::ramp::build_ramp;
use crate::plot::render::{
    composite_overlay, draw_text_lines, encode_rgb_to_png, load_image, pixel_buffer, text_style,
    Overlay,
};
use crate::plot::types::{
    parse_hex, Band, RenderedChart, BACKGROUND_COLOR, BACKGROUND_SLICES, BORDER_COLOR,
};

/// Step line color (`#444`).
const LINE_COLOR: RGBColor = RGBColor(0x44, 0x44, 0x44);
const LINE_WIDTH: u32 = 3;
/// Each step rises by a uniform draw scaled by this factor.
const STEP_HEIGHT_SCALE: f64 = 0.2;

/// One phase: a background band with its label and emoji.
#[derive(Debug, Clone)]
pub struct Phase {
    pub name: String,
    pub band: Band,
    pub text_color: RGBColor,
    /// Label height as a fraction of the top of the progress line.
    pub label_height: f64,
    pub label_x_offset: f64,
    pub emoji: Option<PathBuf>,
}

impl Phase {
    fn new(
        name: &str,
        band_hex: &str,
        text_hex: &str,
        width: f64,
        label_height: f64,
        label_x_offset: f64,
        emoji: &str,
    ) -> ChartResult<Self> {
        Ok(Self {
            name: name.to_string(),
            band: Band::from_hex(band_hex, width)?,
            text_color: parse_hex(text_hex)?,
            label_height,
            label_x_offset,
            emoji: Some(PathBuf::from(emoji)),
        })
    }
}

/// Free-floating annotation in data coordinates.
#[derive(Debug, Clone)]
pub struct Marker {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Relative to the base label size.
    pub font_scale: f64,
}

/// Image fitted into a square box in data coordinates, lower-left at (x, y).
#[derive(Debug, Clone)]
pub struct Logo {
    pub path: PathBuf,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone)]
pub struct PhaseChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub legend_label: String,
    pub phases: Vec<Phase>,
    pub solid_fraction: f64,
    pub resolution: usize,
    pub seed: u64,
    pub steps: usize,
    /// Emoji box as a fraction of the figure size.
    pub emoji_size: f64,
    /// Emoji sit this far above their label, in data units.
    pub emoji_y_offset: f64,
    pub marker: Option<Marker>,
    pub logo: Option<Logo>,
    pub file_name: String,
}

impl PhaseChart {
    pub fn four_phases() -> ChartResult<Self> {
        let phases = vec![
            Phase::new(
                "Below\nHuman",
                "#AEB5EA",
                "#0C1027",
                2.25,
                0.325,
                0.0,
                "emoji_msft/parrot.png",
            )?,
            Phase::new(
                "Human\nLevel",
                "#AAEEBD",
                "#082B13",
                1.25,
                0.425,
                -0.1,
                "emoji_msft/woman-raising-hand-medium-dark-skin-tone.png",
            )?,
            Phase::new(
                "Moderately\nSuperhuman",
                "#FBDA74",
                "#332500",
                2.5,
                0.47,
                0.0,
                "emoji_msft/man-mage-medium-light-skin-tone.png",
            )?,
            Phase::new(
                "Super-\nIntelligent",
                "#FBACC0",
                "#280B0C",
                2.25,
                0.525,
                0.0,
                "emoji_msft/milky-way-10th-anniversary.png",
            )?,
        ];

        Ok(Self {
            title: "Four Phases of AGI".to_string(),
            x_desc: "Time and Investment \u{2192}".to_string(),
            y_desc: "General Capabilities \u{2192}".to_string(),
            legend_label: "Mock Data".to_string(),
            phases,
            solid_fraction: 0.75,
            resolution: 16,
            seed: 65,
            steps: 20,
            emoji_size: 0.125,
            emoji_y_offset: 0.25,
            marker: Some(Marker {
                text: "\u{2191}\nYou are\nhere".to_string(),
                x: 1.75,
                y: 0.205,
                font_scale: 0.625,
            }),
            logo: Some(Logo {
                path: PathBuf::from("ai_acumen_wide.png"),
                x: 5.6125,
                y: -1.09,
                size: 2.5,
            }),
            file_name: "four_phases_of_agi.png".to_string(),
        })
    }

    /// Drop the emoji and the logo.
    pub fn without_images(mut self) -> Self {
        for phase in &mut self.phases {
            phase.emoji = None;
        }
        self.logo = None;
        self
    }

    pub fn bands(&self) -> Vec<Band> {
        self.phases.iter().map(|p| p.band).collect()
    }

    pub fn total_width(&self) -> f64 {
        self.phases.iter().map(|p| p.band.width).sum()
    }

    /// Label centers: the middle of each band shifted by its offset, at its
    /// height fraction of `y_max`.
    pub fn label_anchors(&self, y_max: f64) -> Vec<(f64, f64)> {
        let mut start = 0.0;
        self.phases
            .iter()
            .map(|phase| {
                let x = start + phase.band.width / 2.0 + phase.label_x_offset;
                start += phase.band.width;
                (x, y_max * phase.label_height)
            })
            .collect()
    }
}

/// Mock capabilities progress: random step positions and random rises.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLine {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

fn cumulative_sum(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values
        .into_iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

impl ProgressLine {
    /// x is a cumulative sum of uniform draws rescaled to end at
    /// `total_width`; y is a cumulative sum of scaled uniform draws. All x
    /// draws come before the y draws.
    pub fn generate(seed: u64, steps: usize, total_width: f64) -> ChartResult<Self> {
        if steps < 2 {
            return Err(ChartError::render(format!(
                "progress line needs at least 2 steps, got {}",
                steps
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let x_draws: Vec<f64> = (0..steps).map(|_| rng.gen::<f64>()).collect();
        let y_draws: Vec<f64> = (0..steps)
            .map(|_| rng.gen::<f64>() * STEP_HEIGHT_SCALE)
            .collect();

        let mut xs = cumulative_sum(x_draws);
        let (_, x_max) = min_max(&xs);
        if x_max <= 0.0 {
            return Err(ChartError::render("degenerate progress line"));
        }
        for x in &mut xs {
            *x = *x / x_max * total_width;
        }
        let ys = cumulative_sum(y_draws);

        Ok(Self { xs, ys })
    }

    pub fn x_range(&self) -> (f64, f64) {
        min_max(&self.xs)
    }

    pub fn y_range(&self) -> (f64, f64) {
        min_max(&self.ys)
    }

    /// Vertices of the post-step line: each value holds until the next x.
    pub fn step_points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.xs.len() * 2);
        for (i, (&x, &y)) in self.xs.iter().zip(&self.ys).enumerate() {
            points.push((x, y));
            if let Some(&next_x) = self.xs.get(i + 1) {
                points.push((next_x, y));
            }
        }
        points
    }
}

/// Render the phases chart to PNG.
pub fn render(
    chart: &PhaseChart,
    style: &StyleConfig,
    output: &OutputConfig,
) -> ChartResult<RenderedChart> {
    let width = style.phase_width;
    let height = style.phase_height;
    let ramp = build_ramp(&chart.bands(), chart.solid_fraction, chart.resolution)?;
    if ramp.is_empty() {
        return Err(ChartError::band(format!(
            "resolution {} leaves no color stops for {} bands",
            chart.resolution,
            chart.phases.len()
        )));
    }
    let line = ProgressLine::generate(chart.seed, chart.steps, chart.total_width())?;

    // Every asset is loaded before anything is drawn.
    let emoji = chart
        .phases
        .iter()
        .map(|p| p.emoji.as_ref().map(|path| load_image(&output.asset(path))).transpose())
        .collect::<ChartResult<Vec<_>>>()?;
    let logo_image = chart
        .logo
        .as_ref()
        .map(|logo| load_image(&output.asset(&logo.path)))
        .transpose()?;

    let mut buf = pixel_buffer(width, height)?;
    let mut overlays = Vec::new();

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND_COLOR)
            .map_err(|e| ChartError::render(format!("fill: {}", e)))?;

        let family = style.font_family.as_str();
        let (x_min, x_max) = line.x_range();
        let (y_min, y_max) = line.y_range();

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20).x_label_area_size(40).y_label_area_size(40);
        if style.draw_text {
            builder.caption(&chart.title, (family, style.font_size(1.4)));
        }
        let mut ctx = builder
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| ChartError::render(format!("chart build: {}", e)))?;

        if style.draw_text {
            ctx.configure_mesh()
                .disable_mesh()
                .x_labels(0)
                .y_labels(0)
                .x_desc(chart.x_desc.as_str())
                .y_desc(chart.y_desc.as_str())
                .axis_desc_style((family, style.font_size(1.0)))
                .draw()
                .map_err(|e| ChartError::render(format!("mesh: {}", e)))?;
        }

        // Band background over [0, total_width], clipped to the view.
        let total_width = chart.total_width();
        let slice_width = total_width / BACKGROUND_SLICES as f64;
        let slices = (0..BACKGROUND_SLICES).filter_map(|k| {
            let x0 = (slice_width * k as f64).max(x_min);
            let x1 = (slice_width * (k + 1) as f64).min(x_max);
            if x1 <= x0 {
                return None;
            }
            let t = k as f64 / (BACKGROUND_SLICES - 1) as f64;
            Some(Rectangle::new([(x0, y_min), (x1, y_max)], ramp.sample(t).filled()))
        });
        ctx.draw_series(slices)
            .map_err(|e| ChartError::render(format!("background: {}", e)))?;

        let line_style = LINE_COLOR.stroke_width(LINE_WIDTH);
        let series = ctx
            .draw_series(LineSeries::new(line.step_points(), line_style))
            .map_err(|e| ChartError::render(format!("progress line: {}", e)))?;
        if style.draw_text {
            series
                .label(chart.legend_label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
            ctx.configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.66))
                .border_style(BORDER_COLOR)
                .label_font((family, style.font_size(0.66)))
                .draw()
                .map_err(|e| ChartError::render(format!("legend: {}", e)))?;
        }

        let (px, py) = ctx.plotting_area().get_pixel_range();
        root.draw(&Rectangle::new(
            [(px.start, py.start), (px.end - 1, py.end - 1)],
            BORDER_COLOR.stroke_width(1),
        ))
        .map_err(|e| ChartError::render(format!("border: {}", e)))?;

        let anchors = chart.label_anchors(y_max);
        if style.draw_text {
            let size = style.font_size(1.0);
            for (phase, anchor) in chart.phases.iter().zip(&anchors) {
                let text = text_style(family, size, true, &phase.text_color);
                draw_text_lines(&root, &phase.name, ctx.backend_coord(anchor), size, &text)?;
            }
            if let Some(marker) = &chart.marker {
                let size = style.font_size(marker.font_scale);
                let text = text_style(family, size, false, &BORDER_COLOR);
                let center = ctx.backend_coord(&(marker.x, marker.y));
                draw_text_lines(&root, &marker.text, center, size, &text)?;
            }
        }

        let emoji_bounds = (
            (width as f64 * chart.emoji_size).round() as u32,
            (height as f64 * chart.emoji_size).round() as u32,
        );
        for (&(x, y), image) in anchors.iter().zip(emoji) {
            if let Some(image) = image {
                overlays.push(Overlay {
                    image,
                    center: ctx.backend_coord(&(x, y + chart.emoji_y_offset)),
                    bounds: emoji_bounds,
                });
            }
        }
        if let (Some(logo), Some(image)) = (&chart.logo, logo_image) {
            let (left, bottom) = ctx.backend_coord(&(logo.x, logo.y));
            let (right, top) = ctx.backend_coord(&(logo.x + logo.size, logo.y + logo.size));
            overlays.push(Overlay {
                image,
                center: ((left + right) / 2, (top + bottom) / 2),
                bounds: ((right - left).unsigned_abs(), (bottom - top).unsigned_abs()),
            });
        }

        root.present()
            .map_err(|e| ChartError::render(format!("present: {}", e)))?;
    }

    for overlay in &overlays {
        composite_overlay(&mut buf, width, height, overlay);
    }
    debug!(overlays = overlays.len(), stops = ramp.len(), "composited phases chart");

    let png_bytes = encode_rgb_to_png(&buf, width, height)?;
    info!(file = %chart.file_name, width, height, "rendered phases chart");

    Ok(RenderedChart {
        file_name: chart.file_name.clone(),
        png_bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn plain_style() -> StyleConfig {
        StyleConfig {
            phase_width: 400,
            phase_height: 240,
            draw_text: false,
            ..StyleConfig::default()
        }
    }

    #[test]
    fn test_four_phases_definition() {
        let chart = PhaseChart::four_phases().unwrap();
        assert_eq!(chart.phases.len(), 4);
        assert_abs_diff_eq!(chart.total_width(), 8.25, epsilon = 1e-12);
        assert_eq!(chart.bands()[2].color, RGBColor(0xFB, 0xDA, 0x74));
        assert_eq!(chart.phases[3].text_color, RGBColor(0x28, 0x0B, 0x0C));
    }

    #[test]
    fn test_label_anchors() {
        let chart = PhaseChart::four_phases().unwrap();
        let anchors = chart.label_anchors(2.0);
        let xs: Vec<f64> = anchors.iter().map(|a| a.0).collect();
        assert_abs_diff_eq!(xs[0], 1.125, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[1], 2.25 + 0.625 - 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[2], 3.5 + 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[3], 6.0 + 1.125, epsilon = 1e-12);
        assert_abs_diff_eq!(anchors[1].1, 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_progress_line_shape() {
        let line = ProgressLine::generate(65, 20, 8.25).unwrap();
        assert_eq!(line.xs.len(), 20);
        assert_eq!(line.ys.len(), 20);
        assert_abs_diff_eq!(*line.xs.last().unwrap(), 8.25, epsilon = 1e-9);
        assert!(line.xs.windows(2).all(|w| w[0] < w[1]));
        assert!(line.ys.windows(2).all(|w| w[0] < w[1]));
        assert!(line.ys.iter().all(|&y| y > 0.0 && y <= 20.0 * STEP_HEIGHT_SCALE));
    }

    #[test]
    fn test_progress_line_is_seeded() {
        let a = ProgressLine::generate(65, 20, 8.25).unwrap();
        let b = ProgressLine::generate(65, 20, 8.25).unwrap();
        let c = ProgressLine::generate(66, 20, 8.25).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_progress_line_needs_steps() {
        assert!(ProgressLine::generate(1, 1, 8.0).is_err());
    }

    #[test]
    fn test_step_points() {
        let line = ProgressLine {
            xs: vec![1.0, 2.0, 4.0],
            ys: vec![0.5, 0.7, 1.0],
        };
        assert_eq!(
            line.step_points(),
            vec![(1.0, 0.5), (2.0, 0.5), (2.0, 0.7), (4.0, 0.7), (4.0, 1.0)]
        );
    }

    #[test]
    fn test_render_without_text_or_images() {
        let chart = PhaseChart::four_phases().unwrap().without_images();
        let rendered = render(&chart, &plain_style(), &OutputConfig::default()).unwrap();
        assert_eq!(rendered.file_name, "four_phases_of_agi.png");
        assert_eq!((rendered.width, rendered.height), (400, 240));
        let decoded = image::load_from_memory(&rendered.png_bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (400, 240));
    }

    #[test]
    fn test_band_colors_reach_pixels() {
        let chart = PhaseChart::four_phases().unwrap().without_images();
        let rendered = render(&chart, &plain_style(), &OutputConfig::default()).unwrap();
        let img = image::load_from_memory(&rendered.png_bytes).unwrap().to_rgb8();

        // near the top, well inside the solid parts of bands 1 and 3
        assert_eq!(img.get_pixel(75, 30).0, [0xAE, 0xB5, 0xEA]);
        assert_eq!(img.get_pixel(220, 30).0, [0xFB, 0xDA, 0x74]);
        // between them the background is a blend of neighbouring bands
        let mid = img.get_pixel(150, 30).0;
        assert_ne!(mid, [0xAE, 0xB5, 0xEA]);
        assert_ne!(mid, [0xFB, 0xDA, 0x74]);
        assert_ne!(mid, [255, 255, 255]);
    }

    #[test]
    fn test_unrenderable_size_is_an_error() {
        let chart = PhaseChart::four_phases().unwrap().without_images();
        for (w, h) in [(0, 240), (65_536, 65_536)] {
            let style = StyleConfig {
                phase_width: w,
                phase_height: h,
                ..plain_style()
            };
            let err = render(&chart, &style, &OutputConfig::default()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Render);
        }
    }

    #[test]
    fn test_render_is_reproducible() {
        let chart = PhaseChart::four_phases().unwrap().without_images();
        let a = render(&chart, &plain_style(), &OutputConfig::default()).unwrap();
        let b = render(&chart, &plain_style(), &OutputConfig::default()).unwrap();
        assert_eq!(a.png_bytes, b.png_bytes);
    }

    #[test]
    fn test_missing_emoji_fails_fast() {
        let chart = PhaseChart::four_phases().unwrap();
        let output = OutputConfig {
            assets_dir: PathBuf::from("/nonexistent/assets"),
            ..OutputConfig::default()
        };
        let err = render(&chart, &plain_style(), &output).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Asset);
    }

    #[test]
    fn test_empty_ramp_is_rejected() {
        let mut chart = PhaseChart::four_phases().unwrap().without_images();
        chart.resolution = 1;
        assert!(build_ramp(&chart.bands(), chart.solid_fraction, 1).unwrap().is_empty());
        let err = render(&chart, &plain_style(), &OutputConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidBand);
    }

    #[test]
    fn test_invalid_band_is_reported() {
        let mut chart = PhaseChart::four_phases().unwrap().without_images();
        chart.phases[1].band.width = 0.0;
        let err = render(&chart, &plain_style(), &OutputConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidBand);
    }
}
