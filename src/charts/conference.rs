//! ML conference cycle: one arc per conference on a polar month axis, from
//! the conference date to the next submission deadline.

use std::f64::consts::PI;
use std::iter;

use plotters::prelude::*;
use tracing::info;

use crate::config::StyleConfig;
use crate::error::{ChartError, ChartResult};
use crate::plot::polar::{AngleTable, PolarFrame, MONTHS_PER_YEAR};
use crate::plot::render::{draw_text_lines, encode_rgb_to_png, pixel_buffer, text_style};
use crate::plot::types::{parse_hex, RenderedChart, BACKGROUND_COLOR, BORDER_COLOR};

/// Data range on both axes; leaves room for month labels outside the unit circle.
const EXTENT: f64 = 1.25;
const CHART_MARGIN: u32 = 10;

#[derive(Debug, Clone)]
pub struct Conference {
    pub name: String,
    pub color: RGBColor,
    /// Fractional month index of the conference itself.
    pub conference_month: f64,
    /// Fractional month index of the following submission deadline.
    pub submission_month: f64,
    pub arc_radius: f64,
    pub label_radius: f64,
}

impl Conference {
    fn new(
        name: &str,
        hex: &str,
        conference_month: f64,
        submission_month: f64,
        arc_radius: f64,
        label_radius: f64,
    ) -> ChartResult<Self> {
        Ok(Self {
            name: name.to_string(),
            color: parse_hex(hex)?,
            conference_month,
            submission_month,
            arc_radius,
            label_radius,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Untitled,
    Titled,
}

#[derive(Debug, Clone)]
pub struct ConferenceChart {
    pub conferences: Vec<Conference>,
    /// Tick labels for the first twelve slots of the angle table.
    pub month_labels: Vec<String>,
    pub month_label_radius: f64,
    pub table: AngleTable,
    pub frame: PolarFrame,
    pub title: String,
    pub subtitle: String,
    pub arc_width: u32,
    pub arc_alpha: f64,
    pub subdivisions: usize,
    pub dot_radius: i32,
    pub file_name: String,
    pub titled_file_name: String,
}

impl ConferenceChart {
    pub fn ml_cycle() -> ChartResult<Self> {
        let conferences = vec![
            // December -> May
            Conference::new("NeurIPS", "#916CA3", 0.0, 5.0, 0.9, 0.55)?,
            // late April/early May -> late September/early October
            Conference::new("ICLR", "#2CA02C", 4.5, 9.5, 0.8, 0.5)?,
            // July -> late January/early February of the next cycle
            Conference::new("ICML", "#1F77B4", 7.0, 13.5, 0.7, 0.45)?,
        ];
        let month_labels = [
            "Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
        ]
        .iter()
        .map(|m| m.to_string())
        .collect();

        Ok(Self {
            conferences,
            month_labels,
            month_label_radius: 1.12,
            table: AngleTable::monthly(),
            frame: PolarFrame::default(),
            title: "ML Conference Submission Cycle".to_string(),
            subtitle: "Arcs go from conference date to next submission deadline".to_string(),
            arc_width: 10,
            arc_alpha: 0.8,
            subdivisions: 500,
            dot_radius: 10,
            file_name: "ml_conference_cycle_no_title.png".to_string(),
            titled_file_name: "ml_conference_cycle.png".to_string(),
        })
    }

    /// (start, end) angles of a conference arc.
    pub fn arc_angles(&self, conference: &Conference) -> ChartResult<(f64, f64)> {
        Ok((
            self.table.angle_for(conference.conference_month)?,
            self.table.angle_for(conference.submission_month)?,
        ))
    }

    pub fn file_name(&self, variant: Variant) -> &str {
        match variant {
            Variant::Untitled => &self.file_name,
            Variant::Titled => &self.titled_file_name,
        }
    }
}

/// Header band height above the polar area for the titled variant.
fn header_height(size: u32, variant: Variant) -> u32 {
    match variant {
        Variant::Untitled => 0,
        Variant::Titled => size / 5,
    }
}

/// Render one variant of the conference chart to PNG.
pub fn render(
    chart: &ConferenceChart,
    style: &StyleConfig,
    variant: Variant,
) -> ChartResult<RenderedChart> {
    if chart.month_labels.len() != MONTHS_PER_YEAR {
        return Err(ChartError::render(format!(
            "expected {} month labels, got {}",
            MONTHS_PER_YEAR,
            chart.month_labels.len()
        )));
    }
    let arcs = chart
        .conferences
        .iter()
        .map(|c| chart.arc_angles(c))
        .collect::<ChartResult<Vec<_>>>()?;

    let width = style.conference_size;
    let header = header_height(width, variant);
    let height = width
        .checked_add(header)
        .ok_or_else(|| ChartError::render(format!("figure size {} too large", width)))?;
    let mut buf = pixel_buffer(width, height)?;

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND_COLOR)
            .map_err(|e| ChartError::render(format!("fill: {}", e)))?;
        let (_, body) = root.split_vertically(header as i32);

        let mut ctx = ChartBuilder::on(&body)
            .margin(CHART_MARGIN)
            .build_cartesian_2d(-EXTENT..EXTENT, -EXTENT..EXTENT)
            .map_err(|e| ChartError::render(format!("chart build: {}", e)))?;

        let frame = chart.frame;
        let outline = frame.arc(0.0, 2.0 * PI, 1.0, 360);
        ctx.draw_series(iter::once(PathElement::new(outline, BORDER_COLOR.stroke_width(1))))
            .map_err(|e| ChartError::render(format!("outline: {}", e)))?;

        // Arcs are filled ring sectors `arc_width` pixels thick.
        let (px, _) = ctx.plotting_area().get_pixel_range();
        let px_per_unit = (px.end - px.start) as f64 / (2.0 * EXTENT);
        let half_width = chart.arc_width as f64 / 2.0 / px_per_unit;

        // Innermost arc first so outer arcs and their dots stay on top.
        for (conf, &(start, end)) in chart.conferences.iter().zip(&arcs).rev() {
            let points = frame.sector(
                start,
                end,
                conf.arc_radius - half_width,
                conf.arc_radius + half_width,
                chart.subdivisions,
            );
            let fill = conf.color.mix(chart.arc_alpha).filled();
            ctx.draw_series(iter::once(Polygon::new(points, fill)))
                .map_err(|e| ChartError::render(format!("{} arc: {}", conf.name, e)))?;

            let deadline = frame.to_cartesian(end, conf.arc_radius);
            ctx.draw_series(iter::once(Circle::new(
                deadline,
                chart.dot_radius,
                conf.color.filled(),
            )))
            .map_err(|e| ChartError::render(format!("{} deadline: {}", conf.name, e)))?;
        }

        if style.draw_text {
            let family = style.font_family.as_str();

            let size = style.font_size(0.75);
            let month_style = text_style(family, size, false, &BORDER_COLOR);
            for (label, &angle) in chart.month_labels.iter().zip(chart.table.angles()) {
                let pos = frame.to_cartesian(angle, chart.month_label_radius);
                draw_text_lines(&root, label, ctx.backend_coord(&pos), size, &month_style)?;
            }

            let size = style.font_size(1.0);
            for (conf, &(start, end)) in chart.conferences.iter().zip(&arcs) {
                let pos = frame.to_cartesian((start + end) / 2.0, conf.label_radius);
                let name_style = text_style(family, size, true, &conf.color);
                draw_text_lines(&root, &conf.name, ctx.backend_coord(&pos), size, &name_style)?;
            }

            if variant == Variant::Titled {
                let center_x = (width / 2) as i32;
                let size = style.font_size(1.25);
                let title_style = text_style(family, size, false, &BORDER_COLOR);
                let title_y = (header as f64 * 0.4) as i32;
                draw_text_lines(&root, &chart.title, (center_x, title_y), size, &title_style)?;

                let size = style.font_size(0.7);
                let subtitle_style = text_style(family, size, false, &BORDER_COLOR);
                let subtitle_y = (header as f64 * 0.8) as i32;
                draw_text_lines(&root, &chart.subtitle, (center_x, subtitle_y), size, &subtitle_style)?;
            }
        }

        root.present()
            .map_err(|e| ChartError::render(format!("present: {}", e)))?;
    }

    let png_bytes = encode_rgb_to_png(&buf, width, height)?;
    let file_name = chart.file_name(variant).to_string();
    info!(file = %file_name, width, height, "rendered conference chart");

    Ok(RenderedChart {
        file_name,
        png_bytes,
        width,
        height,
    })
}

/// Render the untitled and titled variants, in that order.
pub fn render_variants(chart: &ConferenceChart, style: &StyleConfig) -> ChartResult<Vec<RenderedChart>> {
    [Variant::Untitled, Variant::Titled]
        .into_iter()
        .map(|variant| render(chart, style, variant))
        .collect()
}
