//! Band-gradient compositing.
//!
//! A sequence of bands becomes a flat list of color stops: each band is a run
//! of identical stops sized by its share of the total width, optionally
//! followed by one transition anchor. Blending across a boundary happens in
//! [`ColorRamp::sample`], which interpolates linearly between neighbouring
//! stops, so a long run of identical stops stays solid and the short step
//! from an anchor into the next run becomes the visible gradient.

use plotters::style::RGBColor;
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::plot::types::Band;

/// How many ramp stops one band receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandAllocation {
    /// `round(resolution * width / total_width)`
    pub budget: usize,
    /// `round(budget * solid_fraction)` repeated flat stops
    pub solid: usize,
    /// One extra stop of the band color when the budget has room left after
    /// the solid run.
    pub anchor: bool,
}

impl BandAllocation {
    pub fn stops(&self) -> usize {
        self.solid + usize::from(self.anchor)
    }
}

/// Ordered color stops spread evenly across [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<RGBColor>,
}

impl ColorRamp {
    pub fn stops(&self) -> &[RGBColor] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Color at `t` in [0, 1]; values outside are clamped.
    ///
    /// A ramp can be empty when every band budget rounds to zero at a small
    /// resolution. Sampling it yields black; callers that paint with the
    /// ramp check `is_empty` first.
    pub fn sample(&self, t: f64) -> RGBColor {
        match self.stops.len() {
            0 => RGBColor(0, 0, 0),
            1 => self.stops[0],
            n => {
                let pos = t.clamp(0.0, 1.0) * (n - 1) as f64;
                let lower = (pos.floor() as usize).min(n - 2);
                let frac = pos - lower as f64;
                lerp_rgb(self.stops[lower], self.stops[lower + 1], frac)
            }
        }
    }
}

fn lerp_rgb(a: RGBColor, b: RGBColor, k: f64) -> RGBColor {
    let mix = |p: u8, q: u8| (p as f64 + (q as f64 - p as f64) * k).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn validate(bands: &[Band], solid_fraction: f64, resolution: usize) -> ChartResult<f64> {
    if bands.is_empty() {
        return Err(ChartError::band("at least one band is required"));
    }
    if let Some((i, band)) = bands
        .iter()
        .enumerate()
        .find(|(_, b)| !(b.width.is_finite() && b.width > 0.0))
    {
        return Err(ChartError::band(format!(
            "band {} has non-positive width {}",
            i, band.width
        )));
    }
    if !(solid_fraction > 0.0 && solid_fraction <= 1.0) {
        return Err(ChartError::band(format!(
            "solid fraction must be in (0, 1], got {}",
            solid_fraction
        )));
    }
    if resolution == 0 {
        return Err(ChartError::band("resolution must be positive"));
    }
    Ok(bands.iter().map(|b| b.width).sum())
}

/// Split `resolution` stops across `bands` proportionally to their widths.
///
/// Rounding is per band, so the budgets may sum to anything within
/// `resolution ± bands.len()`. A lone band has nothing to blend into and
/// never gets an anchor.
pub fn allocate(
    bands: &[Band],
    solid_fraction: f64,
    resolution: usize,
) -> ChartResult<Vec<BandAllocation>> {
    let total_width = validate(bands, solid_fraction, resolution)?;
    let single = bands.len() == 1;

    Ok(bands
        .iter()
        .map(|band| {
            let budget = (resolution as f64 * band.width / total_width).round() as usize;
            let solid = (budget as f64 * solid_fraction).round() as usize;
            BandAllocation {
                budget,
                solid,
                anchor: !single && budget > solid,
            }
        })
        .collect())
}

/// Build the color ramp for `bands`. The result holds at most
/// `resolution + bands.len()` stops.
pub fn build_ramp(bands: &[Band], solid_fraction: f64, resolution: usize) -> ChartResult<ColorRamp> {
    let allocations = allocate(bands, solid_fraction, resolution)?;

    let mut stops = Vec::with_capacity(resolution + bands.len());
    for (band, alloc) in bands.iter().zip(&allocations) {
        stops.extend(std::iter::repeat(band.color).take(alloc.stops()));
    }

    debug!(
        bands = bands.len(),
        resolution,
        stops = stops.len(),
        "built color ramp"
    );
    Ok(ColorRamp { stops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const RED: RGBColor = RGBColor(255, 0, 0);
    const BLUE: RGBColor = RGBColor(0, 0, 255);
    const GREEN: RGBColor = RGBColor(0, 255, 0);
    const YELLOW: RGBColor = RGBColor(255, 255, 0);

    fn four_bands() -> Vec<Band> {
        vec![
            Band::new(RED, 2.0),
            Band::new(BLUE, 1.0),
            Band::new(GREEN, 3.0),
            Band::new(YELLOW, 2.0),
        ]
    }

    #[test]
    fn test_budgets_follow_widths() {
        let allocs = allocate(&four_bands(), 0.75, 16).unwrap();
        let budgets: Vec<usize> = allocs.iter().map(|a| a.budget).collect();
        assert_eq!(budgets, vec![4, 2, 6, 4]);
        let solids: Vec<usize> = allocs.iter().map(|a| a.solid).collect();
        assert_eq!(solids, vec![3, 2, 5, 3]);
        let anchors: Vec<bool> = allocs.iter().map(|a| a.anchor).collect();
        assert_eq!(anchors, vec![true, false, true, true]);
    }

    #[test]
    fn test_four_band_ramp_layout() {
        let ramp = build_ramp(&four_bands(), 0.75, 16).unwrap();
        assert!((16..=20).contains(&ramp.len()));

        let mut expected = Vec::new();
        expected.extend([RED; 4]);
        expected.extend([BLUE; 2]);
        expected.extend([GREEN; 6]);
        expected.extend([YELLOW; 4]);
        assert_eq!(ramp.stops(), expected.as_slice());
    }

    #[test]
    fn test_budget_sum_within_band_count() {
        let widths = [0.3, 1.7, 2.25, 0.05, 4.0, 1.25];
        for resolution in [1usize, 7, 16, 33, 100, 257] {
            let bands: Vec<Band> = widths.iter().map(|&w| Band::new(RED, w)).collect();
            let allocs = allocate(&bands, 0.6, resolution).unwrap();
            let total: usize = allocs.iter().map(|a| a.budget).sum();
            let diff = (total as i64 - resolution as i64).abs();
            assert!(diff <= bands.len() as i64, "resolution {}: total {}", resolution, total);

            let ramp = build_ramp(&bands, 0.6, resolution).unwrap();
            assert!(ramp.len() <= resolution + bands.len());
        }
    }

    #[test]
    fn test_single_band_is_flat() {
        let ramp = build_ramp(&[Band::new(BLUE, 3.0)], 0.75, 16).unwrap();
        assert_eq!(ramp.len(), 12);
        assert!(ramp.stops().iter().all(|&c| c == BLUE));

        let ramp = build_ramp(&[Band::new(BLUE, 3.0)], 0.5, 9).unwrap();
        assert_eq!(ramp.len(), 5);
    }

    #[test]
    fn test_full_solid_fraction_has_hard_edges() {
        let allocs = allocate(&four_bands(), 1.0, 16).unwrap();
        assert!(allocs.iter().all(|a| !a.anchor));
        assert_eq!(build_ramp(&four_bands(), 1.0, 16).unwrap().len(), 16);
    }

    #[test]
    fn test_narrow_band_loses_anchor() {
        // 16 * 0.2 / 8 rounds to a zero budget
        let bands = vec![Band::new(RED, 7.8), Band::new(BLUE, 0.2)];
        let allocs = allocate(&bands, 0.75, 16).unwrap();
        assert_eq!(allocs[1], BandAllocation { budget: 0, solid: 0, anchor: false });
        let ramp = build_ramp(&bands, 0.75, 16).unwrap();
        assert!(!ramp.stops().contains(&BLUE));
    }

    #[test]
    fn test_invalid_inputs() {
        let cases: Vec<(Vec<Band>, f64, usize)> = vec![
            (vec![], 0.75, 16),
            (vec![Band::new(RED, 0.0)], 0.75, 16),
            (vec![Band::new(RED, 1.0), Band::new(BLUE, -2.0)], 0.75, 16),
            (vec![Band::new(RED, f64::NAN)], 0.75, 16),
            (vec![Band::new(RED, 1.0)], 0.0, 16),
            (vec![Band::new(RED, 1.0)], 1.5, 16),
            (vec![Band::new(RED, 1.0)], 0.75, 0),
        ];
        for (bands, fraction, resolution) in cases {
            let err = build_ramp(&bands, fraction, resolution).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidBand);
        }
    }

    #[test]
    fn test_sample_endpoints_and_midpoint() {
        let ramp = ColorRamp { stops: vec![RGBColor(0, 0, 0), RGBColor(200, 100, 50)] };
        assert_eq!(ramp.sample(0.0), RGBColor(0, 0, 0));
        assert_eq!(ramp.sample(1.0), RGBColor(200, 100, 50));
        assert_eq!(ramp.sample(0.5), RGBColor(100, 50, 25));
        assert_eq!(ramp.sample(-3.0), RGBColor(0, 0, 0));
        assert_eq!(ramp.sample(7.0), RGBColor(200, 100, 50));
    }

    #[test]
    fn test_sample_hits_stops_exactly() {
        let ramp = build_ramp(&four_bands(), 0.75, 16).unwrap();
        let n = ramp.len();
        for (i, &stop) in ramp.stops().iter().enumerate() {
            assert_eq!(ramp.sample(i as f64 / (n - 1) as f64), stop);
        }
    }

    #[test]
    fn test_sample_blends_across_boundary() {
        let bands = vec![Band::new(RED, 1.0), Band::new(BLUE, 1.0)];
        let ramp = build_ramp(&bands, 0.75, 8).unwrap();
        // red x3, red anchor, blue x3, blue anchor
        assert_eq!(ramp.len(), 8);
        let mid = ramp.sample(3.5 / 7.0);
        assert!(mid.0 > 0 && mid.0 < 255);
        assert!(mid.2 > 0 && mid.2 < 255);
    }

    #[test]
    fn test_single_stop_sample() {
        let ramp = build_ramp(&[Band::new(GREEN, 1.0)], 0.1, 10).unwrap();
        assert_eq!(ramp.len(), 1);
        assert_eq!(ramp.sample(0.3), GREEN);
    }
}
