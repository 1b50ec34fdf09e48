//! Month positions on a circular axis.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{ChartError, ChartResult};

pub const MONTHS_PER_YEAR: usize = 12;
/// The calendar is unrolled across two years so that ranges crossing
/// December → January interpolate without wrapping.
pub const TABLE_LEN: usize = 2 * MONTHS_PER_YEAR;

/// Base angles at integer month positions over two calendar cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTable {
    angles: Vec<f64>,
}

impl AngleTable {
    pub fn new(angles: Vec<f64>) -> ChartResult<Self> {
        if angles.len() != TABLE_LEN {
            return Err(ChartError::table(format!(
                "angle table needs {} entries, got {}",
                TABLE_LEN,
                angles.len()
            )));
        }
        Ok(Self { angles })
    }

    /// Twelve equally spaced angles over [0, 2π), then the same plus 2π.
    pub fn monthly() -> Self {
        let step = 2.0 * PI / MONTHS_PER_YEAR as f64;
        let first: Vec<f64> = (0..MONTHS_PER_YEAR).map(|i| i as f64 * step).collect();
        let angles = first
            .iter()
            .copied()
            .chain(first.iter().map(|a| a + 2.0 * PI))
            .collect();
        Self { angles }
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Angle at an integer slot. Slot 24 continues the second cycle by one
    /// more period so the last month can still interpolate upwards.
    fn slot(&self, index: usize) -> f64 {
        if index < TABLE_LEN {
            self.angles[index]
        } else {
            let period = self.angles[MONTHS_PER_YEAR] - self.angles[0];
            self.angles[index - MONTHS_PER_YEAR] + period
        }
    }

    /// Angle for a fractional month index in [0, 24].
    ///
    /// Whole indices are table lookups; anything else is linearly
    /// interpolated between the surrounding slots.
    pub fn angle_for(&self, month_index: f64) -> ChartResult<f64> {
        if !(0.0..=TABLE_LEN as f64).contains(&month_index) {
            return Err(ChartError::out_of_range(format!(
                "month index {} outside [0, {}]",
                month_index, TABLE_LEN
            )));
        }
        let lower = month_index.floor();
        let index = lower as usize;
        if month_index == lower {
            return Ok(self.slot(index));
        }
        let (lo, hi) = (self.slot(index), self.slot(index + 1));
        Ok(lo + (month_index - lower) * (hi - lo))
    }
}

/// Free-function form of [`AngleTable::angle_for`].
pub fn angle_for(month_index: f64, base_angles: &AngleTable) -> ChartResult<f64> {
    base_angles.angle_for(month_index)
}

/// Orientation of the angular axis: zero at 12 o'clock, increasing clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarFrame {
    /// Angle added before projection.
    pub offset: f64,
    /// `1.0` counter-clockwise, `-1.0` clockwise.
    pub direction: f64,
}

impl Default for PolarFrame {
    fn default() -> Self {
        Self {
            offset: FRAC_PI_2,
            direction: -1.0,
        }
    }
}

impl PolarFrame {
    /// Project (theta, radius) onto cartesian coordinates around the origin.
    pub fn to_cartesian(&self, theta: f64, radius: f64) -> (f64, f64) {
        let phi = self.direction * theta + self.offset;
        (radius * phi.cos(), radius * phi.sin())
    }

    /// Sample the arc from `start` to `end` at `radius` in `subdivisions` steps.
    pub fn arc(&self, start: f64, end: f64, radius: f64, subdivisions: usize) -> Vec<(f64, f64)> {
        let steps = subdivisions.max(1);
        (0..=steps)
            .map(|j| {
                let theta = start + (end - start) * (j as f64 / steps as f64);
                self.to_cartesian(theta, radius)
            })
            .collect()
    }

    /// Outline of the ring sector between `inner` and `outer` radii: the
    /// outer arc forward, then the inner arc back.
    pub fn sector(
        &self,
        start: f64,
        end: f64,
        inner: f64,
        outer: f64,
        subdivisions: usize,
    ) -> Vec<(f64, f64)> {
        let mut points = self.arc(start, end, outer, subdivisions);
        points.extend(self.arc(end, start, inner, subdivisions));
        points
    }
}
