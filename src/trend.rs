//! Ordinary-least-squares trend lines.
//!
//! The regression uses each point's **sequence index** (0, 1, 2, …) as the
//! independent variable, not its timestamp. For uniformly sampled series this
//! matches a time-based fit; with irregular spacing it is an approximation.

use crate::models::DataPoint;
use serde::{Deserialize, Serialize};

/// Fitted line `y = slope * index + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Fit an index-based OLS line.
///
/// Non-finite points are skipped but keep their index. Returns `None` with
/// fewer than two finite points or when the system is degenerate.
pub fn fit_index_trend(data: &[DataPoint]) -> Option<TrendLine> {
    let (mut n, mut sx, mut sy, mut sxy, mut sxx) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for (i, p) in data.iter().enumerate() {
        if !p.is_finite() {
            continue;
        }
        let x = i as f64;
        n += 1.0;
        sx += x;
        sy += p.y;
        sxy += x * p.y;
        sxx += x * x;
    }
    if n < 2.0 {
        return None;
    }
    let denom = n * sxx - sx * sx;
    if denom.abs() < f64::EPSILON {
        log::debug!("degenerate regression over {n} points");
        return None;
    }
    let slope = (n * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / n;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some(TrendLine { slope, intercept })
}

/// Fitted points: same length and same `x` values as `data`.
pub fn trend_points(data: &[DataPoint]) -> Option<Vec<DataPoint>> {
    let line = fit_index_trend(data)?;
    Some(
        data.iter()
            .enumerate()
            .map(|(i, p)| DataPoint::new(p.x, line.at(i)))
            .collect(),
    )
}
