use crate::models::{CountryProfile, Indicator, Series};
use serde::{Deserialize, Serialize};

/// Summary statistics for one indicator series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub indicator: Indicator,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Compound annual growth between the first and last observation, in percent.
    pub cagr_pct: Option<f64>,
}

/// Summaries for every indicator of `profile` that was fetched successfully,
/// restricted to the profile's year range.
pub fn profile_summary(profile: &CountryProfile) -> Vec<Summary> {
    profile
        .requested()
        .filter_map(|indicator| {
            profile
                .get(indicator)
                .map(|series| summarize(indicator, series, profile))
        })
        .collect()
}

fn summarize(indicator: Indicator, series: &Series, profile: &CountryProfile) -> Summary {
    let points = series.points_within(profile.range);
    let mut vals: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    vals.sort_by(|a, b| a.total_cmp(b));

    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };

    let first = points.first().copied();
    let last = points.last().copied();
    let cagr_pct = match (first, last) {
        (Some((y0, v0)), Some((y1, v1))) if y1 > y0 && v0 > 0.0 && v1 > 0.0 => {
            Some(((v1 / v0).powf(1.0 / f64::from(y1 - y0)) - 1.0) * 100.0)
        }
        _ => None,
    };

    Summary {
        indicator,
        count,
        min,
        max,
        mean,
        median,
        first_year: first.map(|(y, _)| y),
        last_year: last.map(|(y, _)| y),
        cagr_pct,
    }
}
