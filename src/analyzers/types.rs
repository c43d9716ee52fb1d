//! Data types produced by the metrics engine.

use crate::value::Value;

/// One entry of a per-series timeline.
///
/// Gap markers have `year: None` and every metric unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: f64,
    pub year: Option<i32>,
    pub attendance: Value<u64>,
    pub growth: Value<f64>,
    pub share: Value<f64>,
    pub calendar_share: Value<f64>,
}

impl SeriesPoint {
    pub(crate) fn gap(date: f64) -> Self {
        Self {
            date,
            year: None,
            attendance: Value::Unavailable,
            growth: Value::Unavailable,
            share: Value::Unavailable,
            calendar_share: Value::Unavailable,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.year.is_none()
    }
}

/// Timeline of one series, with gap markers already inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMetrics {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl SeriesMetrics {
    pub fn dates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn attendances(&self) -> Vec<Value<u64>> {
        self.points.iter().map(|p| p.attendance).collect()
    }

    pub fn growths(&self) -> Vec<Value<f64>> {
        self.points.iter().map(|p| p.growth).collect()
    }

    pub fn shares(&self) -> Vec<Value<f64>> {
        self.points.iter().map(|p| p.share).collect()
    }

    /// Calendar year of the first and last real occurrence.
    pub fn active_years(&self) -> Option<(i32, i32)> {
        let mut years = self.points.iter().filter_map(|p| p.year);
        let first = years.next()?;
        let last = years.last().unwrap_or(first);
        Some((first, last))
    }

    /// The last real occurrence dated in `year`.
    pub fn point_in_year(&self, year: i32) -> Option<&SeriesPoint> {
        self.points.iter().rev().find(|p| p.year == Some(year))
    }
}

/// Aggregates for one calendar year across all series.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    pub year: i32,
    /// Known attendance of every occurrence dated this year.
    pub total_attendance: u64,
    /// Occurrences with a defined growth value.
    pub qualifying: usize,
    /// Attendance-weighted mean growth.
    pub average_growth: Option<f64>,
    pub min_growth: Option<f64>,
    pub max_growth: Option<f64>,
}

/// Global growth curves as `(year + 0.5, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthSeries {
    pub average: Vec<(f64, f64)>,
    pub total: Vec<(f64, f64)>,
    pub min: Vec<(f64, f64)>,
    pub max: Vec<(f64, f64)>,
}
