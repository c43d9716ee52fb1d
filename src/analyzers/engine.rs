//! Metrics over a fully windowed [`SeriesCollection`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::aggregate;
use crate::analyzers::rank;
use crate::analyzers::types::{GrowthSeries, SeriesMetrics, SeriesPoint};
use crate::config::BlackoutInterval;
use crate::date::FractionalDate;
use crate::event_year::EventYear;
use crate::series::SeriesCollection;
use crate::value::Value;

/// Consecutive occurrences further apart than this (in flat 365-day years)
/// get a gap marker between them.
pub const GAP_THRESHOLD_YEARS: f64 = 1.5;

/// Read-only metric computations. Build it after window assignment.
#[derive(Debug, Clone)]
pub struct MetricsEngine<'a> {
    collection: &'a SeriesCollection,
    blackout: Option<BlackoutInterval>,
    year_totals: BTreeMap<i32, u64>,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(collection: &'a SeriesCollection, blackout: Option<BlackoutInterval>) -> Self {
        let mut year_totals = BTreeMap::new();
        for occurrence in collection.occurrences() {
            let total = year_totals.entry(occurrence.date().year()).or_insert(0u64);
            *total += occurrence.attendance().known().unwrap_or(0);
        }

        Self {
            collection,
            blackout,
            year_totals,
        }
    }

    pub fn collection(&self) -> &'a SeriesCollection {
        self.collection
    }

    /// Known attendance of every occurrence dated in `year`.
    pub fn year_total(&self, year: i32) -> u64 {
        self.year_totals.get(&year).copied().unwrap_or(0)
    }

    /// Attendance over the summed attendance of the occurrence's window.
    ///
    /// Unavailable for unknown attendance, an empty denominator, or a date
    /// the blackout interval suppresses.
    pub fn market_share(&self, occurrence: &EventYear) -> Value<f64> {
        if self
            .blackout
            .is_some_and(|b| b.suppresses(occurrence.date()))
        {
            return Value::Unavailable;
        }

        let Value::Known(attendance) = occurrence.attendance() else {
            return Value::Unavailable;
        };

        match occurrence.market_share_denominator() {
            0 => Value::Unavailable,
            denominator => Value::Known(attendance as f64 / denominator as f64),
        }
    }

    /// Attendance over the total attendance of its calendar year.
    pub fn calendar_year_share(&self, occurrence: &EventYear) -> Value<f64> {
        let Value::Known(attendance) = occurrence.attendance() else {
            return Value::Unavailable;
        };

        match self.year_total(occurrence.date().year()) {
            0 => Value::Unavailable,
            total => Value::Known(attendance as f64 / total as f64),
        }
    }

    /// The series' timeline, with one gap marker at the midpoint of every
    /// gap longer than [`GAP_THRESHOLD_YEARS`]. `None` for an unknown name.
    pub fn per_series_series(&self, name: &str) -> Option<SeriesMetrics> {
        let series = self.collection.get(name)?;
        let mut points = Vec::with_capacity(series.occurrences.len());
        let mut previous: Option<FractionalDate> = None;

        for occurrence in &series.occurrences {
            let date = occurrence.date();

            if let Some(previous) = previous {
                let gap = date.difference_in_years(&previous);
                if gap > GAP_THRESHOLD_YEARS {
                    let midpoint = date.subtract(gap / 2.0);
                    debug!(series = name, gap, midpoint = %midpoint, "Inserting gap marker");
                    points.push(SeriesPoint::gap(midpoint.to_fraction()));
                }
            }

            points.push(SeriesPoint {
                date: date.to_fraction(),
                year: Some(date.year()),
                attendance: occurrence.attendance(),
                growth: occurrence.growth(),
                share: self.market_share(occurrence),
                calendar_share: self.calendar_year_share(occurrence),
            });
            previous = Some(date);
        }

        Some(SeriesMetrics {
            name: series.name.clone(),
            points,
        })
    }

    pub fn yearly_growth_stats(&self, min_year: i32, max_year: i32, as_of: FractionalDate) -> GrowthSeries {
        aggregate::yearly_growth_stats(self.collection, min_year, max_year, as_of)
    }

    pub fn rank_series_by_peak_attendance(&self) -> Vec<String> {
        rank::rank_series_by_peak_attendance(self.collection)
    }
}
