//! One event's occurrence in one year, and its trailing comparison window.

use std::collections::BTreeMap;

use crate::date::FractionalDate;
use crate::error::ValidationError;
use crate::value::Value;

/// Window length used until the previous occurrence of the same series is
/// known: a year and roughly nine days.
pub const DEFAULT_WINDOW_YEARS: f64 = 1.025;

/// Attendance strings accepted as "no data" when none are configured.
pub const DEFAULT_UNKNOWN_MARKERS: &[&str] = &["unknown"];

/// Recorded attendance of an occurrence.
pub type Attendance = Value<u64>;

/// Parses an attendance cell: a non-negative integer, or one of
/// `unknown_markers` (case-insensitive).
pub fn parse_attendance<S: AsRef<str>>(
    raw: &str,
    unknown_markers: &[S],
) -> Result<Attendance, ValidationError> {
    let trimmed = raw.trim();

    if unknown_markers
        .iter()
        .any(|m| m.as_ref().trim().eq_ignore_ascii_case(trimmed))
    {
        return Ok(Value::Unavailable);
    }

    trimmed
        .parse::<u64>()
        .map(Value::Known)
        .map_err(|_| ValidationError::InvalidAttendance(raw.to_string()))
}

/// Position of an occurrence inside a [`SeriesCollection`](crate::series::SeriesCollection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OccurrenceId {
    pub series: usize,
    pub index: usize,
}

/// Read-only view of another occurrence, as stored in a comparison set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonMember {
    pub id: OccurrenceId,
    pub date: FractionalDate,
    pub attendance: Attendance,
}

/// A dated attendance record within a named series.
///
/// The comparison set only ever holds members dated in
/// `(window_start, date]`. `window_start` only moves forward.
#[derive(Debug, Clone)]
pub struct EventYear {
    series_name: String,
    date: FractionalDate,
    attendance: Attendance,
    previous_attendance: u64,
    window_start: FractionalDate,
    comparison_set: BTreeMap<OccurrenceId, ComparisonMember>,
}

impl EventYear {
    pub fn new(series_name: impl Into<String>, date: FractionalDate, attendance: Attendance) -> Self {
        Self {
            series_name: series_name.into(),
            date,
            attendance,
            previous_attendance: 0,
            window_start: date.subtract(DEFAULT_WINDOW_YEARS),
            comparison_set: BTreeMap::new(),
        }
    }

    /// Builds an occurrence from raw `month/day/year` and attendance strings.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Date`] for a malformed date,
    /// [`ValidationError::InvalidAttendance`] if attendance is neither a
    /// non-negative integer nor `unknown`.
    pub fn create(
        series_name: impl Into<String>,
        raw_date: &str,
        raw_attendance: &str,
    ) -> Result<Self, ValidationError> {
        let date = FractionalDate::from_calendar_string(raw_date)?;
        let attendance = parse_attendance(raw_attendance, DEFAULT_UNKNOWN_MARKERS)?;
        Ok(Self::new(series_name, date, attendance))
    }

    pub fn series_name(&self) -> &str {
        &self.series_name
    }

    pub fn date(&self) -> FractionalDate {
        self.date
    }

    pub fn attendance(&self) -> Attendance {
        self.attendance
    }

    pub fn previous_attendance(&self) -> u64 {
        self.previous_attendance
    }

    pub fn window_start(&self) -> FractionalDate {
        self.window_start
    }

    pub fn comparison_set(&self) -> impl Iterator<Item = &ComparisonMember> {
        self.comparison_set.values()
    }

    pub fn as_member(&self, id: OccurrenceId) -> ComparisonMember {
        ComparisonMember {
            id,
            date: self.date,
            attendance: self.attendance,
        }
    }

    /// `true` if `date` falls in `(window_start, self.date]`.
    pub fn window_contains(&self, date: FractionalDate) -> bool {
        self.window_start < date && date <= self.date
    }

    /// Tightens the window to start at `candidate` if it is later than the
    /// current start, dropping members that fall out. Returns whether the
    /// window moved.
    pub fn set_previous_date(&mut self, candidate: FractionalDate) -> bool {
        if candidate <= self.window_start {
            return false;
        }

        self.window_start = candidate;
        let (start, end) = (self.window_start, self.date);
        self.comparison_set
            .retain(|_, m| start < m.date && m.date <= end);
        true
    }

    pub fn set_previous_attendance(&mut self, count: u64) {
        self.previous_attendance = count;
    }

    /// Adds `candidate` to the comparison set if it lies in the window.
    /// Inserting the same member twice is a no-op.
    pub fn add_candidate(&mut self, candidate: &ComparisonMember) -> bool {
        if !self.window_contains(candidate.date) {
            return false;
        }
        self.comparison_set.insert(candidate.id, *candidate);
        true
    }

    /// Sum of known attendance across the comparison set.
    pub fn market_share_denominator(&self) -> u64 {
        self.comparison_set
            .values()
            .filter_map(|m| m.attendance.known())
            .sum()
    }

    /// Relative change against the previous occurrence's attendance.
    /// Unavailable when there is no previous attendance or this
    /// occurrence's attendance is unknown.
    pub fn growth(&self) -> Value<f64> {
        match self.attendance {
            Value::Known(current) if self.previous_attendance > 0 => {
                let previous = self.previous_attendance as f64;
                Value::Known((current as f64 - previous) / previous)
            }
            _ => Value::Unavailable,
        }
    }
}
