//! Parser for per-series attendance tables.
//!
//! Each table is a headerless CSV:
//!
//! ```text
//! Example Con,Regional
//! Year,Attendance
//! 6/1/2019,100
//! 6/1/2020,150
//! 2021,unknown
//! ```
//!
//! Row 0 holds the series name and an optional category. Any later row whose
//! first cell is a `month/day/year` date or a bare four-digit year is an
//! occurrence; every other row is metadata and is skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{Position, StringRecord};
use tracing::{debug, warn};

use crate::config::MetricsConfig;
use crate::date::{FractionalDate, looks_like_calendar_date};
use crate::error::ParseError;
use crate::event_year::{EventYear, parse_attendance};

/// One parsed input table.
#[derive(Debug, Clone)]
pub struct SeriesTable {
    pub name: String,
    pub category: Option<String>,
    pub occurrences: Vec<EventYear>,
}

/// Interprets the first cell of a data row.
///
/// Returns `Ok(None)` for metadata rows, `Err` for cells shaped like a date
/// that do not name a real one.
pub fn parse_date_cell(cell: &str) -> Result<Option<FractionalDate>, ParseError> {
    let cell = cell.trim();

    if looks_like_calendar_date(cell) {
        return FractionalDate::from_calendar_string(cell).map(Some);
    }

    if cell.len() == 4 && cell.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(year) = cell.parse::<i32>() {
            return Ok(Some(FractionalDate::from_year(year)));
        }
    }

    Ok(None)
}

/// Parses a table from any reader. Returns `None` for an empty table.
///
/// Errors carry the 1-based line number of the offending record, counting
/// the blank lines the reader skips.
pub fn parse_table<R: Read>(reader: R, config: &MetricsConfig) -> Result<Option<SeriesTable>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();

    let Some(first) = records.next() else {
        return Ok(None);
    };
    let first = read_record(first)?;
    let first_row = line_of(first.position());

    let name = first.get(0).unwrap_or("").trim_start_matches('\u{feff}').to_string();
    if name.is_empty() {
        bail!("row {first_row}: missing series name");
    }
    let category = first
        .get(1)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let mut occurrences = Vec::new();
    let mut skipped = 0usize;

    for result in records {
        let record = read_record(result)?;
        let row = line_of(record.position());

        let Some(date) = parse_date_cell(record.get(0).unwrap_or(""))
            .with_context(|| format!("row {row}"))?
        else {
            skipped += 1;
            continue;
        };

        let raw_attendance = record.get(config.attendance_column).unwrap_or("");
        let attendance = parse_attendance(raw_attendance, config.unknown_markers.as_slice())
            .with_context(|| format!("row {row}"))?;

        occurrences.push(EventYear::new(name.clone(), date, attendance));
    }

    debug!(
        series = %name,
        occurrences = occurrences.len(),
        skipped,
        "Parsed series table"
    );

    Ok(Some(SeriesTable {
        name,
        category,
        occurrences,
    }))
}

fn line_of(position: Option<&Position>) -> u64 {
    position.map_or(0, Position::line)
}

fn read_record(result: csv::Result<StringRecord>) -> Result<StringRecord> {
    result.map_err(|err| {
        let row = line_of(err.position());
        anyhow::Error::new(err).context(format!("row {row}"))
    })
}

/// Loads one table from disk, adding the file path to any error.
#[tracing::instrument(skip(config), fields(path = %path.display()))]
pub fn load_table(path: &Path, config: &MetricsConfig) -> Result<Option<SeriesTable>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let table = parse_table(file, config).with_context(|| path.display().to_string())?;

    if table.is_none() {
        warn!("Empty table, no occurrences loaded");
    }

    Ok(table)
}
