//! Output formatting and persistence for attendance metrics.
//!
//! Produces the chart record consumed by the front-end as JSON, and per-year
//! CSV tables for spreadsheets.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::engine::MetricsEngine;
use crate::analyzers::types::{GrowthSeries, SeriesMetrics, SeriesPoint};
use crate::date::FractionalDate;
use crate::value::{PLACEHOLDER, Value};

/// One element of a chart column: the leading label, a count, or a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Label(String),
    Count(Value<u64>),
    Number(Value<f64>),
}

impl Cell {
    pub fn number(v: f64) -> Self {
        Cell::Number(Value::Known(v))
    }
}

/// The chart record.
///
/// Besides the fixed keys, every series contributes `<name>-date`,
/// `<name>-attendance`, `<name>-growth`, `<name>-twelveMonths` and
/// `<name>-calendarShare` columns, and each global growth curve contributes
/// a column plus a matching `-date` column. Every column starts with a label.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    #[serde(rename = "minYear")]
    pub min_year: Option<i32>,
    /// One past the last year with data.
    #[serde(rename = "maxYear")]
    pub max_year: Option<i32>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, String>,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<Cell>>,
}

impl ChartData {
    pub fn build(engine: &MetricsEngine<'_>, as_of: FractionalDate) -> Self {
        let collection = engine.collection();
        let range = collection.year_range();

        let mut chart = ChartData {
            min_year: range.map(|(lo, _)| lo),
            max_year: range.map(|(_, hi)| hi + 1),
            sort_order: engine
                .rank_series_by_peak_attendance()
                .into_iter()
                .filter(|name| collection.get(name).is_some_and(|s| !s.occurrences.is_empty()))
                .collect(),
            categories: BTreeMap::new(),
            columns: BTreeMap::new(),
        };

        for series in collection.iter().filter(|s| !s.occurrences.is_empty()) {
            if let Some(category) = &series.category {
                chart.categories.insert(series.name.clone(), category.clone());
            }
            if let Some(metrics) = engine.per_series_series(&series.name) {
                chart.add_series(&metrics);
            }
        }

        if let Some((min_year, max_year)) = range {
            let growth = engine.yearly_growth_stats(min_year, max_year, as_of);
            chart.add_growth(&growth);
        }

        chart
    }

    pub fn column(&self, key: &str) -> Option<&[Cell]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    fn add_series(&mut self, metrics: &SeriesMetrics) {
        let name = &metrics.name;
        let label = || Cell::Label(name.clone());

        let mut dates = vec![Cell::Label(format!("{name}-date"))];
        let mut attendance = vec![label()];
        let mut growth = vec![label()];
        let mut share = vec![label()];
        let mut calendar_share = vec![label()];

        for p in &metrics.points {
            dates.push(Cell::number(p.date));
            attendance.push(Cell::Count(p.attendance));
            growth.push(Cell::Number(p.growth));
            share.push(Cell::Number(p.share));
            calendar_share.push(Cell::Number(p.calendar_share));
        }

        self.columns.insert(format!("{name}-date"), dates);
        self.columns.insert(format!("{name}-attendance"), attendance);
        self.columns.insert(format!("{name}-growth"), growth);
        self.columns.insert(format!("{name}-twelveMonths"), share);
        self.columns.insert(format!("{name}-calendarShare"), calendar_share);
    }

    fn add_growth(&mut self, growth: &GrowthSeries) {
        for (label, pairs) in [
            ("Average Growth", &growth.average),
            ("Total Growth", &growth.total),
            ("Least Growth", &growth.min),
            ("Most Growth", &growth.max),
        ] {
            let date_label = format!("{label}-date");

            let mut dates = vec![Cell::Label(date_label.clone())];
            let mut values = vec![Cell::Label(label.to_string())];
            for (x, v) in pairs {
                dates.push(Cell::number(*x));
                values.push(Cell::number(*v));
            }

            self.columns.insert(date_label, dates);
            self.columns.insert(label.to_string(), values);
        }
    }
}

/// Logs chart data as pretty-printed JSON.
pub fn print_json(chart: &ChartData) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(chart)?);
    Ok(())
}

/// Writes the chart record as pretty-printed JSON.
pub fn write_json(path: &Path, chart: &ChartData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, chart)?;
    writer.flush()?;

    info!(path = %path.display(), columns = chart.columns.len(), "Chart JSON written");
    Ok(())
}

/// Per-year table files and the metric each one holds.
const TABLES: &[(&str, fn(&SeriesPoint) -> String)] = &[
    ("attendance.csv", attendance_cell),
    ("growth.csv", growth_cell),
    ("twelve_months.csv", share_cell),
    ("calendar_share.csv", calendar_share_cell),
];

fn attendance_cell(p: &SeriesPoint) -> String {
    p.attendance.to_cell()
}

fn growth_cell(p: &SeriesPoint) -> String {
    p.growth.to_cell()
}

fn share_cell(p: &SeriesPoint) -> String {
    p.share.to_cell()
}

fn calendar_share_cell(p: &SeriesPoint) -> String {
    p.calendar_share.to_cell()
}

/// Builds a `YEAR`-by-series table for one metric.
///
/// Each calendar year is represented by the series' last occurrence in it.
/// Years before a series starts or after it ends are `0`; years inside its
/// run without an occurrence hold the placeholder.
pub fn year_table(
    series: &[SeriesMetrics],
    min_year: i32,
    max_year: i32,
    metric: fn(&SeriesPoint) -> String,
) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    let mut header = vec!["YEAR".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    rows.push(header);

    for year in min_year..=max_year {
        let mut row = vec![year.to_string()];
        for s in series {
            let cell = match s.active_years() {
                Some((first, last)) if (first..=last).contains(&year) => s
                    .point_in_year(year)
                    .map(metric)
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                _ => "0".to_string(),
            };
            row.push(cell);
        }
        rows.push(row);
    }

    rows
}

/// Writes the per-year CSV tables into `dir`.
pub fn write_tables(dir: &Path, engine: &MetricsEngine<'_>) -> Result<()> {
    let collection = engine.collection();
    let Some((min_year, max_year)) = collection.year_range() else {
        info!("No occurrences, skipping CSV tables");
        return Ok(());
    };

    fs::create_dir_all(dir)?;

    let series: Vec<SeriesMetrics> = collection
        .names()
        .filter_map(|name| engine.per_series_series(name))
        .filter(|metrics| !metrics.points.is_empty())
        .collect();

    for (file_name, metric) in TABLES {
        let path = dir.join(file_name);
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        for row in year_table(&series, min_year, max_year, *metric) {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), "CSV table written");
    }

    info!(dir = %dir.display(), tables = TABLES.len(), "CSV tables written");
    Ok(())
}
