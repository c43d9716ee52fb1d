use crate::analyzers::engine::MetricsEngine;
use crate::config::MetricsConfig;
use crate::output::{ChartData, write_json, write_tables};
use crate::parser::{SeriesTable, load_table};
use crate::series::SeriesCollection;
use crate::window::WindowAssigner;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads every table in `input_dir`, assigns comparison windows, writes the
/// chart JSON to `output` and, if given, the per-year CSV tables to
/// `tables_dir`.
#[tracing::instrument(skip(config), fields(input_dir = %input_dir.display(), output = %output.display()))]
pub fn run(
    input_dir: &Path,
    output: &Path,
    tables_dir: Option<&Path>,
    config: &MetricsConfig,
) -> Result<ChartData> {
    let collection = prepare(input_dir, config)?;
    let engine = MetricsEngine::new(&collection, config.blackout);

    let chart = ChartData::build(&engine, config.as_of_or_today());
    write_json(output, &chart)?;

    if let Some(dir) = tables_dir {
        write_tables(dir, &engine)?;
    }

    info!(
        series = collection.len(),
        occurrences = collection.occurrence_count(),
        "Processing complete"
    );
    Ok(chart)
}

/// Loads `input_dir` and runs both window passes.
pub fn prepare(input_dir: &Path, config: &MetricsConfig) -> Result<SeriesCollection> {
    let mut collection = load_series_dir(input_dir, config)?;
    WindowAssigner::new(config.window_strategy).assign(&mut collection);
    Ok(collection)
}

/// Builds the chart record for `input_dir` without writing anything.
pub fn analyze(input_dir: &Path, config: &MetricsConfig) -> Result<ChartData> {
    let collection = prepare(input_dir, config)?;
    let engine = MetricsEngine::new(&collection, config.blackout);
    Ok(ChartData::build(&engine, config.as_of_or_today()))
}

/// Reads every table in `dir` in file-name order. A missing directory
/// yields an empty collection.
pub fn load_series_dir(dir: &Path, config: &MetricsConfig) -> Result<SeriesCollection> {
    let mut collection = SeriesCollection::new();

    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Input directory not found, no series loaded");
        return Ok(collection);
    }

    for path in list_tables(dir)? {
        if let Some(table) = load_table(&path, config)? {
            merge_table(&mut collection, table);
        }
    }

    info!(
        series = collection.len(),
        occurrences = collection.occurrence_count(),
        "Series loaded"
    );
    Ok(collection)
}

fn list_tables(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let hidden = entry
            .file_name()
            .to_str()
            .is_none_or(|name| name.starts_with('.'));
        if hidden {
            continue;
        }
        paths.push(entry.path());
    }

    paths.sort();
    Ok(paths)
}

/// Appends a table to the series of the same name, creating it if needed.
/// Tables without occurrences add nothing.
fn merge_table(collection: &mut SeriesCollection, table: SeriesTable) {
    if table.occurrences.is_empty() {
        debug!(series = %table.name, "No occurrences, series skipped");
        return;
    }
    let series = collection.entry(&table.name);
    if series.category.is_none() {
        series.category = table.category;
    }
    series.occurrences.extend(table.occurrences);
}
