//! Run configuration.
//!
//! Stored as an optional JSON file; every field has a default:
//! ```json
//! {
//!   "blackout": { "start": "03/01/2020", "end": "06/30/2021" },
//!   "attendance_column": 1,
//!   "unknown_markers": ["unknown", "N/A", "*"],
//!   "as_of": "10/01/2024",
//!   "window_strategy": "indexed"
//! }
//! ```

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::date::FractionalDate;
use crate::window::WindowStrategy;

/// A period during which market-share figures are meaningless.
///
/// Suppression covers `[start, end]` plus one more year after `end`, since
/// trailing windows keep reaching back into the period for that long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutInterval {
    pub start: FractionalDate,
    pub end: FractionalDate,
}

impl BlackoutInterval {
    pub fn new(start: FractionalDate, end: FractionalDate) -> Self {
        Self { start, end }
    }

    pub fn suppresses(&self, date: FractionalDate) -> bool {
        self.start <= date && date <= self.end.add(1.0)
    }
}

impl Default for BlackoutInterval {
    fn default() -> Self {
        Self {
            start: FractionalDate::new(2020, 60),
            end: FractionalDate::new(2021, 180),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub blackout: Option<BlackoutInterval>,
    /// Column holding attendance in each data row.
    pub attendance_column: usize,
    pub unknown_markers: Vec<String>,
    /// Reference "today" for the final-year total growth; the local date if unset.
    pub as_of: Option<FractionalDate>,
    pub window_strategy: WindowStrategy,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            blackout: Some(BlackoutInterval::default()),
            attendance_column: 1,
            unknown_markers: vec!["unknown".into(), "N/A".into(), "*".into()],
            as_of: None,
            window_strategy: WindowStrategy::default(),
        }
    }
}

impl MetricsConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path}"))?;
        Self::from_json(&content).with_context(|| format!("invalid config {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: MetricsConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(blackout) = &self.blackout {
            if blackout.start > blackout.end {
                bail!(
                    "blackout start {} is after its end {}",
                    blackout.start,
                    blackout.end
                );
            }
        }
        if self.attendance_column == 0 {
            bail!("attendance_column 0 is the date column");
        }
        Ok(())
    }

    pub fn as_of_or_today(&self) -> FractionalDate {
        self.as_of
            .unwrap_or_else(|| FractionalDate::from_naive(Local::now().date_naive()))
    }
}
