//! Attendance metrics and the processing pipeline.
//!
//! Once every occurrence has its comparison window, this module derives
//! market share, growth and calendar-year share per series, aggregates
//! growth per calendar year, ranks series by peak attendance, and drives the
//! whole load → window → metrics → output run.

pub mod aggregate;
pub mod analyzer;
pub mod engine;
pub mod rank;
pub mod types;
pub mod utility;
