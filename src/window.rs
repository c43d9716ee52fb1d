//! Assignment of trailing comparison windows.
//!
//! Runs in two strictly ordered passes over a [`SeriesCollection`]:
//!
//! 1. Within each series, every occurrence after the first learns the date
//!    and attendance of its predecessor, which tightens its window.
//! 2. Every occurrence is offered every occurrence of every series
//!    (itself included); [`EventYear::add_candidate`] keeps those inside the
//!    window.
//!
//! The second pass reads only snapshots taken after the first pass, so each
//! target is independent and the outer loop runs on rayon.
//!
//! With [`WindowStrategy::Exhaustive`] the second pass is O(N²) in the total
//! number of occurrences. [`WindowStrategy::Indexed`] sorts the snapshots by
//! date once and binary-searches each window, giving O(N log N + M) where M
//! is the total size of all comparison sets. Both produce the same sets.

use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::event_year::{ComparisonMember, EventYear};
use crate::series::SeriesCollection;

/// How the cross-series pass finds window candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowStrategy {
    /// Offer every occurrence to every occurrence.
    #[default]
    Exhaustive,
    /// Offer only occurrences whose date falls in the window, found by
    /// binary search over date-sorted snapshots.
    Indexed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAssigner {
    strategy: WindowStrategy,
}

impl WindowAssigner {
    pub fn new(strategy: WindowStrategy) -> Self {
        Self { strategy }
    }

    /// Runs both passes in order.
    #[tracing::instrument(skip_all, fields(strategy = ?self.strategy))]
    pub fn assign(&self, collection: &mut SeriesCollection) {
        self.link_previous(collection);
        self.fill_windows(collection);
    }

    /// Intra-series pass: occurrence `i` takes occurrence `i - 1`'s date as
    /// its window start and its attendance as previous attendance.
    pub fn link_previous(&self, collection: &mut SeriesCollection) {
        for series in collection.series_mut() {
            let occurrences = &mut series.occurrences;

            for i in 1..occurrences.len() {
                let previous_date = occurrences[i - 1].date();
                let previous_attendance = occurrences[i - 1].attendance();

                let current = &mut occurrences[i];
                current.set_previous_date(previous_date);
                if let Some(count) = previous_attendance.known() {
                    current.set_previous_attendance(count);
                }
            }

            debug!(
                series = %series.name,
                occurrences = occurrences.len(),
                "Linked previous occurrences"
            );
        }
    }

    /// Cross-series pass: fills every comparison set.
    pub fn fill_windows(&self, collection: &mut SeriesCollection) {
        let mut members = collection.members();
        let total = members.len();

        match self.strategy {
            WindowStrategy::Exhaustive => {
                for_each_target(collection, |target| offer_all(target, &members));
            }
            WindowStrategy::Indexed => {
                members.sort_by_key(|m| m.date);
                for_each_target(collection, |target| offer_window(target, &members));
            }
        }

        info!(occurrences = total, "Comparison windows assigned");
    }
}

fn for_each_target<F>(collection: &mut SeriesCollection, f: F)
where
    F: Fn(&mut EventYear) + Sync + Send,
{
    collection
        .series_mut()
        .par_iter_mut()
        .flat_map(|s| s.occurrences.par_iter_mut())
        .for_each(f);
}

fn offer_all(target: &mut EventYear, members: &[ComparisonMember]) {
    for candidate in members {
        target.add_candidate(candidate);
    }
}

/// `members` must be sorted by date.
fn offer_window(target: &mut EventYear, members: &[ComparisonMember]) {
    let (start, end) = (target.window_start(), target.date());
    let lo = members.partition_point(|m| m.date <= start);
    let hi = members.partition_point(|m| m.date <= end);

    for candidate in &members[lo..hi.max(lo)] {
        target.add_candidate(candidate);
    }
}
