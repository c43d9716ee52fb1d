//! Insertion-ordered collection of named series.

use crate::event_year::{ComparisonMember, EventYear, OccurrenceId};

/// One recurring event's history, in input (chronological) order.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub category: Option<String>,
    pub occurrences: Vec<EventYear>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            occurrences: Vec::new(),
        }
    }

    /// Highest known attendance across the series, if any.
    pub fn peak_attendance(&self) -> Option<u64> {
        self.occurrences
            .iter()
            .filter_map(|o| o.attendance().known())
            .max()
    }
}

/// Series keyed by name, iterated in first-insertion order.
///
/// Occurrences are expected to arrive sorted by date within each series;
/// nothing here re-sorts them.
#[derive(Debug, Clone, Default)]
pub struct SeriesCollection {
    series: Vec<Series>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the series named `name`, creating an empty one at the end if
    /// it does not exist yet.
    pub fn entry(&mut self, name: &str) -> &mut Series {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.series.push(Series::new(name));
                self.series.len() - 1
            }
        };
        &mut self.series[idx]
    }

    pub fn push(&mut self, occurrence: EventYear) {
        let name = occurrence.series_name().to_string();
        self.entry(&name).occurrences.push(occurrence);
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.series.iter().position(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut [Series] {
        &mut self.series
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Every occurrence in every series, in collection order.
    pub fn occurrences(&self) -> impl Iterator<Item = &EventYear> {
        self.series.iter().flat_map(|s| s.occurrences.iter())
    }

    pub fn occurrence_count(&self) -> usize {
        self.series.iter().map(|s| s.occurrences.len()).sum()
    }

    /// Snapshots every occurrence as a comparison member.
    pub fn members(&self) -> Vec<ComparisonMember> {
        self.series
            .iter()
            .enumerate()
            .flat_map(|(series, s)| {
                s.occurrences
                    .iter()
                    .enumerate()
                    .map(move |(index, o)| o.as_member(OccurrenceId { series, index }))
            })
            .collect()
    }

    /// Earliest and latest calendar year of any occurrence.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.occurrences().map(|o| o.date().year());
        years.fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(name: &str, date: &str, attendance: &str) -> EventYear {
        EventYear::create(name, date, attendance).unwrap()
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut collection = SeriesCollection::new();
        collection.push(occurrence("B", "1/1/2019", "10"));
        collection.push(occurrence("A", "1/1/2019", "20"));
        collection.push(occurrence("B", "1/1/2020", "30"));

        let names: Vec<_> = collection.names().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(collection.get("B").unwrap().occurrences.len(), 2);
        assert_eq!(collection.occurrence_count(), 3);
    }

    #[test]
    fn test_members_carry_positions() {
        let mut collection = SeriesCollection::new();
        collection.push(occurrence("A", "1/1/2019", "10"));
        collection.push(occurrence("B", "1/1/2019", "20"));
        collection.push(occurrence("B", "1/1/2020", "30"));

        let ids: Vec<_> = collection.members().iter().map(|m| (m.id.series, m.id.index)).collect();
        assert_eq!(ids, vec![(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_year_range_and_peak() {
        let mut collection = SeriesCollection::new();
        assert_eq!(collection.year_range(), None);

        collection.push(occurrence("A", "5/1/2018", "10"));
        collection.push(occurrence("A", "5/1/2021", "unknown"));
        collection.push(occurrence("B", "5/1/2019", "40"));

        assert_eq!(collection.year_range(), Some((2018, 2021)));
        assert_eq!(collection.get("A").unwrap().peak_attendance(), Some(10));
        assert_eq!(Series::new("empty").peak_attendance(), None);
    }
}
