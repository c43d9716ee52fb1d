use crate::analyzers::types::{GrowthSeries, YearlyStats};
use crate::analyzers::utility::{min_max, relative_change, weighted_mean};
use crate::date::FractionalDate;
use crate::series::SeriesCollection;
use std::collections::BTreeMap;
use tracing::debug;

/// Per-year totals and growth extremes across every series.
///
/// Growth only counts occurrences with a known attendance and a non-zero
/// previous attendance; the average weights each growth by that occurrence's
/// attendance. Every year in `[min_year, max_year]` gets an entry.
pub fn yearly_stats(
    collection: &SeriesCollection,
    min_year: i32,
    max_year: i32,
) -> BTreeMap<i32, YearlyStats> {
    let mut totals: BTreeMap<i32, u64> = (min_year..=max_year).map(|y| (y, 0)).collect();
    let mut growths: BTreeMap<i32, Vec<(f64, f64)>> = BTreeMap::new();

    for occurrence in collection.occurrences() {
        let year = occurrence.date().year();
        let Some(total) = totals.get_mut(&year) else {
            continue;
        };
        *total += occurrence.attendance().known().unwrap_or(0);

        if let (Some(growth), Some(attendance)) =
            (occurrence.growth().known(), occurrence.attendance().known())
        {
            growths
                .entry(year)
                .or_default()
                .push((growth, attendance as f64));
        }
    }

    totals
        .into_iter()
        .map(|(year, total_attendance)| {
            let pairs = growths.remove(&year).unwrap_or_default();
            let values: Vec<f64> = pairs.iter().map(|(g, _)| *g).collect();
            let extremes = min_max(&values);

            let stats = YearlyStats {
                year,
                total_attendance,
                qualifying: pairs.len(),
                average_growth: weighted_mean(&pairs),
                min_growth: extremes.map(|(lo, _)| lo),
                max_growth: extremes.map(|(_, hi)| hi),
            };
            (year, stats)
        })
        .collect()
}

/// Global growth curves keyed at `year + 0.5`.
///
/// Years without a qualifying occurrence are left out of all four curves.
/// Total growth compares each year's summed attendance with the year
/// before; for `max_year`, the year before only counts occurrences dated
/// earlier than one year before `as_of`, so a partial current year is not
/// measured against a complete one.
pub fn yearly_growth_stats(
    collection: &SeriesCollection,
    min_year: i32,
    max_year: i32,
    as_of: FractionalDate,
) -> GrowthSeries {
    let stats = yearly_stats(collection, min_year - 1, max_year);
    let cutoff = as_of.subtract(1.0);
    let mut series = GrowthSeries::default();

    for year in min_year..=max_year {
        let Some(current) = stats.get(&year) else {
            continue;
        };
        if current.qualifying == 0 {
            continue;
        }
        let x = year as f64 + 0.5;

        if let Some(average) = current.average_growth {
            series.average.push((x, average));
        }
        if let Some(min) = current.min_growth {
            series.min.push((x, min));
        }
        if let Some(max) = current.max_growth {
            series.max.push((x, max));
        }

        let previous_total = if year == max_year {
            partial_year_total(collection, year - 1, cutoff)
        } else {
            stats.get(&(year - 1)).map_or(0, |s| s.total_attendance)
        };

        match relative_change(current.total_attendance as f64, previous_total as f64) {
            Some(total) => series.total.push((x, total)),
            None => debug!(year, "No prior-year attendance, total growth skipped"),
        }
    }

    series
}

/// Known attendance of occurrences in `year` dated strictly before `cutoff`.
fn partial_year_total(collection: &SeriesCollection, year: i32, cutoff: FractionalDate) -> u64 {
    collection
        .occurrences()
        .filter(|o| o.date().year() == year && o.date() < cutoff)
        .filter_map(|o| o.attendance().known())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_year::EventYear;
    use crate::window::WindowAssigner;

    fn collection(rows: &[(&str, &str, &str)]) -> SeriesCollection {
        let mut collection = SeriesCollection::new();
        for (name, date, attendance) in rows {
            collection.push(EventYear::create(*name, date, attendance).unwrap());
        }
        WindowAssigner::default().assign(&mut collection);
        collection
    }

    fn sample() -> SeriesCollection {
        collection(&[
            ("A", "6/1/2019", "100"),
            ("A", "6/1/2020", "150"),
            ("A", "6/1/2021", "120"),
            ("B", "3/1/2019", "100"),
            ("B", "3/1/2020", "50"),
            ("B", "9/1/2021", "75"),
        ])
    }

    #[test]
    fn test_yearly_stats() {
        let stats = yearly_stats(&sample(), 2019, 2021);

        let y2019 = &stats[&2019];
        assert_eq!(y2019.total_attendance, 200);
        assert_eq!(y2019.qualifying, 0);
        assert_eq!(y2019.average_growth, None);

        let y2020 = &stats[&2020];
        assert_eq!(y2020.total_attendance, 200);
        assert_eq!(y2020.qualifying, 2);
        // (0.5 * 150 + -0.5 * 50) / 200
        assert_eq!(y2020.average_growth, Some(0.25));
        assert_eq!(y2020.min_growth, Some(-0.5));
        assert_eq!(y2020.max_growth, Some(0.5));
    }

    #[test]
    fn test_year_without_qualifying_is_omitted() {
        let growth = yearly_growth_stats(&sample(), 2019, 2021, FractionalDate::from_year(2030));

        let years: Vec<f64> = growth.average.iter().map(|(x, _)| *x).collect();
        assert_eq!(years, vec![2020.5, 2021.5]);
        assert_eq!(growth.min.len(), 2);
        assert_eq!(growth.max.len(), 2);
        assert!(growth.total.iter().all(|(x, _)| *x != 2019.5));
    }

    #[test]
    fn test_total_growth_between_full_years() {
        let growth = yearly_growth_stats(&sample(), 2019, 2021, FractionalDate::from_year(2030));
        // 2020 total 200 vs 2019 total 200
        assert_eq!(growth.total[0], (2020.5, 0.0));
    }

    #[test]
    fn test_final_year_total_uses_partial_prior_year() {
        // cutoff = 7/1/2021 - 1 year: 2020 occurrences before ~7/1/2020
        let as_of = FractionalDate::from_calendar_string("7/1/2021").unwrap();
        let data = collection(&[
            ("A", "6/1/2019", "100"),
            ("A", "6/1/2020", "150"),
            ("A", "6/1/2021", "180"),
            ("B", "3/1/2019", "40"),
            ("B", "3/1/2020", "50"),
            ("B", "11/1/2020", "999"),
        ]);

        let growth = yearly_growth_stats(&data, 2019, 2021, as_of);
        let (x, total) = *growth.total.last().unwrap();
        assert_eq!(x, 2021.5);
        // 180 vs 150 + 50; the November 2020 event has not come round again yet
        assert_eq!(total, (180.0 - 200.0) / 200.0);
    }

    #[test]
    fn test_zero_prior_total_skips_total_only() {
        let data = collection(&[("A", "6/1/2019", "0"), ("A", "6/1/2020", "10")]);
        let stats = yearly_stats(&data, 2019, 2020);
        assert_eq!(stats[&2020].qualifying, 0);

        // A skipped 2019, so 2020 has growth but no prior-year total
        let data = collection(&[("A", "6/1/2018", "10"), ("A", "6/1/2020", "20")]);
        let growth = yearly_growth_stats(&data, 2018, 2020, FractionalDate::from_year(2030));
        assert_eq!(growth.average, vec![(2020.5, 1.0)]);
        assert_eq!(growth.min, vec![(2020.5, 1.0)]);
        assert!(growth.total.is_empty());
    }
}
