use crate::series::SeriesCollection;

/// Series names ordered by each series' highest known attendance, largest
/// first.
///
/// The sort is stable: ties keep collection order. Series with no known
/// attendance go last.
pub fn rank_series_by_peak_attendance(collection: &SeriesCollection) -> Vec<String> {
    let mut ranked: Vec<(&str, Option<u64>)> = collection
        .iter()
        .map(|s| (s.name.as_str(), s.peak_attendance()))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked.into_iter().map(|(name, _)| name.to_string()).collect()
}
