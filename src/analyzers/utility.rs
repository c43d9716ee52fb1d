/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of `(value, weight)` pairs weighted by `weight`.
///
/// Falls back to the unweighted mean when every weight is zero, and returns
/// `None` for empty input.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let weight_sum: f64 = pairs.iter().map(|(_, w)| w).sum();
    if weight_sum == 0.0 {
        let values: Vec<f64> = pairs.iter().map(|(v, _)| *v).collect();
        return mean(&values);
    }
    Some(pairs.iter().map(|(v, w)| v * w).sum::<f64>() / weight_sum)
}

/// `(current - previous) / previous`, or `None` when `previous` is zero.
pub fn relative_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
