//! Order statistics over simulated stopping times.

/// Linear-interpolated quantile of an ascending slice.
///
/// Position `q·(len - 1)` between order statistics; NaN for an empty slice.
/// Infinite entries are allowed and propagate.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Stopping times as reals, with "not stopped" mapped to `+inf`, sorted.
pub fn sorted_stop_times(stops: &[Option<usize>]) -> Vec<f64> {
    let mut times: Vec<f64> = stops
        .iter()
        .map(|stop| stop.map_or(f64::INFINITY, |n| n as f64))
        .collect();
    times.sort_by(f64::total_cmp);
    times
}
