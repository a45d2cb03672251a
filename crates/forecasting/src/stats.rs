//! Small deterministic statistics shared by the methods.

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Ordinary least squares fit of `ys` against `0..n`.
///
/// Returns `(intercept, slope)`, or `None` for fewer than two points.
pub fn linear_fit(ys: &[f64]) -> Option<(f64, f64)> {
    if ys.len() < 2 {
        return None;
    }
    let n = ys.len() as f64;
    let t_mean = (n - 1.0) / 2.0;
    let y_mean = mean(ys);

    let mut cov = 0.0;
    let mut var = 0.0;
    for (t, y) in ys.iter().enumerate() {
        let dt = t as f64 - t_mean;
        cov += dt * (y - y_mean);
        var += dt * dt;
    }

    let slope = cov / var;
    Some((y_mean - slope * t_mean, slope))
}

/// Sum of squared values.
pub fn sum_sq(xs: impl IntoIterator<Item = f64>) -> f64 {
    xs.into_iter().map(|x| x * x).sum()
}
