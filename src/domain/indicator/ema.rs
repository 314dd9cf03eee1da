//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first observation (no SMA seed):
//! EMA[0] = x[0], EMA[i] = x[i]*k + EMA[i-1]*(1-k). Every bar is defined.

/// Recursive exponential smoothing with factor `alpha`, seeded at `values[0]`.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut acc = match values.first() {
        Some(&first) => first,
        None => return out,
    };
    out.push(acc);

    for &v in &values[1..] {
        acc = alpha * v + (1.0 - alpha) * acc;
        out.push(acc);
    }

    out
}

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    ewm(values, smoothing_factor(span))
}

/// 2 / (span + 1)
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}
