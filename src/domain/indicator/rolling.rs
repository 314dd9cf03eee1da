//! Trailing simple moving average with minimum-period averaging.
//!
//! The running sum is Kahan-compensated on both the add and the remove side,
//! each with its own compensation term.

/// Mean over up to `window` trailing values, fewer at the start.
///
/// Output[0] is values[0]; output[i] averages the non-missing values among
/// values[i+1-min(i+1, window)..=i], or is `NaN` when all of them are missing.
/// A window holding a single repeated value yields that value exactly, and a
/// window of one sign never yields a mean of the other sign.
/// A window of 0 is treated as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut acc = MeanAccumulator::default();

    for (i, &v) in values.iter().enumerate() {
        if i >= window {
            acc.remove(values[i - window]);
        }
        acc.add(v);
        out.push(acc.mean());
    }

    out
}

#[derive(Debug, Default)]
struct MeanAccumulator {
    nobs: usize,
    neg_count: usize,
    sum: f64,
    add_comp: f64,
    remove_comp: f64,
    /// Length of the run of equal values ending at the last one added.
    same_run: usize,
    last: f64,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.nobs += 1;
        let y = value - self.add_comp;
        let t = self.sum + y;
        self.add_comp = t - self.sum - y;
        self.sum = t;
        if value.is_sign_negative() {
            self.neg_count += 1;
        }
        if self.same_run > 0 && value == self.last {
            self.same_run += 1;
        } else {
            self.same_run = 1;
        }
        self.last = value;
    }

    fn remove(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.nobs -= 1;
        let y = -value - self.remove_comp;
        let t = self.sum + y;
        self.remove_comp = t - self.sum - y;
        self.sum = t;
        if value.is_sign_negative() {
            self.neg_count -= 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.nobs == 0 {
            return f64::NAN;
        }
        if self.same_run >= self.nobs {
            return self.last;
        }
        let mean = self.sum / self.nobs as f64;
        if (self.neg_count == 0 && mean < 0.0) || (self.neg_count == self.nobs && mean > 0.0) {
            0.0
        } else {
            mean
        }
    }
}
