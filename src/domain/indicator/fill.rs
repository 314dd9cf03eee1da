//! Sentinel-fill passes.
//!
//! Indicator scans are total and may leave `NaN` where a formula is
//! indeterminate. These passes are the only place such gaps get replaced.

/// Replace every `NaN` with `value`.
pub fn fill_value(values: &mut [f64], value: f64) {
    for v in values.iter_mut().filter(|v| v.is_nan()) {
        *v = value;
    }
}

/// Carry the last defined value forward over `NaN` gaps.
pub fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}

/// Carry the next defined value backward over `NaN` gaps.
pub fn backward_fill(values: &mut [f64]) {
    let mut next = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
}

/// Turn `±inf` into the `NaN` missing sentinel.
pub fn replace_non_finite(values: &mut [f64]) {
    for v in values.iter_mut().filter(|v| v.is_infinite()) {
        *v = f64::NAN;
    }
}
