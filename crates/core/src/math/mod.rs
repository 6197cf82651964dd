//! Small numeric helpers shared by the synthesis engine.

/// `1 / sqrt(2 * pi)`.
const INV_SQRT_TAU: f64 = 0.398_942_280_401_432_7;

/// Unnormalized Gaussian curve.
///
/// Outputs values in `(0, 1]` with the maximum of 1 reached at
/// `value == mean`. Callers must guarantee `sigma > 0`; a zero sigma divides
/// by zero.
pub fn gaussian(value: f64, mean: f64, sigma: f64) -> f64 {
    let diff = value - mean;
    (-(diff * diff) / (2.0 * sigma * sigma)).exp()
}

/// Gaussian curve scaled by `sigma / sqrt(2 * pi)` so its integral over
/// `(-inf, inf)` is 1.
pub fn gaussian_normalized(value: f64, mean: f64, sigma: f64) -> f64 {
    INV_SQRT_TAU * sigma * gaussian(value, mean, sigma)
}

/// Bounds `v` to `[lo, hi]` under a caller-supplied strict ordering.
///
/// Panics when `hi` orders before `lo`; that is a programming error at the
/// call site, not a recoverable condition.
pub fn clamp_by<T, F>(v: T, lo: T, hi: T, mut is_less: F) -> T
where
    F: FnMut(&T, &T) -> bool,
{
    assert!(!is_less(&hi, &lo), "clamp bounds must satisfy lo <= hi");
    if is_less(&v, &lo) {
        lo
    } else if is_less(&hi, &v) {
        hi
    } else {
        v
    }
}

/// Bounds `v` to `[lo, hi]` under the natural ordering.
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    clamp_by(v, lo, hi, |a, b| a < b)
}
