//! Fixed-size trailing windows.

use super::{Series, UNDEFINED};

/// A trailing window of `window` samples over a series. Every reduction
/// returns a series whose watermark is `wm + window - 1`.
#[derive(Debug, Clone, Copy)]
pub struct Rolling<'a> {
    series: &'a Series,
    window: usize,
}

impl<'a> Rolling<'a> {
    /// A zero window is treated as one sample.
    pub(crate) fn new(series: &'a Series, window: usize) -> Self {
        Self {
            series,
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Reduces each full window with `f`.
    pub fn apply(&self, f: impl Fn(&[f64]) -> f64) -> Series {
        let s = self.series;
        let w = self.window;
        s.derive(s.watermark + w - 1, |start| {
            (start..s.values.len())
                .map(|i| f(&s.values[i + 1 - w..=i]))
                .collect()
        })
    }

    pub fn sum(&self) -> Series {
        self.apply(|w| w.iter().sum())
    }

    pub fn mean(&self) -> Series {
        self.apply(|w| w.iter().sum::<f64>() / w.len() as f64)
    }

    pub fn max(&self) -> Series {
        self.apply(|w| w.iter().copied().fold(f64::NEG_INFINITY, nan_max))
    }

    pub fn min(&self) -> Series {
        self.apply(|w| w.iter().copied().fold(f64::INFINITY, nan_min))
    }

    /// Variance with `ddof` delta degrees of freedom.
    pub fn var(&self, ddof: usize) -> Series {
        self.apply(|w| variance(w, ddof))
    }

    pub fn std(&self, ddof: usize) -> Series {
        self.apply(|w| variance(w, ddof).sqrt())
    }
}

fn nan_max(acc: f64, v: f64) -> f64 {
    if acc.is_nan() || v.is_nan() {
        UNDEFINED
    } else {
        acc.max(v)
    }
}

fn nan_min(acc: f64, v: f64) -> f64 {
    if acc.is_nan() || v.is_nan() {
        UNDEFINED
    } else {
        acc.min(v)
    }
}

fn variance(w: &[f64], ddof: usize) -> f64 {
    let n = w.len();
    if n <= ddof {
        return UNDEFINED;
    }
    let mean = w.iter().sum::<f64>() / n as f64;
    let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
    ss / (n - ddof) as f64
}

#[cfg(test)]
mod tests {
    use super::super::{assert_approx, DEFAULT_EPSILON};
    use super::*;

    #[test]
    fn rolling_mean_of_five() {
        let x = Series::from_values("x", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let m = x.rolling(3).mean();
        assert_eq!(m.watermark(), 3);
        assert!(m[0].is_nan() && m[1].is_nan());
        assert_eq!(m.valid(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn rolling_stacks_on_watermark() {
        let x = Series::from_values("x", &[1.0, 5.0, 2.0, 8.0, 3.0, 1.0]).diff(1);
        let hi = x.rolling(2).max();
        assert_eq!(hi.watermark(), 3);
        assert_approx(hi[2], 4.0, DEFAULT_EPSILON);
        assert_approx(hi[3], 6.0, DEFAULT_EPSILON);
        assert_approx(hi[5], -2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn variance_respects_ddof() {
        let x = Series::from_values("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let pop = x.rolling(8).std(0);
        assert_approx(pop[7], 2.0, DEFAULT_EPSILON);
        let single = Series::from_values("x", &[1.0, 2.0]).rolling(1).var(1);
        assert!(single[0].is_nan() && single[1].is_nan());
    }

    #[test]
    fn window_larger_than_data_is_all_sentinel() {
        let x = Series::from_values("x", &[1.0, 2.0]);
        let s = x.rolling(5).sum();
        assert_eq!(s.watermark(), 5);
        assert!(s.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn custom_reduction() {
        let x = Series::from_values("x", &[1.0, 2.0, 3.0, 4.0]);
        let r = x.rolling(2).apply(|w| w[1] * w[0]);
        assert_eq!(r.valid(), &[2.0, 6.0, 12.0]);
    }
}
