//! Watermarked series.
//!
//! A `Series` is a named `Vec<f64>` plus a watermark: the 1-based position of
//! the first sample guaranteed to be defined. Every position before it holds
//! the undefined sentinel (`f64::NAN`). Operations compute the result over the
//! valid tail only and advance the watermark by the lookback they consume:
//!
//! - element-wise binary ops: `max(wm_a, wm_b)`
//! - unary and cumulative ops: unchanged
//! - `rolling(w)`: `wm + w - 1`
//! - `shift(k)`, `diff(k)`, `pct_change(k)`: `wm + k`
//!
//! Nothing here fails for lack of data. When the watermark runs past the end
//! the result is all sentinel.

mod arith;
mod rolling;

pub use rolling::Rolling;

use std::ops::Index;

/// The undefined sentinel.
pub const UNDEFINED: f64 = f64::NAN;

#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    values: Vec<f64>,
    watermark: usize,
}

/// Right-hand side of an element-wise operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Series(&'a Series),
    Slice(&'a [f64]),
}

impl Operand<'_> {
    fn watermark(&self) -> usize {
        match self {
            Operand::Series(s) => s.watermark,
            Operand::Scalar(_) | Operand::Slice(_) => 1,
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            Operand::Scalar(v) => *v,
            Operand::Series(s) => s.values.get(i).copied().unwrap_or(UNDEFINED),
            Operand::Slice(v) => v.get(i).copied().unwrap_or(UNDEFINED),
        }
    }
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

impl<'a> From<&'a Series> for Operand<'a> {
    fn from(s: &'a Series) -> Self {
        Operand::Series(s)
    }
}

impl<'a> From<&'a [f64]> for Operand<'a> {
    fn from(v: &'a [f64]) -> Self {
        Operand::Slice(v)
    }
}

impl<'a> From<&'a Vec<f64>> for Operand<'a> {
    fn from(v: &'a Vec<f64>) -> Self {
        Operand::Slice(v.as_slice())
    }
}

/// Division with the sentinel for a zero denominator.
pub(crate) fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        UNDEFINED
    } else {
        num / den
    }
}

fn flag(cond: bool) -> f64 {
    if cond {
        1.0
    } else {
        0.0
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

// ─── Construction and access ─────────────────────────────────────────

impl Series {
    /// Raw data: every sample is considered valid.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            watermark: 1,
        }
    }

    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.to_vec())
    }

    /// All-sentinel series of `len` samples.
    pub fn undefined(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![UNDEFINED; len],
            watermark: len + 1,
        }
    }

    /// Declares the first valid position and blanks everything before it.
    pub fn with_watermark(mut self, watermark: usize) -> Self {
        self.watermark = watermark.max(1);
        let end = (self.watermark - 1).min(self.values.len());
        for v in &mut self.values[..end] {
            *v = UNDEFINED;
        }
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// 1-based position of the first defined sample.
    pub fn watermark(&self) -> usize {
        self.watermark
    }

    /// 0-based index of the first defined sample.
    pub fn min_index(&self) -> usize {
        self.watermark - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples from the watermark on.
    pub fn valid(&self) -> &[f64] {
        &self.values[self.min_index().min(self.values.len())..]
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Builds a same-length series whose tail from `watermark - 1` comes from
    /// `tail(start)`; the rest is sentinel.
    pub(crate) fn derive(&self, watermark: usize, tail: impl FnOnce(usize) -> Vec<f64>) -> Series {
        let len = self.values.len();
        let watermark = watermark.max(1);
        let start = (watermark - 1).min(len);
        let mut values = vec![UNDEFINED; len];
        if start < len {
            for (slot, v) in values[start..].iter_mut().zip(tail(start)) {
                *slot = v;
            }
        }
        Series {
            name: self.name.clone(),
            values,
            watermark,
        }
    }

    pub(crate) fn from_parts(name: String, values: Vec<f64>, watermark: usize) -> Series {
        Series {
            name,
            values,
            watermark: watermark.max(1),
        }
    }
}

impl Index<usize> for Series {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

// ─── Element-wise ────────────────────────────────────────────────────

impl Series {
    /// Combines with another operand sample by sample.
    pub fn zip_with<'a>(&self, other: impl Into<Operand<'a>>, f: impl Fn(f64, f64) -> f64) -> Series {
        let other = other.into();
        let watermark = self.watermark.max(other.watermark());
        self.derive(watermark, |start| {
            (start..self.values.len())
                .map(|i| f(self.values[i], other.at(i)))
                .collect()
        })
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Series {
        self.derive(self.watermark, |start| {
            self.values[start..].iter().map(|&v| f(v)).collect()
        })
    }

    pub fn pow<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, f64::powf)
    }

    pub fn gt<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a > b))
    }

    pub fn ge<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a >= b))
    }

    pub fn lt<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a < b))
    }

    pub fn le<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a <= b))
    }

    pub fn equal<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a == b))
    }

    pub fn not_equal<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(a != b))
    }

    pub fn and<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(truthy(a) && truthy(b)))
    }

    pub fn or<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| flag(truthy(a) || truthy(b)))
    }

    /// Element-wise maximum, i.e. clipped from below by `other`.
    pub fn max_with<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| if a.is_nan() || b.is_nan() { UNDEFINED } else { a.max(b) })
    }

    /// Element-wise minimum, i.e. clipped from above by `other`.
    pub fn min_with<'a>(&self, other: impl Into<Operand<'a>>) -> Series {
        self.zip_with(other, |a, b| if a.is_nan() || b.is_nan() { UNDEFINED } else { a.min(b) })
    }

    pub fn abs(&self) -> Series {
        self.map(f64::abs)
    }

    /// -1, 0 or 1. The sentinel stays undefined.
    pub fn sign(&self) -> Series {
        self.map(|v| {
            if v.is_nan() {
                UNDEFINED
            } else if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    pub fn clip(&self, lower: Option<f64>, upper: Option<f64>) -> Series {
        self.map(|mut v| {
            if let Some(lo) = lower {
                if v < lo {
                    v = lo;
                }
            }
            if let Some(hi) = upper {
                if v > hi {
                    v = hi;
                }
            }
            v
        })
    }
}

// ─── Lookback ────────────────────────────────────────────────────────

impl Series {
    /// Lags by `k` samples.
    pub fn shift(&self, k: usize) -> Series {
        self.derive(self.watermark + k, |start| {
            (start..self.values.len()).map(|i| self.values[i - k]).collect()
        })
    }

    /// `x[i] - x[i - k]`.
    pub fn diff(&self, k: usize) -> Series {
        self.derive(self.watermark + k, |start| {
            (start..self.values.len())
                .map(|i| self.values[i] - self.values[i - k])
                .collect()
        })
    }

    /// `x[i] / x[i - k] - 1`.
    pub fn pct_change(&self, k: usize) -> Series {
        self.derive(self.watermark + k, |start| {
            (start..self.values.len())
                .map(|i| safe_div(self.values[i], self.values[i - k]) - 1.0)
                .collect()
        })
    }

    pub fn rolling(&self, window: usize) -> Rolling<'_> {
        Rolling::new(self, window)
    }
}

// ─── Cumulative ──────────────────────────────────────────────────────

impl Series {
    fn scan(&self, f: impl Fn(f64, f64) -> f64) -> Series {
        self.derive(self.watermark, |start| {
            let mut acc: Option<f64> = None;
            self.values[start..]
                .iter()
                .map(|&v| {
                    let next = match acc {
                        Some(prev) => f(prev, v),
                        None => v,
                    };
                    acc = Some(next);
                    next
                })
                .collect()
        })
    }

    pub fn cumsum(&self) -> Series {
        self.scan(|acc, v| acc + v)
    }

    pub fn cumprod(&self) -> Series {
        self.scan(|acc, v| acc * v)
    }

    pub fn cummax(&self) -> Series {
        self.scan(f64::max)
    }

    pub fn cummin(&self) -> Series {
        self.scan(f64::min)
    }
}

// ─── Free-form ───────────────────────────────────────────────────────

impl Series {
    /// Runs `f` over the valid tail. The output is laid back from the
    /// watermark on; missing trailing samples stay undefined.
    pub fn apply(&self, f: impl FnOnce(&[f64]) -> Vec<f64>) -> Series {
        self.derive(self.watermark, |start| f(&self.values[start..]))
    }

    /// Like `apply`, with other operands aligned at the combined watermark.
    pub fn apply_with(
        &self,
        others: &[&Series],
        f: impl FnOnce(&[f64], &[&[f64]]) -> Vec<f64>,
    ) -> Series {
        let watermark = others
            .iter()
            .fold(self.watermark, |wm, s| wm.max(s.watermark));
        self.derive(watermark, |start| {
            let tails: Vec<&[f64]> = others
                .iter()
                .map(|s| &s.values[start.min(s.values.len())..])
                .collect();
            f(&self.values[start..], &tails)
        })
    }

    /// Multi-output variant of `apply_with`: one series per returned vector,
    /// all sharing the combined watermark.
    pub fn apply_many(
        &self,
        others: &[&Series],
        f: impl FnOnce(&[f64], &[&[f64]]) -> Vec<Vec<f64>>,
    ) -> Vec<Series> {
        let watermark = others
            .iter()
            .fold(self.watermark, |wm, s| wm.max(s.watermark));
        let len = self.values.len();
        let start = (watermark - 1).min(len);
        let tails: Vec<&[f64]> = others
            .iter()
            .map(|s| &s.values[start.min(s.values.len())..])
            .collect();
        let computed = if start < len {
            f(&self.values[start..], &tails)
        } else {
            Vec::new()
        };
        computed
            .into_iter()
            .map(|tail| self.derive(watermark, |_| tail))
            .collect()
    }
}

// ─── Manual watermark control ────────────────────────────────────────

impl Series {
    /// Moves the watermark by `delta`. With `fill`, the positions whose
    /// validity changed are overwritten: `[old-1, old-1+delta)` for a forward
    /// move, `[old-1+delta, old-1)` for a backward one. Without it, values are
    /// left untouched. The watermark never drops below 1.
    pub fn period(mut self, delta: isize, fill: Option<f64>) -> Series {
        if delta == 0 {
            return self;
        }
        let old = self.watermark - 1;
        let step = delta.unsigned_abs();
        if let Some(value) = fill {
            let (lo, hi) = if delta > 0 {
                (old, old + step)
            } else {
                (old.saturating_sub(step), old)
            };
            let len = self.values.len();
            for v in &mut self.values[lo.min(len)..hi.min(len)] {
                *v = value;
            }
        }
        self.watermark = if delta > 0 {
            self.watermark + step
        } else {
            self.watermark.saturating_sub(step).max(1)
        };
        self
    }

    /// Writes `value` at `watermark - 1 + offset`, if that position exists.
    pub fn set_from_watermark(&mut self, offset: isize, value: f64) {
        let pos = self.min_index() as isize + offset;
        if pos >= 0 {
            if let Some(slot) = self.values.get_mut(pos as usize) {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;
