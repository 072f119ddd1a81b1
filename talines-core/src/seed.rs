//! Seeded recursive smoothing.
//!
//! Recursive filters need a starting value. `Ewm` picks an anchor position
//! from the operand's watermark and the smoothing window, computes a seed
//! there according to a `Seed` strategy, and runs the recursion forward:
//!
//! ```text
//! anchor = (wm - 1) + (poffset or window) - 1 - pearly     (0-based)
//! mean():          y[i] = (1 - alpha) * y[i-1] + alpha * x[i]
//! lfilter(a, b):   y[i] = b * y[i-1] + a * x[i]
//! dynamic mean():  y[i] = y[i-1] + alpha[i] * (x[i] - y[i-1])
//! ```
//!
//! The result watermark is `anchor + 1`, so a smoothing of a smoothing starts
//! where the first one became valid. `poffset` delays the anchor to line up
//! two smoothings of different windows; `pearly` starts one sample earlier to
//! reproduce a well-known legacy warm-up. Neither changes the recursion.

use serde::{Deserialize, Serialize};

use crate::series::{Series, UNDEFINED};

/// How the first value of a recursive smoothing is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seed {
    /// Mean of the window ending at the anchor.
    #[default]
    Average,
    /// Raw sample at the anchor.
    Last,
    /// Sum of the window ending at the anchor.
    Sum,
    /// Zero at the anchor.
    Zero,
    /// Zero at the anchor and everywhere before it. The result has no
    /// undefined prefix.
    ZeroFill,
    /// No seed computation; the recursion starts from the raw sample.
    None,
}

/// Smoothing factor.
#[derive(Debug, Clone)]
pub enum Decay {
    /// Fixed alpha with an explicit warm-up window.
    Alpha { alpha: f64, window: usize },
    /// `alpha = 2 / (span + 1)`, window = span.
    Span(usize),
    /// Center of mass: `alpha = 1 / (com + 1)`, window = com + 1.
    Com(f64),
    /// Per-sample alpha. The window may be 0.
    Dynamic { alpha: Series, window: usize },
}

impl Decay {
    pub fn window(&self) -> usize {
        match self {
            Decay::Alpha { window, .. } | Decay::Dynamic { window, .. } => *window,
            Decay::Span(span) => *span,
            Decay::Com(com) => (com + 1.0).round().max(0.0) as usize,
        }
    }

    /// Fixed alpha, `None` for the dynamic variant.
    pub fn alpha(&self) -> Option<f64> {
        match self {
            Decay::Alpha { alpha, .. } => Some(*alpha),
            Decay::Span(span) => Some(2.0 / (*span as f64 + 1.0)),
            Decay::Com(com) => Some(1.0 / (com + 1.0)),
            Decay::Dynamic { .. } => None,
        }
    }
}

/// Builder for a seeded smoothing over one series.
#[derive(Debug, Clone)]
pub struct Ewm<'a> {
    series: &'a Series,
    decay: Decay,
    seed: Seed,
    poffset: usize,
    pearly: bool,
}

impl Series {
    pub fn ewm(&self, decay: Decay) -> Ewm<'_> {
        Ewm {
            series: self,
            decay,
            seed: Seed::Average,
            poffset: 0,
            pearly: false,
        }
    }
}

impl<'a> Ewm<'a> {
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Anchor offset from the watermark; 0 means "use the window".
    pub fn poffset(mut self, poffset: usize) -> Self {
        self.poffset = poffset;
        self
    }

    pub fn pearly(mut self, pearly: bool) -> Self {
        self.pearly = pearly;
        self
    }

    /// 0-based seed position.
    pub fn anchor(&self) -> usize {
        let offset = if self.poffset > 0 {
            self.poffset
        } else {
            self.decay.window()
        };
        let anchor = (self.series.min_index() + offset).saturating_sub(1 + usize::from(self.pearly));
        match &self.decay {
            // alpha must be defined one step after the anchor
            Decay::Dynamic { alpha, .. } => anchor.max(alpha.watermark().saturating_sub(2)),
            _ => anchor,
        }
    }

    /// Reduces the window ending at `anchor`. Only defined samples take part:
    /// with `pearly` the window reaches one sample into the undefined prefix.
    /// A window that would start before the first sample (`poffset` smaller
    /// than the window) is cut at 0. An empty `Sum` is 0, an empty `Average`
    /// is undefined.
    fn seed_value(&self, anchor: usize) -> f64 {
        let x = self.series.values();
        let window = self.decay.window().max(1);
        let from = (anchor + 1).saturating_sub(window);
        let defined = x[from..=anchor].iter().copied().filter(|v| !v.is_nan());
        match self.seed {
            Seed::Average => {
                let (sum, n) = defined.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if n == 0 {
                    UNDEFINED
                } else {
                    sum / n as f64
                }
            }
            Seed::Sum => defined.sum(),
            Seed::Last | Seed::None => x[anchor],
            Seed::Zero | Seed::ZeroFill => 0.0,
        }
    }

    /// Runs `step(prev, i)` from the anchor on. `emit_seed` controls whether
    /// the seed itself is part of the output.
    fn run(self, emit_seed: bool, step: impl Fn(f64, usize) -> f64) -> Series {
        let len = self.series.len();
        let anchor = self.anchor();
        let mut values = vec![UNDEFINED; len];
        if anchor < len {
            let mut prev = self.seed_value(anchor);
            if emit_seed {
                values[anchor] = prev;
            }
            for (i, slot) in values.iter_mut().enumerate().skip(anchor + 1) {
                prev = step(prev, i);
                *slot = prev;
            }
        }
        let mut watermark = if emit_seed { anchor + 1 } else { anchor + 2 };
        if self.seed == Seed::ZeroFill {
            for v in values.iter_mut().take(anchor + 1) {
                *v = 0.0;
            }
            watermark = 1;
        }
        Series::from_parts(self.series.name().to_string(), values, watermark)
    }

    /// Exponential mean with the configured decay.
    pub fn mean(self) -> Series {
        let x = self.series.values();
        match self.decay.alpha() {
            Some(alpha) => self.run(true, |prev, i| (1.0 - alpha) * prev + alpha * x[i]),
            None => {
                let alphas = match &self.decay {
                    Decay::Dynamic { alpha, .. } => alpha.values().to_vec(),
                    _ => Vec::new(),
                };
                self.run(false, |prev, i| {
                    let a = alphas.get(i).copied().unwrap_or(UNDEFINED);
                    prev + a * (x[i] - prev)
                })
            }
        }
    }

    /// Linear recursive filter `y = beta * y_prev + alpha * x`. The decay
    /// only contributes its window.
    pub fn lfilter(self, alpha: f64, beta: f64) -> Series {
        let x = self.series.values();
        self.run(true, |prev, i| beta * prev + alpha * x[i])
    }
}
