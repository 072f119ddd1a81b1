//! Kaufman's adaptive moving average.
//!
//! ```text
//! er = |x - x(-period)| / sum(|x - x(-pvol)|, period)
//! sc = (er * (2/(fast+1) - 2/(slow+1)) + 2/(slow+1))^2
//! kama = kama(-1) + sc * (x - kama(-1))
//! ```
//!
//! The smoothing constant becomes defined one sample after the seed window,
//! so the seed itself is never emitted.

use std::sync::Arc;

use talines_core::{Context, Decay, IndicatorDef, IndicatorError, Kwargs, SchemaError, Seed};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let fast = ctx.param_f64("fast")?;
    let slow = ctx.param_f64("slow")?;
    let pvol = ctx.param_usize("pvol")?;
    let seed = ctx.param_seed("seed")?;
    let x = ctx.input_at(0)?;

    let direction = x.diff(period);
    let volatility = x.diff(pvol).abs().rolling(period).sum();
    let effratio = (&direction / &volatility).abs();
    let scfast = 2.0 / (fast + 1.0);
    let scslow = 2.0 / (slow + 1.0);
    let sc = (effratio * (scfast - scslow) + scslow).pow(2.0);

    let out = x
        .ewm(Decay::Dynamic {
            alpha: sc,
            window: period,
        })
        .seed(seed)
        .mean();
    ctx.set_output("kama", out)
}

/// The reference library seeds with the previous sample.
fn compat(kwargs: &mut Kwargs) {
    kwargs.entry("seed".to_string()).or_insert(Seed::Last.into());
}

pub fn kama() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("kama")
        .doc("Moving average whose smoothing factor follows market efficiency")
        .alias(["KAMA", "KaufmanAdaptiveMovingAverage"])
        .group(["overlap"])
        .outputs(["kama"])
        .param("period", 30, "Period to consider")
        .param("fast", 2, "Fast exponential smoothing period")
        .param("slow", 30, "Slow exponential smoothing period")
        .param("seed", Seed::Average, "Seed strategy for the first value")
        .param("pvol", 1, "Lookback for the volatility calculation")
        .body(body)
        .compat_class(compat)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{kwargs, ParamValue, Series};

    fn trend() -> Series {
        Series::new("close", (0..12).map(|i| 10.0 + i as f64).collect())
    }

    #[test]
    fn first_value_after_period() {
        let out = kama().unwrap().call([trend()], kwargs! { "period" => 4 }).unwrap();
        assert_eq!(out.watermark(), 5);
        assert!(out["kama"][3].is_nan());
    }

    #[test]
    fn straight_trend_uses_fast_constant() {
        // er = 1 on a straight line, so sc = (2 / 3)^2 with fast = 2
        let sc = (2.0_f64 / 3.0).powi(2);
        let out = kama().unwrap().call([trend()], kwargs! { "period" => 4 }).unwrap();
        let seed = (10.0 + 11.0 + 12.0 + 13.0) / 4.0;
        let expected = seed + sc * (14.0 - seed);
        assert_approx(out["kama"][4], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn compat_seeds_with_last_sample() {
        let sc = (2.0_f64 / 3.0).powi(2);
        let out = kama()
            .unwrap()
            .call_compat([trend()], kwargs! { "period" => 4 }, true)
            .unwrap();
        assert_approx(out["kama"][4], 13.0 + sc * (14.0 - 13.0), DEFAULT_EPSILON);
        assert_eq!(out.params().get("seed"), Some(&ParamValue::Seed(Seed::Last)));
    }
}
