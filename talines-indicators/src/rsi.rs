//! Relative strength index (Wilder, 1978).

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

use crate::{smooth, sub_indicator};

/// `100 * ma(up) / (ma(up) + ma(down))` over `lookback` differences.
fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let lookback = ctx.param_usize("lookback")?;
    let ma = sub_indicator(ctx, "ma")?;
    let delta = ctx.input_at(0)?.diff(lookback);
    let upday = delta.clip(Some(0.0), None);
    let downday = delta.clip(None, Some(0.0)).abs();

    let maup = smooth(ctx, &ma, &upday, period)?;
    let madown = smooth(ctx, &ma, &downday, period)?;
    let out = &maup * 100.0 / (&maup + &madown);
    ctx.set_output("rsi", out)
}

pub fn rsi(smma: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("rsi")
        .doc("Ratio of smoothed gains to smoothed absolute moves, scaled to 0-100")
        .alias(["RSI", "RelativeStrengthIndex"])
        .group(["momentum"])
        .outputs(["rsi"])
        .param("period", 14, "Period to consider")
        .param("lookback", 1, "Lookback for up and down days")
        .param("ma", smma, "Smoothing moving average")
        .body(body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{kwargs, Series};

    fn def() -> Arc<IndicatorDef> {
        rsi(&crate::smma::smma().unwrap()).unwrap()
    }

    #[test]
    fn gains_against_losses() {
        let x = Series::from_values("close", &[1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
        let out = def().call([&x], kwargs! { "period" => 2 }).unwrap();
        let r = &out["rsi"];
        assert_eq!(r.watermark(), 3);
        assert_approx(r[2], 100.0, DEFAULT_EPSILON);
        assert_approx(r[3], 50.0, DEFAULT_EPSILON);
        assert_approx(r[4], 75.0, DEFAULT_EPSILON);
        assert_approx(r[5], 87.5, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_input_is_undefined() {
        let x = Series::new("close", vec![5.0; 10]);
        let out = def().call([&x], kwargs! { "period" => 3 }).unwrap();
        assert!(out["rsi"].valid().iter().all(|v| v.is_nan()));
    }
}
