//! True range and the averages built on it (Wilder, 1978).
//!
//! `atr` extends `truerange` and renames its output, so the range computed by
//! the parent body is visible to the `atr` body under either name before it is
//! replaced by the average. `natr` repeats the trick one level further down.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

use crate::{smooth, sub_indicator};

fn truerange_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let lookback = ctx.param_usize("lookback")?;
    let close1 = ctx.input("close")?.shift(lookback);
    let truehigh = close1.max_with(ctx.input("high")?);
    let truelow = close1.min_with(ctx.input("low")?);
    ctx.set_output("tr", truehigh - truelow)
}

fn atr_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let ma = sub_indicator(ctx, "ma")?;
    let tr = ctx.output("tr")?.clone();
    let out = smooth(ctx, &ma, &tr, period)?;
    ctx.set_output("atr", out)
}

fn natr_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let out = ctx.output("atr")? * 100.0 / ctx.input("close")?;
    ctx.set_output("natr", out)
}

/// `max(high, close(-lookback)) - min(low, close(-lookback))`.
pub fn truerange() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("truerange")
        .doc("Daily range extended to the previous close")
        .alias(["TR", "TrueRange", "trange", "TRANGE"])
        .group(["volatility"])
        .inputs(["high", "low", "close"])
        .outputs(["tr"])
        .param("lookback", 1, "Lookback of the close compared with high and low")
        .body(truerange_body)
        .build()
}

/// Average of the true range, Wilder's smoothing by default.
pub fn atr(
    truerange: &Arc<IndicatorDef>,
    smma: &Arc<IndicatorDef>,
) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("atr")
        .extends(truerange)
        .doc("Moving average of the true range")
        .alias(["ATR", "AverageTrueRange"])
        .outputs(["atr"])
        .param("period", 14, "Period to consider")
        .param("ma", smma, "Moving average to use")
        .body(atr_body)
        .build()
}

/// `100 * atr / close`.
pub fn natr(atr: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("natr")
        .extends(atr)
        .doc("Average true range normalized by the close")
        .alias(["NATR", "NormalizedAverageTrueRange"])
        .outputs(["natr"])
        .body(natr_body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{kwargs, Series};

    fn hlc() -> [Series; 3] {
        [
            Series::from_values("high", &[10.0, 11.0, 12.0, 14.0, 13.0]),
            Series::from_values("low", &[8.0, 9.0, 10.0, 9.0, 11.0]),
            Series::from_values("close", &[9.0, 10.0, 11.0, 13.0, 12.0]),
        ]
    }

    fn defs() -> (Arc<IndicatorDef>, Arc<IndicatorDef>, Arc<IndicatorDef>) {
        let tr = truerange().unwrap();
        let atr = atr(&tr, &crate::smma::smma().unwrap()).unwrap();
        let natr = natr(&atr).unwrap();
        (tr, atr, natr)
    }

    #[test]
    fn true_range_uses_previous_close() {
        let (tr, _, _) = defs();
        let out = tr.call(&hlc(), kwargs! {}).unwrap();
        assert_eq!(out.watermark(), 2);
        assert_eq!(out["tr"].valid(), &[2.0, 2.0, 5.0, 2.0]);
    }

    #[test]
    fn atr_smooths_the_range_and_keeps_the_old_name() {
        let (_, atr, _) = defs();
        let out = atr.call(&hlc(), kwargs! { "period" => 2 }).unwrap();
        assert_eq!(out.outputs().names(), &["atr".to_string()]);
        assert_eq!(out.watermark(), 3);
        assert_approx(out["atr"][2], 2.0, DEFAULT_EPSILON);
        assert_approx(out["atr"][3], 3.5, DEFAULT_EPSILON);
        assert_approx(out["atr"][4], 2.75, DEFAULT_EPSILON);
        assert_approx(out["tr"][4], 2.75, DEFAULT_EPSILON);
        assert_eq!(out["atr"].name(), "atr");
    }

    #[test]
    fn natr_normalizes_by_close() {
        let (_, _, natr) = defs();
        let out = natr.call(&hlc(), kwargs! { "period" => 2 }).unwrap();
        assert_approx(out["natr"][2], 200.0 / 11.0, DEFAULT_EPSILON);
        assert_approx(out["natr"][3], 350.0 / 13.0, DEFAULT_EPSILON);
        assert_approx(out["tr"][4], 275.0 / 12.0, DEFAULT_EPSILON);
        assert!(natr.derives_from("truerange") && natr.derives_from("atr"));
        assert_eq!(natr.groups(), &["volatility".to_string()]);
    }
}
