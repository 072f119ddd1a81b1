//! Stochastic oscillator (Lane).
//!
//! ```text
//! kfast = 100 * (close - lowest(low, period)) / (highest(high, period) - lowest(low, period))
//! dfast = ma(kfast, pfast)
//! ```
//!
//! The slow version promotes `dfast` to `k` and smooths it again with
//! `maslow` over `pslow`.

use std::sync::Arc;

use talines_core::{kwargs, Context, IndicatorDef, IndicatorError, Kwargs, SchemaError};

use crate::{smooth, sub_indicator};

fn stochf_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let pfast = ctx.param_usize("pfast")?;
    let ma = sub_indicator(ctx, "ma")?;
    let highest = crate::indicator("highest")?;
    let lowest = crate::indicator("lowest")?;

    let hh = ctx.call_primary(&highest, [ctx.input("high")?], kwargs! { "period" => period })?;
    let ll = ctx.call_primary(&lowest, [ctx.input("low")?], kwargs! { "period" => period })?;
    let k = (ctx.input("close")? - &ll) * 100.0 / (&hh - &ll);
    let d = smooth(ctx, &ma, &k, pfast)?;
    ctx.set_output("k", k)?;
    ctx.set_output("d", d)
}

/// The reference library defaults to a 5 sample window.
fn stochf_compat(kwargs: &mut Kwargs) {
    kwargs.entry("period".to_string()).or_insert(5.into());
}

fn stochastic_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let pslow = ctx.param_usize("pslow")?;
    let maslow = match ctx.param_indicator("maslow")? {
        Some(def) => def,
        None => sub_indicator(ctx, "ma")?,
    };
    let k = ctx.output("d")?.clone();
    let d = smooth(ctx, &maslow, &k, pslow)?;
    ctx.set_output("k", k)?;
    ctx.set_output("d", d)
}

pub fn stochf(sma: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("stochf")
        .doc("Position of the close within the recent high-low range")
        .alias(["stochfast", "StochasticFast", "STOCHF"])
        .group(["momentum"])
        .inputs(["high", "low", "close"])
        .outputs(["k", "d"])
        .param("period", 14, "Period to consider")
        .param("pfast", 3, "Fast smoothing period")
        .param("ma", sma, "Moving average to use")
        .body(stochf_body)
        .compat_class(stochf_compat)
        .build()
}

pub fn stochastic(stochf: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("stochastic")
        .extends(stochf)
        .doc("Slow stochastic: the fast one smoothed once more")
        .alias(["stoch", "Stochastic", "STOCH"])
        .param("pslow", 3, "Slow moving average period")
        .param("maslow", None::<Arc<IndicatorDef>>, "Slow moving average, `ma` when unset")
        .body(stochastic_body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, ohlcv, DEFAULT_EPSILON};
    use talines_core::{ParamValue, Series};

    fn hlc() -> [Series; 3] {
        [
            Series::from_values("high", &[5.0, 6.0, 7.0, 6.0, 8.0]),
            Series::from_values("low", &[1.0, 2.0, 3.0, 2.0, 4.0]),
            Series::from_values("close", &[3.0, 5.0, 6.0, 3.0, 7.0]),
        ]
    }

    fn defs() -> (Arc<IndicatorDef>, Arc<IndicatorDef>) {
        let fast = stochf(&crate::sma::sma().unwrap()).unwrap();
        let slow = stochastic(&fast).unwrap();
        (fast, slow)
    }

    #[test]
    fn fast_lines() {
        let (fast, _) = defs();
        let out = fast.call(&hlc(), kwargs! { "period" => 3, "pfast" => 2 }).unwrap();
        assert_eq!(out.watermarks(), vec![("k".to_string(), 3), ("d".to_string(), 4)]);
        assert_approx(out["k"][2], 500.0 / 6.0, 1e-9);
        assert_approx(out["k"][3], 20.0, 1e-9);
        assert_approx(out["d"][3], (500.0 / 6.0 + 20.0) / 2.0, 1e-9);
    }

    #[test]
    fn slow_promotes_d_to_k() {
        let (fast, slow) = defs();
        let kw = kwargs! { "period" => 3, "pfast" => 2, "pslow" => 2 };
        let f = fast.call(&hlc(), kw.clone()).unwrap();
        let s = slow.call(&hlc(), kw).unwrap();
        assert_eq!(s["k"].valid(), f["d"].valid());
        assert_eq!(s["d"].watermark(), 5);
        assert_approx(s["d"][4], (f["d"][3] + f["d"][4]) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn compat_defaults_period_to_five() {
        let (_, slow) = defs();
        let [_, high, low, close, _] = ohlcv(30);
        let out = slow.call_compat([&high, &low, &close], kwargs! {}, true).unwrap();
        assert_eq!(out.params().get("period"), Some(&ParamValue::Int(5)));
        assert_eq!(out["k"].watermark(), 5 + 2);

        let explicit = slow
            .call_compat([&high, &low, &close], kwargs! { "period" => 9 }, true)
            .unwrap();
        assert_eq!(explicit.params().get("period"), Some(&ParamValue::Int(9)));
    }
}
