//! Moving average convergence/divergence (Appel).
//!
//! ```text
//! macd      = ma(x, pfast) - ma(x, pslow)
//! signal    = masig(macd, psignal)
//! histogram = macd - signal
//! ```

use std::sync::Arc;

use talines_core::{kwargs, Context, IndicatorDef, IndicatorError, Kwargs, ParamValue, SchemaError};

use crate::{smooth, sub_indicator};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let pfast = ctx.param_usize("pfast")?;
    let pslow = ctx.param_usize("pslow")?;
    let psignal = ctx.param_usize("psignal")?;
    let ma = sub_indicator(ctx, "ma")?;
    let masig = ctx.param_indicator("masig")?.unwrap_or_else(|| Arc::clone(&ma));
    let x = ctx.input_at(0)?;

    let mut fast_kwargs = kwargs! { "period" => pfast };
    if let Some(poffset) = ctx.var("poffset").and_then(ParamValue::as_usize) {
        fast_kwargs.insert("poffset".to_string(), poffset.into());
    }
    let fast = ctx.call_primary(&ma, [x], fast_kwargs)?;
    let slow = smooth(ctx, &ma, x, pslow)?;

    let macd = fast - slow;
    let signal = smooth(ctx, &masig, &macd, psignal)?;
    let histogram = &macd - &signal;
    ctx.set_output("macd", macd)?;
    ctx.set_output("signal", signal)?;
    ctx.set_output("histogram", histogram)
}

/// The reference library delays the fast average so that it starts together
/// with the slow one.
fn compat(ctx: &mut Context<'_>, kwargs: &mut Kwargs) {
    let pslow = kwargs
        .get("pslow")
        .cloned()
        .or_else(|| ctx.definition().params().default("pslow").cloned());
    if let Some(pslow) = pslow {
        ctx.set_var("poffset", pslow);
    }
}

pub fn macd(ema: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("macd")
        .doc("Distance between a fast and a slow moving average, with a signal line")
        .alias(["MACD", "MovingAverageConvergenceDivergence", "MACDEXT", "MACDFIX"])
        .group(["momentum"])
        .outputs(["macd", "signal", "histogram"])
        .param("pfast", 12, "Fast moving average period")
        .param("pslow", 26, "Slow moving average period")
        .param("psignal", 9, "Signal smoothing period")
        .param("ma", ema, "Moving average to use")
        .param("masig", None::<Arc<IndicatorDef>>, "Signal moving average, `ma` when unset")
        .body(body)
        .compat_instance(compat)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{Decay, Series};

    fn curve() -> Series {
        Series::new("close", (0..60).map(|i| 50.0 + (i as f64 * 0.2).sin() * 4.0).collect())
    }

    fn def() -> Arc<IndicatorDef> {
        macd(&crate::ema::ema().unwrap()).unwrap()
    }

    #[test]
    fn lines_and_watermarks() {
        let x = curve();
        let out = def().call([&x], kwargs! {}).unwrap();
        assert_eq!(out.watermarks(), vec![
            ("macd".to_string(), 26),
            ("signal".to_string(), 34),
            ("histogram".to_string(), 34),
        ]);
        let fast = x.ewm(Decay::Span(12)).mean();
        let slow = x.ewm(Decay::Span(26)).mean();
        assert_approx(out["macd"][30], fast[30] - slow[30], DEFAULT_EPSILON);
        assert_approx(out["histogram"][40], out["macd"][40] - out["signal"][40], DEFAULT_EPSILON);
    }

    #[test]
    fn compat_delays_the_fast_average() {
        let x = curve();
        let out = def().call_compat([&x], kwargs! { "pslow" => 20 }, true).unwrap();
        let fast = x.ewm(Decay::Span(12)).poffset(20).mean();
        let slow = x.ewm(Decay::Span(20)).mean();
        assert_eq!(fast.watermark(), 20);
        assert_approx(out["macd"][19], fast[19] - slow[19], DEFAULT_EPSILON);
        assert_approx(out["macd"][45], fast[45] - slow[45], DEFAULT_EPSILON);

        let plain = def().call_compat([&x], kwargs! { "pslow" => 20 }, false).unwrap();
        assert!((plain["macd"][19] - out["macd"][19]).abs() > 1e-6);
    }

    #[test]
    fn separate_signal_average() {
        let x = curve();
        let sma = crate::sma::sma().unwrap();
        let out = def().call([&x], kwargs! { "masig" => &sma, "psignal" => 4 }).unwrap();
        let expected = out["macd"].rolling(4).mean();
        assert_eq!(out["signal"].watermark(), 29);
        assert_approx(out["signal"][50], expected[50], DEFAULT_EPSILON);
    }
}
