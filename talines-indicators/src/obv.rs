//! On-balance volume (Granville).
//!
//! Volume is added on up closes, subtracted on down closes and ignored on
//! flat ones, then accumulated.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let lookback = ctx.param_usize("lookback")?;
    let mut close1 = ctx.input("close")?.diff(lookback);
    if ctx.compat_active() {
        // the first sample counts as an up close
        close1 = close1.period(-1, Some(1.0));
    }
    let out = (ctx.input("volume")? * close1.sign()).cumsum();
    ctx.set_output("obv", out)
}

pub fn obv() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("obv")
        .doc("Cumulative volume signed by the direction of the close")
        .alias(["OBV", "OnBalanceVolume"])
        .group(["volume"])
        .inputs(["close", "volume"])
        .outputs(["obv"])
        .param("lookback", 1, "Lookback for the close comparison")
        .body(body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use talines_core::{kwargs, Series};

    fn cv() -> [Series; 2] {
        [
            Series::from_values("close", &[10.0, 11.0, 10.0, 10.0, 12.0]),
            Series::from_values("volume", &[100.0, 200.0, 300.0, 400.0, 500.0]),
        ]
    }

    #[test]
    fn signed_accumulation() {
        let out = obv().unwrap().call_compat(&cv(), kwargs! {}, false).unwrap();
        assert_eq!(out.watermark(), 2);
        assert_eq!(out["obv"].valid(), &[200.0, -100.0, -100.0, 400.0]);
    }

    #[test]
    fn compat_counts_the_first_volume() {
        let out = obv().unwrap().call_compat(&cv(), kwargs! {}, true).unwrap();
        assert_eq!(out.watermark(), 1);
        assert_eq!(out["obv"].values(), &[100.0, 300.0, 0.0, 0.0, 500.0]);
    }
}
