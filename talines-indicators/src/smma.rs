//! Wilder's smoothed moving average: `alpha = 1 / period`.

use std::sync::Arc;

use talines_core::{Context, Decay, IndicatorDef, IndicatorError, SchemaError, Seed};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?.max(1);
    let seed = ctx.param_seed("seed")?;
    let out = ctx
        .input_at(0)?
        .ewm(Decay::Com(period as f64 - 1.0))
        .seed(seed)
        .mean();
    ctx.set_output("smma", out)
}

pub fn smma() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("smma")
        .doc("Smoothed moving average as defined by Wilder")
        .alias(["SMMA", "SmoothedMovingAverage", "MMA", "ModifiedMovingAverage"])
        .group(["overlap"])
        .outputs(["smma"])
        .param("period", 30, "Period for the moving average calculation")
        .param("seed", Seed::Average, "Seed strategy for the first value")
        .body(body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{kwargs, Series};

    #[test]
    fn wilder_recursion() {
        let x = Series::from_values("close", &[2.0, 4.0, 6.0, 8.0, 10.0]);
        let out = smma().unwrap().call([&x], kwargs! { "period" => 2 }).unwrap();
        let s = &out["smma"];
        assert_eq!(s.watermark(), 2);
        assert_approx(s[1], 3.0, DEFAULT_EPSILON);
        // y = y_prev + (x - y_prev) / 2
        assert_approx(s[2], 4.5, DEFAULT_EPSILON);
        assert_approx(s[3], 6.25, DEFAULT_EPSILON);
    }
}
