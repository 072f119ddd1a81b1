//! Weighted moving average.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

/// Linear weights `1..=period`, newest heaviest, normalized to sum to one.
fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?.max(1);
    let coef = 2.0 / (period * (period + 1)) as f64;
    let out = ctx.input_at(0)?.rolling(period).apply(|w| {
        coef * w
            .iter()
            .enumerate()
            .map(|(i, v)| (i + 1) as f64 * v)
            .sum::<f64>()
    });
    ctx.set_output("wma", out)
}

pub fn wma() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("wma")
        .doc("Moving average with arithmetic weights, the newest sample weighing most")
        .alias(["WMA", "WeightedMovingAverage"])
        .group(["overlap"])
        .outputs(["wma"])
        .param("period", 30, "Period for the moving average calculation")
        .body(body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};
    use talines_core::{kwargs, Series};

    #[test]
    fn newest_sample_weighs_most() {
        let x = Series::from_values("close", &[1.0, 2.0, 3.0, 6.0]);
        let out = wma().unwrap().call([&x], kwargs! { "period" => 3 }).unwrap();
        let w = &out["wma"];
        assert_eq!(w.watermark(), 3);
        // (1 + 4 + 9) / 6, then (2 + 6 + 18) / 6
        assert_approx(w[2], 14.0 / 6.0, DEFAULT_EPSILON);
        assert_approx(w[3], 26.0 / 6.0, DEFAULT_EPSILON);
    }
}
