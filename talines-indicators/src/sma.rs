//! Simple moving average.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let out = ctx.input_at(0)?.rolling(period).mean();
    ctx.set_output("sma", out)
}

/// Non-weighted mean of the last `period` samples.
pub fn sma() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("sma")
        .doc("Non-weighted average of the last `period` samples")
        .alias(["SMA", "SimpleMovingAverage"])
        .group(["overlap"])
        .outputs(["sma"])
        .param("period", 30, "Period for the moving average calculation")
        .body(body)
        .build()
}
