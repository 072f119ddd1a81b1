//! Exponential moving average.
//!
//! `alpha = 2 / (period + 1)`, seeded by default with the mean of the first
//! `period` samples. An optional `poffset` keyword delays the first value to
//! position `poffset` (counted like `period`) so two averages of different
//! periods can start together.

use std::sync::Arc;

use talines_core::{Context, Decay, IndicatorDef, IndicatorError, SchemaError, Seed};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let seed = ctx.param_seed("seed")?;
    let poffset = ctx.extra_usize("poffset")?.unwrap_or(0);
    let out = ctx
        .input_at(0)?
        .ewm(Decay::Span(period))
        .seed(seed)
        .poffset(poffset)
        .mean();
    ctx.set_output("ema", out)
}

pub fn ema() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("ema")
        .doc("Moving average smoothing data exponentially with alpha = 2 / (period + 1)")
        .alias(["EMA", "ExponentialMovingAverage"])
        .group(["overlap"])
        .outputs(["ema"])
        .param("period", 30, "Period for the moving average calculation")
        .param("seed", Seed::Average, "Seed strategy for the first value")
        .body(body)
        .build()
}
