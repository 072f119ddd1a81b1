//! Wilder's smoothed accumulation.
//!
//! Seeded with the sum of the first `period` samples, then
//! `acc = acc(-1) - acc(-1) / period + x`. Not an average: the level is about
//! `period` times the input.

use std::sync::Arc;

use talines_core::{Context, Decay, IndicatorDef, IndicatorError, Kwargs, SchemaError, Seed};

fn body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?.max(1);
    let pearly = ctx.param_bool("pearly")?;
    let seed = ctx.param_seed("seed")?;
    let beta = (period - 1) as f64 / period as f64;
    let out = ctx
        .input_at(0)?
        .ewm(Decay::Span(period))
        .pearly(pearly)
        .seed(seed)
        .lfilter(1.0, beta);
    ctx.set_output("smacc", out)
}

/// The reference library seeds one sample early.
fn compat(kwargs: &mut Kwargs) {
    kwargs.entry("pearly".to_string()).or_insert(true.into());
}

pub fn smacc() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("smacc")
        .doc("Smoothed accumulation as defined by Wilder")
        .alias(["SmoothedAccumulation", "WildersSmoothedAccumulation"])
        .group(["overlap"])
        .outputs(["smacc"])
        .param("period", 14, "Period to consider")
        .param("pearly", false, "Seed one sample early")
        .param("seed", Seed::Sum, "Seed strategy for the first value")
        .body(body)
        .compat_class(compat)
        .build()
}
