//! Rolling extremes and sums.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError};

fn highest_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let out = ctx.input_at(0)?.rolling(period).max();
    ctx.set_output("highest", out)
}

fn lowest_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let out = ctx.input_at(0)?.rolling(period).min();
    ctx.set_output("lowest", out)
}

fn sumn_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let out = ctx.input_at(0)?.rolling(period).sum();
    ctx.set_output("sum", out)
}

/// Rolling maximum over `period`.
pub fn highest() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("highest")
        .doc("Rolling maximum over `period` samples")
        .alias(["max", "maxn", "MAX"])
        .group(["mathop"])
        .outputs(["highest"])
        .param("period", 30, "Period to consider")
        .body(highest_body)
        .build()
}

/// Rolling minimum over `period`.
pub fn lowest() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("lowest")
        .doc("Rolling minimum over `period` samples")
        .alias(["min", "minn", "MIN"])
        .group(["mathop"])
        .outputs(["lowest"])
        .param("period", 30, "Period to consider")
        .body(lowest_body)
        .build()
}

pub fn sumn() -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("sumn")
        .doc("Rolling sum over `period` samples")
        .alias(["sum", "SUM"])
        .group(["mathop"])
        .outputs(["sum"])
        .param("period", 30, "Period to consider")
        .body(sumn_body)
        .build()
}
