//! Double and triple exponential moving averages (Mulloy, 1994).
//!
//! ```text
//! dema = 2 * ma1 - ma2
//! tema = 3 * ma1 - 3 * ma2 + ma3
//! ```
//!
//! where `ma2` smooths `ma1` and `ma3` smooths `ma2`. The average defaults to
//! `ema` and can be swapped through the `ma` parameter.

use std::sync::Arc;

use talines_core::{Context, IndicatorDef, IndicatorError, SchemaError, Series};

use crate::{smooth, sub_indicator};

/// `depth` successive smoothings of the input.
fn cascade(ctx: &Context<'_>, depth: usize) -> Result<Vec<Series>, IndicatorError> {
    let period = ctx.param_usize("period")?;
    let ma = sub_indicator(ctx, "ma")?;
    let mut stages: Vec<Series> = Vec::with_capacity(depth);
    let mut current = ctx.input_at(0)?.clone();
    for _ in 0..depth {
        current = smooth(ctx, &ma, &current, period)?;
        stages.push(current.clone());
    }
    Ok(stages)
}

fn dema_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let stages = cascade(ctx, 2)?;
    let out = &stages[0] * 2.0 - &stages[1];
    ctx.set_output("dema", out)
}

fn tema_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let stages = cascade(ctx, 3)?;
    let out = &stages[0] * 3.0 - &stages[1] * 3.0 + &stages[2];
    ctx.set_output("tema", out)
}

pub fn dema(ema: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("dema")
        .doc("Double exponential moving average")
        .alias(["DEMA", "DoubleExponentialMovingAverage"])
        .group(["overlap"])
        .outputs(["dema"])
        .param("period", 30, "Period to consider")
        .param("ma", ema, "Moving average to use")
        .body(dema_body)
        .build()
}

pub fn tema(ema: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("tema")
        .doc("Triple exponential moving average")
        .alias(["TEMA", "TripleExponentialMovingAverage"])
        .group(["overlap"])
        .outputs(["tema"])
        .param("period", 30, "Period to consider")
        .param("ma", ema, "Moving average to use")
        .body(tema_body)
        .build()
}
