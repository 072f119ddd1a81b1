//! Directional Movement System (Wilder, 1978).
//!
//! ```text
//! upmove   = high - high(-lookback)
//! downmove = low(-lookback) - low
//! +dm = smooth(upmove   if upmove > downmove and upmove > 0 else 0)
//! -dm = smooth(downmove if downmove > upmove and downmove > 0 else 0)
//! +di = 100 * +dm / smooth(truerange)
//! -di = 100 * -dm / smooth(truerange)
//! dx  = 100 * |+di - -di| / (+di + -di)
//! adx = ma(dx)
//! adxr = (adx + adx(-period)) / 2
//! ```
//!
//! `smooth` is the `accum` indicator (Wilder's accumulation) unless `alt` is
//! set, in which case the `ma` average is used.
//!
//! Two base fragments carry the shared work: `_dm` leaves the smoothed
//! movements in the stash, `_di` adds `close` to the inputs and turns them
//! into indicators. The concrete definitions only pick what to publish.

use std::sync::Arc;

use talines_core::{kwargs, Context, IndicatorDef, IndicatorError, Kwargs, SchemaError, Series};

use crate::{smooth, sub_indicator};

/// Smoother selected by the `alt` flag.
fn smoothing(ctx: &Context<'_>, series: &Series) -> Result<Series, IndicatorError> {
    let period = ctx.param_usize("period")?;
    if ctx.param_bool("alt")? {
        let ma = sub_indicator(ctx, "ma")?;
        return smooth(ctx, &ma, series, period);
    }
    let accum = sub_indicator(ctx, "accum")?;
    let pearly = ctx.param_bool("pearly")?;
    ctx.call_primary(&accum, [series], kwargs! { "period" => period, "pearly" => pearly })
}

// ─── Base fragments ──────────────────────────────────────────────────

fn dm_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let lookback = ctx.param_usize("lookback")?;
    let high = ctx.input("high")?;
    let low = ctx.input("low")?;

    let upmove = high.diff(lookback);
    let downmove = low.shift(lookback) - low;
    let pdm = upmove.max_with(0.0) * upmove.gt(&downmove);
    let mdm = downmove.max_with(0.0) * downmove.gt(&upmove);

    let pdm = smoothing(ctx, &pdm)?;
    let mdm = smoothing(ctx, &mdm)?;
    ctx.stash("pdm", pdm);
    ctx.stash("mdm", mdm);
    Ok(())
}

/// The reference library seeds the accumulation one sample early.
fn dm_compat(kwargs: &mut Kwargs) {
    kwargs.entry("pearly".to_string()).or_insert(true.into());
}

fn di_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let lookback = ctx.param_usize("lookback")?;
    let truerange = crate::indicator("truerange")?;
    let tr = ctx.call_primary(
        &truerange,
        [ctx.input("high")?, ctx.input("low")?, ctx.input("close")?],
        kwargs! { "lookback" => lookback },
    )?;
    let mut trp = smoothing(ctx, &tr)?;
    if ctx.compat_active() {
        // early seed for the movements, regular start for the indicators
        trp = trp.period(1, None);
    }

    let pdi = ctx.stashed("pdm")? * 100.0 / &trp;
    let mdi = ctx.stashed("mdm")? * 100.0 / &trp;
    ctx.stash("pdi", pdi);
    ctx.stash("mdi", mdi);
    Ok(())
}

pub fn dm_base(
    smacc: &Arc<IndicatorDef>,
    smma: &Arc<IndicatorDef>,
) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("_dm")
        .doc("Directional movement")
        .group(["momentum"])
        .inputs(["high", "low"])
        .param("period", 14, "Period to consider")
        .param("lookback", 1, "Lookback for the upmove and downmove calculations")
        .param("pearly", false, "Seed the accumulation one sample early")
        .param("alt", false, "Smooth with `ma` instead of `accum`")
        .param("accum", smacc, "Accumulation to use unless `alt`")
        .param("ma", smma, "Moving average to use with `alt`")
        .body(dm_body)
        .compat_class(dm_compat)
        .build()
}

pub fn di_base(dm_base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("_di")
        .extends(dm_base)
        .doc("Directional indicator")
        .inputs_extend(["close"])
        .body(di_body)
        .build()
}

// ─── Published definitions ───────────────────────────────────────────

fn publish(ctx: &mut Context<'_>, stashed: &str, output: &str) -> Result<(), IndicatorError> {
    let series = ctx.stashed(stashed)?.clone();
    ctx.set_output(output, series)
}

fn plus_dm_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "pdm", "plusdm")
}

fn minus_dm_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "mdm", "minusdm")
}

fn dm_pair_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "pdm", "plusdm")?;
    publish(ctx, "mdm", "minusdm")
}

fn plus_di_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "pdi", "plusdi")
}

fn minus_di_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "mdi", "minusdi")
}

fn di_pair_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    publish(ctx, "pdi", "plusdi")?;
    publish(ctx, "mdi", "minusdi")
}

fn dx_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let pdi = ctx.stashed("pdi")?;
    let mdi = ctx.stashed("mdi")?;
    let out = (pdi - mdi).abs() * 100.0 / (pdi + mdi);
    ctx.set_output("dx", out)
}

fn adx_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let period = ctx.param_usize("period")?;
    let ma = sub_indicator(ctx, "ma")?;
    let dx = ctx.output("dx")?.clone();
    let out = smooth(ctx, &ma, &dx, period)?;
    ctx.set_output("adx", out)
}

fn adxr_body(ctx: &mut Context<'_>) -> Result<(), IndicatorError> {
    let rating = match ctx.param("prating")?.as_usize() {
        Some(p) => p,
        None => ctx.param_usize("period")?,
    };
    // the reference library compares against one sample less
    let rating = rating.saturating_sub(usize::from(ctx.compat_active()));
    let adx = ctx.output("adx")?;
    let out = (adx + &adx.shift(rating)) / 2.0;
    ctx.set_output("adxr", out)
}

pub fn plus_dm(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("plus_dm")
        .extends(base)
        .doc("Smoothed positive directional movement")
        .alias(["PLUS_DM", "PlusDirectionalMovement"])
        .outputs(["plusdm"])
        .body(plus_dm_body)
        .build()
}

pub fn minus_dm(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("minus_dm")
        .extends(base)
        .doc("Smoothed negative directional movement")
        .alias(["MINUS_DM", "MinusDirectionalMovement"])
        .outputs(["minusdm"])
        .body(minus_dm_body)
        .build()
}

pub fn dm(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("dm")
        .extends(base)
        .doc("Smoothed positive and negative directional movement")
        .alias(["DM", "DirectionalMovement"])
        .outputs(["plusdm", "minusdm"])
        .body(dm_pair_body)
        .build()
}

pub fn plus_di(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("plus_di")
        .extends(base)
        .doc("Positive directional indicator")
        .alias(["PLUS_DI", "PlusDirectionalIndicator"])
        .outputs(["plusdi"])
        .body(plus_di_body)
        .build()
}

pub fn minus_di(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("minus_di")
        .extends(base)
        .doc("Negative directional indicator")
        .alias(["MINUS_DI", "MinusDirectionalIndicator"])
        .outputs(["minusdi"])
        .body(minus_di_body)
        .build()
}

pub fn di(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("di")
        .extends(base)
        .doc("Positive and negative directional indicators")
        .alias(["DI", "DirectionalIndicator"])
        .outputs(["plusdi", "minusdi"])
        .body(di_pair_body)
        .build()
}

pub fn dx(base: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("dx")
        .extends(base)
        .doc("Directional index")
        .alias(["DX", "DirectionalIndex"])
        .outputs(["dx"])
        .body(dx_body)
        .build()
}

pub fn adx(dx: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("adx")
        .extends(dx)
        .doc("Average directional index")
        .alias(["ADX", "AverageDirectionalIndex"])
        .outputs(["adx"])
        .body(adx_body)
        .build()
}

pub fn adxr(adx: &Arc<IndicatorDef>) -> Result<Arc<IndicatorDef>, SchemaError> {
    IndicatorDef::builder("adxr")
        .extends(adx)
        .doc("Average directional index rating")
        .alias(["ADXR", "AverageDirectionalIndexRating"])
        .outputs(["adxr"])
        .param("prating", None::<i64>, "Rating period, `period` when unset")
        .body(adxr_body)
        .build()
}
