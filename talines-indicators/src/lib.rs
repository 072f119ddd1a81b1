//! Technical indicators written against `talines-core`.
//!
//! Every indicator is an `IndicatorDef` built once and registered in the
//! standard catalog:
//!
//! - math: `highest`, `lowest`, `sumn`
//! - overlap: `sma`, `wma`, `ema`, `smma`, `dema`, `tema`, `kama`, `smacc`
//! - volatility: `truerange`, `atr`, `natr`
//! - momentum: the directional movement family (`plus_dm` .. `adxr`),
//!   `macd`, `rsi`, `stochf`, `stochastic`
//! - volume: `obv`
//!
//! ```ignore
//! let ema = talines_indicators::indicator("ema")?;
//! let out = ema.call([&close], kwargs! { "period" => 20 })?;
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use talines_core::{kwargs, Context, IndicatorDef, IndicatorError, Series};

pub mod atr;
pub mod dema;
pub mod directional;
pub mod ema;
pub mod kama;
pub mod macd;
pub mod mathop;
pub mod obv;
pub mod registry;
pub mod rsi;
pub mod sma;
pub mod smacc;
pub mod smma;
pub mod stochastic;
pub mod wma;

pub use registry::Registry;

// ─── Catalog ─────────────────────────────────────────────────────────

static CATALOG: Lazy<Registry> =
    Lazy::new(|| Registry::standard().expect("built-in indicator definitions are valid"));

/// The standard registry.
pub fn catalog() -> &'static Registry {
    &CATALOG
}

/// Looks up a built-in indicator by name or alias.
pub fn indicator(name: &str) -> Result<Arc<IndicatorDef>, IndicatorError> {
    catalog()
        .get(name)
        .cloned()
        .ok_or_else(|| IndicatorError::UnknownIndicator(name.to_string()))
}

// ─── Body helpers ────────────────────────────────────────────────────

/// A sub-indicator parameter that must be set.
pub(crate) fn sub_indicator(
    ctx: &Context<'_>,
    name: &str,
) -> Result<Arc<IndicatorDef>, IndicatorError> {
    ctx.param_indicator(name)?
        .ok_or_else(|| IndicatorError::RequiredParam {
            indicator: ctx.name().to_string(),
            name: name.to_string(),
        })
}

/// Runs a moving average over `series` with the given period.
pub(crate) fn smooth(
    ctx: &Context<'_>,
    ma: &Arc<IndicatorDef>,
    series: &Series,
    period: usize,
) -> Result<Series, IndicatorError> {
    ctx.call_primary(ma, [series], kwargs! { "period" => period })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        assert_eq!(indicator("EMA").map(|d| d.name().to_string()), Ok("ema".to_string()));
        assert_eq!(
            indicator("nope").map(|d| d.name().to_string()),
            Err(IndicatorError::UnknownIndicator("nope".into()))
        );
    }
}
