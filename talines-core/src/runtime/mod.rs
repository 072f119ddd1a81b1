//! Construction protocol.
//!
//! Building an instance goes through fixed steps:
//!
//! 1. pick the compatibility mode (per call, else the enclosing construction,
//!    else the thread's settings);
//! 2. in compatibility mode, run the class hooks on the keyword arguments;
//! 3. resolve the sources into the declared inputs;
//! 4. in compatibility mode, mark the instance and run the instance hooks;
//! 5. resolve parameters: keywords override defaults, unknown keywords are
//!    kept as extras;
//! 6. push a nesting frame and run every body, least specific first;
//! 7. check that all outputs were set and freeze the instance.

mod context;
mod inputs;
pub mod stack;

pub use context::Context;
pub use inputs::Source;

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, trace};

use crate::collection::Params;
use crate::def::IndicatorDef;
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::params::Kwargs;
use crate::settings::{self, ReturnShape};

/// Result of `IndicatorDef::invoke`.
#[derive(Debug, Clone)]
pub enum Returned {
    Instance(Indicator),
    Frame(DataFrame),
}

impl Returned {
    pub fn into_instance(self) -> Option<Indicator> {
        match self {
            Returned::Instance(ind) => Some(ind),
            Returned::Frame(_) => None,
        }
    }

    pub fn into_frame(self) -> Option<DataFrame> {
        match self {
            Returned::Frame(df) => Some(df),
            Returned::Instance(_) => None,
        }
    }
}

impl IndicatorDef {
    /// Builds an instance from `sources`. At least one source is required.
    pub fn call<I, S>(self: &Arc<Self>, sources: I, kwargs: Kwargs) -> Result<Indicator, IndicatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        construct(self, collect(sources), kwargs, None)
    }

    /// `call` with an explicit compatibility mode.
    pub fn call_compat<I, S>(
        self: &Arc<Self>,
        sources: I,
        kwargs: Kwargs,
        compat: bool,
    ) -> Result<Indicator, IndicatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        construct(self, collect(sources), kwargs, Some(compat))
    }

    /// `call`, honoring the thread's return shape: a top-level construction
    /// yields a table when the settings ask for one.
    pub fn invoke<I, S>(self: &Arc<Self>, sources: I, kwargs: Kwargs) -> Result<Returned, IndicatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let instance = construct(self, collect(sources), kwargs, None)?;
        if stack::is_top_level() && settings::current().return_shape == ReturnShape::Frame {
            let df = instance
                .to_frame()
                .map_err(|e| IndicatorError::Table(e.to_string()))?;
            return Ok(Returned::Frame(df));
        }
        Ok(Returned::Instance(instance))
    }
}

fn collect<I, S>(sources: I) -> Vec<Source>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    sources.into_iter().map(Into::into).collect()
}

pub(crate) fn construct(
    def: &Arc<IndicatorDef>,
    sources: Vec<Source>,
    mut kwargs: Kwargs,
    compat: Option<bool>,
) -> Result<Indicator, IndicatorError> {
    let settings = settings::current();
    let compat = compat
        .or_else(stack::enclosing_compat)
        .unwrap_or(settings.compat);
    debug!(
        indicator = def.name(),
        depth = stack::depth(),
        compat,
        "construction started"
    );

    if compat {
        for fragment in def.lineage() {
            if let Some(hook) = fragment.class_hook() {
                trace!(indicator = def.name(), fragment = fragment.name(), "class hook");
                hook(&mut kwargs);
            }
        }
    }

    let resolved = inputs::resolve(def, sources, &settings, stack::is_top_level())?;
    let mut ctx = Context::new(def, resolved.lines, resolved.extra, compat);

    if compat {
        ctx.set_compat_active(true);
        for fragment in def.lineage() {
            if let Some(hook) = fragment.instance_hook() {
                trace!(indicator = def.name(), fragment = fragment.name(), "instance hook");
                hook(&mut ctx, &mut kwargs);
            }
        }
    }

    let (params, extra) = resolve_params(def, kwargs)?;
    ctx.params = params;
    ctx.extra = extra;

    {
        let _frame = stack::enter(def.name(), compat);
        for fragment in def.lineage() {
            if let Some(body) = fragment.body() {
                body(&mut ctx)?;
            }
        }
    }

    let (inputs, params, outputs, extra) = ctx.into_parts();
    if let Some(name) = outputs.unset().first() {
        return Err(IndicatorError::OutputNotSet {
            indicator: def.name().to_string(),
            name: name.to_string(),
        });
    }
    let instance = Indicator::new(Arc::clone(def), inputs, params, outputs, extra);
    debug!(
        indicator = def.name(),
        watermark = instance.watermark(),
        "construction finished"
    );
    Ok(instance)
}

/// Keyword overrides on top of the declared defaults. Returns the params and
/// the keywords no parameter claimed.
fn resolve_params(def: &IndicatorDef, mut kwargs: Kwargs) -> Result<(Params, Kwargs), IndicatorError> {
    let mut pairs = Vec::with_capacity(def.params().len());
    for spec in def.params().specs() {
        let value = kwargs
            .remove(&spec.name)
            .unwrap_or_else(|| spec.default.clone());
        if spec.required && value.is_none() {
            return Err(IndicatorError::RequiredParam {
                indicator: def.name().to_string(),
                name: spec.name.clone(),
            });
        }
        pairs.push((spec.name.clone(), value));
    }
    Ok((Params::from_pairs(pairs), kwargs))
}
