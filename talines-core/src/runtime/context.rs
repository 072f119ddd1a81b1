//! What a formula body sees while an instance is being built.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::collection::{Lines, Params};
use crate::def::IndicatorDef;
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::params::{Kwargs, ParamValue};
use crate::runtime::{construct, Source};
use crate::seed::Seed;
use crate::series::Series;

/// Shared state of one construction. Every fragment of the lineage runs
/// against the same context, so a base fragment can leave series in the
/// stash for a more specific one, and a child body can rework the outputs
/// its parent set.
pub struct Context<'a> {
    def: &'a Arc<IndicatorDef>,
    inputs: Lines,
    pub(crate) params: Params,
    outputs: Lines,
    pub(crate) extra: Kwargs,
    extra_sources: Vec<Source>,
    stash: BTreeMap<String, Series>,
    vars: Kwargs,
    compat: bool,
    compat_active: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        def: &'a Arc<IndicatorDef>,
        inputs: Lines,
        extra_sources: Vec<Source>,
        compat: bool,
    ) -> Self {
        let outputs = Lines::new(
            def.outputs().names().to_vec(),
            def.outputs().aliases().clone(),
        );
        Self {
            def,
            inputs,
            params: Params::new(Vec::new(), BTreeMap::new()),
            outputs,
            extra: Kwargs::new(),
            extra_sources,
            stash: BTreeMap::new(),
            vars: Kwargs::new(),
            compat,
            compat_active: false,
        }
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn definition(&self) -> &Arc<IndicatorDef> {
        self.def
    }

    fn err_input(&self, name: &str) -> IndicatorError {
        IndicatorError::MissingInput {
            indicator: self.name().to_string(),
            name: name.to_string(),
        }
    }

    fn err_param(&self, name: &str, expected: &'static str) -> IndicatorError {
        IndicatorError::ParamType {
            indicator: self.name().to_string(),
            name: name.to_string(),
            expected,
        }
    }

    // ─── Inputs ──────────────────────────────────────────────────────

    pub fn inputs(&self) -> &Lines {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Result<&Series, IndicatorError> {
        self.inputs.get(name).ok_or_else(|| self.err_input(name))
    }

    pub fn input_at(&self, i: usize) -> Result<&Series, IndicatorError> {
        self.inputs
            .at(i)
            .ok_or_else(|| self.err_input(&i.to_string()))
    }

    /// Largest input watermark.
    pub fn input_watermark(&self) -> usize {
        self.inputs.watermark()
    }

    /// Sources given beyond the declared inputs.
    pub fn extra_sources(&self) -> &[Source] {
        &self.extra_sources
    }

    // ─── Parameters ──────────────────────────────────────────────────

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Result<&ParamValue, IndicatorError> {
        self.params
            .get(name)
            .ok_or_else(|| IndicatorError::MissingParam {
                indicator: self.name().to_string(),
                name: name.to_string(),
            })
    }

    pub fn param_usize(&self, name: &str) -> Result<usize, IndicatorError> {
        self.param(name)?
            .as_usize()
            .ok_or_else(|| self.err_param(name, "a non-negative integer"))
    }

    pub fn param_f64(&self, name: &str) -> Result<f64, IndicatorError> {
        self.param(name)?
            .as_f64()
            .ok_or_else(|| self.err_param(name, "a number"))
    }

    pub fn param_bool(&self, name: &str) -> Result<bool, IndicatorError> {
        self.param(name)?
            .as_bool()
            .ok_or_else(|| self.err_param(name, "a flag"))
    }

    pub fn param_seed(&self, name: &str) -> Result<Seed, IndicatorError> {
        self.param(name)?
            .as_seed()
            .ok_or_else(|| self.err_param(name, "a seed strategy"))
    }

    /// A sub-indicator parameter; `None` when unset.
    pub fn param_indicator(&self, name: &str) -> Result<Option<Arc<IndicatorDef>>, IndicatorError> {
        match self.param(name)? {
            ParamValue::None => Ok(None),
            ParamValue::Indicator(def) => Ok(Some(Arc::clone(def))),
            _ => Err(self.err_param(name, "an indicator")),
        }
    }

    /// Keyword arguments that match no declared parameter.
    pub fn extras(&self) -> &Kwargs {
        &self.extra
    }

    pub fn extra(&self, name: &str) -> Option<&ParamValue> {
        self.extra.get(name)
    }

    pub fn extra_usize(&self, name: &str) -> Result<Option<usize>, IndicatorError> {
        match self.extra.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_usize()
                .map(Some)
                .ok_or_else(|| self.err_param(name, "a non-negative integer")),
        }
    }

    // ─── Compatibility ───────────────────────────────────────────────

    /// Whether compatibility mode was requested for this construction.
    pub fn compat(&self) -> bool {
        self.compat
    }

    /// Whether the compatibility transforms apply to this instance.
    pub fn compat_active(&self) -> bool {
        self.compat_active
    }

    pub fn set_compat_active(&mut self, active: bool) {
        self.compat_active = active;
    }

    // ─── Scratch state ───────────────────────────────────────────────

    pub fn var(&self, name: &str) -> Option<&ParamValue> {
        self.vars.get(name)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn stash(&mut self, name: impl Into<String>, series: Series) {
        self.stash.insert(name.into(), series);
    }

    pub fn stashed(&self, name: &str) -> Result<&Series, IndicatorError> {
        self.stash
            .get(name)
            .ok_or_else(|| IndicatorError::NotStashed {
                indicator: self.name().to_string(),
                name: name.to_string(),
            })
    }

    // ─── Outputs ─────────────────────────────────────────────────────

    pub fn outputs(&self) -> &Lines {
        &self.outputs
    }

    /// An output already set by this or a less specific fragment.
    pub fn output(&self, name: &str) -> Result<&Series, IndicatorError> {
        if !self.outputs.contains(name) {
            return Err(IndicatorError::UnknownOutput {
                indicator: self.name().to_string(),
                name: name.to_string(),
            });
        }
        self.outputs
            .get(name)
            .ok_or_else(|| IndicatorError::OutputNotSet {
                indicator: self.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Stores an output under `name` or whatever it was renamed to.
    pub fn set_output(&mut self, name: &str, series: Series) -> Result<(), IndicatorError> {
        let Some(pos) = self.outputs.position(name) else {
            return Err(IndicatorError::UnknownOutput {
                indicator: self.name().to_string(),
                name: name.to_string(),
            });
        };
        let visible = self.outputs.names()[pos].clone();
        self.outputs.set_at(pos, series.renamed(visible));
        Ok(())
    }

    // ─── Nesting ─────────────────────────────────────────────────────

    /// Builds another indicator from inside this one. The compatibility mode
    /// of this construction carries over.
    pub fn call<I, S>(
        &self,
        def: &Arc<IndicatorDef>,
        sources: I,
        kwargs: Kwargs,
    ) -> Result<Indicator, IndicatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        construct(def, sources.into_iter().map(Into::into).collect(), kwargs, None)
    }

    /// Like `call`, returning only the first output.
    pub fn call_primary<I, S>(
        &self,
        def: &Arc<IndicatorDef>,
        sources: I,
        kwargs: Kwargs,
    ) -> Result<Series, IndicatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let ind = self.call(def, sources, kwargs)?;
        ind.into_primary()
            .ok_or_else(|| IndicatorError::OutputNotSet {
                indicator: def.name().to_string(),
                name: "0".to_string(),
            })
    }

    pub(crate) fn into_parts(self) -> (Lines, Params, Lines, Kwargs) {
        (self.inputs, self.params, self.outputs, self.extra)
    }
}
