//! Built indicator instances.

use std::collections::BTreeMap;
use std::ops::Index;
use std::sync::Arc;

use polars::prelude::{DataFrame, PolarsResult};

use crate::collection::{Lines, Params};
use crate::def::IndicatorDef;
use crate::params::Kwargs;
use crate::series::Series;

/// Result of one construction: resolved inputs, concrete params and the
/// outputs the bodies produced. Immutable once built.
#[derive(Debug, Clone)]
pub struct Indicator {
    def: Arc<IndicatorDef>,
    inputs: Lines,
    params: Params,
    outputs: Lines,
    extra: Kwargs,
}

impl Indicator {
    pub(crate) fn new(
        def: Arc<IndicatorDef>,
        inputs: Lines,
        params: Params,
        outputs: Lines,
        extra: Kwargs,
    ) -> Self {
        Self {
            def,
            inputs,
            params,
            outputs,
            extra,
        }
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn definition(&self) -> &Arc<IndicatorDef> {
        &self.def
    }

    pub fn inputs(&self) -> &Lines {
        &self.inputs
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Keyword arguments no parameter claimed.
    pub fn extras(&self) -> &Kwargs {
        &self.extra
    }

    pub fn outputs(&self) -> &Lines {
        &self.outputs
    }

    /// Output by name, following renames.
    pub fn output(&self, name: &str) -> Option<&Series> {
        self.outputs.get(name)
    }

    pub fn primary(&self) -> Option<&Series> {
        self.outputs.at(0)
    }

    pub fn into_primary(self) -> Option<Series> {
        self.outputs.at(0).cloned()
    }

    /// Largest output watermark.
    pub fn watermark(&self) -> usize {
        self.outputs.watermark()
    }

    pub fn watermarks(&self) -> Vec<(String, usize)> {
        self.outputs.watermarks()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.outputs.values().next().map_or(0, Series::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One column per output.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        self.outputs.to_frame()
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<f64>> {
        self.outputs.to_map()
    }
}

impl Index<&str> for Indicator {
    type Output = Series;

    /// Panics if `name` is not an output.
    fn index(&self, name: &str) -> &Series {
        &self.outputs[name]
    }
}
