//! Indicator definitions.
//!
//! An `IndicatorDef` is built once with `IndicatorDef::builder`, optionally on
//! top of a parent definition. Building merges the inputs, outputs and params
//! schemas with the parent's and appends this definition's fragment (formula
//! body and compatibility hooks) to the inherited lineage. Constructing an
//! instance later walks that lineage from the least to the most specific
//! fragment.

use std::fmt;
use std::sync::Arc;

use crate::error::{IndicatorError, SchemaError};
use crate::params::{Kwargs, ParamValue};
use crate::runtime::Context;
use crate::schema::{
    merge_field, merge_params, FieldDecl, FieldSchema, NameDecl, ParamSchema, ParamSpec,
};

/// Formula body: reads inputs and params from the context, writes outputs.
pub type Body = fn(&mut Context<'_>) -> Result<(), IndicatorError>;

/// Compatibility hook run on the keyword arguments before construction.
pub type ClassHook = fn(&mut Kwargs);

/// Compatibility hook run once inputs are resolved, before the bodies.
pub type InstanceHook = fn(&mut Context<'_>, &mut Kwargs);

/// The behavior one definition adds to its lineage.
#[derive(Clone)]
pub struct Fragment {
    name: String,
    body: Option<Body>,
    class_hook: Option<ClassHook>,
    instance_hook: Option<InstanceHook>,
}

impl Fragment {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<Body> {
        self.body
    }

    pub fn class_hook(&self) -> Option<ClassHook> {
        self.class_hook
    }

    pub fn instance_hook(&self) -> Option<InstanceHook> {
        self.instance_hook
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("name", &self.name)
            .field("body", &self.body.is_some())
            .field("class_hook", &self.class_hook.is_some())
            .field("instance_hook", &self.instance_hook.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct IndicatorDef {
    name: String,
    doc: String,
    aliases: Vec<String>,
    groups: Vec<String>,
    inputs: FieldSchema,
    outputs: FieldSchema,
    params: ParamSchema,
    allow_inputs: Option<usize>,
    lineage: Vec<Fragment>,
}

impl IndicatorDef {
    pub fn builder(name: impl Into<String>) -> IndicatorDefBuilder {
        IndicatorDefBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Alternate registry names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn inputs(&self) -> &FieldSchema {
        &self.inputs
    }

    pub fn outputs(&self) -> &FieldSchema {
        &self.outputs
    }

    pub fn params(&self) -> &ParamSchema {
        &self.params
    }

    pub fn allow_inputs(&self) -> Option<usize> {
        self.allow_inputs
    }

    /// Fragments from the least to the most specific.
    pub fn lineage(&self) -> &[Fragment] {
        &self.lineage
    }

    /// Base fragments (leading underscore) are building blocks, never
    /// registered or called directly.
    pub fn is_abstract(&self) -> bool {
        self.name.starts_with('_')
    }

    /// True if `other` appears in this definition's lineage.
    pub fn derives_from(&self, other: &str) -> bool {
        self.lineage.iter().any(|f| f.name == other)
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

pub struct IndicatorDefBuilder {
    name: String,
    doc: String,
    parent: Option<Arc<IndicatorDef>>,
    aliases: Vec<String>,
    groups: Option<Vec<String>>,
    inputs: FieldDecl,
    outputs: FieldDecl,
    params: Vec<ParamSpec>,
    allow_inputs: Option<usize>,
    body: Option<Body>,
    class_hook: Option<ClassHook>,
    instance_hook: Option<InstanceHook>,
}

fn to_strings<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Vec<String> {
    names.into_iter().map(Into::into).collect()
}

impl IndicatorDefBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            doc: String::new(),
            parent: None,
            aliases: Vec::new(),
            groups: None,
            inputs: FieldDecl::Inherit,
            outputs: FieldDecl::Inherit,
            params: Vec::new(),
            allow_inputs: None,
            body: None,
            class_hook: None,
            instance_hook: None,
        }
    }

    pub fn extends(mut self, parent: &Arc<IndicatorDef>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn alias<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.aliases.extend(to_strings(names));
        self
    }

    /// Replaces the inherited group tags.
    pub fn group<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.groups = Some(to_strings(names));
        self
    }

    pub fn inputs<D: Into<NameDecl>>(mut self, names: impl IntoIterator<Item = D>) -> Self {
        self.inputs = FieldDecl::Override(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn inputs_extend<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.inputs = FieldDecl::Extend(to_strings(names));
        self
    }

    pub fn outputs<D: Into<NameDecl>>(mut self, names: impl IntoIterator<Item = D>) -> Self {
        self.outputs = FieldDecl::Override(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn outputs_extend<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.outputs = FieldDecl::Extend(to_strings(names));
        self
    }

    pub fn param(
        mut self,
        name: impl Into<String>,
        default: impl Into<ParamValue>,
        doc: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: default.into(),
            doc: doc.into(),
            required: false,
        });
        self
    }

    /// A parameter the caller must supply.
    pub fn required_param(mut self, name: impl Into<String>, doc: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: ParamValue::None,
            doc: doc.into(),
            required: true,
        });
        self
    }

    /// Accept up to `n` plain sources when fewer than the declared inputs
    /// are given.
    pub fn allow_inputs(mut self, n: usize) -> Self {
        self.allow_inputs = Some(n);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn compat_class(mut self, hook: ClassHook) -> Self {
        self.class_hook = Some(hook);
        self
    }

    pub fn compat_instance(mut self, hook: InstanceHook) -> Self {
        self.instance_hook = Some(hook);
        self
    }

    pub fn build(self) -> Result<Arc<IndicatorDef>, SchemaError> {
        let root_inputs = FieldSchema::new(vec!["close".to_string()]);
        let root_outputs = FieldSchema::default();
        let root_params = <ParamSchema as Default>::default();
        let (p_inputs, p_outputs, p_params) = match &self.parent {
            Some(p) => (&p.inputs, &p.outputs, &p.params),
            None => (&root_inputs, &root_outputs, &root_params),
        };

        let inputs = merge_field(&self.name, "inputs", p_inputs, &self.inputs)?;
        let outputs = merge_field(&self.name, "outputs", p_outputs, &self.outputs)?;
        let params = merge_params(&self.name, p_params, &self.params)?;

        let allow_inputs = self
            .allow_inputs
            .or_else(|| self.parent.as_ref().and_then(|p| p.allow_inputs));
        if let Some(allowed) = allow_inputs {
            if allowed > inputs.len() {
                return Err(SchemaError::AllowInputs {
                    definition: self.name,
                    allowed,
                    declared: inputs.len(),
                });
            }
        }

        if outputs.is_empty() && !self.name.starts_with('_') {
            return Err(SchemaError::NoOutputs {
                definition: self.name,
            });
        }

        let mut lineage = self
            .parent
            .as_ref()
            .map(|p| p.lineage.clone())
            .unwrap_or_default();
        lineage.push(Fragment {
            name: self.name.clone(),
            body: self.body,
            class_hook: self.class_hook,
            instance_hook: self.instance_hook,
        });

        let groups = match self.groups {
            Some(groups) => groups,
            None => self
                .parent
                .as_ref()
                .map(|p| p.groups.clone())
                .unwrap_or_default(),
        };
        let doc = if self.doc.is_empty() {
            self.parent
                .as_ref()
                .map(|p| p.doc.clone())
                .unwrap_or_default()
        } else {
            self.doc
        };

        Ok(Arc::new(IndicatorDef {
            name: self.name,
            doc,
            aliases: self.aliases,
            groups,
            inputs,
            outputs,
            params,
            allow_inputs,
            lineage,
        }))
    }
}
