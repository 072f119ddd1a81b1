//! Field and parameter schemas, and how they merge down a lineage.
//!
//! Inputs and outputs share one merge algorithm. A child declaration either
//! inherits the parent's names, extends them, or overrides them:
//!
//! - **extend**: parent names followed by the new ones; a repeated name keeps
//!   its last position.
//! - **override**: the child's list replaces the parent's. Wherever the parent
//!   name at a position is not reused by the child, the parent name becomes an
//!   alias of the child name at that position.
//! - **remap** (`NameDecl::Remap`, only inside an override): `old` disappears
//!   from the visible list and becomes an alias of `new`.
//!
//! Aliases from the parent are carried over. Resolution follows chains, so
//! `tr → atr → natr` keeps working after two overrides.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SchemaError;
use crate::params::ParamValue;

// ─── Declarations ────────────────────────────────────────────────────

/// One entry of an override list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameDecl {
    Name(String),
    Remap { new: String, old: String },
}

impl NameDecl {
    pub fn remap(new: impl Into<String>, old: impl Into<String>) -> Self {
        NameDecl::Remap {
            new: new.into(),
            old: old.into(),
        }
    }

    fn visible(&self) -> &str {
        match self {
            NameDecl::Name(n) | NameDecl::Remap { new: n, .. } => n,
        }
    }
}

impl From<&str> for NameDecl {
    fn from(name: &str) -> Self {
        NameDecl::Name(name.to_string())
    }
}

impl From<String> for NameDecl {
    fn from(name: String) -> Self {
        NameDecl::Name(name)
    }
}

impl From<(&str, &str)> for NameDecl {
    fn from((new, old): (&str, &str)) -> Self {
        NameDecl::remap(new, old)
    }
}

/// What a definition says about one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldDecl {
    #[default]
    Inherit,
    Extend(Vec<String>),
    Override(Vec<NameDecl>),
}

/// Merged view of a field: visible names in order plus aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    names: Vec<String>,
    aliases: BTreeMap<String, String>,
}

impl FieldSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            aliases: BTreeMap::new(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Old name → newer name.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Visible name `name` resolves to, if any.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let mut key = name;
        for _ in 0..=self.aliases.len() {
            if self.names.iter().any(|n| n == key) {
                return Some(key);
            }
            key = self.aliases.get(key).map(String::as_str)?;
        }
        None
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub default: ParamValue,
    pub doc: String,
    pub required: bool,
}

/// Merged parameters in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    specs: Vec<ParamSpec>,
}

impl ParamSchema {
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|p| p.name == name)
    }

    pub fn default(&self, name: &str) -> Option<&ParamValue> {
        self.get(name).map(|p| &p.default)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

// ─── Merging ─────────────────────────────────────────────────────────

fn check_name(definition: &str, field: &'static str, name: &str) -> Result<(), SchemaError> {
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyName {
            definition: definition.to_string(),
            field,
        });
    }
    Ok(())
}

fn check_unique<'a>(
    definition: &str,
    field: &'static str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for name in names {
        check_name(definition, field, name)?;
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateName {
                definition: definition.to_string(),
                field,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Keeps the last occurrence of each name, otherwise first-seen order.
fn dedup_keep_last(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut kept: Vec<String> = names
        .into_iter()
        .rev()
        .filter(|n| seen.insert(n.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Merges a field declaration onto the parent's merged field.
pub fn merge_field(
    definition: &str,
    field: &'static str,
    parent: &FieldSchema,
    decl: &FieldDecl,
) -> Result<FieldSchema, SchemaError> {
    let base = &parent.names;
    let mut aliases = parent.aliases.clone();
    // new → old
    let mut mappings: Vec<(String, String)> = Vec::new();

    let merged = match decl {
        FieldDecl::Inherit => base.clone(),
        FieldDecl::Extend(extra) => {
            check_unique(definition, field, extra.iter().map(String::as_str))?;
            base.iter().chain(extra).cloned().collect()
        }
        FieldDecl::Override(decls) => {
            check_unique(definition, field, decls.iter().map(NameDecl::visible))?;
            let visible: Vec<String> = decls.iter().map(|d| d.visible().to_string()).collect();

            for d in decls {
                let NameDecl::Remap { new, old } = d else {
                    continue;
                };
                check_name(definition, field, old)?;
                if !base.contains(old) && !parent.aliases.contains_key(old) {
                    return Err(SchemaError::UnknownRemapTarget {
                        definition: definition.to_string(),
                        field,
                        new: new.clone(),
                        old: old.clone(),
                    });
                }
                if let Some((first, _)) = mappings.iter().find(|(_, o)| o == old) {
                    return Err(SchemaError::ConflictingRemap {
                        definition: definition.to_string(),
                        field,
                        old: old.clone(),
                        first: first.clone(),
                        second: new.clone(),
                    });
                }
                if visible.contains(old) {
                    return Err(SchemaError::AliasShadowsName {
                        definition: definition.to_string(),
                        field,
                        alias: old.clone(),
                    });
                }
                mappings.push((new.clone(), old.clone()));
            }

            // positional aliases for parent names the child dropped
            for (new, old) in visible.iter().zip(base) {
                let reused = visible.contains(old);
                let mapped = mappings.iter().any(|(n, o)| n == new || o == old);
                if !reused && !mapped {
                    mappings.push((new.clone(), old.clone()));
                }
            }
            visible
        }
    };

    let names = dedup_keep_last(merged);
    for (new, old) in mappings {
        aliases.insert(old, new);
    }
    // a name visible again is no longer an alias
    aliases.retain(|old, _| !names.contains(old));

    Ok(FieldSchema { names, aliases })
}

/// Merges parameter declarations onto the parent's. Later defaults and
/// `required` win; an empty doc keeps the inherited one.
pub fn merge_params(
    definition: &str,
    parent: &ParamSchema,
    decls: &[ParamSpec],
) -> Result<ParamSchema, SchemaError> {
    check_unique(definition, "params", decls.iter().map(|p| p.name.as_str()))?;
    let mut specs = parent.specs.clone();
    for decl in decls {
        match specs.iter_mut().find(|p| p.name == decl.name) {
            Some(existing) => {
                existing.default = decl.default.clone();
                existing.required = decl.required;
                if !decl.doc.is_empty() {
                    existing.doc = decl.doc.clone();
                }
            }
            None => specs.push(decl.clone()),
        }
    }
    Ok(ParamSchema { specs })
}
