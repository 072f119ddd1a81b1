//! Per-thread settings.
//!
//! Column mapping for table inputs, the compatibility default and the shape
//! `invoke` returns at the top of the nesting stack. Each thread starts from
//! `Settings::default()`; changes never leak into other threads.
//!
//! ```toml
//! compat = true
//! named_first = false
//! return_shape = "frame"
//!
//! [input_indices]
//! close = 3
//! volume = "vol"
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Where a table input comes from: a column position or a column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

/// What `invoke` returns for a top-level construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    #[default]
    Instance,
    Frame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Consult `input_indices` before matching column names.
    pub named_first: bool,
    /// Compatibility mode for constructions that don't choose one.
    pub compat: bool,
    pub return_shape: ReturnShape,
    /// Default column for each input name. Parsed entries are laid over the
    /// OHLCV defaults.
    #[serde(deserialize_with = "merge_indices")]
    pub input_indices: BTreeMap<String, ColumnRef>,
}

fn default_indices() -> BTreeMap<String, ColumnRef> {
    [
        ("open", 0),
        ("high", 1),
        ("low", 2),
        ("close", 3),
        ("volume", 4),
        ("openinterest", 5),
    ]
    .into_iter()
    .map(|(name, idx)| (name.to_string(), ColumnRef::Index(idx)))
    .collect()
}

fn merge_indices<'de, D>(deserializer: D) -> Result<BTreeMap<String, ColumnRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut indices = default_indices();
    indices.extend(BTreeMap::<String, ColumnRef>::deserialize(deserializer)?);
    Ok(indices)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            named_first: false,
            compat: false,
            return_shape: ReturnShape::Instance,
            input_indices: default_indices(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Settings {
    /// Parses TOML; missing keys keep their defaults, including the
    /// `[input_indices]` entries a table does not mention.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    pub fn column_for(&self, input: &str) -> Option<&ColumnRef> {
        self.input_indices.get(input)
    }

    pub fn with_column(mut self, input: impl Into<String>, column: ColumnRef) -> Self {
        self.input_indices.insert(input.into(), column);
        self
    }
}

thread_local! {
    static CURRENT: RefCell<Settings> = RefCell::new(Settings::default());
}

/// Snapshot of this thread's settings.
pub fn current() -> Settings {
    CURRENT.with(|c| c.borrow().clone())
}

/// Installs `settings` for this thread and returns the previous ones.
pub fn replace(settings: Settings) -> Settings {
    CURRENT.with(|c| std::mem::replace(&mut *c.borrow_mut(), settings))
}

pub fn update(f: impl FnOnce(&mut Settings)) {
    CURRENT.with(|c| f(&mut c.borrow_mut()));
}

pub fn set_compat(compat: bool) {
    update(|s| s.compat = compat);
}

pub fn set_return_shape(shape: ReturnShape) {
    update(|s| s.return_shape = shape);
}

struct Restore(Option<Settings>);

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(previous) = self.0.take() {
            replace(previous);
        }
    }
}

/// Runs `f` with `settings` installed, restoring the previous ones after,
/// even if `f` panics.
pub fn scoped<R>(settings: Settings, f: impl FnOnce() -> R) -> R {
    let _restore = Restore(Some(replace(settings)));
    f()
}
