//! Error categories.
//!
//! Three concerns, three enums: resolving call arguments into inputs
//! (`InputError`), building a definition (`SchemaError`) and running one
//! (`IndicatorError`, which wraps the other two). Settings parsing has its own
//! `SettingsError` in `settings`.
//!
//! Numeric anomalies (division by zero, empty windows, not enough data) are
//! never errors: they surface as the undefined sentinel inside the series.

// ─── Input resolution ────────────────────────────────────────────────

/// Failures while mapping caller-supplied sources onto declared inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("At least one input is needed and none was provided")]
    NoInputs,
    #[error("Multi-column input offers {available} columns but {needed} inputs are needed")]
    TooFewColumns { needed: usize, available: usize },
    #[error("Only tables and indicators can supply several inputs at once")]
    NotMultiColumn,
    #[error("Tables are only accepted by top-level constructions")]
    FrameNotTopLevel,
    #[error("Input '{input}' is mapped to column '{column}', which does not exist")]
    ColumnNotFound { input: String, column: String },
    #[error("Cannot read column '{column}': {reason}")]
    Frame { column: String, reason: String },
}

// ─── Definition building ─────────────────────────────────────────────

/// Malformed indicator declarations, raised by `IndicatorDefBuilder::build`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{definition}: empty name in {field} declaration")]
    EmptyName {
        definition: String,
        field: &'static str,
    },
    #[error("{definition}: '{name}' declared twice in {field}")]
    DuplicateName {
        definition: String,
        field: &'static str,
        name: String,
    },
    #[error("{definition}: cannot remap '{old}' to '{new}', the parent has no {field} named '{old}'")]
    UnknownRemapTarget {
        definition: String,
        field: &'static str,
        new: String,
        old: String,
    },
    #[error("{definition}: {field} '{old}' is remapped to both '{first}' and '{second}'")]
    ConflictingRemap {
        definition: String,
        field: &'static str,
        old: String,
        first: String,
        second: String,
    },
    #[error("{definition}: alias '{alias}' shadows a visible {field} name")]
    AliasShadowsName {
        definition: String,
        field: &'static str,
        alias: String,
    },
    #[error("{definition}: allows {allowed} positional inputs but declares only {declared}")]
    AllowInputs {
        definition: String,
        allowed: usize,
        declared: usize,
    },
    #[error("{definition}: declares no outputs")]
    NoOutputs { definition: String },
    #[error("'{name}' is already registered")]
    AlreadyRegistered { name: String },
}

// ─── Construction ────────────────────────────────────────────────────

/// Everything that can stop an indicator construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{indicator}: output '{name}' was never set")]
    OutputNotSet { indicator: String, name: String },
    #[error("{indicator}: unknown output '{name}'")]
    UnknownOutput { indicator: String, name: String },
    #[error("{indicator}: unknown input '{name}'")]
    MissingInput { indicator: String, name: String },
    #[error("{indicator}: unknown parameter '{name}'")]
    MissingParam { indicator: String, name: String },
    #[error("{indicator}: required parameter '{name}' has no value")]
    RequiredParam { indicator: String, name: String },
    #[error("{indicator}: parameter '{name}' is not {expected}")]
    ParamType {
        indicator: String,
        name: String,
        expected: &'static str,
    },
    #[error("{indicator}: nothing stashed under '{name}'")]
    NotStashed { indicator: String, name: String },
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),
    #[error("Cannot build output table: {0}")]
    Table(String),
}
