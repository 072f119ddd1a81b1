//! talines core: the machinery indicator formulas are written against.
//!
//! - `Series`: samples plus a watermark (first valid position) that every
//!   operation advances by the lookback it consumes
//! - `Ewm`: seeded recursive smoothing with reference-matching offsets
//! - `NamedCollection` and the schema merge rules for inputs, outputs and
//!   params across a definition lineage
//! - `IndicatorDef` (built once) and `Indicator` (built per call), with the
//!   construction protocol, nesting stack and compatibility hooks
//! - per-thread `Settings`

pub mod collection;
pub mod def;
pub mod error;
pub mod indicator;
pub mod params;
pub mod runtime;
pub mod schema;
pub mod seed;
pub mod series;
pub mod settings;

pub use collection::{Lines, NamedCollection, Params};
pub use def::{Body, ClassHook, Fragment, IndicatorDef, IndicatorDefBuilder, InstanceHook};
pub use error::{IndicatorError, InputError, SchemaError};
pub use indicator::Indicator;
pub use params::{Kwargs, ParamValue};
pub use runtime::{stack, Context, Returned, Source};
pub use schema::{FieldDecl, FieldSchema, NameDecl, ParamSchema, ParamSpec};
pub use seed::{Decay, Ewm, Seed};
pub use series::{Operand, Rolling, Series, UNDEFINED};
pub use settings::{ColumnRef, ReturnShape, Settings, SettingsError};
