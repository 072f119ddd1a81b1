//! Parameter values and keyword arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::def::IndicatorDef;
use crate::seed::Seed;

/// A parameter value: a number, a flag, a seed strategy, or another
/// indicator definition used as a building block (e.g. the moving average a
/// formula smooths with).
#[derive(Debug, Clone)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seed(Seed),
    Indicator(Arc<IndicatorDef>),
}

/// Keyword arguments of a call, by name.
pub type Kwargs = BTreeMap<String, ParamValue>;

impl ParamValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }

    /// Non-negative integers only.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Some(*v as usize),
            ParamValue::Bool(b) => Some(usize::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seed(&self) -> Option<Seed> {
        match self {
            ParamValue::Seed(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_indicator(&self) -> Option<&Arc<IndicatorDef>> {
        match self {
            ParamValue::Indicator(def) => Some(def),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::None, ParamValue::None) => true,
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a == b,
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            (ParamValue::Float(a), ParamValue::Float(b)) => a == b,
            (ParamValue::Str(a), ParamValue::Str(b)) => a == b,
            (ParamValue::Seed(a), ParamValue::Seed(b)) => a == b,
            (ParamValue::Indicator(a), ParamValue::Indicator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => write!(f, "none"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(s) => write!(f, "{s}"),
            ParamValue::Seed(s) => write!(f, "{s:?}"),
            ParamValue::Indicator(def) => write!(f, "{}", def.name()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<Seed> for ParamValue {
    fn from(v: Seed) -> Self {
        ParamValue::Seed(v)
    }
}

impl From<Arc<IndicatorDef>> for ParamValue {
    fn from(v: Arc<IndicatorDef>) -> Self {
        ParamValue::Indicator(v)
    }
}

impl From<&Arc<IndicatorDef>> for ParamValue {
    fn from(v: &Arc<IndicatorDef>) -> Self {
        ParamValue::Indicator(Arc::clone(v))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::None, Into::into)
    }
}

/// Builds a `Kwargs` map: `kwargs! { "period" => 14, "seed" => Seed::Last }`.
#[macro_export]
macro_rules! kwargs {
    () => {
        $crate::Kwargs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut kw = $crate::Kwargs::new();
        $(
            kw.insert(::std::string::String::from($key), $crate::ParamValue::from($value));
        )+
        kw
    }};
}
