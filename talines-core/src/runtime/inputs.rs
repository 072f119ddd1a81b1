//! Mapping call sources onto declared inputs.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, DataType};
use tracing::warn;

use crate::collection::Lines;
use crate::def::IndicatorDef;
use crate::error::InputError;
use crate::indicator::Indicator;
use crate::series::Series;
use crate::settings::{ColumnRef, Settings};

/// Something an indicator can read its inputs from.
#[derive(Debug, Clone)]
pub enum Source {
    Series(Series),
    Values(Vec<f64>),
    Frame(DataFrame),
    Indicator(Indicator),
}

impl From<Series> for Source {
    fn from(s: Series) -> Self {
        Source::Series(s)
    }
}

impl From<&Series> for Source {
    fn from(s: &Series) -> Self {
        Source::Series(s.clone())
    }
}

impl From<Vec<f64>> for Source {
    fn from(v: Vec<f64>) -> Self {
        Source::Values(v)
    }
}

impl From<&[f64]> for Source {
    fn from(v: &[f64]) -> Self {
        Source::Values(v.to_vec())
    }
}

impl From<DataFrame> for Source {
    fn from(df: DataFrame) -> Self {
        Source::Frame(df)
    }
}

impl From<Indicator> for Source {
    fn from(ind: Indicator) -> Self {
        Source::Indicator(ind)
    }
}

impl From<&Indicator> for Source {
    fn from(ind: &Indicator) -> Self {
        Source::Indicator(ind.clone())
    }
}

pub(crate) struct Resolved {
    pub lines: Lines,
    pub extra: Vec<Source>,
}

/// Resolves `sources` against the definition's inputs. `top_level` is true
/// when no other construction is in progress on this thread.
pub(crate) fn resolve(
    def: &IndicatorDef,
    mut sources: Vec<Source>,
    settings: &Settings,
    top_level: bool,
) -> Result<Resolved, InputError> {
    if sources.is_empty() {
        return Err(InputError::NoInputs);
    }
    let names = def.inputs().names();
    let mut lines = Lines::new(names.to_vec(), def.inputs().aliases().clone());

    // one source per input
    if sources.len() >= names.len() {
        let extra = sources.split_off(names.len());
        for (i, source) in sources.into_iter().enumerate() {
            lines.set_at(i, single(source, &names[i], settings)?);
        }
        return Ok(Resolved { lines, extra });
    }

    let extra = sources.split_off(1);
    match sources.pop() {
        Some(Source::Frame(df)) => {
            if !top_level {
                return Err(InputError::FrameNotTopLevel);
            }
            for (i, series) in from_frame(&df, names, settings)?.into_iter().enumerate() {
                lines.set_at(i, series);
            }
            Ok(Resolved { lines, extra })
        }
        Some(Source::Indicator(ind)) => {
            let outputs = ind.outputs();
            if outputs.len() < names.len() {
                return Err(InputError::TooFewColumns {
                    needed: names.len(),
                    available: outputs.len(),
                });
            }
            for (i, (name, (_, series))) in names.iter().zip(outputs.iter()).enumerate() {
                lines.set_at(i, series.clone().renamed(name.as_str()));
            }
            Ok(Resolved { lines, extra })
        }
        Some(first) => {
            let allowed = def.allow_inputs().ok_or(InputError::NotMultiColumn)?;
            let mut given = vec![first];
            given.extend(extra);
            if given.len() < allowed {
                return Err(InputError::TooFewColumns {
                    needed: allowed,
                    available: given.len(),
                });
            }
            let extra = given.split_off(allowed);
            lines.truncate(allowed);
            for (i, source) in given.into_iter().enumerate() {
                lines.set_at(i, single(source, &names[i], settings)?);
            }
            Ok(Resolved { lines, extra })
        }
        None => Err(InputError::NoInputs),
    }
}

/// One source feeding exactly one input.
fn single(source: Source, input: &str, settings: &Settings) -> Result<Series, InputError> {
    match source {
        Source::Series(s) => Ok(s.renamed(input)),
        Source::Values(v) => Ok(Series::new(input, v)),
        Source::Indicator(ind) => match ind.outputs().at(0) {
            Some(s) => Ok(s.clone().renamed(input)),
            None => Err(InputError::TooFewColumns {
                needed: 1,
                available: 0,
            }),
        },
        Source::Frame(df) => {
            let lower = lower_names(&df);
            let idx = match lower.iter().position(|c| c == input) {
                Some(i) => i,
                None => {
                    let configured = match settings.column_for(input) {
                        Some(ColumnRef::Index(i)) => *i,
                        Some(ColumnRef::Name(n)) => {
                            let n = n.to_lowercase();
                            lower.iter().position(|c| *c == n).unwrap_or(0)
                        }
                        None => 0,
                    };
                    if configured >= lower.len() {
                        warn!(input, column = configured, "configured column out of range, using column 0");
                        0
                    } else {
                        configured
                    }
                }
            };
            column(&df, idx, input)
        }
    }
}

fn lower_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.to_lowercase())
        .collect()
}

/// Configured column for `input`, if any. A configured name that is not in
/// the table is an error.
fn configured(
    input: &str,
    lower: &[String],
    settings: &Settings,
) -> Result<Option<usize>, InputError> {
    match settings.column_for(input) {
        None => Ok(None),
        Some(ColumnRef::Index(i)) => Ok(Some(*i)),
        Some(ColumnRef::Name(name)) => {
            let wanted = name.to_lowercase();
            match lower.iter().position(|c| *c == wanted) {
                Some(i) => Ok(Some(i)),
                None => Err(InputError::ColumnNotFound {
                    input: input.to_string(),
                    column: name.clone(),
                }),
            }
        }
    }
}

/// Matches every declared input against the table's columns, each column
/// used at most once.
fn from_frame(
    df: &DataFrame,
    inputs: &[String],
    settings: &Settings,
) -> Result<Vec<Series>, InputError> {
    let lower = lower_names(df);
    if lower.len() < inputs.len() {
        return Err(InputError::TooFewColumns {
            needed: inputs.len(),
            available: lower.len(),
        });
    }
    let mut free: BTreeSet<usize> = (0..lower.len()).collect();
    let mut out = Vec::with_capacity(inputs.len());

    for input in inputs {
        let mut idx = if settings.named_first {
            configured(input, &lower, settings)?
        } else {
            None
        };
        if !idx.is_some_and(|i| free.contains(&i)) {
            idx = match lower.iter().position(|c| c == input) {
                Some(i) => Some(i),
                None => configured(input, &lower, settings)?,
            };
        }
        let idx = match idx.filter(|i| free.contains(i)) {
            Some(i) => i,
            None => match free.first() {
                Some(&i) => i,
                None => {
                    return Err(InputError::TooFewColumns {
                        needed: inputs.len(),
                        available: lower.len(),
                    })
                }
            },
        };
        free.remove(&idx);
        out.push(column(df, idx, input)?);
    }
    Ok(out)
}

fn column(df: &DataFrame, idx: usize, input: &str) -> Result<Series, InputError> {
    let Some(col) = df.get_columns().get(idx) else {
        return Err(InputError::ColumnNotFound {
            input: input.to_string(),
            column: idx.to_string(),
        });
    };
    let frame_err = |e: polars::prelude::PolarsError| InputError::Frame {
        column: col.name().to_string(),
        reason: e.to_string(),
    };
    let casted = col.cast(&DataType::Float64).map_err(frame_err)?;
    let values = casted
        .f64()
        .map_err(frame_err)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(Series::new(input, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn ohlc(names: [&str; 4]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(names[0].into(), vec![1.0, 2.0]),
            Column::new(names[1].into(), vec![10.0, 20.0]),
            Column::new(names[2].into(), vec![100.0, 200.0]),
            Column::new(names[3].into(), vec![1000.0, 2000.0]),
        ])
        .unwrap()
    }

    fn field(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn frame_matches_names_case_insensitively() {
        let df = ohlc(["Open", "High", "Low", "Close"]);
        let got = from_frame(&df, &field(&["close", "high"]), &Settings::default()).unwrap();
        assert_eq!(got[0].values(), &[1000.0, 2000.0]);
        assert_eq!(got[1].values(), &[10.0, 20.0]);
        assert_eq!(got[0].name(), "close");
    }

    #[test]
    fn frame_falls_back_to_configured_then_free() {
        let df = ohlc(["a", "b", "c", "d"]);
        // close → configured index 3, volume → index 4 is out of range → first free
        let got = from_frame(&df, &field(&["close", "volume"]), &Settings::default()).unwrap();
        assert_eq!(got[0].values(), &[1000.0, 2000.0]);
        assert_eq!(got[1].values(), &[1.0, 2.0]);
    }

    #[test]
    fn named_first_prefers_configuration() {
        let df = ohlc(["close", "x", "y", "z"]);
        let settings = Settings {
            named_first: true,
            ..Settings::default()
        }
        .with_column("close", ColumnRef::Index(2));
        let got = from_frame(&df, &field(&["close"]), &settings).unwrap();
        assert_eq!(got[0].values(), &[100.0, 200.0]);
    }

    #[test]
    fn missing_configured_name_is_an_error() {
        let df = ohlc(["a", "b", "c", "d"]);
        let settings = Settings::default().with_column("close", ColumnRef::Name("adj".into()));
        let err = from_frame(&df, &field(&["close"]), &settings).unwrap_err();
        assert_eq!(
            err,
            InputError::ColumnNotFound {
                input: "close".into(),
                column: "adj".into()
            }
        );
    }

    #[test]
    fn too_narrow_frame() {
        let df = ohlc(["a", "b", "c", "d"]);
        let err = from_frame(&df, &field(&["a", "b", "c", "d", "e"]), &Settings::default())
            .unwrap_err();
        assert_eq!(err, InputError::TooFewColumns { needed: 5, available: 4 });
    }

    #[test]
    fn single_frame_column_uses_name_then_index() {
        let df = ohlc(["open", "high", "low", "close"]);
        let s = single(Source::Frame(df.clone()), "low", &Settings::default()).unwrap();
        assert_eq!(s.values(), &[100.0, 200.0]);
        let v = single(Source::Frame(df), "volume", &Settings::default()).unwrap();
        assert_eq!(v.values(), &[1.0, 2.0]);
    }

    #[test]
    fn integer_columns_are_cast_and_nulls_become_sentinel() {
        let df = DataFrame::new(vec![Column::new(
            "close".into(),
            vec![Some(1i64), None, Some(3)],
        )])
        .unwrap();
        let s = column(&df, 0, "close").unwrap();
        assert_eq!(s[0], 1.0);
        assert!(s[1].is_nan());
        assert_eq!(s[2], 3.0);
    }
}
