//! Named, ordered slot collections.
//!
//! Inputs, outputs and parameters of an indicator instance are all a
//! `NamedCollection`: a fixed list of declared names, one optional slot per
//! name, and an alias map (old name → newer name) inherited from the
//! definition's schema. Alias chains are followed until a visible name is
//! found, so a name renamed twice down a lineage still resolves.

use std::collections::BTreeMap;
use std::ops::Index;

use polars::prelude::{Column, DataFrame, PolarsResult};

use crate::params::ParamValue;
use crate::series::Series;

#[derive(Debug, Clone)]
pub struct NamedCollection<T> {
    names: Vec<String>,
    slots: Vec<Option<T>>,
    aliases: BTreeMap<String, String>,
}

/// Input or output series of an instance.
pub type Lines = NamedCollection<Series>;

/// Concrete parameter values of an instance.
pub type Params = NamedCollection<ParamValue>;

impl<T> NamedCollection<T> {
    /// Empty slots for each declared name.
    pub fn new(names: Vec<String>, aliases: BTreeMap<String, String>) -> Self {
        let slots = names.iter().map(|_| None).collect();
        Self {
            names,
            slots,
            aliases,
        }
    }

    /// Filled collection without aliases.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, T)>) -> Self {
        let (names, slots): (Vec<String>, Vec<Option<T>>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), Some(value)))
            .unzip();
        Self {
            names,
            slots,
            aliases: BTreeMap::new(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of `name`, following aliases.
    pub fn position(&self, name: &str) -> Option<usize> {
        let mut key = name;
        // a chain can be at most as long as the alias map
        for _ in 0..=self.aliases.len() {
            if let Some(pos) = self.names.iter().position(|n| n == key) {
                return Some(pos);
            }
            key = self.aliases.get(key).map(String::as_str)?;
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.position(name).and_then(|i| self.at(i))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let i = self.position(name)?;
        self.slots[i].as_mut()
    }

    pub fn at(&self, i: usize) -> Option<&T> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stores `value` under `name` (or what it aliases to). Returns the
    /// resolved visible name, `None` if the name is unknown.
    pub fn set(&mut self, name: &str, value: T) -> Option<&str> {
        let i = self.position(name)?;
        self.slots[i] = Some(value);
        Some(&self.names[i])
    }

    pub fn set_at(&mut self, i: usize, value: T) -> bool {
        match self.slots.get_mut(i) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Declared names whose slot is still empty.
    pub fn unset(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Keeps the first `n` names.
    pub fn truncate(&mut self, n: usize) {
        self.names.truncate(n);
        self.slots.truncate(n);
    }

    /// Filled slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.names
            .iter()
            .zip(&self.slots)
            .filter_map(|(name, slot)| slot.as_ref().map(|v| (name.as_str(), v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl NamedCollection<Series> {
    /// Largest watermark among the filled slots (1 when empty).
    pub fn watermark(&self) -> usize {
        self.values().map(Series::watermark).max().unwrap_or(1)
    }

    pub fn watermarks(&self) -> Vec<(String, usize)> {
        self.iter()
            .map(|(name, s)| (name.to_string(), s.watermark()))
            .collect()
    }

    /// One column per filled slot, named after the slot.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .iter()
            .map(|(name, s)| Column::new(name.into(), s.values().to_vec()))
            .collect();
        DataFrame::new(columns)
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<f64>> {
        self.iter()
            .map(|(name, s)| (name.to_string(), s.values().to_vec()))
            .collect()
    }
}

impl<T> Index<&str> for NamedCollection<T> {
    type Output = T;

    fn index(&self, name: &str) -> &T {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no value stored under '{name}'"),
        }
    }
}

impl<T> Index<usize> for NamedCollection<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match self.at(i) {
            Some(v) => v,
            None => panic!("no value stored at position {i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alias_chain_resolves_to_visible_name() {
        let aliases = BTreeMap::from([
            ("tr".to_string(), "atr".to_string()),
            ("atr".to_string(), "natr".to_string()),
        ]);
        let mut lines: Lines = NamedCollection::new(names(&["natr"]), aliases);
        assert_eq!(lines.set("tr", Series::from_values("tr", &[1.0])), Some("natr"));
        assert!(lines.is_set("atr"));
        assert_eq!(lines["natr"].values(), &[1.0]);
        assert_eq!(lines.position("unknown"), None);
    }

    #[test]
    fn alias_cycle_terminates() {
        let aliases = BTreeMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ]);
        let lines: Lines = NamedCollection::new(names(&["c"]), aliases);
        assert_eq!(lines.position("a"), None);
    }

    #[test]
    fn unset_and_watermark() {
        let mut lines: Lines = NamedCollection::new(names(&["k", "d"]), BTreeMap::new());
        assert_eq!(lines.unset(), vec!["k", "d"]);
        lines.set("k", Series::from_values("k", &[1.0, 2.0, 3.0]).shift(1));
        lines.set_at(1, Series::from_values("d", &[1.0, 2.0, 3.0]).shift(2));
        assert!(lines.unset().is_empty());
        assert_eq!(lines.watermark(), 3);
        assert_eq!(
            lines.watermarks(),
            vec![("k".to_string(), 2), ("d".to_string(), 3)]
        );
    }

    #[test]
    fn frame_has_one_column_per_slot() {
        let lines: Lines = NamedCollection::from_pairs([
            ("a", Series::from_values("a", &[1.0, 2.0])),
            ("b", Series::from_values("b", &[3.0, 4.0])),
        ]);
        let df = lines.to_frame().unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 2);
        assert_eq!(lines.to_map()["b"], vec![3.0, 4.0]);
    }

    #[test]
    fn truncate_drops_trailing_names() {
        let mut params: Params = NamedCollection::from_pairs([
            ("period", ParamValue::Int(3)),
            ("seed", ParamValue::None),
        ]);
        params.truncate(1);
        assert_eq!(params.names(), &["period".to_string()]);
        assert_eq!(params[0], ParamValue::Int(3));
    }
}
