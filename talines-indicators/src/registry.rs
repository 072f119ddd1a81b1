//! Name, alias and group index over indicator definitions.
//!
//! A `Registry` is filled once and read many times. `catalog()` in the crate
//! root holds the standard one, built lazily on first use.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use talines_core::{IndicatorDef, SchemaError};
use tracing::{debug, trace};

use crate::{atr, dema, directional, ema, kama, macd, mathop, obv, rsi, sma, smacc, smma, stochastic, wma};

#[derive(Debug, Default)]
pub struct Registry {
    defs: BTreeMap<String, Arc<IndicatorDef>>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
    /// group -> member names, both in registration order
    groups: Vec<(String, Vec<String>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in indicator.
    pub fn standard() -> Result<Self, SchemaError> {
        let mut reg = Registry::new();

        let highest = mathop::highest()?;
        let lowest = mathop::lowest()?;
        let sumn = mathop::sumn()?;
        let sma = sma::sma()?;
        let wma = wma::wma()?;
        let ema = ema::ema()?;
        let smma = smma::smma()?;
        let dema = dema::dema(&ema)?;
        let tema = dema::tema(&ema)?;
        let kama = kama::kama()?;
        let smacc = smacc::smacc()?;
        for def in [&highest, &lowest, &sumn, &sma, &wma, &ema, &smma, &dema, &tema, &kama, &smacc] {
            reg.register(def)?;
        }

        let truerange = atr::truerange()?;
        let atr = atr::atr(&truerange, &smma)?;
        let natr = atr::natr(&atr)?;
        for def in [&truerange, &atr, &natr] {
            reg.register(def)?;
        }

        let dm_base = directional::dm_base(&smacc, &smma)?;
        let di_base = directional::di_base(&dm_base)?;
        let dx = directional::dx(&di_base)?;
        let adx = directional::adx(&dx)?;
        let adxr = directional::adxr(&adx)?;
        let directional_defs = [
            directional::plus_dm(&dm_base)?,
            directional::minus_dm(&dm_base)?,
            directional::dm(&dm_base)?,
            directional::plus_di(&di_base)?,
            directional::minus_di(&di_base)?,
            directional::di(&di_base)?,
            dx,
            adx,
            adxr,
        ];
        for def in &directional_defs {
            reg.register(def)?;
        }

        let stochf = stochastic::stochf(&sma)?;
        let stoch = stochastic::stochastic(&stochf)?;
        for def in [
            macd::macd(&ema)?,
            rsi::rsi(&smma)?,
            stochf,
            stoch,
            obv::obv()?,
        ] {
            reg.register(&def)?;
        }

        debug!(count = reg.len(), "standard registry built");
        Ok(reg)
    }

    /// Adds `def` under its name and aliases. Base fragments are skipped.
    pub fn register(&mut self, def: &Arc<IndicatorDef>) -> Result<(), SchemaError> {
        if def.is_abstract() {
            trace!(indicator = def.name(), "base fragment not registered");
            return Ok(());
        }
        let name = def.name().to_string();
        for key in std::iter::once(&name).chain(def.aliases()) {
            if self.contains(key) {
                return Err(SchemaError::AlreadyRegistered { name: key.clone() });
            }
        }

        for alias in def.aliases() {
            self.aliases.insert(alias.clone(), name.clone());
        }
        for group in def.groups() {
            match self.groups.iter_mut().find(|(g, _)| g == group) {
                Some((_, members)) => members.push(name.clone()),
                None => self.groups.push((group.clone(), vec![name.clone()])),
            }
        }
        self.defs.insert(name.clone(), Arc::clone(def));
        debug!(indicator = %name, aliases = def.aliases().len(), "indicator registered");
        Ok(())
    }

    /// Looks up a canonical name or an alias. Matching is exact.
    pub fn get(&self, name: &str) -> Option<&Arc<IndicatorDef>> {
        self.defs.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|canonical| self.defs.get(canonical))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Canonical names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.defs.keys().map(String::as_str).collect()
    }

    /// Group names in the order they were first seen.
    pub fn groups(&self) -> Vec<&str> {
        self.groups.iter().map(|(g, _)| g.as_str()).collect()
    }

    /// Members of `group` in registration order; empty for an unknown group.
    pub fn group(&self, group: &str) -> Vec<&str> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, members)| members.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<IndicatorDef>> {
        self.defs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talines_core::{Context, IndicatorError};

    fn noop(_: &mut Context<'_>) -> Result<(), IndicatorError> {
        Ok(())
    }

    fn def(name: &str, aliases: &[&str], groups: &[&str]) -> Arc<IndicatorDef> {
        IndicatorDef::builder(name)
            .outputs(["out"])
            .alias(aliases.iter().copied())
            .group(groups.iter().copied())
            .body(noop)
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_by_name_and_alias() {
        let mut reg = Registry::new();
        reg.register(&def("sma", &["SMA", "SimpleMovingAverage"], &["overlap"]))
            .unwrap();
        assert_eq!(reg.get("sma").map(|d| d.name()), Some("sma"));
        assert_eq!(reg.get("SMA").map(|d| d.name()), Some("sma"));
        assert!(reg.get("Sma").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn names_sorted_groups_in_registration_order() {
        let mut reg = Registry::new();
        reg.register(&def("rsi", &[], &["momentum"])).unwrap();
        reg.register(&def("ema", &[], &["overlap"])).unwrap();
        reg.register(&def("adx", &[], &["momentum"])).unwrap();
        assert_eq!(reg.names(), vec!["adx", "ema", "rsi"]);
        assert_eq!(reg.groups(), vec!["momentum", "overlap"]);
        assert_eq!(reg.group("momentum"), vec!["rsi", "adx"]);
        assert!(reg.group("volume").is_empty());
    }

    #[test]
    fn duplicate_name_or_alias_is_rejected() {
        let mut reg = Registry::new();
        reg.register(&def("ema", &["EMA"], &[])).unwrap();
        let err = reg.register(&def("ema", &[], &[])).unwrap_err();
        assert_eq!(err, SchemaError::AlreadyRegistered { name: "ema".into() });
        let err = reg.register(&def("other", &["EMA"], &[])).unwrap_err();
        assert_eq!(err, SchemaError::AlreadyRegistered { name: "EMA".into() });
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn base_fragments_are_skipped() {
        let base = IndicatorDef::builder("_base").build().unwrap();
        let mut reg = Registry::new();
        reg.register(&base).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn standard_registry_builds() {
        let reg = Registry::standard().unwrap();
        assert!(reg.contains("atr") && reg.contains("ATR"));
        assert!(!reg.contains("_dm") && !reg.contains("_di"));
        assert_eq!(reg.groups(), vec!["mathop", "overlap", "volatility", "momentum", "volume"]);
        assert!(reg.iter().all(|d| !d.is_abstract()));
    }
}
