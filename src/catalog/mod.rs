//! # Unit Catalogs
//!
//! A [`UnitCatalog`] is a name-indexed set of units. Conversion identifies
//! units by name, so a catalog guarantees that every name it holds stands
//! for exactly one definition, including the names of units reached only
//! through other units' definitions.
//!
//! Catalogs are immutable once shared: build one, then read it from any
//! number of threads (see [`standard::standard`] for the `OnceLock`
//! pattern).

use std::collections::{BTreeMap, btree_map::Entry};

use log::{debug, warn};
use thiserror::Error;

use crate::{
    convert::{ConvertError, ConvertOptions, convert_with},
    measurement::Measurement,
    numeric::Decimal,
    units::{Unit, UnitError},
};

pub mod standard;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Unit '{0}' is already registered with a different definition")]
    Duplicate(String),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Invalid unit '{name}': {source}")]
    InvalidUnit {
        name: String,
        #[source]
        source: UnitError,
    },

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Multiple problems found while validating.
    #[error("Multiple errors occurred:\n{}", format_errors(.0))]
    Multiple(Vec<CatalogError>),
}

fn format_errors(errors: &[CatalogError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(idx, error)| format!("  {}. {}", idx + 1, error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A set of uniquely named units.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: BTreeMap<String, Unit>,
    options: ConvertOptions,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog converting with `options` instead of the defaults.
    pub fn with_options(options: ConvertOptions) -> Self {
        UnitCatalog {
            units: BTreeMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Registers `unit` and every unit its definition refers to.
    ///
    /// Nothing is registered if any of those names is already taken by a
    /// different definition.
    pub fn insert(&mut self, unit: &Unit) -> Result<(), CatalogError> {
        if self.units.get(unit.name()) == Some(unit) {
            warn!("Unit '{}' is already registered; ignoring", unit.name());
            return Ok(());
        }

        let mut pending: BTreeMap<&str, &Unit> = BTreeMap::new();
        let mut stack = vec![unit];
        while let Some(current) = stack.pop() {
            if let Some(existing) = self.units.get(current.name()) {
                if existing != current {
                    return Err(CatalogError::Duplicate(current.name().to_string()));
                }
                continue;
            }
            match pending.entry(current.name()) {
                Entry::Occupied(seen) => {
                    if *seen.get() != current {
                        return Err(CatalogError::Duplicate(current.name().to_string()));
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(current);
                    stack.extend(current.dependencies());
                }
            }
        }

        for (name, unit) in pending {
            debug!("Registering {} unit '{}'", unit.kind(), name);
            self.units.insert(name.to_string(), unit.clone());
        }
        Ok(())
    }

    /// Registers every unit in `units`, stopping at the first failure.
    pub fn insert_all<'a, I>(&mut self, units: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        units.into_iter().try_for_each(|unit| self.insert(unit))
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Result<&Unit, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::UnknownUnit(name.to_string()))
    }

    /// How many `target` units make one `source` unit.
    pub fn convert(&self, source: &str, target: &str) -> Result<Decimal, CatalogError> {
        let source = self.lookup(source)?;
        let target = self.lookup(target)?;
        Ok(convert_with(source, target, &self.options)?)
    }

    /// `value` of `source` expressed in `target`.
    pub fn convert_value<D: Into<Decimal>>(
        &self,
        value: D,
        source: &str,
        target: &str,
    ) -> Result<Decimal, CatalogError> {
        let measurement = Measurement::new(value, self.lookup(source)?.clone());
        let target = self.lookup(target)?;
        Ok(convert_with(&measurement, target, &self.options)?)
    }

    /// Re-checks every definition and that every name referenced by a
    /// definition resolves to that same definition in this catalog.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut errors = Vec::new();

        for unit in self.units.values() {
            if let Err(source) = unit.validate() {
                errors.push(CatalogError::InvalidUnit {
                    name: unit.name().to_string(),
                    source,
                });
            }
            for dependency in unit.dependencies() {
                match self.units.get(dependency.name()) {
                    Some(registered) if registered == dependency => {}
                    Some(_) => errors.push(CatalogError::Duplicate(dependency.name().to_string())),
                    None => errors.push(CatalogError::UnknownUnit(dependency.name().to_string())),
                }
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(CatalogError::Multiple(errors)),
        }
    }
}

impl<'a> IntoIterator for &'a UnitCatalog {
    type Item = &'a Unit;
    type IntoIter = std::collections::btree_map::Values<'a, String, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dimension::divide,
        test_utils::{fixtures, init_logger},
        units::{
            Conversion, Operation,
            prefixes::{conv, kilo, sixty},
        },
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_registers_dependencies() {
        init_logger();
        let f = fixtures();
        let mut catalog = UnitCatalog::new();
        catalog.insert(&kilo(&kilo(&f.meter))).unwrap();

        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["Kilokilometer", "Kilometer", "Meter"]
        );
        assert_eq!(catalog.convert("Kilokilometer", "Kilometer").unwrap(), Decimal::from(1000));
    }

    #[test]
    fn test_identical_reregistration_is_ignored() {
        let f = fixtures();
        let mut catalog = UnitCatalog::new();
        catalog.insert(&f.meter).unwrap();
        catalog.insert(&f.meter.clone()).unwrap();
        catalog.insert(&kilo(&f.meter)).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_conflicting_name_is_rejected() {
        let f = fixtures();
        let mut catalog = UnitCatalog::new();
        catalog.insert(&kilo(&f.meter)).unwrap();

        let impostor = Unit::conversion(
            "Kilometer",
            Conversion::new(f.meter.clone(), Operation::Multiply, 999),
        )
        .unwrap();
        assert_eq!(
            catalog.insert(&impostor),
            Err(CatalogError::Duplicate("Kilometer".to_string()))
        );
        assert_eq!(catalog.convert("Kilometer", "Meter").unwrap(), Decimal::from(1000));
    }

    #[test]
    fn test_conflict_inside_one_definition_registers_nothing() {
        let f = fixtures();
        let fake_second = Unit::base("Meter", f.time.clone());
        let speed = Unit::composed(
            "MeterPerSecond",
            divide(&f.length, &f.time),
            vec![f.meter.clone(), Unit::conversion("Second", Conversion::new(fake_second, Operation::Multiply, 1)).unwrap()],
        )
        .unwrap();

        let mut catalog = UnitCatalog::new();
        assert_eq!(
            catalog.insert(&speed),
            Err(CatalogError::Duplicate("Meter".to_string()))
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unknown_names() {
        let f = fixtures();
        let mut catalog = UnitCatalog::new();
        catalog.insert(&f.meter).unwrap();
        assert_eq!(
            catalog.convert("Meter", "Parsec"),
            Err(CatalogError::UnknownUnit("Parsec".to_string()))
        );
        assert!(!catalog.contains("Parsec"));
        assert!(catalog.get("Meter").is_some());
    }

    #[test]
    fn test_convert_value_and_errors() {
        let f = fixtures();
        let fahrenheit = conv(
            "Fahrenheit",
            &f.kelvin,
            &[
                (Operation::Subtract, Decimal::from(32)),
                (Operation::Multiply, Decimal::from(5)),
                (Operation::Divide, Decimal::from(9)),
                (Operation::Add, "273.15".parse().unwrap()),
            ],
        )
        .unwrap();

        let mut catalog = UnitCatalog::new();
        catalog.insert_all([&fahrenheit, &f.second, &sixty(&f.second, "Minute")]).unwrap();

        assert_eq!(
            catalog.convert_value(212, "Fahrenheit", "Kelvin").unwrap(),
            "373.15".parse::<Decimal>().unwrap()
        );
        assert_eq!(catalog.convert_value(150, "Second", "Minute").unwrap(), "2.5".parse::<Decimal>().unwrap());

        let err = catalog.convert("Fahrenheit", "Minute").unwrap_err();
        assert_eq!(err.to_string(), "Fahrenheit is not compatible with Minute");
    }

    #[test]
    fn test_validate() {
        let f = fixtures();
        let mut catalog = UnitCatalog::new();
        catalog.insert_all([&f.meter, &f.second, &kilo(&f.meter)]).unwrap();
        assert_eq!(catalog.validate(), Ok(()));
        assert_eq!(catalog.iter().count(), 3);
        assert_eq!((&catalog).into_iter().next().map(Unit::name), Some("Kilometer"));
    }

    #[test]
    fn test_multiple_errors_format() {
        let err = CatalogError::Multiple(vec![
            CatalogError::UnknownUnit("A".to_string()),
            CatalogError::Duplicate("B".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "Multiple errors occurred:\n  1. Unknown unit 'A'\n  2. Unit 'B' is already registered with a different definition"
        );
    }
}
