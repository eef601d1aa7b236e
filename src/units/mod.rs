// A unit of measure is one of three kinds:
//
// - A base unit is tied directly to a dimension (Meter measures Length).
// - A composed unit is built from several factor units and measures a derived
//   dimension (MeterPerSecond measures Length × Time⁻¹ from [Meter, Second];
//   SquareMeter measures Length² from [Meter]).
// - A conversion unit is defined as a transform of another unit: its value
//   expressed in the other unit is `value OP operand` (Kilometer = Meter * 1000,
//   Celsius = Kelvin + 273.15). It has no dimension of its own.
//
// Components of a composed unit correspond, by position, to the base dimension
// names of its dimension in ascending order. A pure power dimension (a single
// base dimension with an exponent other than 1) takes exactly one component.
// This contract is checked when the unit is built, never during conversion.
//
// Unit identity during conversion is by name. Units are immutable and cheap
// to clone; they may be shared freely between threads.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    dimension::{Dimension, Exponent},
    numeric::Decimal,
};

pub mod prefixes;

/// An arithmetic step of a unit definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "^")]
    Power,
    #[serde(rename = "√")]
    Root,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Power => "^",
            Operation::Root => "√",
        }
    }

    /// The operation undoing this one for the same operand.
    pub fn inverse(self) -> Operation {
        match self {
            Operation::Add => Operation::Subtract,
            Operation::Subtract => Operation::Add,
            Operation::Multiply => Operation::Divide,
            Operation::Divide => Operation::Multiply,
            Operation::Power => Operation::Root,
            Operation::Root => Operation::Power,
        }
    }

    /// Whether `x OP operand` can be undone for every `x`.
    fn is_invertible_with(self, operand: &Decimal) -> bool {
        use num_traits::Zero;

        match self {
            Operation::Add | Operation::Subtract => true,
            Operation::Multiply | Operation::Divide | Operation::Power | Operation::Root => {
                !operand.is_zero()
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operation {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operation::Add),
            "-" => Ok(Operation::Subtract),
            "*" => Ok(Operation::Multiply),
            "/" => Ok(Operation::Divide),
            "^" => Ok(Operation::Power),
            "√" => Ok(Operation::Root),
            other => Err(UnitError::UnknownOperation(other.to_string())),
        }
    }
}

/// Errors raised while declaring units. These indicate malformed catalog data
/// and are reported at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error(
        "Composed unit '{name}' expects {expected} component(s) for dimension {dimension}, found {found}"
    )]
    ComponentCount {
        name: String,
        dimension: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "Component {index} ('{component}') of composed unit '{name}' measures {found}, expected {expected}"
    )]
    ComponentDimension {
        name: String,
        index: usize,
        component: String,
        expected: String,
        found: String,
    },

    #[error("Composed unit '{0}' cannot be built over the dimensionless dimension")]
    DimensionlessComposition(String),

    #[error("Conversion unit '{name}' is not invertible: {op} {operand}")]
    NonInvertible {
        name: String,
        op: Operation,
        operand: Decimal,
    },

    #[error("Conversion unit '{0}' needs at least one step")]
    EmptyChain(String),

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUnit {
    name: String,
    dimension: Dimension,
}

impl BaseUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }
}

/// How the components of a composed unit combine, derived from its
/// dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition<'a> {
    /// One component shared by a single base dimension raised to `exponent`.
    Power {
        component: &'a Unit,
        exponent: Exponent,
    },
    /// Each component paired with the exponent of its base dimension, in
    /// ascending base dimension order. Positive exponents multiply, negative
    /// ones divide.
    Product(Vec<(&'a Unit, Exponent)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedUnit {
    name: String,
    dimension: Dimension,
    components: Vec<Unit>,
}

impl ComposedUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn components(&self) -> &[Unit] {
        &self.components
    }

    /// The role of each component, read off the dimension's exponents.
    pub fn composition(&self) -> Composition<'_> {
        match self.dimension.as_pure_power() {
            Some((_, exponent)) => Composition::Power {
                component: &self.components[0],
                exponent,
            },
            None => Composition::Product(
                self.components
                    .iter()
                    .zip(self.dimension.exponents().values().copied())
                    .collect(),
            ),
        }
    }

    fn validate(&self) -> Result<(), UnitError> {
        if self.dimension.is_dimensionless() {
            return Err(UnitError::DimensionlessComposition(self.name.clone()));
        }

        let expected: Vec<&str> = match self.dimension.as_pure_power() {
            Some((key, _)) => vec![key],
            None => self.dimension.keys().collect(),
        };

        if expected.len() != self.components.len() {
            return Err(UnitError::ComponentCount {
                name: self.name.clone(),
                dimension: self.dimension.to_string(),
                expected: expected.len(),
                found: self.components.len(),
            });
        }

        for (index, (key, component)) in expected.iter().zip(&self.components).enumerate() {
            let wanted = Dimension::base(*key);
            if component.dimension() != &wanted {
                return Err(UnitError::ComponentDimension {
                    name: self.name.clone(),
                    index,
                    component: component.name().to_string(),
                    expected: wanted.to_string(),
                    found: component.dimension().to_string(),
                });
            }
        }

        Ok(())
    }
}

/// `base OP operand`: the value of a conversion unit, expressed in `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub base: Unit,
    pub op: Operation,
    pub operand: Decimal,
}

impl Conversion {
    pub fn new<D: Into<Decimal>>(base: Unit, op: Operation, operand: D) -> Self {
        Conversion {
            base,
            op,
            operand: operand.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionUnit {
    name: String,
    conversion: Conversion,
}

impl ConversionUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    fn validate(&self) -> Result<(), UnitError> {
        let Conversion { op, operand, .. } = &self.conversion;
        if !op.is_invertible_with(operand) {
            return Err(UnitError::NonInvertible {
                name: self.name.clone(),
                op: *op,
                operand: operand.clone(),
            });
        }
        Ok(())
    }
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Base(Arc<BaseUnit>),
    Composed(Arc<ComposedUnit>),
    Conversion(Arc<ConversionUnit>),
}

impl Unit {
    /// A unit tied directly to `dimension`.
    pub fn base<S: Into<String>>(name: S, dimension: Dimension) -> Unit {
        Unit::Base(Arc::new(BaseUnit {
            name: name.into(),
            dimension,
        }))
    }

    /// A unit built from `components`, positionally matching the sorted base
    /// dimensions of `dimension`.
    pub fn composed<S: Into<String>>(
        name: S,
        dimension: Dimension,
        components: Vec<Unit>,
    ) -> Result<Unit, UnitError> {
        let unit = ComposedUnit {
            name: name.into(),
            dimension,
            components,
        };
        unit.validate()?;
        Ok(Unit::Composed(Arc::new(unit)))
    }

    /// A unit whose value in `conversion.base` is `value OP operand`.
    pub fn conversion<S: Into<String>>(name: S, conversion: Conversion) -> Result<Unit, UnitError> {
        let unit = ConversionUnit {
            name: name.into(),
            conversion,
        };
        unit.validate()?;
        Ok(Unit::Conversion(Arc::new(unit)))
    }

    /// Skips validation; only for operands known to be invertible.
    pub(crate) fn conversion_unchecked(name: String, conversion: Conversion) -> Unit {
        Unit::Conversion(Arc::new(ConversionUnit { name, conversion }))
    }

    pub fn name(&self) -> &str {
        match self {
            Unit::Base(unit) => &unit.name,
            Unit::Composed(unit) => &unit.name,
            Unit::Conversion(unit) => &unit.name,
        }
    }

    /// Short label of the unit kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Unit::Base(_) => "base",
            Unit::Composed(_) => "composed",
            Unit::Conversion(_) => "conversion",
        }
    }

    /// The measured dimension; conversion units report their base's.
    pub fn dimension(&self) -> &Dimension {
        let mut unit = self;
        loop {
            match unit {
                Unit::Base(base) => return &base.dimension,
                Unit::Composed(composed) => return &composed.dimension,
                Unit::Conversion(conversion) => unit = &conversion.conversion.base,
            }
        }
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Re-checks the construction rules of this unit's own definition.
    pub fn validate(&self) -> Result<(), UnitError> {
        match self {
            Unit::Base(_) => Ok(()),
            Unit::Composed(composed) => composed.validate(),
            Unit::Conversion(conversion) => conversion.validate(),
        }
    }

    /// Units this one is defined in terms of.
    pub fn dependencies(&self) -> Vec<&Unit> {
        match self {
            Unit::Base(_) => Vec::new(),
            Unit::Composed(composed) => composed.components.iter().collect(),
            Unit::Conversion(conversion) => vec![&conversion.conversion.base],
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn base_unit<S: Into<String>>(name: S, dimension: Dimension) -> Unit {
    Unit::base(name, dimension)
}

pub fn composed_unit<S: Into<String>>(
    name: S,
    dimension: Dimension,
    components: Vec<Unit>,
) -> Result<Unit, UnitError> {
    Unit::composed(name, dimension, components)
}

pub fn conversion_unit<S: Into<String>>(name: S, conversion: Conversion) -> Result<Unit, UnitError> {
    Unit::conversion(name, conversion)
}

pub fn dimension_of(unit: &Unit) -> &Dimension {
    unit.dimension()
}

pub fn compatible(u1: &Unit, u2: &Unit) -> bool {
    u1.is_compatible(u2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{base_dimension, divide, power};
    use crate::test_utils::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operation_inverse_pairs() {
        for op in [
            Operation::Add,
            Operation::Subtract,
            Operation::Multiply,
            Operation::Divide,
            Operation::Power,
            Operation::Root,
        ] {
            assert_eq!(op.inverse().inverse(), op);
            assert_ne!(op.inverse(), op);
            assert_eq!(op.symbol().parse::<Operation>().unwrap(), op);
        }
        assert_eq!(Operation::Add.inverse(), Operation::Subtract);
        assert_eq!(Operation::Multiply.inverse(), Operation::Divide);
        assert_eq!(Operation::Power.inverse(), Operation::Root);
    }

    #[test]
    fn test_operation_parse_error() {
        assert_eq!(
            "%".parse::<Operation>(),
            Err(UnitError::UnknownOperation("%".to_string()))
        );
    }

    #[test]
    fn test_operation_serde_symbols() {
        use serde::de::IntoDeserializer;
        use serde::de::value::{Error as ValueError, StrDeserializer};

        let deserializer: StrDeserializer<'_, ValueError> = "√".into_deserializer();
        assert_eq!(Operation::deserialize(deserializer).unwrap(), Operation::Root);
    }

    #[test]
    fn test_dimension_of_follows_conversion_chain() {
        let f = fixtures();
        let km = Unit::conversion("Kilometer", Conversion::new(f.meter.clone(), Operation::Multiply, 1000))
            .unwrap();
        let mm = Unit::conversion("Megameter", Conversion::new(km.clone(), Operation::Multiply, 1000))
            .unwrap();
        assert_eq!(dimension_of(&mm), &base_dimension("Length"));
        assert!(compatible(&mm, &f.meter));
        assert!(!compatible(&mm, &f.second));
    }

    #[test]
    fn test_composed_product_roles() {
        let f = fixtures();
        let mps = Unit::composed(
            "MeterPerSecond",
            divide(&f.length, &f.time),
            vec![f.meter.clone(), f.second.clone()],
        )
        .unwrap();

        let Unit::Composed(composed) = &mps else {
            panic!("expected composed unit");
        };
        assert_eq!(
            composed.composition(),
            Composition::Product(vec![
                (&f.meter, Exponent::from_integer(1)),
                (&f.second, Exponent::from_integer(-1)),
            ])
        );
    }

    #[test]
    fn test_composed_power_role() {
        let f = fixtures();
        let hertz = Unit::composed("Hertz", power(&f.time, -1), vec![f.second.clone()]).unwrap();
        let Unit::Composed(composed) = &hertz else {
            panic!("expected composed unit");
        };
        assert_eq!(
            composed.composition(),
            Composition::Power {
                component: &f.second,
                exponent: Exponent::from_integer(-1),
            }
        );
    }

    #[test]
    fn test_composed_rejects_component_count_mismatch() {
        let f = fixtures();
        let err = Unit::composed(
            "SquareMeter",
            power(&f.length, 2),
            vec![f.meter.clone(), f.meter.clone()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            UnitError::ComponentCount {
                expected: 1,
                found: 2,
                ..
            }
        ));

        let err = Unit::composed("MeterPerSecond", divide(&f.length, &f.time), vec![f.meter.clone()])
            .unwrap_err();
        assert!(matches!(
            err,
            UnitError::ComponentCount {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_composed_rejects_component_order_mismatch() {
        let f = fixtures();
        let err = Unit::composed(
            "MeterPerSecond",
            divide(&f.length, &f.time),
            vec![f.second.clone(), f.meter.clone()],
        )
        .unwrap_err();
        assert!(matches!(err, UnitError::ComponentDimension { index: 0, .. }));
        assert!(err.to_string().contains("Second"));
    }

    #[test]
    fn test_composed_rejects_dimensionless() {
        let f = fixtures();
        let err = Unit::composed("Ratio", divide(&f.length, &f.length), vec![]).unwrap_err();
        assert_eq!(err, UnitError::DimensionlessComposition("Ratio".to_string()));
    }

    #[test]
    fn test_conversion_rejects_non_invertible_steps() {
        let f = fixtures();
        for op in [
            Operation::Multiply,
            Operation::Divide,
            Operation::Power,
            Operation::Root,
        ] {
            let err = Unit::conversion("Broken", Conversion::new(f.meter.clone(), op, 0)).unwrap_err();
            assert!(matches!(err, UnitError::NonInvertible { .. }));
        }
        assert!(Unit::conversion("Shifted", Conversion::new(f.meter.clone(), Operation::Add, 0)).is_ok());
    }

    #[test]
    fn test_units_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Unit>();
    }

    #[test]
    fn test_display_and_kind() {
        let f = fixtures();
        assert_eq!(f.meter.to_string(), "Meter");
        assert_eq!(f.meter.kind(), "base");
        assert!(f.meter.dependencies().is_empty());
    }
}
