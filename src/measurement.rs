use std::fmt;

use crate::{
    convert::{ConvertError, ConvertOptions, convert_with},
    numeric::Decimal,
    units::Unit,
};

/// A value expressed in a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    value: Decimal,
    unit: Unit,
}

impl Measurement {
    pub fn new<D: Into<Decimal>>(value: D, unit: Unit) -> Self {
        Measurement {
            value: value.into(),
            unit,
        }
    }

    pub fn value(&self) -> &Decimal {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// The same quantity expressed in `target`.
    pub fn convert_to(&self, target: &Unit) -> Result<Measurement, ConvertError> {
        self.convert_to_with(target, &ConvertOptions::default())
    }

    pub fn convert_to_with(
        &self,
        target: &Unit,
        options: &ConvertOptions,
    ) -> Result<Measurement, ConvertError> {
        let value = convert_with(self, target, options)?;
        Ok(Measurement {
            value,
            unit: target.clone(),
        })
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::units::prefixes::kilo;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_to_keeps_quantity() {
        let f = fixtures();
        let km = kilo(&f.meter);
        let distance = Measurement::new(2500, f.meter.clone());

        let converted = distance.convert_to(&km).unwrap();
        assert_eq!(converted.value(), &"2.5".parse::<Decimal>().unwrap());
        assert_eq!(converted.unit(), &km);
        assert_eq!(converted.to_string(), "2.5 Kilometer");

        let back = converted.convert_to(&f.meter).unwrap();
        assert_eq!(back, distance);
    }

    #[test]
    fn test_convert_to_incompatible() {
        let f = fixtures();
        let duration = Measurement::new(3, f.second.clone());
        assert!(matches!(
            duration.convert_to(&f.meter),
            Err(ConvertError::IncompatibleDimensions { .. })
        ));
    }
}
