//! Shorthand for declaring conversion units.
//!
//! The step builders return a [`Conversion`] ready to hand to
//! [`Unit::conversion`]:
//!
//! ```rust
//! use quantities::dimension::base_dimension;
//! use quantities::units::{Unit, prefixes::{equal, kilo}};
//!
//! let meter = Unit::base("Meter", base_dimension("Length"));
//! let foot = Unit::conversion("Foot", equal("0.3048".parse::<quantities::numeric::Decimal>().unwrap(), &meter)).unwrap();
//! assert_eq!(kilo(&meter).name(), "Kilometer");
//! assert_eq!(foot.name(), "Foot");
//! ```
//!
//! Metric and binary prefixes name the new unit by prepending the prefix to
//! the lowercased unit name (`Kilo` + `byte` = `Kilobyte`).

use num_bigint::BigInt;
use num_traits::One;

use super::{Conversion, Operation, Unit, UnitError};
use crate::numeric::Decimal;

/// `base + n`
pub fn sum<D: Into<Decimal>>(base: &Unit, n: D) -> Conversion {
    Conversion::new(base.clone(), Operation::Add, n)
}

/// `base - n`
pub fn subtract<D: Into<Decimal>>(base: &Unit, n: D) -> Conversion {
    Conversion::new(base.clone(), Operation::Subtract, n)
}

/// `n` of `base` make one of the new unit.
pub fn equal<D: Into<Decimal>>(n: D, base: &Unit) -> Conversion {
    Conversion::new(base.clone(), Operation::Multiply, n)
}

/// A unit worth sixty of `base` (Minute from Second, Hour from Minute).
pub fn sixty<S: Into<String>>(base: &Unit, name: S) -> Unit {
    Unit::conversion_unchecked(name.into(), equal(60, base))
}

/// Declares `name` through a chain of steps applied in order.
///
/// A value `x` of the new unit corresponds to
/// `((x op₀ n₀) op₁ n₁) ...` in `base`. Every step but the first becomes its
/// own intermediate conversion unit, named `name#k`; the returned unit
/// carries the first step.
pub fn conv<S: Into<String>>(
    name: S,
    base: &Unit,
    steps: &[(Operation, Decimal)],
) -> Result<Unit, UnitError> {
    let name = name.into();
    if steps.is_empty() {
        return Err(UnitError::EmptyChain(name));
    }

    let mut current = base.clone();
    for (k, (op, operand)) in steps.iter().enumerate().rev() {
        let step_name = if k == 0 {
            name.clone()
        } else {
            format!("{name}#{k}")
        };
        current = Unit::conversion(step_name, Conversion::new(current, *op, operand.clone()))?;
    }
    Ok(current)
}

fn prefixed(prefix: &str, factor: Decimal, unit: &Unit) -> Unit {
    let name = format!("{}{}", prefix, unit.name().to_lowercase());
    Unit::conversion_unchecked(name, equal(factor, unit))
}

macro_rules! metric_prefix {
    ($($fn_name:ident => $prefix:literal, $exponent:literal;)*) => {
        $(
            #[doc = concat!("`", $prefix, "` prefix: 10^", stringify!($exponent), " of `unit`.")]
            pub fn $fn_name(unit: &Unit) -> Unit {
                prefixed($prefix, Decimal::pow10($exponent), unit)
            }
        )*

        /// Every metric prefix applied to `unit`, smallest first.
        pub fn metric_prefixes(unit: &Unit) -> Vec<Unit> {
            vec![$($fn_name(unit)),*]
        }
    };
}

macro_rules! binary_prefix {
    ($($fn_name:ident => $prefix:literal, $power:literal;)*) => {
        $(
            #[doc = concat!("`", $prefix, "` prefix: 2^", stringify!($power), " of `unit`.")]
            pub fn $fn_name(unit: &Unit) -> Unit {
                prefixed($prefix, Decimal::new(BigInt::one() << $power, 0), unit)
            }
        )*

        /// Every binary prefix applied to `unit`, smallest first.
        pub fn binary_prefixes(unit: &Unit) -> Vec<Unit> {
            vec![$($fn_name(unit)),*]
        }
    };
}

metric_prefix! {
    yocto => "Yocto", -24;
    zepto => "Zepto", -21;
    atto => "Atto", -18;
    femto => "Femto", -15;
    pico => "Pico", -12;
    nano => "Nano", -9;
    micro => "Micro", -6;
    milli => "Milli", -3;
    centi => "Centi", -2;
    deci => "Deci", -1;
    kilo => "Kilo", 3;
    mega => "Mega", 6;
    giga => "Giga", 9;
    tera => "Tera", 12;
    peta => "Peta", 15;
    exa => "Exa", 18;
    zetta => "Zetta", 21;
    yotta => "Yotta", 24;
}

binary_prefix! {
    kibi => "Kibi", 10;
    mebi => "Mebi", 20;
    gibi => "Gibi", 30;
    tebi => "Tebi", 40;
    pebi => "Pebi", 50;
    exbi => "Exbi", 60;
    zebi => "Zebi", 70;
    yobi => "Yobi", 80;
}
