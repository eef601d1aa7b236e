//! # Dimension Algebra
//!
//! A physical dimension is represented canonically as a product of named base
//! dimensions raised to rational exponents:
//!
//! - Speed = Length¹ × Time⁻¹ → `{ Length: 1, Time: -1 }`
//! - Area = Length² → `{ Length: 2 }`
//! - Force = Length¹ × Mass¹ × Time⁻² → `{ Length: 1, Mass: 1, Time: -2 }`
//!
//! Exponents equal to zero are never stored and keys are kept sorted, so two
//! dimensions describe the same physical quantity exactly when their maps are
//! equal, no matter how each was derived:
//!
//! ```rust
//! use quantities::dimension::{base_dimension, divide, multiply, power, dimensionless};
//!
//! let length = base_dimension("Length");
//! let time = base_dimension("Time");
//!
//! assert_eq!(multiply(&length, &length), power(&length, 2));
//! assert_eq!(divide(&length, &time), multiply(&length, &power(&time, -1)));
//! assert_eq!(divide(&length, &length), dimensionless());
//! ```
//!
//! Composed units rely on this: a unit declared over `multiply(L, L)` and one
//! declared over `power(L, 2)` are recognized as interconvertible.
//!
//! ## Rendering
//!
//! [`Dimension`] implements `Display` with names in ascending order joined by
//! `" × "` and Unicode superscript exponents (`Length² × Time⁻¹`). Fractional
//! exponents render as `Length^(1/2)`. The dimensionless dimension renders
//! as `1`. The [`parse`] submodule reads both this form and an ASCII form
//! back into a [`Dimension`].

use std::{
    collections::BTreeMap,
    fmt,
    ops::{Div, Mul},
};

use itertools::Itertools;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, CheckedSub, One, Zero};
use serde::{Deserialize, Serialize};

pub mod parse;

pub use parse::DimensionParseError;

/// Exponent of a base dimension. Exact rational, so `Length^(1/2)` is
/// representable.
pub type Exponent = Rational64;

/// Values usable as a dimension exponent.
pub trait IntoExponent {
    fn into_exponent(self) -> Exponent;
}

impl IntoExponent for i32 {
    fn into_exponent(self) -> Exponent {
        Exponent::from_integer(i64::from(self))
    }
}

impl IntoExponent for i64 {
    fn into_exponent(self) -> Exponent {
        Exponent::from_integer(self)
    }
}

impl IntoExponent for Exponent {
    fn into_exponent(self) -> Exponent {
        self
    }
}

/// A physical dimension in canonical exponent form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Exponent>",
    into = "BTreeMap<String, Exponent>"
)]
pub struct Dimension {
    exponents: BTreeMap<String, Exponent>,
}

impl Dimension {
    /// A base dimension: `{ name: 1 }`.
    pub fn base<S: Into<String>>(name: S) -> Self {
        let mut exponents = BTreeMap::new();
        exponents.insert(name.into(), Exponent::one());
        Dimension { exponents }
    }

    /// The dimension of pure numbers: `{}`.
    pub fn dimensionless() -> Self {
        Dimension::default()
    }

    /// Builds a dimension from arbitrary exponents, dropping zeros.
    ///
    /// Repeated names accumulate.
    ///
    /// ```rust
    /// use quantities::dimension::Dimension;
    ///
    /// let force = Dimension::from_exponents([("Mass", 1), ("Length", 1), ("Time", -2), ("Current", 0)]);
    /// assert_eq!(force.to_string(), "Length × Mass × Time⁻²");
    /// ```
    pub fn from_exponents<I, K, E>(exponents: I) -> Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<String>,
        E: IntoExponent,
    {
        let mut map: BTreeMap<String, Exponent> = BTreeMap::new();
        for (name, exponent) in exponents {
            *map.entry(name.into()).or_insert_with(Exponent::zero) += exponent.into_exponent();
        }
        Dimension::normalized(map)
    }

    fn normalized(mut exponents: BTreeMap<String, Exponent>) -> Self {
        exponents.retain(|_, exponent| !exponent.is_zero());
        Dimension { exponents }
    }

    /// The non-zero exponents, sorted by base dimension name.
    pub fn exponents(&self) -> &BTreeMap<String, Exponent> {
        &self.exponents
    }

    /// Exponent of `name`, zero when absent.
    pub fn exponent(&self, name: &str) -> Exponent {
        self.exponents
            .get(name)
            .copied()
            .unwrap_or_else(Exponent::zero)
    }

    /// Base dimension names in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.exponents.keys().map(String::as_str)
    }

    /// Number of base dimensions with a non-zero exponent.
    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    /// For a single base dimension with an exponent other than 1 (Area =
    /// Length², Frequency = Time⁻¹), returns that base and exponent.
    pub fn as_pure_power(&self) -> Option<(&str, Exponent)> {
        match self.exponents.iter().exactly_one() {
            Ok((name, exponent)) if !exponent.is_one() => Some((name.as_str(), *exponent)),
            _ => None,
        }
    }

    /// Adds exponents elementwise.
    ///
    /// Panics if an exponent overflows; see [`checked_multiply`](Self::checked_multiply).
    pub fn multiply(&self, other: &Dimension) -> Dimension {
        let mut exponents = self.exponents.clone();
        for (name, exponent) in &other.exponents {
            *exponents
                .entry(name.clone())
                .or_insert_with(Exponent::zero) += exponent;
        }
        Dimension::normalized(exponents)
    }

    /// Subtracts exponents elementwise. Panics on overflow.
    pub fn divide(&self, other: &Dimension) -> Dimension {
        let mut exponents = self.exponents.clone();
        for (name, exponent) in &other.exponents {
            *exponents
                .entry(name.clone())
                .or_insert_with(Exponent::zero) -= exponent;
        }
        Dimension::normalized(exponents)
    }

    /// Scales every exponent by `n`. `n = 0` yields the dimensionless
    /// dimension. Panics on overflow.
    pub fn power<N: IntoExponent>(&self, n: N) -> Dimension {
        let n = n.into_exponent();
        Dimension::normalized(
            self.exponents
                .iter()
                .map(|(name, exponent)| (name.clone(), exponent * n))
                .collect(),
        )
    }

    /// Negates every exponent.
    pub fn invert(&self) -> Dimension {
        self.power(-1)
    }

    /// [`multiply`](Self::multiply), or `None` if an exponent overflows.
    pub fn checked_multiply(&self, other: &Dimension) -> Option<Dimension> {
        self.combine(other, |a, b| a.checked_add(b))
    }

    /// [`divide`](Self::divide), or `None` if an exponent overflows.
    pub fn checked_divide(&self, other: &Dimension) -> Option<Dimension> {
        self.combine(other, |a, b| a.checked_sub(b))
    }

    /// [`power`](Self::power), or `None` if an exponent overflows.
    pub fn checked_power<N: IntoExponent>(&self, n: N) -> Option<Dimension> {
        let n = n.into_exponent();
        self.exponents
            .iter()
            .map(|(name, exponent)| exponent.checked_mul(&n).map(|e| (name.clone(), e)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Dimension::normalized)
    }

    fn combine<F>(&self, other: &Dimension, op: F) -> Option<Dimension>
    where
        F: Fn(&Exponent, &Exponent) -> Option<Exponent>,
    {
        let mut exponents = self.exponents.clone();
        for (name, exponent) in &other.exponents {
            let slot = exponents.entry(name.clone()).or_insert_with(Exponent::zero);
            *slot = op(&*slot, exponent)?;
        }
        Some(Dimension::normalized(exponents))
    }
}

impl Mul for &Dimension {
    type Output = Dimension;

    fn mul(self, rhs: &Dimension) -> Dimension {
        self.multiply(rhs)
    }
}

impl Div for &Dimension {
    type Output = Dimension;

    fn div(self, rhs: &Dimension) -> Dimension {
        self.divide(rhs)
    }
}

impl From<BTreeMap<String, Exponent>> for Dimension {
    fn from(exponents: BTreeMap<String, Exponent>) -> Self {
        Dimension::normalized(exponents)
    }
}

impl From<Dimension> for BTreeMap<String, Exponent> {
    fn from(dimension: Dimension) -> Self {
        dimension.exponents
    }
}

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const SUPERSCRIPT_MINUS: char = '⁻';

fn render_exponent(exponent: &Exponent) -> String {
    if exponent.is_one() {
        return String::new();
    }
    if !exponent.is_integer() {
        return format!("^({})", exponent);
    }

    exponent
        .to_integer()
        .to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(digit) => SUPERSCRIPT_DIGITS[digit as usize],
            None => SUPERSCRIPT_MINUS,
        })
        .collect()
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let rendered = self
            .exponents
            .iter()
            .map(|(name, exponent)| format!("{}{}", name, render_exponent(exponent)))
            .join(" × ");
        write!(f, "{}", rendered)
    }
}

/// `{ name: 1 }`.
pub fn base_dimension<S: Into<String>>(name: S) -> Dimension {
    Dimension::base(name)
}

/// `{}`.
pub fn dimensionless() -> Dimension {
    Dimension::dimensionless()
}

pub fn is_dimensionless(d: &Dimension) -> bool {
    d.is_dimensionless()
}

/// Elementwise-summed exponents, zeros dropped.
pub fn multiply(d1: &Dimension, d2: &Dimension) -> Dimension {
    d1.multiply(d2)
}

/// Elementwise-subtracted exponents, zeros dropped.
pub fn divide(d1: &Dimension, d2: &Dimension) -> Dimension {
    d1.divide(d2)
}

/// Every exponent scaled by `n`.
pub fn power<N: IntoExponent>(d: &Dimension, n: N) -> Dimension {
    d.power(n)
}

/// `power(d, -1)`.
pub fn invert(d: &Dimension) -> Dimension {
    d.invert()
}

/// Canonical-map identity.
pub fn equals(d1: &Dimension, d2: &Dimension) -> bool {
    d1 == d2
}

/// Deterministic rendering, see [`Dimension`]'s `Display`.
pub fn dimension_to_string(d: &Dimension) -> String {
    d.to_string()
}
