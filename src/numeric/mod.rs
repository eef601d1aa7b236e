//! # Arbitrary-Precision Decimals
//!
//! This module implements the decimal number type every conversion factor is
//! expressed in. Binary floating point cannot represent most decimal
//! constants (`0.3048`, `273.15`) exactly, and chains of scale/unscale steps
//! drift under it, so all arithmetic in this crate runs on [`Decimal`].
//!
//! ## Representation
//!
//! A [`Decimal`] is a `BigInt` coefficient scaled by a power of ten:
//! `value = coefficient × 10^(-scale)`. Values are kept normalized (no
//! trailing zero digits in the coefficient, zero has scale 0), which makes
//! equality, hashing and display value-based: `1.000` and `1` are the same
//! decimal and both display as `1`.
//!
//! ## Precision Rules
//!
//! - **Addition, subtraction, multiplication** are exact.
//! - **Division and integer powers** round to a [`MathContext`] (half-even
//!   rounding to a fixed number of significant digits). The default context,
//!   [`MathContext::DECIMAL128`], keeps 34 significant digits.
//! - **Fractional powers and roots** fall back to `f64` and re-enter the
//!   decimal domain through the shortest round-trip representation of the
//!   float. This is the one place precision is knowingly given up.
//!
//! ## Examples
//!
//! ```rust
//! use quantities::numeric::{Decimal, MathContext};
//!
//! let big: Decimal = "22222222222222222222".parse().unwrap();
//! let half = big.checked_div(&Decimal::from(2), MathContext::DECIMAL128).unwrap();
//! assert_eq!(half.to_string(), "11111111111111111111");
//!
//! let third = Decimal::from(1)
//!     .checked_div(&Decimal::from(3), MathContext::DECIMAL128)
//!     .unwrap();
//! assert_eq!(third.to_string(), "0.3333333333333333333333333333333333");
//! ```
//!
//! ## Parsing
//!
//! The accepted syntax is the usual one for decimal literals:
//!
//! ```bnf
//! decimal ::= [+ | -] { [digit]+[.[digit]*] | [digit]*.[digit]+ }[{E | e} [{+ | -}] [digit]+]
//! ```
//!
//! ```rust
//! use quantities::numeric::{Decimal, DecimalError};
//! use std::str::FromStr;
//!
//! assert_eq!(Decimal::from_str("1.5e3").unwrap(), Decimal::from(1500));
//! assert!(matches!(Decimal::from_str("1.2.3"), Err(DecimalError::MultipleDecimalPoints(_))));
//! assert!(matches!(Decimal::from_str("1E"), Err(DecimalError::InvalidExponent(_))));
//! ```

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing or computing with decimals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecimalError {
    /// The input string is empty or contains only whitespace.
    #[error("Empty decimal")]
    Empty,

    /// Multiple decimal points found in the number.
    ///
    /// Examples: `"1.2.3"`, `"..5"`
    #[error("Multiple decimal points: '{0}'")]
    MultipleDecimalPoints(String),

    /// The exponent after `E`/`e` is missing, malformed or out of range.
    ///
    /// Examples: `"1E"`, `"1e+"`, `"1e1000001"`
    #[error("Invalid exponent: '{0}'")]
    InvalidExponent(String),

    /// Unexpected character found in the number.
    ///
    /// Examples: `"1a2"`, `"1,000"`
    #[error("Unexpected character: '{1}' in '{0}'")]
    UnexpectedCharacter(String, char),

    /// No digits found in the mantissa.
    ///
    /// Examples: `"."`, `"-"`
    #[error("No digits: '{0}'")]
    NoDigits(String),

    /// A floating point value (input or fallback result) is NaN or infinite.
    #[error("Not a finite number: {0}")]
    NotFinite(f64),

    /// Division (or a negative power) of zero.
    #[error("Division by zero")]
    DivisionByZero,
}

/// Significant-digit budget for rounded operations.
///
/// Rounding is always half-even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MathContext {
    /// Number of significant decimal digits kept by rounded operations.
    pub precision: u32,
}

impl MathContext {
    /// 34 significant digits, the precision of IEEE 754 decimal128.
    pub const DECIMAL128: MathContext = MathContext { precision: 34 };

    /// Creates a context keeping `precision` significant digits (at least one).
    pub const fn new(precision: u32) -> Self {
        MathContext {
            precision: if precision == 0 { 1 } else { precision },
        }
    }

    /// A wider context used for intermediate results.
    fn with_guard_digits(self) -> Self {
        MathContext::new(self.precision.saturating_add(GUARD_DIGITS))
    }
}

impl Default for MathContext {
    fn default() -> Self {
        MathContext::DECIMAL128
    }
}

const GUARD_DIGITS: u32 = 10;

/// Largest magnitude accepted for a written exponent (`1e1000000`).
const MAX_EXPONENT: u64 = 1_000_000;

/// An arbitrary-precision decimal number.
///
/// See the [module documentation](self) for representation and precision
/// rules.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    coefficient: BigInt,
    scale: i64,
}

fn pow10(exponent: u64) -> BigInt {
    BigInt::from(10u32).pow(u32::try_from(exponent).unwrap_or(u32::MAX))
}

fn digit_count(value: &BigInt) -> u64 {
    if value.is_zero() {
        return 1;
    }
    value.magnitude().to_str_radix(10).len() as u64
}

impl Decimal {
    /// Creates `coefficient × 10^(-scale)`.
    ///
    /// ```rust
    /// use quantities::numeric::Decimal;
    ///
    /// assert_eq!(Decimal::new(3048, 4).to_string(), "0.3048");
    /// assert_eq!(Decimal::new(5, -3).to_string(), "5000");
    /// ```
    pub fn new<C: Into<BigInt>>(coefficient: C, scale: i64) -> Self {
        Decimal::normalized(coefficient.into(), scale)
    }

    /// Exactly `10^exponent`.
    pub fn pow10(exponent: i64) -> Self {
        Decimal::normalized(BigInt::one(), -exponent)
    }

    fn normalized(mut coefficient: BigInt, mut scale: i64) -> Self {
        if coefficient.is_zero() {
            return Decimal {
                coefficient,
                scale: 0,
            };
        }

        let ten = BigInt::from(10u32);
        while (&coefficient % &ten).is_zero() {
            coefficient /= &ten;
            scale -= 1;
        }

        Decimal { coefficient, scale }
    }

    /// Rounds `coefficient × 10^(-scale)` to the context precision.
    ///
    /// `inexact` marks that the true value lies strictly beyond the given
    /// coefficient (a non-zero division remainder), which breaks half-way ties
    /// upwards.
    fn rounded(coefficient: BigInt, scale: i64, context: MathContext, inexact: bool) -> Self {
        let digits = digit_count(&coefficient);
        let precision = u64::from(context.precision);
        if digits <= precision {
            return Decimal::normalized(coefficient, scale);
        }

        let dropped = digits - precision;
        let divisor = pow10(dropped);
        let negative = coefficient.is_negative();
        let magnitude = coefficient.abs();

        let two = BigInt::from(2u32);

        let mut quotient = &magnitude / &divisor;
        let remainder = &magnitude % &divisor;
        let twice = &remainder * &two;

        let round_up = match twice.cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => inexact || !(&quotient % &two).is_zero(),
        };
        if round_up {
            quotient += BigInt::one();
        }

        let coefficient = if negative { -quotient } else { quotient };
        Decimal::normalized(coefficient, scale - dropped as i64)
    }

    /// Brings two decimals to a common scale, returning both coefficients and
    /// that scale.
    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, i64) {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (
                self.coefficient.clone(),
                other.coefficient.clone(),
                self.scale,
            ),
            Ordering::Greater => {
                let shift = (self.scale - other.scale) as u64;
                (
                    self.coefficient.clone(),
                    &other.coefficient * pow10(shift),
                    self.scale,
                )
            }
            Ordering::Less => {
                let shift = (other.scale - self.scale) as u64;
                (
                    &self.coefficient * pow10(shift),
                    other.coefficient.clone(),
                    other.scale,
                )
            }
        }
    }

    /// Returns `true` for negative values (zero is not negative).
    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    /// Returns `true` when the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.scale <= 0
    }

    /// Absolute value.
    pub fn abs(&self) -> Decimal {
        Decimal {
            coefficient: self.coefficient.abs(),
            scale: self.scale,
        }
    }

    /// The value as an `i64`, if it is an integer in range.
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        let shift = self.scale.unsigned_abs();
        if shift > 18 {
            return None;
        }
        (&self.coefficient * pow10(shift)).to_i64()
    }

    /// Nearest `f64` to this value.
    pub fn to_f64(&self) -> f64 {
        format!("{}e{}", self.coefficient, -self.scale)
            .parse()
            .unwrap_or(f64::NAN)
    }

    /// Rounds to the precision of `context`.
    pub fn round(&self, context: MathContext) -> Decimal {
        Decimal::rounded(self.coefficient.clone(), self.scale, context, false)
    }

    /// Divides by `divisor`, rounding the quotient to `context`.
    ///
    /// Exact quotients with no more significant digits than the context
    /// allows are returned exactly.
    pub fn checked_div(
        &self,
        divisor: &Decimal,
        context: MathContext,
    ) -> Result<Decimal, DecimalError> {
        if divisor.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Decimal::zero());
        }

        let numerator = self.coefficient.abs();
        let denominator = divisor.coefficient.abs();

        // Shift the numerator so the integer quotient has at least one digit
        // more than the context keeps.
        let shift = (i64::from(context.precision) + 1 + digit_count(&denominator) as i64
            - digit_count(&numerator) as i64)
            .max(0);

        let scaled = numerator * pow10(shift as u64);
        let quotient = &scaled / &denominator;
        let inexact = !(&scaled % &denominator).is_zero();

        let quotient = if self.is_negative() != divisor.is_negative() {
            -quotient
        } else {
            quotient
        };

        Ok(Decimal::rounded(
            quotient,
            self.scale - divisor.scale + shift,
            context,
            inexact,
        ))
    }

    /// Raises to an integer power, rounding to `context`.
    ///
    /// Negative exponents yield the rounded reciprocal; `x^0` is exactly 1.
    pub fn powi(&self, exponent: i64, context: MathContext) -> Result<Decimal, DecimalError> {
        if exponent == 0 {
            return Ok(Decimal::one());
        }

        let working = context.with_guard_digits();
        let mut remaining = exponent.unsigned_abs();
        let mut base = self.clone();
        let mut result = Decimal::one();

        while remaining > 0 {
            if remaining & 1 == 1 {
                result = (&result * &base).round(working);
            }
            remaining >>= 1;
            if remaining > 0 {
                base = (&base * &base).round(working);
            }
        }

        if exponent < 0 {
            Decimal::one().checked_div(&result, context)
        } else {
            Ok(result.round(context))
        }
    }

    /// Raises to an arbitrary real power through `f64`.
    pub fn powf(&self, exponent: f64) -> Result<Decimal, DecimalError> {
        debug!("Falling back to f64 for {} ^ {}", self, exponent);
        Decimal::try_from(self.to_f64().powf(exponent))
    }

    /// The `degree`-th root, computed as `x^(1/degree)` through `f64`.
    ///
    /// Odd integer roots of negative values keep their sign.
    pub fn nth_root(&self, degree: &Decimal) -> Result<Decimal, DecimalError> {
        if degree.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }

        let odd = degree.to_i64().is_some_and(|n| n % 2 != 0);
        let inverse = 1.0 / degree.to_f64();

        if self.is_negative() && odd {
            return Ok(-self.abs().powf(inverse)?);
        }
        self.powf(inverse)
    }
}

impl Zero for Decimal {
    fn zero() -> Self {
        Decimal {
            coefficient: BigInt::zero(),
            scale: 0,
        }
    }

    fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }
}

impl One for Decimal {
    fn one() -> Self {
        Decimal {
            coefficient: BigInt::one(),
            scale: 0,
        }
    }
}

impl Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(rhs);
        Decimal::normalized(a + b, scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(rhs);
        Decimal::normalized(a - b, scale)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl Mul<&Decimal> for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::normalized(&self.coefficient * &rhs.coefficient, self.scale + rhs.scale)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        &self * &rhs
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            coefficient: -self.coefficient,
            scale: self.scale,
        }
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        -self.clone()
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(value, 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = DecimalError;

    /// Converts through the shortest decimal string that round-trips to the
    /// same float, so `0.3048` becomes exactly `0.3048`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(DecimalError::NotFinite(value));
        }
        format!("{}", value).parse()
    }
}

/// Splits a numeric string into mantissa and optional exponent part.
fn split_exponent(input: &str) -> (&str, Option<&str>) {
    match input.find(|c: char| c == 'E' || c == 'e') {
        Some(pos) => (&input[0..pos], Some(&input[pos..])),
        None => (input, None),
    }
}

/// Parses the mantissa into a coefficient and the number of fractional
/// digits.
fn parse_main(full: &str, input: &str) -> Result<(BigInt, i64), DecimalError> {
    let (negative, unsigned) = match input.chars().next() {
        Some('-') => (true, &input[1..]),
        Some('+') => (false, &input[1..]),
        _ => (false, input),
    };

    let mut digits = String::with_capacity(unsigned.len());
    let mut fractional_digits: i64 = 0;
    let mut has_decimal = false;

    for ch in unsigned.chars() {
        match ch {
            '0'..='9' => {
                digits.push(ch);
                if has_decimal {
                    fractional_digits += 1;
                }
            }
            '.' => {
                if has_decimal {
                    return Err(DecimalError::MultipleDecimalPoints(full.to_string()));
                }
                has_decimal = true;
            }
            c => {
                return Err(DecimalError::UnexpectedCharacter(full.to_string(), c));
            }
        }
    }

    if digits.is_empty() {
        return Err(DecimalError::NoDigits(full.to_string()));
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| DecimalError::NoDigits(full.to_string()))?;
    let coefficient = if negative { -magnitude } else { magnitude };

    Ok((coefficient, fractional_digits))
}

/// Parses the exponent part of scientific notation (including the `E`).
fn parse_exponent(full: &str, input: &str) -> Result<i64, DecimalError> {
    let remaining = &input[1..];
    let digits = remaining
        .strip_prefix('+')
        .or_else(|| remaining.strip_prefix('-'))
        .unwrap_or(remaining);

    if digits.is_empty() {
        return Err(DecimalError::InvalidExponent(full.to_string()));
    }
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(DecimalError::UnexpectedCharacter(full.to_string(), c));
    }

    remaining
        .parse::<i64>()
        .ok()
        .filter(|exponent| exponent.unsigned_abs() <= MAX_EXPONENT)
        .ok_or_else(|| DecimalError::InvalidExponent(full.to_string()))
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        if input.is_empty() {
            return Err(DecimalError::Empty);
        }

        let (main_part, exp_part) = split_exponent(input);
        if main_part.is_empty() {
            return Err(DecimalError::NoDigits(input.to_string()));
        }

        let (coefficient, fractional_digits) = parse_main(input, main_part)?;
        let exponent = exp_part
            .map(|exp| parse_exponent(input, exp))
            .transpose()?
            .unwrap_or(0);

        Ok(Decimal::normalized(coefficient, fractional_digits - exponent))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.coefficient.magnitude().to_str_radix(10);

        if self.scale <= 0 {
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return write!(f, "{}{}{}", sign, digits, zeros);
        }

        let scale = self.scale as usize;
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, integer, fraction)
        } else {
            let zeros = "0".repeat(scale - digits.len());
            write!(f, "{}0.{}{}", sign, zeros, digits)
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({})", self)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
