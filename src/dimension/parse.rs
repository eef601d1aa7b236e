use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value},
    multi::{many1, separated_list1},
    sequence::{delimited, pair, preceded},
};
use thiserror::Error;

use super::{Dimension, Exponent, SUPERSCRIPT_DIGITS, SUPERSCRIPT_MINUS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionParseError {
    #[error("Invalid dimension '{input}': unexpected input at '{remaining}'")]
    Syntax { input: String, remaining: String },

    #[error("Invalid dimension '{0}': zero denominator in exponent")]
    ZeroDenominator(String),

    #[error("Invalid dimension '{0}': exponent out of range")]
    ExponentOverflow(String),
}

/// An exponent as written, before the denominator is checked.
type RawExponent = (i64, i64);

/// Parse whitespace (spaces, tabs, newlines)
fn ws<'a, P, O>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a base dimension name. Superscript digits are not part of a name.
fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphabetic() || c.is_ascii_digit() || c == '_'),
    ))
    .parse(input)
}

fn signed_integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>()
    })
    .parse(input)
}

fn superscript_digit(input: &str) -> IResult<&str, i64> {
    map_opt(one_of("⁰¹²³⁴⁵⁶⁷⁸⁹"), |c| {
        SUPERSCRIPT_DIGITS
            .iter()
            .position(|&digit| digit == c)
            .map(|position| position as i64)
    })
    .parse(input)
}

/// `²`, `⁻¹`, `¹²`
fn superscript_exponent(input: &str) -> IResult<&str, RawExponent> {
    map(
        pair(opt(char(SUPERSCRIPT_MINUS)), many1(superscript_digit)),
        |(minus, digits)| {
            let magnitude = digits
                .iter()
                .fold(0i64, |acc, digit| acc.saturating_mul(10).saturating_add(*digit));
            let numer = if minus.is_some() { -magnitude } else { magnitude };
            (numer, 1)
        },
    )
    .parse(input)
}

/// `(1/2)`, `(-3)`
fn parenthesised_exponent(input: &str) -> IResult<&str, RawExponent> {
    map(
        delimited(
            ws(char('(')),
            pair(
                ws(signed_integer),
                opt(preceded(ws(char('/')), ws(signed_integer))),
            ),
            ws(char(')')),
        ),
        |(numer, denom)| (numer, denom.unwrap_or(1)),
    )
    .parse(input)
}

/// `^2`, `^-1`, `^(1/2)`
fn caret_exponent(input: &str) -> IResult<&str, RawExponent> {
    preceded(
        ws(char('^')),
        alt((
            parenthesised_exponent,
            map(signed_integer, |numer| (numer, 1)),
        )),
    )
    .parse(input)
}

fn term(input: &str) -> IResult<&str, (&str, RawExponent)> {
    map(
        pair(name, opt(alt((superscript_exponent, caret_exponent)))),
        |(name, exponent)| (name, exponent.unwrap_or((1, 1))),
    )
    .parse(input)
}

fn separator(input: &str) -> IResult<&str, char> {
    ws(one_of("×*·")).parse(input)
}

fn dimension_terms(input: &str) -> IResult<&str, Vec<(&str, RawExponent)>> {
    alt((
        all_consuming(value(Vec::new(), ws(char('1')))),
        all_consuming(separated_list1(separator, ws(term))),
    ))
    .parse(input)
}

/// Parses a rendered dimension.
///
/// Accepts the `Display` form (`Length² × Time⁻¹`, `Length^(1/2)`, `1`) and
/// an ASCII form (`Length^2 * Time^-1`). Repeated names accumulate.
pub fn parse_dimension(input: &str) -> Result<Dimension, DimensionParseError> {
    let (_, terms) = dimension_terms(input).map_err(|err| {
        let remaining = match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e.input.to_string(),
            nom::Err::Incomplete(_) => String::new(),
        };
        DimensionParseError::Syntax {
            input: input.to_string(),
            remaining,
        }
    })?;

    let overflow = || DimensionParseError::ExponentOverflow(input.to_string());
    terms
        .into_iter()
        .try_fold(Dimension::dimensionless(), |acc, (name, (numer, denom))| {
            if denom == 0 {
                return Err(DimensionParseError::ZeroDenominator(input.to_string()));
            }
            // Reducing a ratio negates its parts.
            if numer == i64::MIN || denom == i64::MIN {
                return Err(overflow());
            }
            Dimension::base(name)
                .checked_power(Exponent::new(numer, denom))
                .and_then(|term| acc.checked_multiply(&term))
                .ok_or_else(overflow)
        })
}

impl FromStr for Dimension {
    type Err = DimensionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dimension(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dim(pairs: &[(&str, i64)]) -> Dimension {
        Dimension::from_exponents(pairs.iter().copied())
    }

    #[test]
    fn test_parse_rendered_form() {
        assert_eq!(parse_dimension("Length").unwrap(), dim(&[("Length", 1)]));
        assert_eq!(parse_dimension("Length²").unwrap(), dim(&[("Length", 2)]));
        assert_eq!(
            parse_dimension("Length × Time⁻¹").unwrap(),
            dim(&[("Length", 1), ("Time", -1)])
        );
        assert_eq!(
            parse_dimension("Length² × Mass × Time⁻²").unwrap(),
            dim(&[("Length", 2), ("Mass", 1), ("Time", -2)])
        );
        assert_eq!(parse_dimension("Length¹²").unwrap(), dim(&[("Length", 12)]));
    }

    #[test]
    fn test_parse_ascii_form() {
        assert_eq!(
            parse_dimension("Length^2 * Time^-1").unwrap(),
            dim(&[("Length", 2), ("Time", -1)])
        );
        assert_eq!(
            parse_dimension("Length^(1/2)").unwrap(),
            Dimension::base("Length").power(Exponent::new(1, 2))
        );
        assert_eq!(
            parse_dimension(" Mass · Length ^ ( -3 ) ").unwrap(),
            dim(&[("Length", -3), ("Mass", 1)])
        );
    }

    #[test]
    fn test_parse_dimensionless() {
        assert_eq!(parse_dimension("1").unwrap(), Dimension::dimensionless());
        assert_eq!(
            parse_dimension("Length * Length^-1").unwrap(),
            Dimension::dimensionless()
        );
    }

    #[test]
    fn test_repeated_names_accumulate() {
        assert_eq!(
            parse_dimension("Length * Length * Length").unwrap(),
            dim(&[("Length", 3)])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_dimension(""),
            Err(DimensionParseError::Syntax { .. })
        ));
        assert!(matches!(
            parse_dimension("Length ×"),
            Err(DimensionParseError::Syntax { .. })
        ));
        assert!(matches!(
            parse_dimension("2Length"),
            Err(DimensionParseError::Syntax { .. })
        ));
        assert_eq!(
            parse_dimension("Length^(1/0)"),
            Err(DimensionParseError::ZeroDenominator("Length^(1/0)".to_string()))
        );
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let accumulated = "Length^9223372036854775807 * Length";
        assert_eq!(
            accumulated.parse::<Dimension>(),
            Err(DimensionParseError::ExponentOverflow(accumulated.to_string()))
        );

        let min_denominator = "Length^(1/-9223372036854775808)";
        assert_eq!(
            min_denominator.parse::<Dimension>(),
            Err(DimensionParseError::ExponentOverflow(min_denominator.to_string()))
        );

        assert!(matches!(
            parse_dimension("Time^-9223372036854775808"),
            Err(DimensionParseError::ExponentOverflow(_))
        ));
        assert_eq!(
            parse_dimension("Length^9223372036854775807").unwrap(),
            Dimension::base("Length").power(i64::MAX)
        );
    }

    #[test]
    fn test_from_str() {
        let d: Dimension = "Time⁻¹".parse().unwrap();
        assert_eq!(d, Dimension::base("Time").invert());
    }
}
