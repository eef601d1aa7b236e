//! # Unit Conversion
//!
//! Converting between two units first resolves an [`OperationChain`]: the
//! steps mapping a value expressed in the source unit to the same quantity
//! expressed in the target unit. The chain is then evaluated over the
//! source value (1 for a bare unit).
//!
//! Resolution walks the unit definitions:
//!
//! - identical names resolve to the empty chain;
//! - a conversion unit on the source side contributes its own step, then
//!   resolution continues from its base;
//! - a conversion unit on the target side is resolved to its base first, then
//!   contributes the inverse of its step;
//! - two composed units over the same dimension contribute the product of
//!   their component factors, as a multiplication by its numerator and a
//!   division by its denominator.
//!
//! Two distinct base units never convert into each other, even when they
//! measure the same dimension.
//!
//! ```rust
//! use quantities::prelude::*;
//!
//! let kelvin = Unit::base("Kelvin", base_dimension("Temperature"));
//! let celsius = Unit::conversion("Celsius", sum(&kelvin, "273.15".parse::<Decimal>().unwrap())).unwrap();
//!
//! let zero_celsius = Measurement::new(0, celsius.clone());
//! assert_eq!(convert(&zero_celsius, &kelvin).unwrap().to_string(), "273.15");
//! assert_eq!(convert(&kelvin, &celsius).unwrap().to_string(), "-272.15");
//! ```

use log::{debug, trace};
use num_traits::One;
use thiserror::Error;

use crate::{
    dimension::Exponent,
    measurement::Measurement,
    numeric::{Decimal, DecimalError, MathContext},
    units::{ComposedUnit, Composition, Operation, Unit},
};

pub mod evaluate;

pub use evaluate::{EvalError, OperationChain, Step, evaluate};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("{from} is not compatible with {to}")]
    IncompatibleDimensions { from: String, to: String },

    #[error("Converting {from} to {to} nests deeper than {limit} definitions")]
    ChainTooDeep {
        from: String,
        to: String,
        limit: usize,
    },

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Settings for resolving and evaluating a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Maximum nesting of unit definitions followed during resolution.
    pub max_depth: usize,
    /// Precision of divisions and powers.
    pub context: MathContext,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            context: MathContext::DECIMAL128,
        }
    }
}

/// What is being converted: one of a unit, or a measured value.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Unit(&'a Unit),
    Measurement(&'a Measurement),
}

impl Source<'_> {
    pub fn unit(&self) -> &Unit {
        match self {
            Source::Unit(unit) => *unit,
            Source::Measurement(measurement) => measurement.unit(),
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Source::Unit(_) => Decimal::one(),
            Source::Measurement(measurement) => measurement.value().clone(),
        }
    }
}

impl<'a> From<&'a Unit> for Source<'a> {
    fn from(unit: &'a Unit) -> Self {
        Source::Unit(unit)
    }
}

impl<'a> From<&'a Measurement> for Source<'a> {
    fn from(measurement: &'a Measurement) -> Self {
        Source::Measurement(measurement)
    }
}

/// Converts `source` into `target` with the default options.
///
/// For a unit this is the number of `target` units in one source unit; for a
/// measurement it is its value expressed in `target`.
pub fn convert<'a, S: Into<Source<'a>>>(source: S, target: &Unit) -> Result<Decimal, ConvertError> {
    convert_with(source, target, &ConvertOptions::default())
}

pub fn convert_with<'a, S: Into<Source<'a>>>(
    source: S,
    target: &Unit,
    options: &ConvertOptions,
) -> Result<Decimal, ConvertError> {
    let source = source.into();
    let result = resolve_with(source.unit(), target, options).and_then(|chain| {
        chain
            .evaluate(&source.value(), options.context)
            .map_err(ConvertError::from)
    });
    if let Err(err) = &result {
        debug!("Conversion of {} to {} failed: {}", source.unit(), target, err);
    }
    result
}

/// Resolves the chain from `from` to `to` with the default options.
pub fn resolve(from: &Unit, to: &Unit) -> Result<OperationChain, ConvertError> {
    resolve_with(from, to, &ConvertOptions::default())
}

pub fn resolve_with(
    from: &Unit,
    to: &Unit,
    options: &ConvertOptions,
) -> Result<OperationChain, ConvertError> {
    if !from.is_compatible(to) {
        return Err(incompatible(from, to));
    }

    let resolver = Resolver { from, to, options };
    let chain = resolver.resolve(from, to, 0)?;
    debug!("Resolved {} -> {}: {}", from, to, chain);
    Ok(chain)
}

fn incompatible(from: &Unit, to: &Unit) -> ConvertError {
    ConvertError::IncompatibleDimensions {
        from: from.name().to_string(),
        to: to.name().to_string(),
    }
}

struct Resolver<'a> {
    from: &'a Unit,
    to: &'a Unit,
    options: &'a ConvertOptions,
}

impl Resolver<'_> {
    fn resolve(&self, from: &Unit, to: &Unit, depth: usize) -> Result<OperationChain, ConvertError> {
        if depth > self.options.max_depth {
            return Err(ConvertError::ChainTooDeep {
                from: self.from.name().to_string(),
                to: self.to.name().to_string(),
                limit: self.options.max_depth,
            });
        }

        trace!(
            "Resolving {} ({}) -> {} ({}) at depth {}",
            from,
            from.kind(),
            to,
            to.kind(),
            depth
        );

        if from.name() == to.name() {
            return Ok(OperationChain::new());
        }

        match (from, to) {
            (Unit::Conversion(source), _) => {
                let conversion = source.conversion();
                let mut chain =
                    OperationChain::from(Step::new(conversion.op, conversion.operand.clone()));
                chain.append(self.resolve(&conversion.base, to, depth + 1)?);
                Ok(chain)
            }
            (_, Unit::Conversion(target)) => {
                let conversion = target.conversion();
                let mut chain = self.resolve(from, &conversion.base, depth + 1)?;
                chain.push(Step::new(conversion.op, conversion.operand.clone()).inverse());
                Ok(chain)
            }
            (Unit::Composed(source), Unit::Composed(target)) => {
                let factor = self.composed_factor(source, target, depth)?;
                Ok(factor.into_chain())
            }
            _ => Err(incompatible(from, to)),
        }
    }

    /// How many `target` units make one `source` unit, built from the
    /// factors between corresponding components.
    fn composed_factor(
        &self,
        source: &ComposedUnit,
        target: &ComposedUnit,
        depth: usize,
    ) -> Result<Factor, ConvertError> {
        let mismatch = || ConvertError::IncompatibleDimensions {
            from: source.name().to_string(),
            to: target.name().to_string(),
        };
        if source.dimension() != target.dimension() {
            return Err(mismatch());
        }

        match (source.composition(), target.composition()) {
            (
                Composition::Power {
                    component: from,
                    exponent,
                },
                Composition::Power { component: to, .. },
            ) => self
                .component_factor(from, to, depth)?
                .raise(exponent, self.options.context),
            (Composition::Product(from), Composition::Product(to)) => from.iter().zip(&to).try_fold(
                Factor::one(),
                |acc, ((from, exponent), (to, _))| -> Result<Factor, ConvertError> {
                    let factor = self.component_factor(from, to, depth)?;
                    if *exponent > Exponent::from_integer(0) {
                        Ok(acc.multiply(&factor.raise(*exponent, self.options.context)?))
                    } else {
                        Ok(acc.divide(&factor.raise(-*exponent, self.options.context)?))
                    }
                },
            ),
            // Equal dimensions always share a composition shape.
            _ => Err(mismatch()),
        }
    }

    /// How many `to` units make one `from` unit.
    fn component_factor(&self, from: &Unit, to: &Unit, depth: usize) -> Result<Factor, ConvertError> {
        self.resolve(from, to, depth + 1)?
            .iter()
            .try_fold(Factor::one(), |factor, step| {
                factor.apply(step, self.options.context)
            })
    }
}

/// A conversion factor held as `numer / denom`, so that chains of
/// divisions stay exact until evaluated against a value.
#[derive(Debug, Clone, PartialEq)]
struct Factor {
    numer: Decimal,
    denom: Decimal,
}

impl Factor {
    fn one() -> Self {
        Factor {
            numer: Decimal::one(),
            denom: Decimal::one(),
        }
    }

    fn apply(self, step: &Step, context: MathContext) -> Result<Factor, ConvertError> {
        let Factor { numer, denom } = self;
        let operand = &step.operand;

        let factor = match step.op {
            Operation::Add => Factor {
                numer: &numer + &(operand * &denom),
                denom,
            },
            Operation::Subtract => Factor {
                numer: &numer - &(operand * &denom),
                denom,
            },
            Operation::Multiply => Factor {
                numer: &numer * operand,
                denom,
            },
            Operation::Divide => Factor {
                numer,
                denom: &denom * operand,
            },
            Operation::Power if operand.is_integer() => {
                let exponent = operand.to_i64().ok_or_else(|| EvalError {
                    value: numer.clone(),
                    op: step.op,
                    operand: operand.clone(),
                    source: DecimalError::NotFinite(operand.to_f64()),
                })?;
                let numer = Step::new(Operation::Power, exponent.abs()).apply(&numer, context)?;
                let denom = Step::new(Operation::Power, exponent.abs()).apply(&denom, context)?;
                if exponent < 0 {
                    Factor {
                        numer: denom,
                        denom: numer,
                    }
                } else {
                    Factor { numer, denom }
                }
            }
            Operation::Power | Operation::Root => {
                let value = Step::new(Operation::Divide, denom).apply(&numer, context)?;
                Factor {
                    numer: step.apply(&value, context)?,
                    denom: Decimal::one(),
                }
            }
        };
        Ok(factor)
    }

    /// `self ^ exponent`, taking `p/q` as a power of `p` then a root of `q`.
    fn raise(self, exponent: Exponent, context: MathContext) -> Result<Factor, ConvertError> {
        let mut factor = self;
        if !exponent.numer().is_one() {
            factor = factor.apply(&Step::new(Operation::Power, *exponent.numer()), context)?;
        }
        if !exponent.denom().is_one() {
            factor = factor.apply(&Step::new(Operation::Root, *exponent.denom()), context)?;
        }
        Ok(factor)
    }

    fn multiply(&self, other: &Factor) -> Factor {
        Factor {
            numer: &self.numer * &other.numer,
            denom: &self.denom * &other.denom,
        }
    }

    fn divide(&self, other: &Factor) -> Factor {
        Factor {
            numer: &self.numer * &other.denom,
            denom: &self.denom * &other.numer,
        }
    }

    /// `* numer` then `/ denom`, leaving out multiplications by one.
    fn into_chain(self) -> OperationChain {
        let mut chain = OperationChain::new();
        if !self.numer.is_one() {
            chain.push(Step::new(Operation::Multiply, self.numer));
        }
        if !self.denom.is_one() {
            chain.push(Step::new(Operation::Divide, self.denom));
        }
        chain
    }
}
