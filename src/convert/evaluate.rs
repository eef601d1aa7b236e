use std::fmt;

use log::trace;
use thiserror::Error;

use crate::{
    numeric::{Decimal, DecimalError, MathContext},
    units::Operation,
};

/// A step of an [`OperationChain`] that could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot evaluate {value} {op} {operand}: {source}")]
pub struct EvalError {
    pub value: Decimal,
    pub op: Operation,
    pub operand: Decimal,
    #[source]
    pub source: DecimalError,
}

/// One arithmetic operation with its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub op: Operation,
    pub operand: Decimal,
}

impl Step {
    pub fn new<D: Into<Decimal>>(op: Operation, operand: D) -> Self {
        Step {
            op,
            operand: operand.into(),
        }
    }

    /// The step undoing this one.
    pub fn inverse(&self) -> Step {
        Step {
            op: self.op.inverse(),
            operand: self.operand.clone(),
        }
    }

    /// Computes `value OP operand`.
    ///
    /// Addition, subtraction and multiplication are exact. Division and
    /// integer powers round to `context`. Fractional powers and roots go
    /// through `f64`.
    pub fn apply(&self, value: &Decimal, context: MathContext) -> Result<Decimal, EvalError> {
        let result = match self.op {
            Operation::Add => Ok(value + &self.operand),
            Operation::Subtract => Ok(value - &self.operand),
            Operation::Multiply => Ok(value * &self.operand),
            Operation::Divide => value.checked_div(&self.operand, context),
            Operation::Power => match self.operand.to_i64() {
                Some(exponent) => value.powi(exponent, context),
                None => value.powf(self.operand.to_f64()),
            },
            Operation::Root => value.nth_root(&self.operand),
        };

        result.map_err(|source| EvalError {
            value: value.clone(),
            op: self.op,
            operand: self.operand.clone(),
            source,
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.operand)
    }
}

/// An ordered list of steps taking a value from one unit to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationChain {
    steps: Vec<Step>,
}

impl OperationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Appends every step of `other`, keeping order.
    pub fn append(&mut self, other: OperationChain) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Folds the steps over `seed`, left to right.
    pub fn evaluate(&self, seed: &Decimal, context: MathContext) -> Result<Decimal, EvalError> {
        evaluate(&self.steps, seed, context)
    }
}

/// Applies `steps` in order, starting from `seed`.
pub fn evaluate<'a, I>(steps: I, seed: &Decimal, context: MathContext) -> Result<Decimal, EvalError>
where
    I: IntoIterator<Item = &'a Step>,
{
    steps.into_iter().try_fold(seed.clone(), |value, step| {
        let next = step.apply(&value, context)?;
        trace!("{} {} = {}", value, step, next);
        Ok(next)
    })
}

impl From<Step> for OperationChain {
    fn from(step: Step) -> Self {
        OperationChain { steps: vec![step] }
    }
}

impl FromIterator<Step> for OperationChain {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        OperationChain {
            steps: iter.into_iter().collect(),
        }
    }
}

impl Extend<Step> for OperationChain {
    fn extend<I: IntoIterator<Item = Step>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

impl<'a> IntoIterator for &'a OperationChain {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for OperationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x")?;
        for step in &self.steps {
            write!(f, " {}", step)?;
        }
        Ok(())
    }
}
