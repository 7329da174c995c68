//! Field values as seen by circuit code.
//!
//! A [`FieldVar`] is either a constant known to everybody, or a circuit
//! variable whose value is only known to the prover. During symbolic
//! analysis variables carry no value at all.

use std::fmt::{self, Display};
use std::str::FromStr;

use ark_ff::PrimeField;
use num::BigUint;

use crate::utils::{ProvableError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldVar<F: PrimeField> {
    Constant(F),
    Variable { index: usize, value: Option<F> },
}

impl<F: PrimeField> FieldVar<F> {
    pub fn constant(value: F) -> Self {
        FieldVar::Constant(value)
    }

    pub fn from_u64(n: u64) -> Self {
        FieldVar::Constant(F::from(n))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, FieldVar::Constant(_))
    }

    /// The concrete value, if it is known at this point of the computation.
    pub fn value(&self) -> Option<F> {
        match self {
            FieldVar::Constant(c) => Some(*c),
            FieldVar::Variable { value, .. } => *value,
        }
    }

    /// Detaches the value from whatever variable produced it.
    pub fn to_constant(&self) -> Result<Self> {
        match self {
            FieldVar::Constant(_) => Ok(*self),
            FieldVar::Variable { .. } => self.require_value().map(FieldVar::Constant),
        }
    }

    pub fn require_value(&self) -> Result<F> {
        match self {
            FieldVar::Constant(c) => Ok(*c),
            FieldVar::Variable { index, value } => value.ok_or(ProvableError::MissingValue(*index)),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            FieldVar::Constant(_) => None,
            FieldVar::Variable { index, .. } => Some(*index),
        }
    }
}

impl<F: PrimeField> From<F> for FieldVar<F> {
    fn from(value: F) -> Self {
        FieldVar::Constant(value)
    }
}

impl<F: PrimeField> Display for FieldVar<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldVar::Constant(c) => write!(f, "{}", to_decimal(c)),
            FieldVar::Variable { index, value: Some(v) } => write!(f, "v{index}={}", to_decimal(v)),
            FieldVar::Variable { index, value: None } => write!(f, "v{index}"),
        }
    }
}

pub fn to_decimal<F: PrimeField>(value: &F) -> String {
    let n: BigUint = (*value).into();
    n.to_string()
}

/// Parses a canonical decimal representation, rejecting values outside the field.
pub fn from_decimal<F: PrimeField>(s: &str) -> Option<F> {
    let n = BigUint::from_str(s.trim()).ok()?;
    let modulus: BigUint = F::MODULUS.into();
    if n >= modulus {
        return None;
    }
    Some(F::from(n))
}
