//! Constraint primitives for descriptor checks.
//!
//! Inside a checked computation a constraint is handed to the installed
//! engine. Everywhere else, and whenever all operands are constants, it is
//! evaluated on the spot.

use ark_ff::PrimeField;

use crate::backend::{self, Constraint};
use crate::context;
use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

pub fn enforce<F: PrimeField>(constraint: Constraint<F>) -> Result<()> {
    if constraint.is_constant() || !context::in_checked_computation() {
        return match constraint.evaluate() {
            Some(false) => Err(ProvableError::ConstraintViolation(constraint.describe())),
            _ => Ok(()),
        };
    }
    tracing::trace!(constraint = %constraint.describe(), "enforce");
    backend::with_engine(|engine| engine.add_constraint(constraint))
}

pub fn assert_equal<F: PrimeField>(a: &FieldVar<F>, b: &FieldVar<F>) -> Result<()> {
    enforce(Constraint::Equal(*a, *b))
}

pub fn assert_boolean<F: PrimeField>(x: &FieldVar<F>) -> Result<()> {
    enforce(Constraint::Boolean(*x))
}

/// Constrain a * b == c
pub fn assert_mul<F: PrimeField>(a: &FieldVar<F>, b: &FieldVar<F>, c: &FieldVar<F>) -> Result<()> {
    enforce(Constraint::Mul(*a, *b, *c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{with_frame, FrameOverrides};
    use ark_bn254::Fr;

    #[test]
    fn evaluates_eagerly_outside_checked_computation() {
        let two = FieldVar::<Fr>::from_u64(2);
        let three = FieldVar::from_u64(3);
        let six = FieldVar::from_u64(6);
        assert!(assert_mul(&two, &three, &six).is_ok());
        assert!(assert_equal(&two, &three).is_err());
        assert!(assert_boolean(&FieldVar::<Fr>::from_u64(1)).is_ok());
        assert!(matches!(
            assert_boolean(&two),
            Err(ProvableError::ConstraintViolation(_))
        ));

        let known = FieldVar::Variable {
            index: 0,
            value: Some(Fr::from(2u64)),
        };
        assert!(assert_boolean(&known).is_err());
        let unknown = FieldVar::<Fr>::Variable {
            index: 0,
            value: None,
        };
        assert!(assert_boolean(&unknown).is_ok());
    }

    #[test]
    fn checked_computation_needs_an_engine() {
        let x = FieldVar::<Fr>::Variable {
            index: 0,
            value: Some(Fr::from(1u64)),
        };
        let result = with_frame(FrameOverrides::new().checked(true), || assert_boolean(&x));
        assert!(matches!(result, Err(ProvableError::NoActiveEngine)));

        // constants never reach the engine
        let result = with_frame(FrameOverrides::new().checked(true), || {
            assert_boolean(&FieldVar::<Fr>::from_u64(0))
        });
        assert!(result.is_ok());
    }
}
