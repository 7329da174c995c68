//! Introducing externally computed values into a computation.

use ark_ff::PrimeField;

use crate::backend;
use crate::context::{self, FrameGuard, FrameOverrides};
use crate::field::FieldVar;
use crate::memo;
use crate::provable::{expect_size, Provable};
use crate::utils::{ProvableError, Result};

/// Witnesses a value of type `ty`.
///
/// Outside a checked computation, and inside another witness block, this
/// just runs `compute` and normalizes the result through its field
/// representation. Inside a checked computation the value is bound to fresh
/// circuit variables and constrained by `ty.check`. During analysis
/// `compute` is never run and the variables carry no values.
///
/// When a memoization pass is active the value is replayed from, or
/// recorded into, the pass's record.
#[tracing::instrument(skip_all, name = "witness", fields(ty = %ty.name()))]
pub fn witness<F, T>(ty: &T, compute: impl FnOnce() -> Result<T::Value>) -> Result<T::Value>
where
    F: PrimeField,
    T: Provable<F> + ?Sized,
{
    let frame = context::current();
    if !frame.in_checked_computation || frame.in_witness_block {
        let value = memo::replay_or_compute(ty, compute)?;
        return canonicalize(ty, &value);
    }

    let block = FrameGuard::enter(FrameOverrides::new().witness_block(true));
    let size = ty.size_in_fields();

    let prover_value = if frame.in_prover {
        Some(context::with_frame(FrameOverrides::new().prover(true), || {
            memo::replay_or_compute(ty, compute)
        })?)
    } else {
        None
    };

    let values = match &prover_value {
        Some(value) => {
            let fields = ty.to_fields(value);
            if fields.len() != size {
                return Err(ProvableError::shape(ty.name(), size, fields.len()));
            }
            let values = fields
                .iter()
                .map(FieldVar::require_value)
                .collect::<Result<Vec<F>>>()?;
            Some(values)
        }
        None => None,
    };

    let vars = backend::with_engine(|engine| engine.exists(size, values))?;
    expect_size(ty, &vars)?;
    drop(block);

    // auxiliary data never enters the circuit, so it comes from the prover value
    let aux = ty.to_auxiliary(prover_value.as_ref());
    let value = ty.from_fields(&vars, aux)?;
    ty.check(&value)?;
    Ok(value)
}

/// Rebuilds `value` from its own field representation.
pub fn canonicalize<F, T>(ty: &T, value: &T::Value) -> Result<T::Value>
where
    F: PrimeField,
    T: Provable<F> + ?Sized,
{
    let fields = ty.to_fields(value);
    expect_size(ty, &fields)?;
    ty.from_fields(&fields, ty.to_auxiliary(Some(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{EngineMode, EngineScope, ReferenceEngine};
    use crate::context::{with_frame, Frame};
    use crate::provable::{array, BoolType, Boolean, FieldType};
    use ark_bn254::Fr;

    fn checked<R>(f: impl FnOnce() -> R) -> R {
        let mut engine = ReferenceEngine::<Fr>::new();
        crate::backend::CircuitEngine::begin(&mut engine, EngineMode::Check);
        let _scope = EngineScope::install(Box::new(engine));
        with_frame(FrameOverrides::new().checked(true).prover(true), f)
    }

    #[test]
    fn outside_checked_computation_returns_the_value() {
        let xs = vec![FieldVar::<Fr>::from_u64(1), FieldVar::from_u64(2)];
        let out = witness(&array::<Fr, _>(FieldType, 2), || Ok(xs.clone())).unwrap();
        assert_eq!(out, xs);
        assert_eq!(context::current(), Frame::default());
    }

    #[test]
    fn checked_witness_allocates_variables() {
        let out = checked(|| {
            witness(&array::<Fr, _>(BoolType, 3), || {
                Ok(vec![
                    Boolean::constant(true),
                    Boolean::constant(false),
                    Boolean::constant(true),
                ])
            })
        })
        .unwrap();
        assert_eq!(out.len(), 3);
        for (i, b) in out.iter().enumerate() {
            assert_eq!(b.0.index(), Some(i));
        }
        assert_eq!(
            out.iter().map(Boolean::value).collect::<Vec<_>>(),
            vec![Some(true), Some(false), Some(true)]
        );
    }

    #[test]
    fn failing_check_unwinds_the_witness_block() {
        let err = checked(|| {
            let err = witness(&BoolType, || Ok(Boolean::<Fr>(FieldVar::from_u64(2)))).unwrap_err();
            assert!(!context::current().in_witness_block);
            err
        });
        assert!(matches!(err, ProvableError::ConstraintViolation(_)));
    }

    #[test]
    fn failing_compute_unwinds_the_witness_block() {
        checked(|| {
            let depth = context::depth();
            let result = witness(&FieldType, || -> Result<FieldVar<Fr>> {
                assert!(context::current().in_witness_block);
                Err(ProvableError::NoMemoScope)
            });
            assert!(matches!(result, Err(ProvableError::NoMemoScope)));
            assert_eq!(context::depth(), depth);
        });
    }

    #[test]
    fn nested_witness_short_circuits() {
        let out = checked(|| {
            witness(&FieldType, || {
                let inner = witness(&FieldType, || Ok(FieldVar::<Fr>::from_u64(4)))?;
                // nested values are plain prover values, not new variables
                assert!(inner.is_constant());
                Ok(inner)
            })
        })
        .unwrap();
        assert_eq!(out.index(), Some(0));
        assert_eq!(out.value(), Some(Fr::from(4u64)));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = checked(|| {
            witness(&array::<Fr, _>(FieldType, 3), || {
                Ok(vec![FieldVar::from_u64(1)])
            })
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ProvableError::ShapeMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn checked_witness_without_engine_fails() {
        let result = with_frame(FrameOverrides::new().checked(true).prover(true), || {
            witness(&FieldType, || Ok(FieldVar::<Fr>::from_u64(1)))
        });
        assert!(matches!(result, Err(ProvableError::NoActiveEngine)));
        assert_eq!(context::depth(), 0);
    }
}
