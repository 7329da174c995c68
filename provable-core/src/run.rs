//! Entry points that put a computation into checked or prover mode.

use ark_ff::PrimeField;

use crate::backend::{CircuitEngine, EngineMode, EngineReport, EngineScope};
use crate::context::{self, FrameOverrides};
use crate::utils::Result;

pub use crate::context::{in_analyze, in_checked_computation, in_prover};

/// Runs `f` as prover code.
///
/// Outside a checked computation `f` just runs. Inside one it runs only when
/// prover values exist; during analysis it is skipped.
pub fn as_prover(f: impl FnOnce() -> Result<()>) -> Result<()> {
    let frame = context::current();
    if !frame.in_checked_computation {
        return f();
    }
    if !frame.in_prover {
        tracing::trace!("as_prover block skipped without prover values");
        return Ok(());
    }
    context::with_frame(FrameOverrides::new().prover(true), f)
}

/// Runs `f` as a checked computation: witnesses become variables and every
/// constraint is evaluated on the prover's values.
#[tracing::instrument(skip_all, name = "run_and_check")]
pub fn run_and_check<F, E, R>(engine: E, f: impl FnOnce() -> Result<R>) -> Result<R>
where
    F: PrimeField,
    E: CircuitEngine<F> + 'static,
{
    let (result, report) = run_with(Box::new(engine), EngineMode::Check, prover_frame(), f)?;
    tracing::debug!(rows = report.rows, "checked computation finished");
    Ok(result)
}

/// Like [`run_and_check`], but the engine only records constraints.
#[tracing::instrument(skip_all, name = "run_unchecked")]
pub fn run_unchecked<F, E, R>(engine: E, f: impl FnOnce() -> Result<R>) -> Result<R>
where
    F: PrimeField,
    E: CircuitEngine<F> + 'static,
{
    let (result, report) = run_with(Box::new(engine), EngineMode::Unchecked, prover_frame(), f)?;
    tracing::debug!(rows = report.rows, "unchecked computation finished");
    Ok(result)
}

fn prover_frame() -> FrameOverrides {
    FrameOverrides::new()
        .checked(true)
        .prover(true)
        .analyze(false)
        .witness_block(false)
}

/// Installs `engine` for the duration of `f` and finishes it afterwards,
/// whether or not `f` succeeded.
pub(crate) fn run_with<F, R>(
    mut engine: Box<dyn CircuitEngine<F>>,
    mode: EngineMode,
    overrides: FrameOverrides,
    f: impl FnOnce() -> Result<R>,
) -> Result<(R, EngineReport)>
where
    F: PrimeField,
{
    engine.begin(mode);
    let scope = EngineScope::install(engine);
    let result = context::with_frame(overrides, f);
    let finished = scope.take().finish();
    // an error from the computation takes precedence over one from finishing
    let result = result?;
    Ok((result, finished?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Constraint, ReferenceEngine};
    use crate::context::Frame;
    use crate::field::FieldVar;
    use crate::gadgets::assert_mul;
    use crate::provable::{array, BoolType, Boolean, FieldType};
    use crate::utils::ProvableError;
    use crate::witness::witness;
    use ark_bn254::Fr;

    #[test]
    fn as_prover_runs_outside_circuits() {
        let mut ran = false;
        as_prover(|| {
            ran = true;
            Ok(())
        })
        .unwrap();
        assert!(ran);
    }

    #[test]
    fn run_and_check_accepts_valid_witnesses() {
        let product = run_and_check(ReferenceEngine::<Fr>::new(), || {
            assert!(in_checked_computation());
            assert!(in_prover());
            let x = witness(&FieldType, || Ok(FieldVar::<Fr>::from_u64(3)))?;
            let y = witness(&FieldType, || Ok(FieldVar::<Fr>::from_u64(5)))?;
            let z = witness(&FieldType, || {
                Ok(FieldVar::Constant(x.require_value()? * y.require_value()?))
            })?;
            assert_mul(&x, &y, &z)?;
            let mut seen = None;
            as_prover(|| {
                seen = z.value();
                Ok(())
            })?;
            Ok(seen)
        })
        .unwrap();
        assert_eq!(product, Some(Fr::from(15u64)));
        assert_eq!(context::current(), Frame::default());
    }

    #[test]
    fn run_and_check_rejects_invalid_witnesses() {
        let result = run_and_check(ReferenceEngine::<Fr>::new(), || {
            witness(&array::<Fr, _>(BoolType, 2), || {
                Ok(vec![Boolean::constant(true), Boolean(FieldVar::from_u64(7))])
            })
        });
        assert!(matches!(result, Err(ProvableError::ConstraintViolation(_))));
        assert_eq!(context::current(), Frame::default());
    }

    /// Delegates to the reference engine but cannot produce a report.
    #[derive(Debug, Default)]
    struct UnfinishedEngine(ReferenceEngine<Fr>);

    impl CircuitEngine<Fr> for UnfinishedEngine {
        fn begin(&mut self, mode: EngineMode) {
            self.0.begin(mode)
        }

        fn exists(&mut self, arity: usize, values: Option<Vec<Fr>>) -> Result<Vec<FieldVar<Fr>>> {
            self.0.exists(arity, values)
        }

        fn add_constraint(&mut self, constraint: Constraint<Fr>) -> Result<()> {
            self.0.add_constraint(constraint)
        }

        fn finish(&mut self) -> Result<EngineReport> {
            Err(ProvableError::invalid_json("gates", "report unavailable"))
        }
    }

    #[test]
    fn computation_errors_win_over_finish_errors() {
        let result = run_and_check(UnfinishedEngine::default(), || {
            witness(&BoolType, || Ok(Boolean::<Fr>(FieldVar::from_u64(2))))
        });
        assert!(matches!(result, Err(ProvableError::ConstraintViolation(_))));

        let result = run_and_check(UnfinishedEngine::default(), || Ok(()));
        assert!(matches!(result, Err(ProvableError::InvalidJson { .. })));
        assert_eq!(context::depth(), 0);
    }

    #[test]
    fn run_unchecked_skips_evaluation() {
        let result = run_unchecked(ReferenceEngine::<Fr>::new(), || {
            witness(&BoolType, || Ok(Boolean::<Fr>(FieldVar::from_u64(7))))
        })
        .unwrap();
        assert_eq!(result.0.value(), Some(Fr::from(7u64)));
    }
}
