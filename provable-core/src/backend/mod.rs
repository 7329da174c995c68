//! The seam to the proving backend.
//!
//! The core never allocates variables or emits gates itself. It talks to a
//! [`CircuitEngine`], installed for the duration of one checked run or one
//! analysis, through this thread's engine stack.

pub mod reference;

use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};

use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

pub use reference::ReferenceEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    /// Prover values are present and every constraint is evaluated.
    Check,
    /// Prover values are present but constraints are only recorded.
    Unchecked,
    /// No prover values; the gate sequence is recorded symbolically.
    Analyze,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Byte order of gate coefficients in the emitted gate JSON.
    pub endianness: Endianness,
    /// Evaluate constraints on known values in [`EngineMode::Check`].
    pub check_constraints: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            check_constraints: true,
        }
    }
}

/// Constraints that descriptor checks can ask the engine to enforce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint<F: PrimeField> {
    /// a == b
    Equal(FieldVar<F>, FieldVar<F>),
    /// x * (x - 1) == 0
    Boolean(FieldVar<F>),
    /// a * b == c
    Mul(FieldVar<F>, FieldVar<F>, FieldVar<F>),
}

impl<F: PrimeField> Constraint<F> {
    /// Evaluates the constraint if every operand value is known.
    pub fn evaluate(&self) -> Option<bool> {
        match self {
            Constraint::Equal(a, b) => Some(a.value()? == b.value()?),
            Constraint::Boolean(x) => {
                let x = x.value()?;
                Some(x * (x - F::one()) == F::zero())
            }
            Constraint::Mul(a, b, c) => Some(a.value()? * b.value()? == c.value()?),
        }
    }

    pub fn is_constant(&self) -> bool {
        match self {
            Constraint::Equal(a, b) => a.is_constant() && b.is_constant(),
            Constraint::Boolean(x) => x.is_constant(),
            Constraint::Mul(a, b, c) => a.is_constant() && b.is_constant() && c.is_constant(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Constraint::Equal(a, b) => format!("{a} == {b}"),
            Constraint::Boolean(x) => format!("{x} is boolean"),
            Constraint::Mul(a, b, c) => format!("{a} * {b} == {c}"),
        }
    }
}

/// Position of a cell in the gate table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wire {
    pub row: usize,
    pub col: usize,
}

/// A gate as it appears in an engine's JSON output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGate {
    #[serde(rename = "type")]
    pub typ: String,
    pub wires: Vec<Wire>,
    pub coeffs: Vec<Vec<u8>>,
}

/// What an engine hands back once a run is over. Gates are JSON with
/// coefficients as raw unsigned-integer byte arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineReport {
    pub rows: usize,
    pub digest: String,
    pub gates_json: String,
    pub endianness: Endianness,
}

pub trait CircuitEngine<F: PrimeField>: Debug {
    fn begin(&mut self, mode: EngineMode);

    /// Allocates `arity` fresh variables. `values` is `Some` exactly when the
    /// prover callback ran, and then holds one value per variable.
    fn exists(&mut self, arity: usize, values: Option<Vec<F>>) -> Result<Vec<FieldVar<F>>>;

    fn add_constraint(&mut self, constraint: Constraint<F>) -> Result<()>;

    fn finish(&mut self) -> Result<EngineReport>;
}

type EngineCell<F> = RefCell<Box<dyn CircuitEngine<F>>>;

thread_local! {
    static ENGINES: RefCell<Vec<Rc<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Keeps an engine installed on this thread until it is taken back or dropped.
#[must_use]
pub struct EngineScope<F: PrimeField> {
    cell: Option<Rc<EngineCell<F>>>,
}

impl<F: PrimeField> EngineScope<F> {
    pub fn install(engine: Box<dyn CircuitEngine<F>>) -> Self {
        let cell: Rc<EngineCell<F>> = Rc::new(RefCell::new(engine));
        ENGINES.with(|engines| engines.borrow_mut().push(cell.clone() as Rc<dyn Any>));
        Self { cell: Some(cell) }
    }

    /// Uninstalls the engine and returns it.
    pub fn take(mut self) -> Box<dyn CircuitEngine<F>> {
        match self.uninstall().map(Rc::try_unwrap) {
            Some(Ok(cell)) => cell.into_inner(),
            _ => unreachable!("engine handle escaped its scope"),
        }
    }

    fn uninstall(&mut self) -> Option<Rc<EngineCell<F>>> {
        let cell = self.cell.take()?;
        ENGINES.with(|engines| {
            let top = engines.borrow_mut().pop();
            debug_assert!(
                top.is_some_and(|top| Rc::ptr_eq(&top, &(cell.clone() as Rc<dyn Any>))),
                "engine scopes must be uninstalled innermost first"
            );
        });
        Some(cell)
    }
}

impl<F: PrimeField> Drop for EngineScope<F> {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Runs `f` against the innermost installed engine for field `F`.
///
/// The engine is borrowed for the duration of `f` only; `f` must not call
/// back into user code.
pub fn with_engine<F: PrimeField, R>(
    f: impl FnOnce(&mut dyn CircuitEngine<F>) -> Result<R>,
) -> Result<R> {
    let cell = ENGINES
        .with(|engines| engines.borrow().last().cloned())
        .and_then(|top| top.downcast::<EngineCell<F>>().ok())
        .ok_or(ProvableError::NoActiveEngine)?;
    let mut engine = cell.borrow_mut();
    f(&mut **engine)
}
