#![allow(clippy::len_without_is_empty)]
#![allow(clippy::assertions_on_result_states)]
#![allow(clippy::type_complexity)]

pub mod analyze;
pub mod backend;
pub mod context;
pub mod field;
pub mod gadgets;
pub mod memo;
pub mod provable;
pub mod run;
pub mod utils;
pub mod witness;

pub use analyze::{constraint_system, ConstraintSystemSummary, Gate};
pub use backend::{CircuitEngine, EngineConfig, Endianness, ReferenceEngine};
pub use field::FieldVar;
pub use memo::{get_blinding_value, MemoRecord};
pub use provable::{array, pair, BoolType, Boolean, FieldType, Provable, UnitType};
pub use run::{as_prover, in_analyze, in_checked_computation, in_prover, run_and_check, run_unchecked};
pub use utils::{ProvableError, Result};
pub use witness::witness;
