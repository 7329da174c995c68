//! Symbolic evaluation of a computation into its gate sequence.

use std::fmt::Write;

use ark_ff::PrimeField;
use num::BigUint;
use serde::Serialize;

use crate::backend::{CircuitEngine, EngineMode, Endianness, RawGate, Wire};
use crate::context::FrameOverrides;
use crate::run::run_with;
use crate::utils::Result;

/// A gate with its coefficients rendered as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Gate {
    #[serde(rename = "type")]
    pub typ: String,
    pub wires: Vec<Wire>,
    pub coeffs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintSystemSummary<R> {
    pub rows: usize,
    pub digest: String,
    pub result: R,
    pub gates: Vec<Gate>,
}

impl<R> ConstraintSystemSummary<R> {
    /// One line per gate: `row: type wires coeffs`.
    pub fn print_gates(&self) -> String {
        let mut out = String::new();
        for (row, gate) in self.gates.iter().enumerate() {
            let wires = gate
                .wires
                .iter()
                .map(|w| format!("({}, {})", w.row, w.col))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "{row}: {} [{wires}] [{}]", gate.typ, gate.coeffs.join(", "));
        }
        out
    }
}

/// Runs `f` without prover values and summarizes the constraints it emits.
///
/// Witness computations and `as_prover` blocks are skipped, so the result
/// only depends on the shape of the computation.
#[tracing::instrument(skip_all, name = "constraint_system")]
pub fn constraint_system<F, E, R>(
    engine: E,
    f: impl FnOnce() -> Result<R>,
) -> Result<ConstraintSystemSummary<R>>
where
    F: PrimeField,
    E: CircuitEngine<F> + 'static,
{
    let overrides = FrameOverrides::new()
        .checked(true)
        .analyze(true)
        .prover(false)
        .witness_block(false);
    let (result, report) = run_with(Box::new(engine), EngineMode::Analyze, overrides, f)?;
    let gates = decode_gates(&report.gates_json, report.endianness)?;
    tracing::info!(rows = report.rows, digest = %report.digest, "constraint system analyzed");
    Ok(ConstraintSystemSummary {
        rows: report.rows,
        digest: report.digest,
        result,
        gates,
    })
}

/// Parses an engine's gate JSON, converting byte-array coefficients to
/// decimal strings.
pub fn decode_gates(gates_json: &str, endianness: Endianness) -> Result<Vec<Gate>> {
    let raw: Vec<RawGate> = serde_json::from_str(gates_json)?;
    Ok(raw
        .into_iter()
        .map(|gate| Gate {
            typ: gate.typ,
            wires: gate.wires,
            coeffs: gate
                .coeffs
                .iter()
                .map(|bytes| decode_coeff(bytes, endianness))
                .collect(),
        })
        .collect())
}

fn decode_coeff(bytes: &[u8], endianness: Endianness) -> String {
    match endianness {
        Endianness::Little => BigUint::from_bytes_le(bytes),
        Endianness::Big => BigUint::from_bytes_be(bytes),
    }
    .to_string()
}
