//! A deterministic in-memory engine.
//!
//! Every constraint becomes one `Generic` row
//! `cl * l + cr * r + co * o + cm * l * r + cc == 0`.

use std::collections::HashMap;

use ark_ff::{BigInteger, PrimeField};
use sha3::{Digest, Sha3_256};

use super::{
    CircuitEngine, Constraint, EngineConfig, EngineMode, EngineReport, Endianness, RawGate, Wire,
};
use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

const GENERIC_GATE: &str = "Generic";
const COLUMNS: usize = 3;

// Coefficient slots of a generic row.
const CL: usize = 0;
const CM: usize = 3;
const CC: usize = 4;

#[derive(Clone, Debug)]
struct GenericRow<F: PrimeField> {
    vars: [Option<usize>; COLUMNS],
    coeffs: [F; 5],
    wires: [Wire; COLUMNS],
}

impl<F: PrimeField> GenericRow<F> {
    fn empty() -> Self {
        Self {
            vars: [None; COLUMNS],
            coeffs: [F::zero(); 5],
            wires: [Wire { row: 0, col: 0 }; COLUMNS],
        }
    }

    /// Adds `scale * x`, folding constants into `cc`.
    fn push_linear(&mut self, x: &FieldVar<F>, scale: F) -> Result<()> {
        match x {
            FieldVar::Constant(c) => self.coeffs[CC] += scale * c,
            FieldVar::Variable { index, .. } => {
                let col = self.vars.iter().position(Option::is_none).ok_or_else(|| {
                    ProvableError::UnsupportedConstraint(format!(
                        "generic rows hold at most {COLUMNS} variables, cannot add v{index}"
                    ))
                })?;
                self.vars[col] = Some(*index);
                self.coeffs[CL + col] = scale;
            }
        }
        Ok(())
    }

    fn from_constraint(constraint: &Constraint<F>) -> Result<Self> {
        let mut row = Self::empty();
        match constraint {
            Constraint::Equal(a, b) => {
                row.push_linear(a, F::one())?;
                row.push_linear(b, -F::one())?;
            }
            Constraint::Boolean(x) => {
                // x * x - x == 0
                let index = x.index();
                row.vars = [index, index, None];
                row.coeffs[CL] = -F::one();
                row.coeffs[CM] = F::one();
            }
            Constraint::Mul(a, b, c) => match (a, b) {
                (FieldVar::Constant(k), other) | (other, FieldVar::Constant(k)) => {
                    row.push_linear(other, *k)?;
                    row.push_linear(c, -F::one())?;
                }
                _ => {
                    row.vars = [a.index(), b.index(), None];
                    row.coeffs[CM] = F::one();
                    match c {
                        FieldVar::Constant(k) => row.coeffs[CC] -= k,
                        FieldVar::Variable { index, .. } => {
                            row.vars[2] = Some(*index);
                            row.coeffs[2] = -F::one();
                        }
                    }
                }
            },
        }
        Ok(row)
    }
}

#[derive(Debug)]
pub struct ReferenceEngine<F: PrimeField> {
    config: EngineConfig,
    mode: EngineMode,
    num_vars: usize,
    rows: Vec<GenericRow<F>>,
    last_position: HashMap<usize, Wire>,
}

impl<F: PrimeField> ReferenceEngine<F> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            mode: EngineMode::Check,
            num_vars: 0,
            rows: Vec::new(),
            last_position: HashMap::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn checks_values(&self) -> bool {
        self.mode == EngineMode::Check && self.config.check_constraints
    }

    fn coeff_bytes(&self, coeff: &F) -> Vec<u8> {
        let repr = coeff.into_bigint();
        match self.config.endianness {
            Endianness::Little => repr.to_bytes_le(),
            Endianness::Big => repr.to_bytes_be(),
        }
    }

    fn raw_gates(&self) -> Vec<RawGate> {
        self.rows
            .iter()
            .map(|row| RawGate {
                typ: GENERIC_GATE.to_string(),
                wires: row.wires.to_vec(),
                coeffs: row.coeffs.iter().map(|c| self.coeff_bytes(c)).collect(),
            })
            .collect()
    }
}

impl<F: PrimeField> Default for ReferenceEngine<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> CircuitEngine<F> for ReferenceEngine<F> {
    fn begin(&mut self, mode: EngineMode) {
        tracing::debug!(?mode, "reference engine started");
        self.mode = mode;
    }

    fn exists(&mut self, arity: usize, values: Option<Vec<F>>) -> Result<Vec<FieldVar<F>>> {
        if let Some(values) = &values {
            if values.len() != arity {
                return Err(ProvableError::shape("exists", arity, values.len()));
            }
        }
        let start = self.num_vars;
        self.num_vars += arity;
        let vars = (start..self.num_vars)
            .enumerate()
            .map(|(i, index)| FieldVar::Variable {
                index,
                value: values.as_ref().map(|values| values[i]),
            })
            .collect();
        Ok(vars)
    }

    fn add_constraint(&mut self, constraint: Constraint<F>) -> Result<()> {
        if constraint.is_constant() {
            return match constraint.evaluate() {
                Some(false) => Err(ProvableError::ConstraintViolation(constraint.describe())),
                _ => Ok(()),
            };
        }

        let row_index = self.rows.len();
        if self.checks_values() && constraint.evaluate() == Some(false) {
            return Err(ProvableError::ConstraintViolation(format!(
                "row {row_index}: {}",
                constraint.describe()
            )));
        }

        let mut row = GenericRow::from_constraint(&constraint)?;
        for col in 0..COLUMNS {
            let here = Wire {
                row: row_index,
                col,
            };
            row.wires[col] = match row.vars[col] {
                Some(var) => self.last_position.insert(var, here).unwrap_or(here),
                None => here,
            };
        }
        self.rows.push(row);
        Ok(())
    }

    fn finish(&mut self) -> Result<EngineReport> {
        let gates_json = serde_json::to_string(&self.raw_gates())?;
        let digest = hex::encode(Sha3_256::digest(gates_json.as_bytes()));
        tracing::debug!(rows = self.rows.len(), vars = self.num_vars, %digest, "reference engine finished");
        Ok(EngineReport {
            rows: self.rows.len(),
            digest,
            gates_json,
            endianness: self.config.endianness,
        })
    }
}
