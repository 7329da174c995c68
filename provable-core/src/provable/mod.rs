//! Provable type descriptors.
//!
//! A descriptor explains how values of one type are laid out as a fixed
//! number of field elements plus auxiliary data that never enters the
//! circuit. For every value `v` of a descriptor `T`,
//! `T.from_fields(&T.to_fields(&v), T.to_auxiliary(Some(&v)))` is equal to
//! `v`, and `T.size_in_fields()` does not depend on `v`.
//!
//! JSON and hash-input encodings are optional capabilities. Descriptors
//! expose them through [`Provable::json_codec`] and
//! [`Provable::hash_input_codec`]; asking for a missing one fails with
//! [`ProvableError::MissingCapability`].

pub mod array;
pub mod boolean;
pub mod pair;
pub mod scalar;

use std::fmt::Debug;

use ark_ff::PrimeField;

use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

pub use array::{array, ArrayOf};
pub use boolean::{BoolType, Boolean};
pub use pair::{pair, PairOf};
pub use scalar::{FieldType, UnitType};

pub trait Provable<F: PrimeField> {
    type Value: Clone + Debug;
    type Aux: Clone + Debug + 'static;

    /// Human readable type name, used in diagnostics.
    fn name(&self) -> String;

    fn size_in_fields(&self) -> usize;

    fn to_fields(&self, value: &Self::Value) -> Vec<FieldVar<F>>;

    /// Auxiliary data for `value`. With `None` this yields the layout a value
    /// would have, so the shape can be derived before any value exists.
    fn to_auxiliary(&self, value: Option<&Self::Value>) -> Self::Aux;

    fn from_fields(&self, fields: &[FieldVar<F>], aux: Self::Aux) -> Result<Self::Value>;

    /// Constrains the type's invariants. Never alters the field representation.
    fn check(&self, value: &Self::Value) -> Result<()>;

    fn json_codec(&self) -> Option<&dyn JsonCodec<Self::Value>> {
        None
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, Self::Value>> {
        None
    }

    fn to_json(&self, value: &Self::Value) -> Result<serde_json::Value> {
        self.json_codec()
            .ok_or_else(|| missing_capability(self.name(), "JSON"))?
            .encode(value)
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<Self::Value> {
        self.json_codec()
            .ok_or_else(|| missing_capability(self.name(), "JSON"))?
            .decode(json)
    }

    fn to_input(&self, value: &Self::Value) -> Result<HashInput<F>> {
        Ok(self
            .hash_input_codec()
            .ok_or_else(|| missing_capability(self.name(), "hash input"))?
            .hash_input(value))
    }
}

pub trait JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<serde_json::Value>;
    fn decode(&self, json: &serde_json::Value) -> Result<T>;
}

pub trait HashInputCodec<F: PrimeField, T> {
    fn hash_input(&self, value: &T) -> HashInput<F>;
}

/// Input to an algebraic hash: whole field elements, plus small values that
/// a hasher may pack several to a field element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashInput<F: PrimeField> {
    pub fields: Vec<FieldVar<F>>,
    /// (value, bit width)
    pub packed: Vec<(FieldVar<F>, u32)>,
}

impl<F: PrimeField> Default for HashInput<F> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            packed: Vec::new(),
        }
    }
}

impl<F: PrimeField> HashInput<F> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn append(mut self, other: HashInput<F>) -> Self {
        self.fields.extend(other.fields);
        self.packed.extend(other.packed);
        self
    }
}

pub(crate) fn missing_capability(type_name: String, capability: &'static str) -> ProvableError {
    ProvableError::MissingCapability {
        type_name,
        capability,
    }
}

/// Checks that a flat field sequence has the descriptor's size.
pub(crate) fn expect_size<F: PrimeField, T: Provable<F> + ?Sized>(
    ty: &T,
    fields: &[FieldVar<F>],
) -> Result<()> {
    let expected = ty.size_in_fields();
    if fields.len() != expected {
        return Err(ProvableError::shape(ty.name(), expected, fields.len()));
    }
    Ok(())
}
