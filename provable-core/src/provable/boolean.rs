use ark_ff::PrimeField;

use super::{expect_size, HashInput, HashInputCodec, JsonCodec, Provable};
use crate::field::FieldVar;
use crate::gadgets;
use crate::utils::{ProvableError, Result};

/// A field element constrained to 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Boolean<F: PrimeField>(pub FieldVar<F>);

impl<F: PrimeField> Boolean<F> {
    pub fn constant(b: bool) -> Self {
        Boolean(FieldVar::Constant(if b { F::one() } else { F::zero() }))
    }

    pub fn as_field(&self) -> &FieldVar<F> {
        &self.0
    }

    /// `None` while the value is unknown or not a valid boolean.
    pub fn value(&self) -> Option<bool> {
        let v = self.0.value()?;
        if v.is_zero() {
            Some(false)
        } else if v.is_one() {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoolType;

impl<F: PrimeField> Provable<F> for BoolType {
    type Value = Boolean<F>;
    type Aux = ();

    fn name(&self) -> String {
        "Bool".to_string()
    }

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &Boolean<F>) -> Vec<FieldVar<F>> {
        vec![value.0]
    }

    fn to_auxiliary(&self, _value: Option<&Boolean<F>>) {}

    fn from_fields(&self, fields: &[FieldVar<F>], _aux: ()) -> Result<Boolean<F>> {
        expect_size(self, fields)?;
        Ok(Boolean(fields[0]))
    }

    fn check(&self, value: &Boolean<F>) -> Result<()> {
        gadgets::assert_boolean(&value.0)
    }

    fn json_codec(&self) -> Option<&dyn JsonCodec<Boolean<F>>> {
        Some(self)
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, Boolean<F>>> {
        Some(self)
    }
}

impl<F: PrimeField> JsonCodec<Boolean<F>> for BoolType {
    fn encode(&self, value: &Boolean<F>) -> Result<serde_json::Value> {
        let b = Boolean(value.0.to_constant()?)
            .value()
            .ok_or_else(|| ProvableError::invalid_json("Bool", "value is neither 0 nor 1"))?;
        Ok(serde_json::Value::Bool(b))
    }

    fn decode(&self, json: &serde_json::Value) -> Result<Boolean<F>> {
        json.as_bool()
            .map(Boolean::constant)
            .ok_or_else(|| ProvableError::invalid_json("Bool", "expected true or false"))
    }
}

impl<F: PrimeField> HashInputCodec<F, Boolean<F>> for BoolType {
    fn hash_input(&self, value: &Boolean<F>) -> HashInput<F> {
        HashInput {
            fields: Vec::new(),
            packed: vec![(value.0, 1)],
        }
    }
}
