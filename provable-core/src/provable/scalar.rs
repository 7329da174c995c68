use ark_ff::PrimeField;

use super::{expect_size, HashInput, HashInputCodec, JsonCodec, Provable};
use crate::field::{from_decimal, to_decimal, FieldVar};
use crate::utils::{ProvableError, Result};

/// A single field element. Any field element is valid, so `check` is a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldType;

impl<F: PrimeField> Provable<F> for FieldType {
    type Value = FieldVar<F>;
    type Aux = ();

    fn name(&self) -> String {
        "Field".to_string()
    }

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &FieldVar<F>) -> Vec<FieldVar<F>> {
        vec![*value]
    }

    fn to_auxiliary(&self, _value: Option<&FieldVar<F>>) {}

    fn from_fields(&self, fields: &[FieldVar<F>], _aux: ()) -> Result<FieldVar<F>> {
        expect_size(self, fields)?;
        Ok(fields[0])
    }

    fn check(&self, _value: &FieldVar<F>) -> Result<()> {
        Ok(())
    }

    fn json_codec(&self) -> Option<&dyn JsonCodec<FieldVar<F>>> {
        Some(self)
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, FieldVar<F>>> {
        Some(self)
    }
}

impl<F: PrimeField> JsonCodec<FieldVar<F>> for FieldType {
    fn encode(&self, value: &FieldVar<F>) -> Result<serde_json::Value> {
        let value = value.require_value()?;
        Ok(serde_json::Value::String(to_decimal(&value)))
    }

    fn decode(&self, json: &serde_json::Value) -> Result<FieldVar<F>> {
        let s = json
            .as_str()
            .ok_or_else(|| ProvableError::invalid_json("Field", "expected a decimal string"))?;
        from_decimal(s)
            .map(FieldVar::Constant)
            .ok_or_else(|| ProvableError::invalid_json("Field", format!("{s:?} is not a field element")))
    }
}

impl<F: PrimeField> HashInputCodec<F, FieldVar<F>> for FieldType {
    fn hash_input(&self, value: &FieldVar<F>) -> HashInput<F> {
        HashInput {
            fields: vec![*value],
            packed: Vec::new(),
        }
    }
}

/// The empty type. Occupies no field elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitType;

impl<F: PrimeField> Provable<F> for UnitType {
    type Value = ();
    type Aux = ();

    fn name(&self) -> String {
        "Unit".to_string()
    }

    fn size_in_fields(&self) -> usize {
        0
    }

    fn to_fields(&self, _value: &()) -> Vec<FieldVar<F>> {
        Vec::new()
    }

    fn to_auxiliary(&self, _value: Option<&()>) {}

    fn from_fields(&self, fields: &[FieldVar<F>], _aux: ()) -> Result<()> {
        expect_size(self, fields)
    }

    fn check(&self, _value: &()) -> Result<()> {
        Ok(())
    }

    fn json_codec(&self) -> Option<&dyn JsonCodec<()>> {
        Some(self)
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, ()>> {
        Some(self)
    }
}

impl JsonCodec<()> for UnitType {
    fn encode(&self, _value: &()) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    fn decode(&self, _json: &serde_json::Value) -> Result<()> {
        Ok(())
    }
}

impl<F: PrimeField> HashInputCodec<F, ()> for UnitType {
    fn hash_input(&self, _value: &()) -> HashInput<F> {
        HashInput::empty()
    }
}
