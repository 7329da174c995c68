//! Two descriptors side by side.

use std::marker::PhantomData;

use ark_ff::PrimeField;

use super::{expect_size, HashInput, HashInputCodec, JsonCodec, Provable};
use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

#[derive(Clone, Debug)]
pub struct PairOf<F: PrimeField, A: Provable<F>, B: Provable<F>> {
    first: A,
    second: B,
    _field: PhantomData<F>,
}

pub fn pair<F: PrimeField, A: Provable<F>, B: Provable<F>>(first: A, second: B) -> PairOf<F, A, B> {
    PairOf {
        first,
        second,
        _field: PhantomData,
    }
}

impl<F: PrimeField, A: Provable<F>, B: Provable<F>> Provable<F> for PairOf<F, A, B> {
    type Value = (A::Value, B::Value);
    type Aux = (A::Aux, B::Aux);

    fn name(&self) -> String {
        format!("({}, {})", self.first.name(), self.second.name())
    }

    fn size_in_fields(&self) -> usize {
        self.first.size_in_fields() + self.second.size_in_fields()
    }

    fn to_fields(&self, (a, b): &(A::Value, B::Value)) -> Vec<FieldVar<F>> {
        let mut fields = self.first.to_fields(a);
        fields.extend(self.second.to_fields(b));
        fields
    }

    fn to_auxiliary(&self, value: Option<&(A::Value, B::Value)>) -> (A::Aux, B::Aux) {
        (
            self.first.to_auxiliary(value.map(|(a, _)| a)),
            self.second.to_auxiliary(value.map(|(_, b)| b)),
        )
    }

    fn from_fields(
        &self,
        fields: &[FieldVar<F>],
        (aux_a, aux_b): (A::Aux, B::Aux),
    ) -> Result<(A::Value, B::Value)> {
        expect_size(self, fields)?;
        let (left, right) = fields.split_at(self.first.size_in_fields());
        Ok((
            self.first.from_fields(left, aux_a)?,
            self.second.from_fields(right, aux_b)?,
        ))
    }

    fn check(&self, (a, b): &(A::Value, B::Value)) -> Result<()> {
        self.first.check(a)?;
        self.second.check(b)
    }

    fn json_codec(&self) -> Option<&dyn JsonCodec<(A::Value, B::Value)>> {
        self.first.json_codec()?;
        self.second.json_codec()?;
        Some(self)
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, (A::Value, B::Value)>> {
        self.first.hash_input_codec()?;
        self.second.hash_input_codec()?;
        Some(self)
    }
}

impl<F: PrimeField, A: Provable<F>, B: Provable<F>> JsonCodec<(A::Value, B::Value)>
    for PairOf<F, A, B>
{
    fn encode(&self, (a, b): &(A::Value, B::Value)) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Array(vec![
            self.first.to_json(a)?,
            self.second.to_json(b)?,
        ]))
    }

    fn decode(&self, json: &serde_json::Value) -> Result<(A::Value, B::Value)> {
        match json.as_array().map(Vec::as_slice) {
            Some([a, b]) => Ok((self.first.from_json(a)?, self.second.from_json(b)?)),
            _ => Err(ProvableError::invalid_json(
                Provable::<F>::name(self),
                "expected a two-element array",
            )),
        }
    }
}

impl<F: PrimeField, A: Provable<F>, B: Provable<F>> HashInputCodec<F, (A::Value, B::Value)>
    for PairOf<F, A, B>
{
    fn hash_input(&self, (a, b): &(A::Value, B::Value)) -> HashInput<F> {
        let first = self.first.hash_input_codec().map(|c| c.hash_input(a));
        let second = self.second.hash_input_codec().map(|c| c.hash_input(b));
        first
            .unwrap_or_default()
            .append(second.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provable::{array, BoolType, Boolean, FieldType};
    use ark_bn254::Fr;

    #[test]
    fn composite_layout() {
        let ty = pair::<Fr, _, _>(FieldType, array::<Fr, _>(BoolType, 2));
        assert_eq!(ty.size_in_fields(), 3);
        let value = (
            FieldVar::from_u64(10),
            vec![Boolean::constant(true), Boolean::constant(false)],
        );
        let flat = ty.to_fields(&value);
        assert_eq!(
            flat,
            vec![
                FieldVar::from_u64(10),
                FieldVar::from_u64(1),
                FieldVar::from_u64(0)
            ]
        );
        let back = ty.from_fields(&flat, ty.to_auxiliary(Some(&value))).unwrap();
        assert_eq!(back, value);
        assert!(ty.check(&value).is_ok());
    }

    #[test]
    fn composite_json() {
        let ty = pair::<Fr, _, _>(FieldType, BoolType);
        let value = (FieldVar::from_u64(3), Boolean::constant(true));
        let json = ty.to_json(&value).unwrap();
        assert_eq!(json, serde_json::json!(["3", true]));
        assert_eq!(ty.from_json(&json).unwrap(), value);
        assert!(ty.from_json(&serde_json::json!(["3"])).is_err());
    }

    #[test]
    fn composite_hash_input() {
        let ty = pair::<Fr, _, _>(FieldType, BoolType);
        let input = ty
            .to_input(&(FieldVar::from_u64(5), Boolean::constant(true)))
            .unwrap();
        assert_eq!(input.fields, vec![FieldVar::from_u64(5)]);
        assert_eq!(input.packed, vec![(FieldVar::from_u64(1), 1)]);
    }
}
