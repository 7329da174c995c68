//! Fixed-length homogeneous sequences.

use std::marker::PhantomData;

use ark_ff::PrimeField;

use super::{expect_size, missing_capability, HashInput, HashInputCodec, JsonCodec, Provable};
use crate::field::FieldVar;
use crate::utils::{ProvableError, Result};

/// Descriptor for `length` values of `element`, laid out back to back.
#[derive(Clone, Debug)]
pub struct ArrayOf<F: PrimeField, E: Provable<F>> {
    element: E,
    length: usize,
    _field: PhantomData<F>,
}

pub fn array<F: PrimeField, E: Provable<F>>(element: E, length: usize) -> ArrayOf<F, E> {
    ArrayOf {
        element,
        length,
        _field: PhantomData,
    }
}

impl<F: PrimeField, E: Provable<F>> ArrayOf<F, E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.length
    }

    fn expect_length<T>(&self, items: &[T], what: &str) -> Result<()> {
        if items.len() != self.length {
            return Err(ProvableError::shape(
                format!("{} {what}", Provable::<F>::name(self)),
                self.length,
                items.len(),
            ));
        }
        Ok(())
    }
}

impl<F: PrimeField, E: Provable<F>> Provable<F> for ArrayOf<F, E> {
    type Value = Vec<E::Value>;
    type Aux = Vec<E::Aux>;

    fn name(&self) -> String {
        format!("[{}; {}]", self.element.name(), self.length)
    }

    fn size_in_fields(&self) -> usize {
        self.length * self.element.size_in_fields()
    }

    fn to_fields(&self, value: &Vec<E::Value>) -> Vec<FieldVar<F>> {
        value
            .iter()
            .flat_map(|item| self.element.to_fields(item))
            .collect()
    }

    /// Missing entries get the element's layout-only auxiliary data.
    fn to_auxiliary(&self, value: Option<&Vec<E::Value>>) -> Vec<E::Aux> {
        (0..self.length)
            .map(|i| self.element.to_auxiliary(value.and_then(|items| items.get(i))))
            .collect()
    }

    fn from_fields(&self, fields: &[FieldVar<F>], aux: Vec<E::Aux>) -> Result<Vec<E::Value>> {
        expect_size(self, fields)?;
        self.expect_length(&aux, "auxiliary data")?;
        let chunk = self.element.size_in_fields();
        aux.into_iter()
            .enumerate()
            .map(|(i, aux)| {
                self.element
                    .from_fields(&fields[i * chunk..(i + 1) * chunk], aux)
            })
            .collect()
    }

    fn check(&self, value: &Vec<E::Value>) -> Result<()> {
        self.expect_length(value, "value")?;
        value.iter().try_for_each(|item| self.element.check(item))
    }

    fn json_codec(&self) -> Option<&dyn JsonCodec<Vec<E::Value>>> {
        self.element.json_codec()?;
        Some(self)
    }

    fn hash_input_codec(&self) -> Option<&dyn HashInputCodec<F, Vec<E::Value>>> {
        self.element.hash_input_codec()?;
        Some(self)
    }
}

impl<F: PrimeField, E: Provable<F>> JsonCodec<Vec<E::Value>> for ArrayOf<F, E> {
    fn encode(&self, value: &Vec<E::Value>) -> Result<serde_json::Value> {
        let codec = self
            .element
            .json_codec()
            .ok_or_else(|| missing_capability(self.element.name(), "JSON"))?;
        let items = value
            .iter()
            .map(|item| codec.encode(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::Value::Array(items))
    }

    fn decode(&self, json: &serde_json::Value) -> Result<Vec<E::Value>> {
        let codec = self
            .element
            .json_codec()
            .ok_or_else(|| missing_capability(self.element.name(), "JSON"))?;
        let items = json.as_array().ok_or_else(|| {
            ProvableError::invalid_json(Provable::<F>::name(self), "expected an array")
        })?;
        self.expect_length(items, "JSON array")?;
        items.iter().map(|item| codec.decode(item)).collect()
    }
}

impl<F: PrimeField, E: Provable<F>> HashInputCodec<F, Vec<E::Value>> for ArrayOf<F, E> {
    fn hash_input(&self, value: &Vec<E::Value>) -> HashInput<F> {
        match self.element.hash_input_codec() {
            Some(codec) => value
                .iter()
                .fold(HashInput::empty(), |acc, item| acc.append(codec.hash_input(item))),
            None => HashInput::empty(),
        }
    }
}
