//! Replaying witnesses across evaluation passes.
//!
//! A [`MemoRecord`] belongs to one logical computation that is evaluated
//! several times, e.g. once to learn its public shape and once to prove it.
//! Each pass runs through [`MemoRecord::run`] and starts reading slots from
//! index zero. Witnesses are keyed purely by the order in which they are
//! requested, so every pass must request them in the same order. Requests
//! made while a recorded witness is being computed take no slot of their
//! own; their result is part of the outer witness's slot.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use ark_ff::PrimeField;

use crate::field::FieldVar;
use crate::provable::{expect_size, Provable};
use crate::utils::{ProvableError, Result};

#[derive(Debug)]
struct MemoSlot<F: PrimeField> {
    fields: Vec<F>,
    aux: Rc<dyn Any>,
}

#[derive(Debug)]
struct MemoTable<F: PrimeField> {
    slots: Vec<Option<MemoSlot<F>>>,
    blinding: Option<F>,
}

/// Shared witness cache for the passes of one computation. Clones share the
/// same slots.
#[derive(Clone, Debug)]
pub struct MemoRecord<F: PrimeField> {
    table: Rc<RefCell<MemoTable<F>>>,
}

struct MemoPass {
    table: Rc<dyn Any>,
    cursor: usize,
    // number of slot computations in progress on this pass
    computing: usize,
}

thread_local! {
    static PASSES: RefCell<Vec<MemoPass>> = const { RefCell::new(Vec::new()) };
}

struct PassGuard;

struct ComputeGuard;

impl ComputeGuard {
    fn enter() -> Self {
        PASSES.with(|passes| {
            if let Some(pass) = passes.borrow_mut().last_mut() {
                pass.computing += 1;
            }
        });
        ComputeGuard
    }
}

impl Drop for ComputeGuard {
    fn drop(&mut self) {
        PASSES.with(|passes| {
            if let Some(pass) = passes.borrow_mut().last_mut() {
                pass.computing -= 1;
            }
        });
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        PASSES.with(|passes| {
            passes.borrow_mut().pop();
        });
    }
}

impl<F: PrimeField> MemoRecord<F> {
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(MemoTable {
                slots: Vec::new(),
                blinding: None,
            })),
        }
    }

    /// Runs one evaluation pass against this record.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        PASSES.with(|passes| {
            passes.borrow_mut().push(MemoPass {
                table: self.table.clone(),
                cursor: 0,
                computing: 0,
            })
        });
        let _pass = PassGuard;
        f()
    }

    /// Number of witnesses recorded so far.
    pub fn len(&self) -> usize {
        self.table.borrow().slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: PrimeField> Default for MemoRecord<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn current_table<F: PrimeField>() -> Option<Rc<RefCell<MemoTable<F>>>> {
    PASSES
        .with(|passes| passes.borrow().last().map(|pass| pass.table.clone()))
        .and_then(|table| table.downcast::<RefCell<MemoTable<F>>>().ok())
}

/// Takes the next slot index of the innermost pass, if it belongs to `F` and
/// no slot of that pass is being computed.
fn reserve<F: PrimeField>() -> Option<(Rc<RefCell<MemoTable<F>>>, usize)> {
    let table = current_table::<F>()?;
    let index = PASSES.with(|passes| {
        let mut passes = passes.borrow_mut();
        let pass = passes.last_mut()?;
        if pass.computing > 0 {
            return None;
        }
        let index = pass.cursor;
        pass.cursor += 1;
        Some(index)
    })?;
    Some((table, index))
}

/// The random blinding value of the current pass's record. Sampled on first
/// use and shared by every pass of the record afterwards.
pub fn get_blinding_value<F: PrimeField>() -> Result<F> {
    let table = current_table::<F>().ok_or(ProvableError::NoMemoScope)?;
    let mut table = table.borrow_mut();
    let blinding = *table
        .blinding
        .get_or_insert_with(|| F::rand(&mut rand::thread_rng()));
    Ok(blinding)
}

/// Returns the recorded witness for the next slot, or runs `compute` and
/// records its result as constants. Without an active pass this is just
/// `compute`.
pub(crate) fn replay_or_compute<F, T>(
    ty: &T,
    compute: impl FnOnce() -> Result<T::Value>,
) -> Result<T::Value>
where
    F: PrimeField,
    T: Provable<F> + ?Sized,
{
    let Some((table, index)) = reserve::<F>() else {
        return compute();
    };

    let cached = table
        .borrow()
        .slots
        .get(index)
        .and_then(Option::as_ref)
        .map(|slot| (slot.fields.clone(), slot.aux.clone()));

    if let Some((fields, aux)) = cached {
        tracing::trace!(index, ty = %ty.name(), "memoized witness replayed");
        let aux = aux
            .downcast_ref::<T::Aux>()
            .cloned()
            .ok_or_else(|| ProvableError::MemoDesync {
                index,
                type_name: ty.name(),
            })?;
        let fields: Vec<FieldVar<F>> = fields.into_iter().map(FieldVar::Constant).collect();
        expect_size(ty, &fields)?;
        return ty.from_fields(&fields, aux);
    }

    // the table is not borrowed here; compute may witness nested values
    let value = {
        let _computing = ComputeGuard::enter();
        compute()?
    };
    let constants = ty
        .to_fields(&value)
        .iter()
        .map(FieldVar::to_constant)
        .collect::<Result<Vec<_>>>()?;
    expect_size(ty, &constants)?;
    let aux = ty.to_auxiliary(Some(&value));

    let mut table = table.borrow_mut();
    if table.slots.len() <= index {
        table.slots.resize_with(index + 1, || None);
    }
    table.slots[index] = Some(MemoSlot {
        fields: constants.iter().filter_map(FieldVar::value).collect(),
        aux: Rc::new(aux.clone()),
    });
    tracing::trace!(index, ty = %ty.name(), "witness memoized");
    drop(table);

    ty.from_fields(&constants, aux)
}
