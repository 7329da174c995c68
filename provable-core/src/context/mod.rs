//! Execution context stack.
//!
//! Every mode-sensitive operation reads the innermost [`Frame`]. Frames are
//! entered as overlays of their parent and must be left in LIFO order;
//! [`FrameGuard`] leaves its frame on every exit path, including unwinding.
//!
//! There is one stack per thread. Computations that must not observe each
//! other's modes have to run on separate threads.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::utils::{ProvableError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub in_checked_computation: bool,
    pub in_prover: bool,
    pub in_analyze: bool,
    pub in_witness_block: bool,
}

/// Flags to change when entering a frame. Unset flags are inherited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOverrides {
    pub in_checked_computation: Option<bool>,
    pub in_prover: Option<bool>,
    pub in_analyze: Option<bool>,
    pub in_witness_block: Option<bool>,
}

impl FrameOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checked(mut self, on: bool) -> Self {
        self.in_checked_computation = Some(on);
        self
    }

    pub fn prover(mut self, on: bool) -> Self {
        self.in_prover = Some(on);
        self
    }

    pub fn analyze(mut self, on: bool) -> Self {
        self.in_analyze = Some(on);
        self
    }

    pub fn witness_block(mut self, on: bool) -> Self {
        self.in_witness_block = Some(on);
        self
    }
}

impl Frame {
    pub fn overlay(&self, overrides: &FrameOverrides) -> Frame {
        Frame {
            in_checked_computation: overrides
                .in_checked_computation
                .unwrap_or(self.in_checked_computation),
            in_prover: overrides.in_prover.unwrap_or(self.in_prover),
            in_analyze: overrides.in_analyze.unwrap_or(self.in_analyze),
            in_witness_block: overrides.in_witness_block.unwrap_or(self.in_witness_block),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

/// A push-down stack of frames. The bottom (ambient) frame is the default
/// frame and is never stored.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<(FrameId, Frame)>,
    next_id: u64,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Frame {
        self.frames
            .last()
            .map(|(_, frame)| *frame)
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn enter(&mut self, overrides: FrameOverrides) -> FrameId {
        let frame = self.current().overlay(&overrides);
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.frames.push((id, frame));
        id
    }

    pub fn leave(&mut self, id: FrameId) -> Result<()> {
        match self.frames.last() {
            Some((top, _)) if *top == id => {
                self.frames.pop();
                Ok(())
            }
            top => Err(ProvableError::ContextImbalance {
                left: id.0,
                top: top.map(|(top, _)| top.0),
            }),
        }
    }
}

thread_local! {
    static CONTEXT: RefCell<ContextStack> = RefCell::new(ContextStack::new());
}

/// The innermost frame of this thread's stack.
pub fn current() -> Frame {
    CONTEXT.with(|stack| stack.borrow().current())
}

pub fn depth() -> usize {
    CONTEXT.with(|stack| stack.borrow().depth())
}

pub fn enter(overrides: FrameOverrides) -> FrameId {
    let id = CONTEXT.with(|stack| stack.borrow_mut().enter(overrides));
    tracing::trace!(?id, ?overrides, "enter frame");
    id
}

pub fn leave(id: FrameId) -> Result<()> {
    tracing::trace!(?id, "leave frame");
    CONTEXT.with(|stack| stack.borrow_mut().leave(id))
}

/// Scoped frame. Leaving out of order is a programming error and panics,
/// unless the thread is already unwinding.
#[must_use = "the frame is left as soon as the guard is dropped"]
pub struct FrameGuard {
    id: FrameId,
    // Frames belong to the thread-local stack they were entered on.
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    pub fn enter(overrides: FrameOverrides) -> Self {
        Self {
            id: enter(overrides),
            _not_send: PhantomData,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if let Err(err) = leave(self.id) {
            if std::thread::panicking() {
                tracing::error!(%err, "context stack left unbalanced while unwinding");
            } else {
                panic!("{err}");
            }
        }
    }
}

/// Runs `f` inside a frame overlaid with `overrides`.
pub fn with_frame<R>(overrides: FrameOverrides, f: impl FnOnce() -> R) -> R {
    let _guard = FrameGuard::enter(overrides);
    f()
}

/// True while prover values are available: outside any checked computation,
/// or inside a checked run that carries a witness.
pub fn in_prover() -> bool {
    let frame = current();
    !frame.in_checked_computation || frame.in_prover
}

pub fn in_checked_computation() -> bool {
    current().in_checked_computation
}

pub fn in_analyze() -> bool {
    current().in_analyze
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_inherits_unset_flags() {
        let mut stack = ContextStack::new();
        let outer = stack.enter(FrameOverrides::new().checked(true).prover(true));
        let inner = stack.enter(FrameOverrides::new().witness_block(true));
        assert_eq!(
            stack.current(),
            Frame {
                in_checked_computation: true,
                in_prover: true,
                in_analyze: false,
                in_witness_block: true,
            }
        );

        let analysis = stack.enter(FrameOverrides::new().analyze(true).prover(false));
        let frame = stack.current();
        assert!(frame.in_analyze && frame.in_witness_block && !frame.in_prover);

        stack.leave(analysis).unwrap();
        stack.leave(inner).unwrap();
        stack.leave(outer).unwrap();
        assert_eq!(stack.current(), Frame::default());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn leaving_out_of_order_is_rejected() {
        let mut stack = ContextStack::new();
        let outer = stack.enter(FrameOverrides::new().checked(true));
        let inner = stack.enter(FrameOverrides::new().prover(true));

        let err = stack.leave(outer).unwrap_err();
        assert!(matches!(err, ProvableError::ContextImbalance { .. }));
        // the failed leave must not disturb the stack
        assert!(stack.current().in_prover);

        stack.leave(inner).unwrap();
        stack.leave(outer).unwrap();
        assert!(stack.leave(outer).is_err());
    }

    #[test]
    fn guard_restores_on_early_return() {
        fn fails() -> Result<()> {
            let _guard = FrameGuard::enter(FrameOverrides::new().checked(true));
            assert!(in_checked_computation());
            Err(ProvableError::NoActiveEngine)
        }

        assert!(fails().is_err());
        assert_eq!(current(), Frame::default());
        assert_eq!(depth(), 0);
    }

    #[test]
    fn guard_restores_on_panic() {
        let result = std::panic::catch_unwind(|| {
            with_frame(FrameOverrides::new().analyze(true), || {
                panic!("boom");
            })
        });
        assert!(result.is_err());
        assert_eq!(current(), Frame::default());
    }

    #[test]
    #[should_panic(expected = "Context frame")]
    fn dropping_guards_out_of_order_panics() {
        let outer = FrameGuard::enter(FrameOverrides::new().checked(true));
        let _inner = FrameGuard::enter(FrameOverrides::new().prover(true));
        drop(outer);
    }

    #[test]
    fn mode_predicates() {
        assert!(in_prover());
        assert!(!in_checked_computation());

        with_frame(FrameOverrides::new().checked(true).analyze(true), || {
            assert!(in_checked_computation());
            assert!(in_analyze());
            assert!(!in_prover());
        });

        with_frame(FrameOverrides::new().checked(true).prover(true), || {
            assert!(in_prover());
        });
    }
}
