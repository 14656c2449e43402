// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A reusable "record a witness, then fail" predicate — the standard way
//! to enumerate every solution of a goal: embed a collect-and-fail
//! predicate inside the goal that records the witness and returns failure
//! to force backtracking. Spliced onto the end of a goal's continuation
//! chain, one call runs per solution the engine finds; its unconditional
//! failure is what drives the engine to keep retrying until every choice
//! is exhausted.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::engine::{Engine, GoalRef, Predicate, PredicateKind};

/// Semi-deterministic predicate that takes a snapshot of the current
/// bindings via `snapshot`, appends it to a shared `witnesses` list, and
/// always fails.
pub struct CollectAndFail<T> {
    witnesses: Rc<RefCell<Vec<T>>>,
    snapshot: Box<dyn FnMut(&mut Engine) -> T>,
    continuation: Option<GoalRef>,
}

impl<T: 'static> CollectAndFail<T> {
    pub fn goal(
        witnesses: Rc<RefCell<Vec<T>>>,
        snapshot: impl FnMut(&mut Engine) -> T + 'static,
    ) -> GoalRef {
        Rc::new(RefCell::new(CollectAndFail {
            witnesses,
            snapshot: Box::new(snapshot),
            continuation: None,
        }))
    }
}

impl<T> fmt::Debug for CollectAndFail<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectAndFail").finish_non_exhaustive()
    }
}

impl<T: 'static> Predicate for CollectAndFail<T> {
    fn kind(&self) -> PredicateKind {
        PredicateKind::SemiDeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {}

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        let witness = (self.snapshot)(engine);
        self.witnesses.borrow_mut().push(witness);
        false
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}
