// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The search engine: variable allocation, the unifier, the choice-point
//! stack, and the iterative `execute`/`call`/`attempt`/`retry` driver.
//!
//! The driver is an explicit, never-recursive loop over a `Vec`-backed
//! stack, so a deep backtracking search doesn't exhaust the host stack —
//! the same split the C++ original's `Engine::execute`/`call`/`attempt`/
//! `retry` uses (`examples/original_source/src/engine.cpp`), with the
//! predicate protocol itself reshaped into continuation-passing form (see
//! `engine::predicate`).

pub mod predicate;

pub use predicate::{last_in_chain, GoalRef, Predicate, PredicateKind, VarChoice};

use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::config::EngineConfig;
use crate::term::{FlatList, Term, TermRef, VarCell};
use crate::trail::Trail;

/// One entry in the choice-point stack: the predicate that may still have
/// untried choices, and the trail height to rewind to before asking it for
/// the next one.
#[derive(Clone)]
struct ChoiceFrame {
    predicate: GoalRef,
    trail_height: usize,
}

/// Owns the trail, the choice-point stack, and variable-id allocation for
/// one search. Not `Send`/`Sync` — a single search is single-threaded —
/// and not `Clone`; an `Engine` is a run, not a value.
pub struct Engine {
    trail: Trail,
    choices: Vec<ChoiceFrame>,
    next_var_id: AtomicU64,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            trail: Trail::new(),
            choices: Vec::with_capacity(config.trail_capacity_hint),
            next_var_id: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Allocate a fresh, unbound variable. Ids are drawn from a counter this
    /// `Engine` owns — scoped per-engine rather than process-wide, so two
    /// `Engine`s in the same process never collide but also never have to
    /// coordinate.
    pub fn fresh_var(&mut self) -> TermRef {
        let id = self.next_var_id.fetch_add(1, AtomicOrdering::Relaxed);
        Rc::new(Term::Var(Rc::new(std::cell::RefCell::new(VarCell::new(id)))))
    }

    /// Allocate a fresh updatable variable (`UpdatablePVar` in the original):
    /// dereferences to itself rather than following `value`, so it behaves
    /// as backtrackable mutable scratch state instead of a logic variable.
    pub fn fresh_updatable_var(&mut self, initial: TermRef) -> TermRef {
        let id = self.next_var_id.fetch_add(1, AtomicOrdering::Relaxed);
        Rc::new(Term::Var(Rc::new(std::cell::RefCell::new(
            VarCell::new_updatable(id, initial),
        ))))
    }

    /// Overwrite an updatable variable's current value, trailing the prior
    /// value so it is restored on backtrack: one trail entry per overwrite,
    /// clean LIFO semantics rather than merging consecutive overwrites
    /// within a choice.
    pub fn set_updatable(&mut self, var: &TermRef, new_value: TermRef) {
        match var.as_ref() {
            Term::Var(v) => {
                debug_assert!(v.borrow().is_updatable(), "set_updatable on a plain variable");
                self.trail.push(v.clone());
                v.borrow_mut().value = Some(new_value);
            }
            _ => debug_assert!(false, "set_updatable called on a non-variable term"),
        }
    }

    pub fn trail_height(&self) -> usize {
        self.trail.height()
    }

    pub fn unwind_trail_to(&mut self, height: usize) {
        self.trail.unwind_to(height);
    }

    pub fn current_choice_depth(&self) -> usize {
        self.choices.len()
    }

    /// Discard every choice frame above `depth` without retrying them. This
    /// is what `Cut` does; it does not by itself touch the trail (a cut
    /// commits to the bindings already made, it does not undo them).
    pub fn cut_to(&mut self, depth: usize) {
        debug_assert!(
            depth <= self.choices.len(),
            "cut_to({}) targets a depth above the current stack ({})",
            depth,
            self.choices.len()
        );
        tracing::debug!(depth, "cut");
        self.choices.truncate(depth);
    }

    /// Structural unification, grounded step-for-step on
    /// `examples/original_source/src/engine.cpp`'s `Engine::unify`:
    /// dereference both sides; if already equal, succeed without binding;
    /// if either side is an unbound variable, trail and bind it; if both
    /// sides are flat lists of equal length, unify element-wise; otherwise
    /// delegate to the user-defined `unify_with` hook.
    pub fn unify(&mut self, a: &TermRef, b: &TermRef) -> bool {
        let da = Term::dereference(a);
        let db = Term::dereference(b);
        if Term::equal(&da, &db) {
            return true;
        }
        if let Term::Var(v) = da.as_ref() {
            self.trail.push(v.clone());
            return Term::bind(&da, &db);
        }
        if let Term::Var(v) = db.as_ref() {
            self.trail.push(v.clone());
            return Term::bind(&db, &da);
        }
        match (da.as_ref(), db.as_ref()) {
            (Term::List(l1), Term::List(l2)) => self.unify_lists(l1, l2),
            (Term::User(u1), Term::User(u2)) => u1.unify_with(self, u2.as_ref()),
            _ => false,
        }
    }

    fn unify_lists(&mut self, l1: &Rc<FlatList>, l2: &Rc<FlatList>) -> bool {
        if l1.len() != l2.len() {
            return false;
        }
        l1.elements()
            .iter()
            .zip(l2.elements())
            .all(|(e1, e2)| self.unify(e1, e2))
    }

    pub fn compare(a: &TermRef, b: &TermRef) -> Ordering {
        Term::compare(a, b)
    }

    /// Run `goal` to completion: call it, and on failure
    /// keep retrying the top choice frame until one succeeds or the stack
    /// empties. Iterative, never recursive, so a long backtracking search
    /// never grows the host call stack.
    ///
    /// If `unbind_after` is set, every choice frame and trail entry created
    /// during this call is discarded before returning — used by `once` and
    /// by double-negation, which only want the success/failure verdict, not
    /// the bindings or the ability to backtrack into alternatives.
    pub fn execute(&mut self, goal: Option<GoalRef>, unbind_after: bool) -> bool {
        let base_depth = self.choices.len();
        let base_trail = self.trail.height();

        let mut success = self.call(goal);
        while !success && self.choices.len() > base_depth {
            let height = self
                .choices
                .last()
                .expect("loop condition guarantees a frame")
                .trail_height;
            self.trail.unwind_to(height);
            success = self.retry();
        }

        if unbind_after {
            self.choices.truncate(base_depth);
            self.trail.unwind_to(base_trail);
        }

        success
    }

    /// Enter `goal`: push a choice frame if its kind demands one, run
    /// `initialize`, then attempt its first choice.
    pub fn call(&mut self, goal: Option<GoalRef>) -> bool {
        let Some(predicate) = goal else {
            return true;
        };

        let kind = predicate.borrow().kind();
        if kind == PredicateKind::Nondeterministic {
            if let Some(max) = self.config.max_choice_depth {
                assert!(
                    self.choices.len() < max,
                    "choice stack exceeded max_choice_depth ({max})"
                );
            }
            self.choices.push(ChoiceFrame {
                predicate: predicate.clone(),
                trail_height: self.trail.height(),
            });
            tracing::trace!(depth = self.choices.len(), "call: pushed choice frame");
        } else {
            tracing::trace!(?kind, "call: no choice frame");
        }

        predicate.borrow_mut().initialize(self);
        self.attempt(predicate)
    }

    /// Ask `predicate` to commit to its next choice; on success, chain into
    /// its continuation.
    fn attempt(&mut self, predicate: GoalRef) -> bool {
        let committed = predicate.borrow_mut().apply_choice(self);
        if !committed {
            tracing::trace!("attempt: apply_choice failed");
            return false;
        }
        let continuation = predicate.borrow().continuation();
        self.call(continuation)
    }

    /// Retry the top choice frame: if it has nothing left to try, pop it and
    /// report failure (so the caller's loop falls through to the next frame
    /// down); otherwise ask it to commit to its next choice.
    fn retry(&mut self) -> bool {
        let frame = self
            .choices
            .last()
            .cloned()
            .expect("retry is only called while choices is non-empty");

        if !frame.predicate.borrow().more_choices() {
            tracing::trace!(depth = self.choices.len(), "retry: exhausted, popping frame");
            self.choices.pop();
            return false;
        }

        tracing::trace!(depth = self.choices.len(), "retry: trying next choice");
        self.attempt(frame.predicate)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
