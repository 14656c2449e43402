// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The predicate protocol: the small state machine every goal implements
//! so the engine driver can run it, retry it on backtrack, and chain it
//! into a continuation.
//!
//! This is a continuation-passing shape — `initialize`/`apply_choice`/
//! `more_choices`, plus a `continuation` field a predicate rewrites to
//! point at its successor — rather than a choice-count return value.
//! Grounded directly in the C++ original's `Pred` class
//! (`examples/original_source/include/pl_search/pred.hpp`).

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use crate::engine::Engine;
use crate::term::TermRef;

/// A live predicate-protocol object as addressed by the engine and by
/// combinators building continuation chains.
pub type GoalRef = Rc<RefCell<dyn Predicate>>;

/// Whether the engine needs to push a choice frame for a predicate. This is
/// a static property of the predicate's kind, decided before `initialize`
/// runs, not a runtime signal the predicate sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Exactly one success; does all its work in `initialize`.
    Deterministic,
    /// At most one success; failure is possible.
    SemiDeterministic,
    /// Possibly many successes; the engine pushes a choice frame for it.
    Nondeterministic,
}

/// The predicate protocol.
pub trait Predicate: Debug {
    /// Static contract: does this predicate ever need a choice frame?
    fn kind(&self) -> PredicateKind;

    /// Called once, the moment this predicate first enters the engine.
    /// Sets up any per-call state (e.g. an iteration cursor). Must not
    /// itself commit to a choice — that is `apply_choice`'s job.
    fn initialize(&mut self, engine: &mut Engine);

    /// Attempt to commit to the next choice. On commit, may rewrite the
    /// continuation (via `set_continuation`) to splice in a successor that
    /// must run before this predicate's own continuation. Returns the
    /// success/failure of the commit itself, not of any successor the
    /// engine goes on to call.
    fn apply_choice(&mut self, engine: &mut Engine) -> bool;

    /// Whether any choice remains untried. Never consulted for
    /// `Deterministic`/`SemiDeterministic` predicates — the engine never
    /// pushes a frame for them, so there is nothing to retry.
    fn more_choices(&self) -> bool {
        false
    }

    fn continuation(&self) -> Option<GoalRef>;

    fn set_continuation(&mut self, cont: Option<GoalRef>);
}

/// Walk a goal's continuation chain to its tail — the last predicate with no
/// successor of its own. Combinators use this to splice one goal's chain
/// onto the front of the next.
pub fn last_in_chain(goal: &GoalRef) -> GoalRef {
    let mut current = goal.clone();
    loop {
        let next = current.borrow().continuation();
        match next {
            Some(n) => current = n,
            None => return current,
        }
    }
}

/// Nondeterministic predicate that unifies `var` with each of `choices` in
/// declaration order, optionally gated by a `test` run immediately after
/// each unification — a choice is only committed to if the test passes.
/// Grounded on the C++ original's `ChoiceIterator`/`VarChoiceIterator`
/// (`examples/original_source/include/pl_search/choice_iterator.hpp`): the
/// simplest possible `Nondeterministic` predicate, and the one the
/// SEND+MORE=MONEY demo drives its per-digit search with (there, `test` is
/// the puzzle's constraint propagation).
pub struct VarChoice {
    var: TermRef,
    choices: Vec<TermRef>,
    test: Option<Box<dyn Fn(&mut Engine) -> bool>>,
    cursor: usize,
    continuation: Option<GoalRef>,
}

impl Debug for VarChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarChoice")
            .field("cursor", &self.cursor)
            .field("choices", &self.choices.len())
            .finish()
    }
}

impl VarChoice {
    /// Plain enumeration: commit to each choice in turn, no extra test.
    pub fn new(var: TermRef, choices: Vec<TermRef>) -> GoalRef {
        Rc::new(RefCell::new(VarChoice {
            var,
            choices,
            test: None,
            cursor: 0,
            continuation: None,
        }))
    }

    /// Like [`VarChoice::new`], but a choice only commits if `test` (run
    /// after the unification) also returns `true` — the
    /// `VarChoiceIterator::test_choice` override in the C++ original.
    pub fn with_test(
        var: TermRef,
        choices: Vec<TermRef>,
        test: impl Fn(&mut Engine) -> bool + 'static,
    ) -> GoalRef {
        Rc::new(RefCell::new(VarChoice {
            var,
            choices,
            test: Some(Box::new(test)),
            cursor: 0,
            continuation: None,
        }))
    }
}

impl Predicate for VarChoice {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Nondeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {
        self.cursor = 0;
    }

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        if self.cursor >= self.choices.len() {
            return false;
        }
        let candidate = self.choices[self.cursor].clone();
        self.cursor += 1;
        if !engine.unify(&self.var, &candidate) {
            return false;
        }
        match &self.test {
            Some(test) => test(engine),
            None => true,
        }
    }

    fn more_choices(&self) -> bool {
        self.cursor < self.choices.len()
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::term::Term;

    #[test]
    fn var_choice_enumerates_in_order() {
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let goal = VarChoice::new(x.clone(), vec![Term::int(1), Term::int(2), Term::int(3)]);
        assert!(engine.execute(Some(goal), false));
        assert!(Term::equal(&Term::dereference(&x), &Term::int(1)));
    }

    #[test]
    fn var_choice_test_skips_failing_candidates() {
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let x_test = x.clone();
        let goal = VarChoice::with_test(
            x.clone(),
            vec![Term::int(1), Term::int(2), Term::int(3)],
            move |_e| matches!(Term::dereference(&x_test).as_ref(), Term::Int(v) if v % 2 == 0),
        );
        assert!(engine.execute(Some(goal), false));
        assert!(Term::equal(&Term::dereference(&x), &Term::int(2)));
    }

    #[test]
    fn var_choice_fails_when_no_candidate_passes_test() {
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let goal = VarChoice::with_test(x, vec![Term::int(1), Term::int(3)], |_e| false);
        assert!(!engine.execute(Some(goal), false));
    }
}
