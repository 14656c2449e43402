// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Control combinators built on the predicate protocol: conjunction,
//! disjunction, cut, once, double negation, if-then-else, and a bounded
//! loop.
//!
//! Grounded directly on the C++ original's `Pred` subclasses
//! (`examples/original_source/include/pl_search/pred.hpp`,
//! `examples/original_source/src/pred.cpp`): `conjunction`, `DisjPred`,
//! `Cut`, `NotNot`/`NotNotEnd`, and `Loop`/`LoopBodyFactory` map one-to-one
//! onto the items below. The one structural difference is `Loop`'s
//! self-reference: the original relies on C++'s `enable_shared_from_this`;
//! here `Rc::new_cyclic` plays the same role without leaking the cycle,
//! since the loop only ever needs a [`Weak`] handle to itself.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::engine::{last_in_chain, Engine, GoalRef, Predicate, PredicateKind};

/// Link `p1, p2, …, pn` so that each one's tail continuation is the next;
/// the result is `p1` itself. `None` if `goals` is empty.
pub fn conjunction(goals: Vec<GoalRef>) -> Option<GoalRef> {
    let mut iter = goals.into_iter();
    let first = iter.next()?;
    let mut tail = last_in_chain(&first);
    for next in iter {
        tail.borrow_mut().set_continuation(Some(next.clone()));
        tail = last_in_chain(&next);
    }
    Some(first)
}

/// Nondeterministic choice among `disjuncts`, tried in declaration order.
#[derive(Debug)]
struct Disjunction {
    disjuncts: Vec<GoalRef>,
    cursor: usize,
    continuation: Option<GoalRef>,
}

pub fn disjunction(disjuncts: Vec<GoalRef>) -> GoalRef {
    Rc::new(RefCell::new(Disjunction {
        disjuncts,
        cursor: 0,
        continuation: None,
    }))
}

impl Predicate for Disjunction {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Nondeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {
        self.cursor = 0;
        for d in &self.disjuncts {
            last_in_chain(d)
                .borrow_mut()
                .set_continuation(self.continuation.clone());
        }
    }

    fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
        if self.cursor >= self.disjuncts.len() {
            return false;
        }
        let chosen = self.disjuncts[self.cursor].clone();
        self.cursor += 1;
        self.continuation = Some(chosen);
        true
    }

    fn more_choices(&self) -> bool {
        self.cursor < self.disjuncts.len()
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// Deterministic predicate that truncates the choice stack to a captured
/// depth. Built by whichever combinator needs to commit to a path —
/// `once`, `if_then_else` — never constructed directly by client code.
#[derive(Debug)]
struct Cut {
    target_depth: usize,
    continuation: Option<GoalRef>,
}

pub fn cut(target_depth: usize) -> GoalRef {
    Rc::new(RefCell::new(Cut {
        target_depth,
        continuation: None,
    }))
}

impl Predicate for Cut {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Deterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {}

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        engine.cut_to(self.target_depth);
        true
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// Wrap `goal` so that, immediately after its first success, every choice
/// frame created while evaluating it is cut away — at most one solution.
#[derive(Debug)]
struct Once {
    goal: GoalRef,
    continuation: Option<GoalRef>,
}

pub fn once(goal: GoalRef) -> GoalRef {
    Rc::new(RefCell::new(Once {
        goal,
        continuation: None,
    }))
}

impl Predicate for Once {
    fn kind(&self) -> PredicateKind {
        PredicateKind::SemiDeterministic
    }

    fn initialize(&mut self, engine: &mut Engine) {
        // Captured here, not at construction, so a `once` re-entered at a
        // different depth (e.g. inside a `Loop` body) cuts to the depth
        // live at *this* entry.
        let depth = engine.current_choice_depth();
        let cut_goal = cut(depth);
        cut_goal.borrow_mut().set_continuation(self.continuation.take());
        last_in_chain(&self.goal)
            .borrow_mut()
            .set_continuation(Some(cut_goal));
        self.continuation = Some(self.goal.clone());
    }

    fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
        true
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// Terminal predicate appended to `not_not`'s inner goal: records that the
/// goal reached it at least once, then forces failure so the nested search
/// keeps backtracking through every remaining choice without leaving any
/// binding intact.
#[derive(Debug)]
struct NotNotEnd {
    succeeded: Rc<RefCell<bool>>,
}

impl Predicate for NotNotEnd {
    fn kind(&self) -> PredicateKind {
        PredicateKind::SemiDeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {}

    fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
        *self.succeeded.borrow_mut() = true;
        false
    }

    fn continuation(&self) -> Option<GoalRef> {
        None
    }

    fn set_continuation(&mut self, _cont: Option<GoalRef>) {}
}

/// Double negation: succeeds iff `goal` has at least one solution, but
/// leaves no bindings from it. Two choices: the first runs `goal` to
/// exhaustion under a terminator that records success and forces failure
/// (discarding every binding it made); the second reports whether the
/// terminator was ever reached.
#[derive(Debug)]
struct NotNot {
    goal: GoalRef,
    succeeded: Rc<RefCell<bool>>,
    cursor: u8,
    continuation: Option<GoalRef>,
}

pub fn not_not(goal: GoalRef) -> GoalRef {
    Rc::new(RefCell::new(NotNot {
        goal,
        succeeded: Rc::new(RefCell::new(false)),
        cursor: 0,
        continuation: None,
    }))
}

impl Predicate for NotNot {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Nondeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {
        self.cursor = 0;
        *self.succeeded.borrow_mut() = false;
    }

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        match self.cursor {
            0 => {
                self.cursor = 1;
                let terminator: GoalRef = Rc::new(RefCell::new(NotNotEnd {
                    succeeded: self.succeeded.clone(),
                }));
                last_in_chain(&self.goal)
                    .borrow_mut()
                    .set_continuation(Some(terminator));
                engine.execute(Some(self.goal.clone()), true);
                false
            }
            _ => {
                self.cursor = 2;
                *self.succeeded.borrow()
            }
        }
    }

    fn more_choices(&self) -> bool {
        self.cursor < 2
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// `if (g1) then g2 else g3`, i.e. `(g1, cut-to-self, g2) ; g3`.
/// Two choices: the first wires up and runs `g1, cut, g2`, committing to
/// the then-branch the moment `g1` succeeds; the second runs `g3`.
#[derive(Debug)]
struct IfThenElse {
    g1: GoalRef,
    g2: GoalRef,
    g3: GoalRef,
    cursor: u8,
    self_depth: usize,
    outer: Option<GoalRef>,
    continuation: Option<GoalRef>,
}

pub fn if_then_else(g1: GoalRef, g2: GoalRef, g3: GoalRef) -> GoalRef {
    Rc::new(RefCell::new(IfThenElse {
        g1,
        g2,
        g3,
        cursor: 0,
        self_depth: 0,
        outer: None,
        continuation: None,
    }))
}

impl Predicate for IfThenElse {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Nondeterministic
    }

    fn initialize(&mut self, engine: &mut Engine) {
        self.cursor = 0;
        // Our own frame is already on the stack by the time initialize
        // runs; cutting "to self" means cutting it away too.
        self.self_depth = engine.current_choice_depth().saturating_sub(1);
        self.outer = self.continuation.clone();
        last_in_chain(&self.g3)
            .borrow_mut()
            .set_continuation(self.outer.clone());
    }

    fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
        match self.cursor {
            0 => {
                self.cursor = 1;
                let cut_goal = cut(self.self_depth);
                last_in_chain(&self.g1)
                    .borrow_mut()
                    .set_continuation(Some(cut_goal.clone()));
                cut_goal.borrow_mut().set_continuation(Some(self.g2.clone()));
                last_in_chain(&self.g2)
                    .borrow_mut()
                    .set_continuation(self.outer.clone());
                self.continuation = Some(self.g1.clone());
                true
            }
            1 => {
                self.cursor = 2;
                self.continuation = Some(self.g3.clone());
                true
            }
            _ => false,
        }
    }

    fn more_choices(&self) -> bool {
        self.cursor < 2
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// Supplies loop bodies one at a time. The factory owns whatever iteration
/// state the loop is driven by (a counter, an iterator, a generator) — it
/// is the sole source of iteration state; the loop predicate itself holds
/// none.
pub trait LoopBodyFactory: Debug {
    /// Produce the next body predicate, or `None` to stop iterating.
    fn next_body(&mut self, engine: &mut Engine) -> Option<GoalRef>;
}

/// Deterministic bounded iteration. Each entry asks the factory for a body;
/// if one comes back, its tail is linked back to the loop itself so the
/// next entry happens once the body finishes, otherwise the loop restores
/// the continuation that was in place before it started and succeeds.
///
/// Backtracking into an earlier iteration re-enters that iteration's body
/// predicate in whatever state it preserved — each body is a fresh
/// predicate instance, so iterations don't share mutable state unless the
/// factory deliberately shares it.
#[derive(Debug)]
struct Loop {
    factory: Box<dyn LoopBodyFactory>,
    self_ref: Weak<RefCell<dyn Predicate>>,
    outer: Option<GoalRef>,
    continuation: Option<GoalRef>,
}

pub fn loop_(factory: Box<dyn LoopBodyFactory>) -> GoalRef {
    Rc::new_cyclic(|weak: &Weak<RefCell<Loop>>| {
        let self_ref: Weak<RefCell<dyn Predicate>> = weak.clone();
        RefCell::new(Loop {
            factory,
            self_ref,
            outer: None,
            continuation: None,
        })
    })
}

impl Predicate for Loop {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Deterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {}

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        match self.factory.next_body(engine) {
            Some(body) => {
                let myself = self
                    .self_ref
                    .upgrade()
                    .expect("loop predicate dropped while still running");
                last_in_chain(&body).borrow_mut().set_continuation(Some(myself));
                self.continuation = Some(body);
            }
            None => {
                self.continuation = self.outer.clone();
            }
        }
        true
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        // Mirrors the original's split field: the continuation set here is
        // both what we run right now and what we must restore once the
        // factory is exhausted, since `apply_choice` overwrites
        // `continuation` on every iteration.
        self.continuation = cont.clone();
        self.outer = cont;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Term, TermRef};

    #[derive(Debug)]
    struct UnifyVar {
        var: TermRef,
        value: TermRef,
        continuation: Option<GoalRef>,
    }

    impl UnifyVar {
        fn goal(var: TermRef, value: TermRef) -> GoalRef {
            Rc::new(RefCell::new(UnifyVar {
                var,
                value,
                continuation: None,
            }))
        }
    }

    impl Predicate for UnifyVar {
        fn kind(&self) -> PredicateKind {
            PredicateKind::SemiDeterministic
        }
        fn initialize(&mut self, _engine: &mut Engine) {}
        fn apply_choice(&mut self, engine: &mut Engine) -> bool {
            engine.unify(&self.var, &self.value)
        }
        fn continuation(&self) -> Option<GoalRef> {
            self.continuation.clone()
        }
        fn set_continuation(&mut self, cont: Option<GoalRef>) {
            self.continuation = cont;
        }
    }

    #[derive(Debug)]
    struct Fail {
        continuation: Option<GoalRef>,
    }

    impl Fail {
        fn goal() -> GoalRef {
            Rc::new(RefCell::new(Fail { continuation: None }))
        }
    }

    impl Predicate for Fail {
        fn kind(&self) -> PredicateKind {
            PredicateKind::SemiDeterministic
        }
        fn initialize(&mut self, _engine: &mut Engine) {}
        fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
            false
        }
        fn continuation(&self) -> Option<GoalRef> {
            self.continuation.clone()
        }
        fn set_continuation(&mut self, cont: Option<GoalRef>) {
            self.continuation = cont;
        }
    }

    #[derive(Debug)]
    struct Collect {
        var: TermRef,
        witnesses: Rc<RefCell<Vec<TermRef>>>,
        continuation: Option<GoalRef>,
    }

    impl Collect {
        fn goal(var: TermRef, witnesses: Rc<RefCell<Vec<TermRef>>>) -> GoalRef {
            Rc::new(RefCell::new(Collect {
                var,
                witnesses,
                continuation: None,
            }))
        }
    }

    impl Predicate for Collect {
        fn kind(&self) -> PredicateKind {
            PredicateKind::SemiDeterministic
        }
        fn initialize(&mut self, _engine: &mut Engine) {}
        fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
            self.witnesses.borrow_mut().push(Term::dereference(&self.var));
            false
        }
        fn continuation(&self) -> Option<GoalRef> {
            self.continuation.clone()
        }
        fn set_continuation(&mut self, cont: Option<GoalRef>) {
            self.continuation = cont;
        }
    }

    #[test]
    fn conjunction_links_in_order() {
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let y = engine.fresh_var();
        let goal = conjunction(vec![
            UnifyVar::goal(x.clone(), Term::int(1)),
            UnifyVar::goal(y.clone(), Term::int(2)),
        ])
        .unwrap();
        assert!(engine.execute(Some(goal), false));
        assert!(Term::equal(&Term::dereference(&x), &Term::int(1)));
        assert!(Term::equal(&Term::dereference(&y), &Term::int(2)));
    }

    #[test]
    fn disjunction_enumerates_in_declaration_order() {
        // S2: (X = 42 ; X = 43), collect(X), fail
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let disj = disjunction(vec![
            UnifyVar::goal(x.clone(), Term::int(42)),
            UnifyVar::goal(x.clone(), Term::int(43)),
        ]);
        let goal = conjunction(vec![disj, Collect::goal(x, witnesses.clone())]).unwrap();
        assert!(!engine.execute(Some(goal), false));
        let values: Vec<i64> = witnesses
            .borrow()
            .iter()
            .map(|t| match t.as_ref() {
                Term::Int(v) => *v,
                _ => panic!("expected int"),
            })
            .collect();
        assert_eq!(values, vec![42, 43]);
    }

    #[test]
    fn once_suppresses_alternatives() {
        // S3: same disjunction wrapped in once
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let disj = disjunction(vec![
            UnifyVar::goal(x.clone(), Term::int(42)),
            UnifyVar::goal(x.clone(), Term::int(43)),
        ]);
        let goal = conjunction(vec![once(disj), Collect::goal(x, witnesses.clone())]).unwrap();
        assert!(!engine.execute(Some(goal), false));
        let values: Vec<i64> = witnesses
            .borrow()
            .iter()
            .map(|t| match t.as_ref() {
                Term::Int(v) => *v,
                _ => panic!("expected int"),
            })
            .collect();
        assert_eq!(values, vec![42]);
    }

    #[test]
    fn not_not_leaves_no_bindings() {
        // S4: not_not(X = 42); collect(X); fail
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let goal = conjunction(vec![
            not_not(UnifyVar::goal(x.clone(), Term::int(42))),
            Collect::goal(x.clone(), witnesses.clone()),
        ])
        .unwrap();
        assert!(!engine.execute(Some(goal), false));
        assert_eq!(witnesses.borrow().len(), 1);
        assert!(witnesses.borrow()[0].is_var());
    }

    #[test]
    fn if_then_else_branch_taken() {
        // S5: if (X = 1 ; X = 2) then collect(X) else collect(99); fail
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let guard = disjunction(vec![
            UnifyVar::goal(x.clone(), Term::int(1)),
            UnifyVar::goal(x.clone(), Term::int(2)),
        ]);
        let then_branch = Collect::goal(x.clone(), witnesses.clone());
        let else_branch = Collect::goal(Term::int(99), witnesses.clone());
        let ite = if_then_else(guard, then_branch, else_branch);
        let goal = conjunction(vec![ite, Fail::goal()]).unwrap();
        assert!(!engine.execute(Some(goal), false));
        let values: Vec<i64> = witnesses
            .borrow()
            .iter()
            .map(|t| match t.as_ref() {
                Term::Int(v) => *v,
                _ => panic!("expected int"),
            })
            .collect();
        assert_eq!(values, vec![1]);
    }

    #[test]
    fn if_then_else_else_taken() {
        // S6: guard is a primitive fail
        let mut engine = Engine::new();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let guard = Fail::goal();
        let then_branch = Collect::goal(Term::int(1), witnesses.clone());
        let else_branch = Collect::goal(Term::int(99), witnesses.clone());
        let ite = if_then_else(guard, then_branch, else_branch);
        assert!(!engine.execute(Some(ite), false));
        let values: Vec<i64> = witnesses
            .borrow()
            .iter()
            .map(|t| match t.as_ref() {
                Term::Int(v) => *v,
                _ => panic!("expected int"),
            })
            .collect();
        assert_eq!(values, vec![99]);
    }

    /// Records `var`'s dereferenced value and succeeds, forward-chaining
    /// into whatever continuation follows it — unlike `Collect`, which
    /// exists specifically to force backtracking. `Loop`'s body runs
    /// forward into the loop itself on every iteration, so a body that
    /// records progress has to succeed, not fail.
    #[derive(Debug)]
    struct RecordAndSucceed {
        var: TermRef,
        witnesses: Rc<RefCell<Vec<TermRef>>>,
        continuation: Option<GoalRef>,
    }

    impl RecordAndSucceed {
        fn goal(var: TermRef, witnesses: Rc<RefCell<Vec<TermRef>>>) -> GoalRef {
            Rc::new(RefCell::new(RecordAndSucceed {
                var,
                witnesses,
                continuation: None,
            }))
        }
    }

    impl Predicate for RecordAndSucceed {
        fn kind(&self) -> PredicateKind {
            PredicateKind::Deterministic
        }
        fn initialize(&mut self, _engine: &mut Engine) {}
        fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
            self.witnesses.borrow_mut().push(Term::dereference(&self.var));
            true
        }
        fn continuation(&self) -> Option<GoalRef> {
            self.continuation.clone()
        }
        fn set_continuation(&mut self, cont: Option<GoalRef>) {
            self.continuation = cont;
        }
    }

    /// Each iteration gets its own fresh variable — `Loop` forward-chains
    /// body after body with nothing unwinding the trail in between, so
    /// reusing one variable across iterations would have the second
    /// iteration's `unify` fail against the first's leftover binding.
    #[derive(Debug)]
    struct CountingFactory {
        remaining: usize,
        witnesses: Rc<RefCell<Vec<TermRef>>>,
    }

    impl LoopBodyFactory for CountingFactory {
        fn next_body(&mut self, engine: &mut Engine) -> Option<GoalRef> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            let value = Term::int(self.remaining as i64);
            let fresh = engine.fresh_var();
            Some(
                conjunction(vec![
                    UnifyVar::goal(fresh.clone(), value),
                    RecordAndSucceed::goal(fresh, self.witnesses.clone()),
                ])
                .unwrap(),
            )
        }
    }

    #[test]
    fn loop_runs_bounded_iterations() {
        let mut engine = Engine::new();
        let witnesses = Rc::new(RefCell::new(Vec::new()));
        let factory = CountingFactory {
            remaining: 3,
            witnesses: witnesses.clone(),
        };
        let goal = loop_(Box::new(factory));
        assert!(engine.execute(Some(goal), false));
        let values: Vec<i64> = witnesses
            .borrow()
            .iter()
            .map(|t| match t.as_ref() {
                Term::Int(v) => *v,
                _ => panic!("expected int"),
            })
            .collect();
        assert_eq!(values, vec![2, 1, 0]);
    }
}
