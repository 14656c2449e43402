// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! `append/3`, runnable forward (`append([1,2], [3,4], L)`) or backward
//! (`append(L1, L2, [1,2,3,4])`), over the [`cons_list`](super::cons_list)
//! sample term. Ground truth:
//! `examples/original_source/examples/append_pred.hpp`, translated from its
//! three classes (`AppendClause1`, `AppendClause2`, `Append`) into the same
//! three predicates here, one-to-one.
//!
//! Prolog equivalent:
//! ```prolog
//! append([], L, L).
//! append([H|T], L2, [H|L3]) :- append(T, L2, L3).
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::combinators::conjunction;
use crate::demos::cons_list::{cons, nil};
use crate::engine::{last_in_chain, Engine, GoalRef, Predicate, PredicateKind};
use crate::term::TermRef;

/// Semi-deterministic unify-and-succeed-once predicate — the building
/// block both append clauses are conjunctions of.
#[derive(Debug)]
struct Unify {
    a: TermRef,
    b: TermRef,
    continuation: Option<GoalRef>,
}

fn unify_goal(a: TermRef, b: TermRef) -> GoalRef {
    Rc::new(RefCell::new(Unify {
        a,
        b,
        continuation: None,
    }))
}

impl Predicate for Unify {
    fn kind(&self) -> PredicateKind {
        PredicateKind::SemiDeterministic
    }
    fn initialize(&mut self, _engine: &mut Engine) {}
    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        engine.unify(&self.a, &self.b)
    }
    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }
    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// Second clause: `L1 = [H|T], L3 = [H|L4], append(T, L2, L4)`. Unlike the
/// first clause this can't be a plain `conjunction` — the recursive
/// `append` call it builds has to be constructed fresh on each attempt
/// (every retry through backtracking needs its own `H`/`T`/`L4`), so it's a
/// predicate in its own right, grounded on `AppendClause2::apply_choice` in
/// the C++ original (the comment there about generating fresh variables on
/// every attempt applies here too — this is not the fastest possible
/// `append`, just the direct translation).
#[derive(Debug)]
struct AppendClause2 {
    l1: TermRef,
    l2: TermRef,
    l3: TermRef,
    continuation: Option<GoalRef>,
}

impl Predicate for AppendClause2 {
    fn kind(&self) -> PredicateKind {
        PredicateKind::SemiDeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {}

    fn apply_choice(&mut self, engine: &mut Engine) -> bool {
        let h = engine.fresh_var();
        let t = engine.fresh_var();
        let l4 = engine.fresh_var();
        if !engine.unify(&self.l1, &cons(h.clone(), t.clone())) {
            return false;
        }
        if !engine.unify(&self.l3, &cons(h, l4.clone())) {
            return false;
        }
        let recursive_call = append(t, self.l2.clone(), l4);
        last_in_chain(&recursive_call)
            .borrow_mut()
            .set_continuation(self.continuation.clone());
        self.continuation = Some(recursive_call);
        true
    }

    fn continuation(&self) -> Option<GoalRef> {
        self.continuation.clone()
    }

    fn set_continuation(&mut self, cont: Option<GoalRef>) {
        self.continuation = cont;
    }
}

/// The two-clause dispatcher: a nondeterministic choice between
/// `AppendClause1` (`L1 = [], L2 = L3`) and `AppendClause2`.
#[derive(Debug)]
struct Append {
    l1: TermRef,
    l2: TermRef,
    l3: TermRef,
    clauses: Vec<GoalRef>,
    cursor: usize,
    continuation: Option<GoalRef>,
}

/// `append(l1, l2, l3)` — true when `l3` is `l1` followed by `l2`. Runs
/// forward (`l1`/`l2` bound, `l3` a variable) or backward (`l3` bound,
/// `l1`/`l2` variables, enumerating every split on backtracking).
pub fn append(l1: TermRef, l2: TermRef, l3: TermRef) -> GoalRef {
    Rc::new(RefCell::new(Append {
        l1,
        l2,
        l3,
        clauses: Vec::new(),
        cursor: 0,
        continuation: None,
    }))
}

impl Predicate for Append {
    fn kind(&self) -> PredicateKind {
        PredicateKind::Nondeterministic
    }

    fn initialize(&mut self, _engine: &mut Engine) {
        self.cursor = 0;
        let clause1 = conjunction(vec![
            unify_goal(self.l1.clone(), nil()),
            unify_goal(self.l2.clone(), self.l3.clone()),
        ])
        .expect("two goals always produce Some");
        let clause2: GoalRef = Rc::new(RefCell::new(AppendClause2 {
            l1: self.l1.clone(),
            l2: self.l2.clone(),
            l3: self.l3.clone(),
            continuation: None,
        }));
        last_in_chain(&clause1)
            .borrow_mut()
            .set_continuation(self.continuation.clone());
        clause2.borrow_mut().set_continuation(self.continuation.clone());
        self.clauses = vec![clause1, clause2];
    }

    fn apply_choice(&mut self, _engine: &mut Engine) -> bool {
        if self.cursor >= self.clauses.len() {
            return false;
        }
        self.continuation = Some(self.clauses[self.cursor].clone());
        self.cursor += 1;
        true
    }

    fn more_choices(&self) -> bool {
        self.cursor < self.clauses.len()
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
    use crate::demos::collect::CollectAndFail;
    use crate::demos::cons_list::{list_from, render};
    use crate::engine::Engine;
    use crate::term::Term;

    #[test]
    fn append_forward_produces_the_concatenation() {
        // S7: append([1,2], [3,4], L); collect(L); fail
        let mut engine = Engine::new();
        let l1 = list_from(vec![Term::int(1), Term::int(2)]);
        let l2 = list_from(vec![Term::int(3), Term::int(4)]);
        let l3 = engine.fresh_var();
        let witnesses: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let l3c = l3.clone();
        let collect = CollectAndFail::goal(witnesses.clone(), move |_e| render(&l3c));
        let goal = conjunction(vec![append(l1, l2, l3), collect]).unwrap();
        assert!(!engine.execute(Some(goal), false));
        assert_eq!(*witnesses.borrow(), vec!["[1, 2, 3, 4]".to_string()]);
    }

    #[test]
    fn append_backward_enumerates_every_split() {
        // S8: append(L1, L2, [1,2,3,4]); collect(L1, L2); fail
        let mut engine = Engine::new();
        let l1 = engine.fresh_var();
        let l2 = engine.fresh_var();
        let l3 = list_from(vec![Term::int(1), Term::int(2), Term::int(3), Term::int(4)]);
        let witnesses: Rc<RefCell<Vec<(String, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let (l1c, l2c) = (l1.clone(), l2.clone());
        let collect = CollectAndFail::goal(witnesses.clone(), move |_e| {
            (render(&l1c), render(&l2c))
        });
        let goal = conjunction(vec![append(l1, l2, l3), collect]).unwrap();
        assert!(!engine.execute(Some(goal), false));
        let expected = vec![
            ("[]".to_string(), "[1, 2, 3, 4]".to_string()),
            ("[1]".to_string(), "[2, 3, 4]".to_string()),
            ("[1, 2]".to_string(), "[3, 4]".to_string()),
            ("[1, 2, 3]".to_string(), "[4]".to_string()),
            ("[1, 2, 3, 4]".to_string(), "[]".to_string()),
        ];
        assert_eq!(*witnesses.borrow(), expected);
    }
}
