// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A Prolog-style cons list: a sample [`UserTerm`] built on the engine's
//! extension hook, not part of the core's own contract. Ground truth:
//! `examples/original_source/examples/prolog_list.{hpp,cpp}`.
//!
//! Unlike [`crate::term::FlatList`] (a fixed-length built-in term), a cons
//! list is open-tailed: `tail` may itself be an unbound variable, which is
//! exactly what makes `append/3` able to run backward.

use std::any::Any;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::engine::Engine;
use crate::term::{Term, TermRef, UserTerm};

/// One `[head | tail]` cell. `head` and `tail` are arbitrary terms — in
/// particular `tail` is usually either `nil()` (a proper list), another
/// `ConsCell` (a longer proper list), or an unbound variable (an open
/// list, the shape `append`'s backward mode produces).
#[derive(Debug)]
pub struct ConsCell {
    pub head: TermRef,
    pub tail: TermRef,
}

impl UserTerm for ConsCell {
    /// Structural equality after the head/tail have already been
    /// dereferenced by the unifier (this is only reached when neither side
    /// is a variable and both are `User`).
    fn term_eq(&self, other: &dyn UserTerm) -> bool {
        match other.as_any().downcast_ref::<ConsCell>() {
            Some(o) => Term::equal(&self.head, &o.head) && Term::equal(&self.tail, &o.tail),
            None => false,
        }
    }

    /// Orders by head first, then tail — a cons list's own open-ended
    /// recursive shape doesn't admit a cheap length-first comparison the
    /// way `FlatList` does.
    fn term_lt(&self, other: &dyn UserTerm) -> bool {
        match other.as_any().downcast_ref::<ConsCell>() {
            Some(o) => match Term::compare(&self.head, &o.head) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => Term::compare(&self.tail, &o.tail) == Ordering::Less,
            },
            None => false,
        }
    }

    /// A cons cell only unifies with another cons cell (variables are
    /// already handled upstream by the engine), and then only if both the
    /// heads and the tails unify — ground truth `PrologList::unifyWith`.
    fn unify_with(&self, engine: &mut Engine, other: &dyn UserTerm) -> bool {
        match other.as_any().downcast_ref::<ConsCell>() {
            Some(o) => engine.unify(&self.head, &o.head) && engine.unify(&self.tail, &o.tail),
            None => false,
        }
    }

    fn type_tag(&self) -> &'static str {
        "cons"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The empty list, `[]` — an ordinary atom, not a special cons-list case.
pub fn nil() -> TermRef {
    Term::atom("[]")
}

/// `[head | tail]`.
pub fn cons(head: TermRef, tail: TermRef) -> TermRef {
    Term::user(Rc::new(ConsCell { head, tail }))
}

/// Build a proper (nil-terminated) list from `elements`, e.g.
/// `list_from(vec![1, 2, 3])` is the cons-list equivalent of Prolog's
/// `[1, 2, 3]`.
pub fn list_from(elements: Vec<TermRef>) -> TermRef {
    elements.into_iter().rev().fold(nil(), |tail, head| cons(head, tail))
}

/// Build an "open" list whose last element is the tail rather than the
/// final cons cell's head — typically an unbound variable, so the result
/// can still unify against an arbitrarily long proper list. Ground truth
/// `make_open_list_from` in `prolog_list.hpp`.
pub fn open_list_from(elements: Vec<TermRef>) -> TermRef {
    assert!(
        elements.len() >= 2,
        "open_list_from needs at least one element plus a tail"
    );
    let mut iter = elements.into_iter().rev();
    let tail = iter.next().expect("length checked above");
    iter.fold(tail, |tail, head| cons(head, tail))
}

/// Render a cons list as `[e1, e2, ... | tail]` (or `[e1, e2, ...]` when the
/// final tail is `nil()`). Not part of the engine's contract — term
/// printing is out of scope for the core — this exists purely so the
/// `append` demo has something to show the user.
pub fn render(list: &TermRef) -> String {
    let mut parts = Vec::new();
    let mut current = Term::dereference(list);
    loop {
        let cell = match current.as_ref() {
            Term::User(u) => u.as_any().downcast_ref::<ConsCell>().map(|c| (c.head.clone(), c.tail.clone())),
            _ => None,
        };
        match cell {
            Some((head, tail)) => {
                parts.push(term_repr(&Term::dereference(&head)));
                current = Term::dereference(&tail);
            }
            None => break,
        }
    }
    if Term::equal(&current, &nil()) {
        format!("[{}]", parts.join(", "))
    } else {
        format!("[{}|{}]", parts.join(", "), term_repr(&current))
    }
}

fn term_repr(t: &TermRef) -> String {
    match t.as_ref() {
        Term::Int(v) => v.to_string(),
        Term::Float(v) => v.to_string(),
        Term::Atom(a) => a.to_string(),
        Term::Var(v) => format!("_G{}", v.borrow().id()),
        Term::List(_) => "<flat-list>".to_string(),
        Term::User(_) => "<user>".to_string(),
    }
}
