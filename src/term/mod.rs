// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Term model: the tagged sum every unification and comparison operates on.
//!
//! # Design
//!
//! `Term` is a tagged sum, not a virtual base class — the five built-in
//! shapes (variable, integer, float, atom, flat list) are enum variants,
//! and the one open-ended shape (a host term type) is carried as a boxed
//! [`UserTerm`] trait object in the `User` variant. Every variant answers
//! the same small protocol: `dereference`, `bind`, `reset`, `equal`,
//! `less_than`. Only `Var` accepts `bind`; every other variant's `bind`
//! fails, matching `PInt`/`PFloat`/`PAtom`/`CList::bind` in the C++ original
//! (`examples/original_source/include/pl_search/p{int,float,atom}.hpp`).
//!
//! # Memory model
//!
//! Terms are `Rc`-shared (`TermRef = Rc<Term>`). Variable bindings can form
//! cycles (unifying `X` with a structure containing `X`); that is
//! intentional and bounded by the owning `Engine`'s lifetime, not
//! something this module tries to detect or break.

mod list;
mod user;
mod var;

pub use list::FlatList;
pub use user::UserTerm;
pub use var::{VarCell, VarRef};

use std::cmp::Ordering;
use std::rc::Rc;

/// Shared handle to a term. Cloning is cheap (`Rc::clone`).
pub type TermRef = Rc<Term>;

/// The tagged sum of term shapes the engine understands natively, plus the
/// `User` escape hatch for host-defined shapes.
#[derive(Debug, Clone)]
pub enum Term {
    Var(VarRef),
    Int(i64),
    Float(f64),
    Atom(Rc<str>),
    List(Rc<FlatList>),
    User(Rc<dyn UserTerm>),
}

impl Term {
    pub fn atom(name: impl Into<Rc<str>>) -> TermRef {
        Rc::new(Term::Atom(name.into()))
    }

    pub fn int(v: i64) -> TermRef {
        Rc::new(Term::Int(v))
    }

    pub fn float(v: f64) -> TermRef {
        Rc::new(Term::Float(v))
    }

    pub fn list(elements: Vec<TermRef>) -> TermRef {
        Rc::new(Term::List(Rc::new(FlatList::new(elements))))
    }

    pub fn user(t: Rc<dyn UserTerm>) -> TermRef {
        Rc::new(Term::User(t))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Follow variable chains to a non-variable or unbound variable. A pure
    /// read: never mutates a variable's value slot (no path compression —
    /// any such mutation would itself need to be trailed, and a pure read
    /// must not trail).
    ///
    /// `UpdatableVar`s are a deliberate exception: they stop at themselves
    /// rather than following `value`, so a caller must still treat the
    /// returned term as "the current term", not "the final non-variable".
    pub fn dereference(self_ref: &TermRef) -> TermRef {
        let mut current = self_ref.clone();
        loop {
            let next = match current.as_ref() {
                Term::Var(v) => {
                    let cell = v.borrow();
                    if cell.updatable {
                        return current.clone();
                    }
                    match &cell.value {
                        Some(bound) => bound.clone(),
                        None => return current.clone(),
                    }
                }
                _ => return current.clone(),
            };
            current = next;
        }
    }

    /// Record a new binding. Only a `Var` accepts this; every other variant
    /// returns `false`. Binding a variable to itself is a no-op success
    /// (mirrors `PVar::bind` in the C++ original).
    ///
    /// Callers are responsible for trailing the prior value *before*
    /// calling `bind` — this mirrors the original's split between
    /// `Engine::trail` and `PVar::bind`, and keeps `bind` itself ignorant
    /// of the trail (so it can be reused by `reset`'s counterpart, the
    /// unifier, without double-trailing).
    pub fn bind(self_ref: &TermRef, other: &TermRef) -> bool {
        match self_ref.as_ref() {
            Term::Var(v) => {
                let other_deref = Term::dereference(other);
                if Rc::ptr_eq(self_ref, &other_deref) {
                    return true;
                }
                v.borrow_mut().value = Some(other_deref);
                true
            }
            _ => false,
        }
    }

    /// Restore a prior binding state. Only meaningful for `Var`; a no-op for
    /// every other variant.
    pub fn reset(self_ref: &TermRef, prior: Option<TermRef>) {
        if let Term::Var(v) = self_ref.as_ref() {
            v.borrow_mut().value = prior;
        }
    }

    /// Structural equality after dereferencing both sides.
    pub fn equal(a: &TermRef, b: &TermRef) -> bool {
        let a = Term::dereference(a);
        let b = Term::dereference(b);
        if Rc::ptr_eq(&a, &b) {
            return true;
        }
        match (a.as_ref(), b.as_ref()) {
            (Term::Var(v1), Term::Var(v2)) => v1.borrow().id == v2.borrow().id,
            (Term::Int(x), Term::Int(y)) => x == y,
            (Term::Float(x), Term::Float(y)) => x == y,
            (Term::Atom(x), Term::Atom(y)) => x == y,
            (Term::List(x), Term::List(y)) => {
                x.elements().len() == y.elements().len()
                    && x.elements()
                        .iter()
                        .zip(y.elements())
                        .all(|(e1, e2)| Term::equal(e1, e2))
            }
            (Term::User(x), Term::User(y)) => x.term_eq(y.as_ref()),
            _ => false,
        }
    }

    /// Total order: `Var < Int/Float < Atom < List < User`, variables by
    /// creation id, numbers by value across kinds, atoms by name,
    /// flat lists element-wise, user terms by their own `term_lt`.
    pub fn compare(a: &TermRef, b: &TermRef) -> Ordering {
        let a = Term::dereference(a);
        let b = Term::dereference(b);
        kind_rank(&a).cmp(&kind_rank(&b)).then_with(|| match (a.as_ref(), b.as_ref()) {
            (Term::Var(v1), Term::Var(v2)) => v1.borrow().id.cmp(&v2.borrow().id),
            (Term::Int(x), Term::Float(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
            (Term::Float(x), Term::Int(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
            (Term::Int(x), Term::Int(y)) => x.cmp(y),
            (Term::Float(x), Term::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Term::Atom(x), Term::Atom(y)) => x.cmp(y),
            (Term::List(x), Term::List(y)) => {
                for (e1, e2) in x.elements().iter().zip(y.elements()) {
                    let c = Term::compare(e1, e2);
                    if c != Ordering::Equal {
                        return c;
                    }
                }
                x.elements().len().cmp(&y.elements().len())
            }
            (Term::User(x), Term::User(y)) => {
                if x.term_lt(y.as_ref()) {
                    Ordering::Less
                } else if y.term_lt(x.as_ref()) {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
            _ => unreachable!("kind_rank put mismatched kinds in the same bucket"),
        })
    }
}

fn kind_rank(t: &TermRef) -> u8 {
    match t.as_ref() {
        Term::Var(_) => 0,
        Term::Int(_) | Term::Float(_) => 1,
        Term::Atom(_) => 2,
        Term::List(_) => 3,
        Term::User(_) => 4,
    }
}
