// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The extension hook a host term type must implement to participate in
//! unification, ordering, and equality alongside the built-in term kinds.
//!
//! [`UserTerm::unify_with`] is the one the engine actually depends on for
//! correctness; it is only ever called after every built-in unification
//! case has already been tried and failed. `term_eq`/`term_lt` mirror the
//! original C++ `Term` base class's pure-virtual `isEqualTo`/`isLessThan`.

use std::any::Any;
use std::fmt::Debug;

use crate::engine::Engine;

/// A host-defined term shape (e.g. a Prolog-style cons cell).
///
/// Implementors are stored behind `Rc<dyn UserTerm>` inside `Term::User`.
pub trait UserTerm: Debug {
    /// Structural equality against another user term. Only ever called with
    /// `other` already dereferenced by the engine.
    fn term_eq(&self, other: &dyn UserTerm) -> bool;

    /// Total order against another user term of (possibly) different
    /// concrete type. Implementors that don't care about a rich order can
    /// fall back to comparing type names or `repr`.
    fn term_lt(&self, other: &dyn UserTerm) -> bool;

    /// Attempt to unify this term with `other` (already dereferenced, and
    /// already known not to be a variable, atom, integer, float, or flat
    /// list). Returning `false` does not itself undo any bindings already
    /// trailed by nested unification — as with every unifier path, undoing
    /// is the enclosing choice frame's job on backtrack, not the hook's.
    fn unify_with(&self, engine: &mut Engine, other: &dyn UserTerm) -> bool;

    /// Debug label used in ordering/equality fallbacks and trace output.
    fn type_tag(&self) -> &'static str;

    /// Downcasting support so a concrete `unify_with`/`term_eq` impl can
    /// recover its own shape from `other: &dyn UserTerm`.
    fn as_any(&self) -> &dyn Any;
}
