// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! An embeddable nondeterministic search core: trailed logical variables,
//! structural unification, and a continuation-passing backtracking engine.
//!
//! This is a general-purpose logic-programming kernel, not a domain-specific
//! solver — it provides the same small set of primitives a Prolog engine is
//! built on (variables, unification, choice points, cut) as a library a host
//! program can embed and extend with its own term shapes and predicates.
//!
//! # Layout
//!
//! - [`term`] — the tagged-sum term model (variables, integers, floats,
//!   atoms, flat lists, and an open `UserTerm` hook for host-defined shapes).
//! - [`trail`] — the undo log backtracking restores variable bindings from.
//! - [`engine`] — variable allocation, the unifier, the choice-point stack,
//!   and the predicate protocol every goal implements.
//! - [`combinators`] — conjunction, disjunction, cut, once, double-negation,
//!   if-then-else, and bounded loop, built on the engine's primitives.
//! - [`config`] — resource limits an embedder can tune.
//!
//! # Example
//!
//! ```
//! use logic_search_core::engine::Engine;
//! use logic_search_core::term::Term;
//!
//! let mut engine = Engine::new();
//! let x = engine.fresh_var();
//! assert!(engine.unify(&x, &Term::int(42)));
//! ```

pub mod combinators;
pub mod config;
pub mod demos;
pub mod engine;
pub mod term;
pub mod trail;

pub use config::EngineConfig;
pub use engine::Engine;
pub use trail::Trail;
