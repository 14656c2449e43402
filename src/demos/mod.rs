// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Sample term types and demo predicates built on the engine: a
//! Prolog-style cons list ([`cons_list`]), `append/3` in both directions
//! ([`append`]), the SEND+MORE=MONEY cryptarithm ([`send_more_money`]), and
//! a reusable "record a witness and fail" test/demo helper ([`collect`]).
//!
//! These are in-scope sample material, not part of the core's contract —
//! the engine never references this module, only the other direction.

pub mod append;
pub mod collect;
pub mod cons_list;
pub mod send_more_money;
