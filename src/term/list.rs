// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The built-in flat-list term: an ordered sequence of terms that only
//! unifies element-wise with another flat list of the same length.
//!
//! This is deliberately not a Prolog cons-list (no `[H|T]` open tail) —
//! that shape is a separate, user-defined extension (see
//! `crate::demos::cons_list`). A flat list is immutable and cheap to
//! compare; it exists for client code that wants list-shaped terms
//! without writing its own `UserTerm`.

use crate::term::TermRef;

/// An immutable, fixed-length sequence of terms.
#[derive(Debug, Clone)]
pub struct FlatList {
    pub(crate) elements: Vec<TermRef>,
}

impl FlatList {
    pub fn new(elements: Vec<TermRef>) -> Self {
        FlatList { elements }
    }

    pub fn elements(&self) -> &[TermRef] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
