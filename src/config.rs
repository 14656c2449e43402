// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Engine resource limits.
//!
//! There is no persisted configuration, no config file, and no wire format —
//! the only configurable surface is how much headroom the engine
//! pre-allocates and how deep its choice stack is allowed to grow before
//! the host's own runaway-search guard should have fired. This generalizes
//! a fixed trail-capacity constant into a value the embedder can choose
//! per-`Engine` instead of a compile-time constant.

/// Resource limits for an [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// `Vec::with_capacity` hint for the trail and choice stacks. Not a
    /// hard cap — both grow past this if needed.
    pub trail_capacity_hint: usize,
    /// Maximum choice-stack depth. `None` means unbounded (the default);
    /// there is no cancellation/timeout mechanism of its own, so this
    /// exists purely for an embedder that wants a hard runaway-search
    /// backstop. Exceeding it panics — a resource exhaustion, not a search
    /// failure, so it is not folded into the success/failure boolean the
    /// engine otherwise reports.
    pub max_choice_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trail_capacity_hint: 256,
            max_choice_depth: None,
        }
    }
}
