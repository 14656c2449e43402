// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Property-based checks of the quantified invariants in `spec.md` §8 that
//! a fixed set of unit scenarios can't fully cover: unify-symmetry,
//! unify-reflexivity with zero trail growth, and cut-to-depth.

use proptest::prelude::*;

use logic_search_core::engine::VarChoice;
use logic_search_core::term::Term;
use logic_search_core::Engine;

/// A small closed universe of ground terms (no variables, no user terms) —
/// enough to exercise every built-in unification case without needing a
/// recursive `Strategy` for arbitrarily deep lists.
fn ground_term() -> impl Strategy<Value = Term> {
    prop_oneof![
        any::<i64>().prop_map(Term::Int),
        any::<f64>().prop_filter("no NaN", |f| !f.is_nan()).prop_map(Term::Float),
        "[a-z]{1,8}".prop_map(|s| Term::Atom(s.into())),
    ]
}

fn to_ref(t: Term) -> logic_search_core::term::TermRef {
    std::rc::Rc::new(t)
}

proptest! {
    /// Invariant 4: `unify(a, b) ⇔ unify(b, a)`, and when both sides
    /// contain no variables the dereferenced outcome is identical either
    /// way (ground terms can't actually bind anything, so this reduces to
    /// "unify agrees with `Term::equal` regardless of argument order").
    #[test]
    fn unify_is_symmetric_for_ground_terms(a in ground_term(), b in ground_term()) {
        let a = to_ref(a);
        let b = to_ref(b);

        let mut forward = Engine::new();
        let forward_result = forward.unify(&a, &b);

        let mut backward = Engine::new();
        let backward_result = backward.unify(&b, &a);

        prop_assert_eq!(forward_result, backward_result);
        prop_assert_eq!(forward_result, Term::equal(&a, &b));
    }

    /// Invariant 4, variable side: unifying a fresh variable with a ground
    /// term succeeds either way and leaves the same value bound.
    #[test]
    fn unify_with_a_variable_is_symmetric(t in ground_term()) {
        let t = to_ref(t);

        let mut forward = Engine::new();
        let x = forward.fresh_var();
        prop_assert!(forward.unify(&x, &t));
        prop_assert!(Term::equal(&Term::dereference(&x), &t));

        let mut backward = Engine::new();
        let y = backward.fresh_var();
        prop_assert!(backward.unify(&t, &y));
        prop_assert!(Term::equal(&Term::dereference(&y), &t));
    }

    /// Invariant 5: `unify(a, a)` always succeeds with zero trail growth.
    #[test]
    fn unify_reflexive_never_grows_the_trail(t in ground_term()) {
        let t = to_ref(t);
        let mut engine = Engine::new();
        let before = engine.trail_height();
        prop_assert!(engine.unify(&t, &t));
        prop_assert_eq!(engine.trail_height(), before);
    }

    /// Invariant 5, variable side: a fresh variable unified with itself.
    #[test]
    fn unify_reflexive_on_a_fresh_variable_never_grows_the_trail(_unused in any::<u8>()) {
        let mut engine = Engine::new();
        let x = engine.fresh_var();
        let before = engine.trail_height();
        prop_assert!(engine.unify(&x, &x));
        prop_assert_eq!(engine.trail_height(), before);
    }

    /// Invariant 6: cut to depth `d` leaves the choice stack at exactly
    /// depth `d`, for any number of nondeterministic choice points pushed
    /// on top of it and any `d` within range.
    #[test]
    fn cut_to_depth_lands_exactly_there(extra_frames in 0usize..6, cut_at in 0usize..6) {
        let mut engine = Engine::new();
        let cut_at = cut_at.min(extra_frames);

        for _ in 0..extra_frames {
            let x = engine.fresh_var();
            let goal = VarChoice::new(x, vec![Term::int(1), Term::int(2)]);
            // unbind_after=false leaves exactly one choice frame per call,
            // since each offers two candidates and only the first is taken.
            engine.execute(Some(goal), false);
        }
        prop_assert_eq!(engine.current_choice_depth(), extra_frames);

        engine.cut_to(cut_at);
        prop_assert_eq!(engine.current_choice_depth(), cut_at);
    }
}
