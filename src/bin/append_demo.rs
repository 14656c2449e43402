// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Demo binary: `append/3` run forward and backward over the Prolog-style
//! cons list sample term. Ground truth:
//! `examples/original_source/examples/prolog_list.cpp`'s `main`.

use std::cell::RefCell;
use std::rc::Rc;

use logic_search_core::combinators::conjunction;
use logic_search_core::demos::append::append;
use logic_search_core::demos::collect::CollectAndFail;
use logic_search_core::demos::cons_list::{list_from, render};
use logic_search_core::term::Term;
use logic_search_core::Engine;

fn main() {
    tracing_subscriber::fmt::init();

    let mut engine = Engine::new();

    println!("Forward: append([1, 2], [3, 4], L)\n");
    let l1 = list_from(vec![Term::int(1), Term::int(2)]);
    let l2 = list_from(vec![Term::int(3), Term::int(4)]);
    let l3 = engine.fresh_var();
    let witnesses: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let l3_for_snapshot = l3.clone();
    let collect = CollectAndFail::goal(witnesses.clone(), move |_engine| render(&l3_for_snapshot));
    let goal = conjunction(vec![append(l1, l2, l3), collect]).expect("two goals always link");
    engine.execute(Some(goal), false);
    for solution in witnesses.borrow().iter() {
        println!("  L = {solution}");
    }

    println!("\nBackward: append(L1, L2, [1, 2, 3, 4])\n");
    let l1 = engine.fresh_var();
    let l2 = engine.fresh_var();
    let l3 = list_from(vec![Term::int(1), Term::int(2), Term::int(3), Term::int(4)]);
    let witnesses: Rc<RefCell<Vec<(String, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let (l1_for_snapshot, l2_for_snapshot) = (l1.clone(), l2.clone());
    let collect = CollectAndFail::goal(witnesses.clone(), move |_engine| {
        (render(&l1_for_snapshot), render(&l2_for_snapshot))
    });
    let goal = conjunction(vec![append(l1, l2, l3), collect]).expect("two goals always link");
    engine.execute(Some(goal), false);
    for (left, right) in witnesses.borrow().iter() {
        println!("  L1 = {left}, L2 = {right}");
    }
}
