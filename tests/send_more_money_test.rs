// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integration tests for the SEND+MORE=MONEY demo (`spec.md` §8 scenario
//! S9, the worked example for the combinator stack under real constraint
//! propagation), beyond the arithmetic check already inline in
//! `src/demos/send_more_money.rs`.

use logic_search_core::demos::send_more_money::{render, solve};
use logic_search_core::Engine;

#[test]
fn every_digit_is_within_its_declared_range() {
    let mut engine = Engine::new();
    let solutions = solve(&mut engine);
    assert_eq!(solutions.len(), 1);
    let [s, e, n, d, m, o, r, y] = solutions[0];
    assert!((1..=9).contains(&s));
    assert!((0..=9).contains(&e));
    assert!((0..=9).contains(&n));
    assert!((0..=9).contains(&d));
    assert!((1..=9).contains(&m));
    assert!((0..=9).contains(&o));
    assert!((0..=9).contains(&r));
    assert!((0..=9).contains(&y));
}

#[test]
fn solving_twice_on_fresh_engines_gives_the_same_answer() {
    let mut first = Engine::new();
    let mut second = Engine::new();
    assert_eq!(solve(&mut first), solve(&mut second));
}

#[test]
fn render_produces_the_classic_four_line_layout() {
    let mut engine = Engine::new();
    let solutions = solve(&mut engine);
    let text = render(&solutions[0]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].trim_start().len(), 4);
    assert!(lines[1].starts_with('+'));
    assert_eq!(lines[2], "-----");
    assert_eq!(lines[3].len(), 5);
}
