// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The SEND+MORE=MONEY cryptarithm: choose distinct digits for
//! `S,E,N,D,M,O,R,Y` so that `SEND + MORE = MONEY`. Ground truth:
//! `examples/original_source/examples/send_more_money.cpp`.
//!
//! The original subclasses `PVar` (`PuzzleVar`) to reject out-of-range or
//! already-used digits directly inside `bind`. `Term` here is a closed enum
//! with a fixed variant set, so that hook doesn't exist; instead the
//! distinctness and range checks are pushed entirely into
//! [`Puzzle::choices_for`] — a variable is only ever offered digits that are
//! in range and not already taken — and into [`ColumnSumConstraint`], which
//! plays the same role as the original's `ColumnSumConstraint`: propagate
//! what each column addition determines once enough of its operands are
//! known, so the search only has to branch on genuinely free digits.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::combinators::{conjunction, loop_, LoopBodyFactory};
use crate::demos::collect::CollectAndFail;
use crate::engine::{Engine, GoalRef, VarChoice};
use crate::term::{Term, TermRef};

const NUM_DIGITS: usize = 10;

fn digit_table() -> Vec<TermRef> {
    (0..NUM_DIGITS as i64).map(Term::int).collect()
}

fn bound_digit(t: &TermRef) -> Option<i64> {
    match Term::dereference(t).as_ref() {
        Term::Int(v) => Some(*v),
        _ => None,
    }
}

struct PuzzleVar {
    var: TermRef,
    low: i64,
    high: i64,
}

/// One column-sum constraint: `lhs` (the digits above the line, plus any
/// incoming carry) sums to `rhs + 10 * carry`. `solved` is a fresh variable
/// used purely as a backtrackable flag: binding it to `atom("solved")`
/// records "this constraint is determined", and unbinding it on backtrack
/// (automatic, via the trail) is exactly what lets the constraint be
/// re-derived if the search backs up past the choices that solved it —
/// ground truth `ColumnSumConstraint::solved`/`solved_value`.
struct ColumnSumConstraint {
    lhs: Vec<TermRef>,
    rhs: TermRef,
    carry: TermRef,
    solved: TermRef,
}

impl ColumnSumConstraint {
    fn new(engine: &mut Engine, lhs: Vec<TermRef>, rhs: TermRef, carry: TermRef) -> Self {
        ColumnSumConstraint {
            lhs,
            rhs,
            carry,
            solved: engine.fresh_var(),
        }
    }

    /// Returns `None` if the constraint is now unsatisfiable, `Some(true)`
    /// if it just became solved (progress), `Some(false)` otherwise.
    fn try_solve(&self, engine: &mut Engine, digits: &[TermRef]) -> Option<bool> {
        if bound_digit(&self.solved).is_some() {
            return Some(false);
        }

        let mut sum = 0i64;
        let mut unbound = Vec::new();
        for v in &self.lhs {
            match bound_digit(v) {
                Some(d) => sum += d,
                None => unbound.push(v.clone()),
            }
        }

        if unbound.is_empty() {
            if !engine.unify(&self.carry, &digits[(sum / 10) as usize]) {
                return None;
            }
            if !engine.unify(&self.rhs, &digits[(sum % 10) as usize]) {
                return None;
            }
            engine.unify(&self.solved, &Term::atom("solved"));
            return Some(true);
        }

        if unbound.len() == 1 {
            let (rhs_val, carry_val) = match (bound_digit(&self.rhs), bound_digit(&self.carry)) {
                (Some(r), Some(c)) => (r, c),
                _ => return Some(false),
            };
            let value = rhs_val + 10 * carry_val - sum;
            if !(0..NUM_DIGITS as i64).contains(&value) {
                return None;
            }
            if !engine.unify(&unbound[0], &digits[value as usize]) {
                return None;
            }
            engine.unify(&self.solved, &Term::atom("solved"));
            return Some(true);
        }

        Some(false)
    }
}

/// Owns every puzzle variable and constraint; ground truth
/// `AllConstraints`.
struct Puzzle {
    vars: Vec<PuzzleVar>,
    distinct: Vec<TermRef>,
    constraints: Vec<ColumnSumConstraint>,
    digits: Vec<TermRef>,
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle").finish_non_exhaustive()
    }
}

impl Puzzle {
    fn choices_for(&self, pv: &PuzzleVar) -> Vec<TermRef> {
        let used: Vec<i64> = self.distinct.iter().filter_map(bound_digit).collect();
        (pv.low..=pv.high)
            .filter(|d| !used.contains(d))
            .map(|d| self.digits[d as usize].clone())
            .collect()
    }

    /// Run every constraint, and simplify-bind any puzzle variable with
    /// exactly one remaining candidate digit, repeating until a full pass
    /// makes no further progress. Ground truth `AllConstraints::try_solve`.
    fn try_solve(&self, engine: &mut Engine) -> bool {
        let mut progress = true;
        while progress {
            progress = false;
            for c in &self.constraints {
                match c.try_solve(engine, &self.digits) {
                    None => return false,
                    Some(p) => progress |= p,
                }
            }
            for pv in &self.vars {
                if bound_digit(&pv.var).is_some() {
                    continue;
                }
                let choices = self.choices_for(pv);
                if choices.is_empty() {
                    return false;
                }
                if choices.len() == 1 {
                    if !engine.unify(&pv.var, &choices[0]) {
                        return false;
                    }
                    progress = true;
                }
            }
        }
        true
    }
}

/// Drives the `Loop` combinator: each iteration picks the first unbound
/// puzzle variable and offers its remaining candidate digits, filtered by
/// `Puzzle::try_solve`. Ground truth `PuzzleLoopBodyFactory`.
struct PuzzleLoopFactory {
    puzzle: Rc<Puzzle>,
}

impl fmt::Debug for PuzzleLoopFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PuzzleLoopFactory").finish_non_exhaustive()
    }
}

impl LoopBodyFactory for PuzzleLoopFactory {
    fn next_body(&mut self, _engine: &mut Engine) -> Option<GoalRef> {
        let next_var = self.puzzle.vars.iter().find(|pv| bound_digit(&pv.var).is_none())?;
        let choices = self.puzzle.choices_for(next_var);
        let var = next_var.var.clone();
        let puzzle = self.puzzle.clone();
        Some(VarChoice::with_test(var, choices, move |engine| puzzle.try_solve(engine)))
    }
}

/// `S, E, N, D, M, O, R, Y` for one solution, in that order.
pub type Solution = [i64; 8];

fn render_row(row: &Solution) -> String {
    let [s, e, n, d, m, o, r, y] = *row;
    format!(" {s}{e}{n}{d}\n+{m}{o}{r}{e}\n-----\n{m}{o}{n}{e}{y}")
}

/// Enumerate every solution to SEND+MORE=MONEY, returning
/// `[S,E,N,D,M,O,R,Y]` for each.
pub fn solve(engine: &mut Engine) -> Vec<Solution> {
    let digits = digit_table();

    let s = PuzzleVar { var: engine.fresh_var(), low: 1, high: 9 };
    let e = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let n = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let d = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let m = PuzzleVar { var: engine.fresh_var(), low: 1, high: 9 };
    let o = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let r = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let y = PuzzleVar { var: engine.fresh_var(), low: 0, high: 9 };
    let c1 = PuzzleVar { var: engine.fresh_var(), low: 0, high: 1 };
    let c2 = PuzzleVar { var: engine.fresh_var(), low: 0, high: 1 };
    let c3 = PuzzleVar { var: engine.fresh_var(), low: 0, high: 1 };

    let distinct = vec![
        s.var.clone(),
        e.var.clone(),
        n.var.clone(),
        d.var.clone(),
        m.var.clone(),
        o.var.clone(),
        r.var.clone(),
        y.var.clone(),
    ];

    // Column sums, above-the-line first:
    //   D + E       = Y + 10*C1
    //   N + R + C1  = E + 10*C2
    //   E + O + C2  = N + 10*C3
    //   S + M + C3  = O + 10*M
    let c_de_y = ColumnSumConstraint::new(engine, vec![d.var.clone(), e.var.clone()], y.var.clone(), c1.var.clone());
    let c_nrc1_e = ColumnSumConstraint::new(
        engine,
        vec![n.var.clone(), r.var.clone(), c1.var.clone()],
        e.var.clone(),
        c2.var.clone(),
    );
    let c_eoc2_n = ColumnSumConstraint::new(
        engine,
        vec![e.var.clone(), o.var.clone(), c2.var.clone()],
        n.var.clone(),
        c3.var.clone(),
    );
    let c_smc3_o = ColumnSumConstraint::new(
        engine,
        vec![s.var.clone(), m.var.clone(), c3.var.clone()],
        o.var.clone(),
        m.var.clone(),
    );

    let m_var = m.var.clone();
    let puzzle = Puzzle {
        vars: vec![s, e, n, d, m, o, r, y, c1, c2, c3],
        distinct,
        constraints: vec![c_de_y, c_nrc1_e, c_eoc2_n, c_smc3_o],
        digits,
    };

    // M is the leading carry of a 4-digit-plus-4-digit sum; it can only be
    // 1 (ground truth: the original fixes this before the first
    // `try_solve` call too).
    if !engine.unify(&m_var, &puzzle.digits[1]) {
        return Vec::new();
    }
    if !puzzle.try_solve(engine) {
        return Vec::new();
    }

    let puzzle = Rc::new(puzzle);
    let loop_goal = loop_(Box::new(PuzzleLoopFactory { puzzle: puzzle.clone() }));

    let solutions: Rc<RefCell<Vec<Solution>>> = Rc::new(RefCell::new(Vec::new()));
    let puzzle_for_collect = puzzle.clone();
    let collect = CollectAndFail::goal(solutions.clone(), move |_engine| {
        let mut row = [0i64; 8];
        for (i, pv) in puzzle_for_collect.vars[0..8].iter().enumerate() {
            row[i] = bound_digit(&pv.var).expect("every puzzle var is bound once the loop exits");
        }
        row
    });

    let goal = conjunction(vec![loop_goal, collect]).unwrap();
    engine.execute(Some(goal), false);

    solutions.borrow().clone()
}

/// Pretty-print a solved puzzle the way the C++ demo does.
pub fn render(row: &Solution) -> String {
    render_row(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_unique_solution() {
        let mut engine = Engine::new();
        let solutions = solve(&mut engine);
        assert_eq!(solutions.len(), 1);
        let [s, e, n, d, m, o, r, y] = solutions[0];
        let send = 1000 * s + 100 * e + 10 * n + d;
        let more = 1000 * m + 100 * o + 10 * r + e;
        let money = 10000 * m + 1000 * o + 100 * n + 10 * e + y;
        assert_eq!(send + more, money);
        assert_eq!(m, 1);
    }

    #[test]
    fn all_eight_letters_are_distinct() {
        let mut engine = Engine::new();
        let solutions = solve(&mut engine);
        let row = solutions[0];
        let mut sorted = row.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), row.len());
    }
}
