// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Demo binary: solve SEND+MORE=MONEY and print every solution. Ground
//! truth: `examples/original_source/examples/send_more_money.cpp`'s `main`.

use logic_search_core::demos::send_more_money::{render, solve};
use logic_search_core::Engine;

fn main() {
    tracing_subscriber::fmt::init();

    println!("\nSolutions of the SEND+MORE=MONEY puzzle:\n");

    let mut engine = Engine::new();
    let solutions = solve(&mut engine);
    for solution in &solutions {
        println!("{}\n", render(solution));
    }

    println!("End of solutions ({} found)", solutions.len());
}
