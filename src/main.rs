// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;

use clap::{value_t_or_exit, values_t_or_exit, App, Arg, ArgMatches};
use escapegrid::cli;
use escapegrid::harness::{self, Matrix};
use escapegrid::{GridParams, Strategy};
use log::{error, info};

const MAX_SIZE: &str = "max-size";
const STEP: &str = "step";
const ROUNDS: &str = "rounds";
const WORKERS: &str = "workers";
const STRATEGY: &str = "strategy";
const COMPLEXITY: &str = "complexity";
const ITERATIONS: &str = "iterations";
const MOVE_X: &str = "move-x";
const MOVE_Y: &str = "move-y";
const VERIFY: &str = "verify";

fn args<'a>() -> ArgMatches<'a> {
    App::new("escapegrid")
        .version("0.1.0")
        .about("Times every scheduling strategy over a sweep of grid sizes")
        .arg(
            Arg::with_name(MAX_SIZE)
                .long(MAX_SIZE)
                .takes_value(true)
                .default_value("500")
                .validator(|s| cli::validate_number::<usize>(&s, "Could not parse size"))
                .help("Side of the largest square grid"),
        )
        .arg(
            Arg::with_name(STEP)
                .long(STEP)
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    cli::validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse step",
                        "Step must be at least 1",
                    )
                })
                .help("Difference between successive grid sides"),
        )
        .arg(
            Arg::with_name(ROUNDS)
                .long(ROUNDS)
                .short("r")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    cli::validate_range(
                        &s,
                        1,
                        1000,
                        "Could not parse round count",
                        "Round count must be between 1 and 1000",
                    )
                })
                .help("Runs per measurement; the fastest is kept"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value("8")
                .validator(|s| cli::validate_workers(&s))
                .help("Workers for the pool strategies, or 'auto'"),
        )
        .arg(
            Arg::with_name(STRATEGY)
                .long(STRATEGY)
                .short("s")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .possible_values(&cli::strategy_names())
                .help("Strategy to measure; repeat for several (default: all)"),
        )
        .arg(
            Arg::with_name(COMPLEXITY)
                .long(COMPLEXITY)
                .short("c")
                .takes_value(true)
                .default_value("40")
                .validator(|s| cli::validate_number::<f64>(&s, "Could not parse complexity"))
                .help("Squared escape radius of the fractal"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    cli::validate_range(
                        &s,
                        1,
                        u32::max_value(),
                        "Could not parse iteration count",
                        "Iteration count must be at least 1",
                    )
                })
                .help("Max number of iterations to run per cell"),
        )
        .arg(
            Arg::with_name(MOVE_X)
                .short("x")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.75")
                .validator(|s| cli::validate_number::<f64>(&s, "Could not parse number"))
                .help("x movement"),
        )
        .arg(
            Arg::with_name(MOVE_Y)
                .short("y")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| cli::validate_number::<f64>(&s, "Could not parse number"))
                .help("y movement"),
        )
        .arg(
            Arg::with_name(VERIFY)
                .long(VERIFY)
                .help("Check every grid against the sequential baseline"),
        )
        .get_matches()
}

fn main() {
    cli::init_logging();
    let matches = args();

    let strategies = if matches.is_present(STRATEGY) {
        values_t_or_exit!(matches, STRATEGY, Strategy)
    } else {
        Strategy::ALL.to_vec()
    };

    let matrix = Matrix {
        sizes: Matrix::sizes_up_to(
            value_t_or_exit!(matches, MAX_SIZE, usize),
            value_t_or_exit!(matches, STEP, usize),
        ),
        rounds: value_t_or_exit!(matches, ROUNDS, usize),
        workers: matches
            .value_of(WORKERS)
            .and_then(cli::parse_workers)
            .unwrap_or(escapegrid::DEFAULT_WORKERS),
        template: GridParams {
            complexity: value_t_or_exit!(matches, COMPLEXITY, f64),
            max_iteration: value_t_or_exit!(matches, ITERATIONS, u32),
            move_x: value_t_or_exit!(matches, MOVE_X, f64),
            move_y: value_t_or_exit!(matches, MOVE_Y, f64),
            ..GridParams::default()
        },
        verify: matches.is_present(VERIFY),
    };

    info!(
        "{} measurements planned",
        harness::plan(&matrix, &strategies).len()
    );
    match harness::run(&matrix, &strategies) {
        Ok(report) => {
            print!("{}", report);
            for &strategy in &strategies {
                if let Some(largest) = report.series(strategy).last() {
                    info!(
                        "{} took {:?} at {}x{}",
                        strategy, largest.elapsed, largest.size, largest.size
                    );
                }
            }
        }
        Err(e) => {
            error!("Benchmark failure: {}", e);
            std::process::exit(1);
        }
    }
}
