// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate image;

use clap::{value_t_or_exit, App, Arg, ArgMatches};
use escapegrid::cli;
use escapegrid::{Grid, GridParams, Strategy};
use image::png::PNGEncoder;
use image::ColorType;
use log::{error, info, warn};
use std::fs::File;

const FILE: &str = "file";
const COMPLEXITY: &str = "complexity";
const ITERATIONS: &str = "iterations";
const MOVE_X: &str = "move-x";
const MOVE_Y: &str = "move-y";
const ZOOM: &str = "zoom";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const STRATEGY: &str = "strategy";
const WORKERS: &str = "workers";

fn float_arg<'a, 'b>(name: &'a str, short: &'a str, default: &'a str, help: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .required(false)
        .short(short)
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value(default)
        .validator(|s| cli::validate_number::<f64>(&s, "Could not parse number"))
        .help(help)
}

fn size_arg<'a, 'b>(name: &'a str, help: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .required(false)
        .long(name)
        .takes_value(true)
        .default_value("2048")
        .validator(|s| cli::validate_number::<usize>(&s, "Could not parse image size"))
        .help(help)
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("render")
        .version("0.1.0")
        .about("Renders the Mandelbrot set with one of the scheduling strategies")
        .arg(
            Arg::with_name(FILE)
                .required(false)
                .long(FILE)
                .short("f")
                .takes_value(true)
                .default_value("output.png")
                .help("File name to output to"),
        )
        .arg(
            Arg::with_name(COMPLEXITY)
                .required(false)
                .long(COMPLEXITY)
                .short("c")
                .takes_value(true)
                .default_value("4")
                .validator(|s| cli::validate_number::<f64>(&s, "Could not parse complexity"))
                .help("Squared escape radius of the fractal"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
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
        .arg(float_arg(MOVE_X, "x", "0", "x movement"))
        .arg(float_arg(MOVE_Y, "y", "0", "y movement"))
        .arg(float_arg(ZOOM, "z", "1", "zoom level").long(ZOOM))
        .arg(size_arg(WIDTH, "width of image"))
        .arg(size_arg(HEIGHT, "height of image"))
        .arg(
            Arg::with_name(STRATEGY)
                .required(false)
                .long(STRATEGY)
                .short("s")
                .takes_value(true)
                .possible_values(&cli::strategy_names())
                .default_value("bufferedRowWorkers")
                .help("How the work is distributed"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .required(false)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value("8")
                .validator(|s| cli::validate_workers(&s))
                .help("Workers for the pool strategies, or 'auto'"),
        )
        .get_matches()
}

fn write_image(outfile: &str, grid: &Grid, (width, height): (u32, u32)) -> Result<(), std::io::Error> {
    let output = File::create(outfile)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(&grid.to_rgba_bytes(), width, height, ColorType::RGBA(8))
}

fn main() {
    cli::init_logging();
    let matches = args();

    let params = GridParams {
        width: value_t_or_exit!(matches, WIDTH, usize),
        height: value_t_or_exit!(matches, HEIGHT, usize),
        zoom: value_t_or_exit!(matches, ZOOM, f64),
        move_x: value_t_or_exit!(matches, MOVE_X, f64),
        move_y: value_t_or_exit!(matches, MOVE_Y, f64),
        complexity: value_t_or_exit!(matches, COMPLEXITY, f64),
        max_iteration: value_t_or_exit!(matches, ITERATIONS, u32),
    };
    let strategy = value_t_or_exit!(matches, STRATEGY, Strategy);
    let workers = matches
        .value_of(WORKERS)
        .and_then(cli::parse_workers)
        .unwrap_or(escapegrid::DEFAULT_WORKERS);
    let outfile = matches.value_of(FILE).unwrap_or("output.png");

    let dimensions = match cli::image_dimensions(params.width, params.height) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            error!("Error sizing image: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "rendering {}x{} with {} ({} workers)",
        params.width, params.height, strategy, workers
    );
    let grid = match strategy.run(&params, workers) {
        Ok(grid) => grid,
        Err(e) => {
            error!("Error executing algorithm: {}", e);
            std::process::exit(1);
        }
    };

    if grid.is_empty() {
        warn!("{}x{} grid is empty, nothing to write", grid.width(), grid.height());
        return;
    }

    if let Err(e) = write_image(outfile, &grid, dimensions) {
        error!("Error encoding fractal to {}: {}", outfile, e);
        std::process::exit(1);
    }
    info!("saved to {}", outfile);
}

