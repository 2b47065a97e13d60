// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate crossbeam;

use clap::{value_t_or_exit, App, Arg, ArgMatches};
use crossbeam::channel;
use escapegrid::cli;
use escapegrid::pipeline::{self, Generator, PipelineError, Writer};
use log::{error, info};
use std::thread;
use std::time::Duration;

const OUTPUT: &str = "output";
const CAPACITY: &str = "capacity";
const CADENCE: &str = "cadence-ms";
const DURATION: &str = "duration-ms";

fn args<'a>(capacity: &'a str, cadence: &'a str) -> ArgMatches<'a> {
    App::new("pipeline")
        .version("0.1.0")
        .about("Streams random numbers through a bounded queue into a file")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("./output.txt")
                .help("File the numbers are appended to"),
        )
        .arg(
            Arg::with_name(CAPACITY)
                .long(CAPACITY)
                .short("c")
                .takes_value(true)
                .default_value(capacity)
                .validator(|s| {
                    cli::validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse capacity",
                        "Capacity must be between 1 and 1000000",
                    )
                })
                .help("Queue capacity"),
        )
        .arg(
            Arg::with_name(CADENCE)
                .long(CADENCE)
                .takes_value(true)
                .default_value(cadence)
                .validator(|s| {
                    cli::validate_range(
                        &s,
                        1,
                        60_000,
                        "Could not parse cadence",
                        "Cadence must be between 1 and 60000 ms",
                    )
                })
                .help("Milliseconds between generated numbers"),
        )
        .arg(
            Arg::with_name(DURATION)
                .long(DURATION)
                .short("d")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| cli::validate_number::<u64>(&s, "Could not parse duration"))
                .help("Milliseconds to run before shutting down"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), PipelineError> {
    let output = matches.value_of(OUTPUT).unwrap_or("./output.txt");
    let capacity = value_t_or_exit!(matches, CAPACITY, usize);
    let cadence = Duration::from_millis(value_t_or_exit!(matches, CADENCE, u64));
    let duration = Duration::from_millis(value_t_or_exit!(matches, DURATION, u64));

    let (numbers, queue) = channel::bounded(capacity);
    let generator = Generator::new(numbers, cadence, pipeline::random_values()).start()?;
    let writer = Writer::new(queue, output).start()?;

    thread::sleep(duration);

    let produced = generator.close()?;
    let written = writer.close()?;
    info!(
        "{} numbers generated, {} written to {}, {} failed, {} dropped",
        produced.handled,
        written.handled,
        output,
        written.failed,
        produced.handled.saturating_sub(written.handled + written.failed)
    );
    Ok(())
}

fn main() {
    cli::init_logging();
    let capacity = pipeline::DEFAULT_CAPACITY.to_string();
    let cadence = pipeline::DEFAULT_CADENCE.as_millis().to_string();
    let matches = args(&capacity, &cadence);
    if let Err(e) = run(&matches) {
        error!("Pipeline failure: {}", e);
        std::process::exit(1);
    }
}
