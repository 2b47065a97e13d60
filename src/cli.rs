// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pieces shared by the command-line programs: clap validators, the
//! worker-count parser and logger setup.

use std::convert::TryFrom;
use std::str::FromStr;

use crate::strategies::Strategy;

/// A clap validator: the value parses as a T.
pub fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

/// A clap validator: the value parses as a T between low and high,
/// inclusive.
pub fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// A worker count: either a positive number, or `auto` for one worker
/// per logical CPU.
pub fn parse_workers(s: &str) -> Option<usize> {
    if s == "auto" {
        return Some(num_cpus::get());
    }
    usize::from_str(s).ok().filter(|&n| n > 0)
}

/// A clap validator for `parse_workers`.
pub fn validate_workers(s: &str) -> Result<(), String> {
    match parse_workers(s) {
        Some(_) => Ok(()),
        None => Err("Worker count must be a positive number or 'auto'".to_string()),
    }
}

/// The strategy names, for clap's `possible_values`.
pub fn strategy_names() -> Vec<&'static str> {
    Strategy::ALL.iter().map(|s| s.name()).collect()
}

/// Image encoders take 32-bit sides; a grid wider or taller than that
/// cannot be saved.
pub fn image_dimensions(width: usize, height: usize) -> Result<(u32, u32), String> {
    let side = |len: usize| {
        u32::try_from(len).map_err(|_| format!("{}x{} is too large for an image", width, height))
    };
    Ok((side(width)?, side(height)?))
}

/// Sends log output to stderr at `info` unless RUST_LOG says
/// otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
