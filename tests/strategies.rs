extern crate escapegrid;
extern crate image;

use escapegrid::kernel::BLACK;
use escapegrid::{colour_of, Grid, GridParams, Strategy};
use image::Rgba;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Mutex;

fn ten_by_ten() -> GridParams {
    GridParams {
        width: 10,
        height: 10,
        complexity: 4.0,
        max_iteration: 1000,
        zoom: 1.0,
        move_x: 0.0,
        move_y: 0.0,
    }
}

#[test]
fn buffered_cell_workers_match_the_baseline_on_a_small_grid() {
    let params = ten_by_ten();
    let baseline = Strategy::Sequential.run(&params, 4).unwrap();
    let pooled = Strategy::BufferedCellWorkers.run(&params, 4).unwrap();
    assert!(pooled.is_complete());
    assert_eq!(pooled, baseline);
}

#[test]
fn every_strategy_matches_the_baseline() {
    let params = GridParams {
        complexity: 40.0,
        move_x: -0.75,
        ..GridParams::default()
    }
    .with_size(61, 47);
    let baseline = Strategy::Sequential.run(&params, 8).unwrap();
    for &strategy in Strategy::ALL.iter() {
        let grid = strategy.run(&params, 8).unwrap();
        assert_eq!(
            grid.first_difference(&baseline),
            None,
            "{} disagrees with the baseline",
            strategy
        );
    }
}

#[test]
fn rerunning_a_strategy_is_bit_identical() {
    let params = ten_by_ten().with_size(33, 21);
    for &strategy in Strategy::ALL.iter() {
        let first = strategy.run(&params, 3).unwrap();
        let second = strategy.run(&params, 3).unwrap();
        assert_eq!(first.to_rgba_bytes(), second.to_rgba_bytes(), "{}", strategy);
    }
}

#[test]
fn each_cell_is_computed_exactly_once() {
    let workers = NonZeroUsize::new(5).unwrap();
    for &(width, height) in &[(0, 0), (1, 1), (7, 1), (1, 7), (12, 9)] {
        for &strategy in Strategy::ALL.iter() {
            let visited = Mutex::new(HashSet::new());
            let kernel = |column: usize, row: usize| {
                assert!(
                    visited.lock().unwrap().insert((column, row)),
                    "({}, {}) computed twice",
                    column,
                    row
                );
                Rgba([0, 0, 0, 255])
            };
            let grid = strategy.fill(width, height, &kernel, workers);
            assert!(grid.is_complete());
            assert_eq!(visited.into_inner().unwrap().len(), width * height, "{}", strategy);
        }
    }
}

#[test]
fn empty_grids_come_back_empty() {
    for &strategy in Strategy::ALL.iter() {
        for &(width, height) in &[(0, 10), (10, 0), (0, 0)] {
            let grid = strategy.run(&ten_by_ten().with_size(width, height), 8).unwrap();
            assert!(grid.is_empty());
            assert_eq!((grid.width(), grid.height()), (width, height));
        }
    }
}

#[test]
fn the_centre_of_the_default_view_is_in_the_set() {
    let grid: Grid = Strategy::RowParallel.run(&ten_by_ten(), 8).unwrap();
    assert_eq!(grid.get(5, 5), BLACK);
    assert_eq!(grid.get(0, 0), colour_of(2, &ten_by_ten()));
}
