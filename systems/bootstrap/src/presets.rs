//! Bundled round plans.
//!
//! These mirror the layouts the game ships with; custom rounds come in as
//! deserialized [`RoundPlan`](crate::RoundPlan) values instead.

use crate::{RoundPlan, TowerPlan};

const FIELD_SIZE: usize = 16;

/// Open 16×16 field with a single eastward tower at (3, 3) and the agent
/// spawning in the north-west corner.
#[must_use]
pub fn open_field() -> RoundPlan {
    let mut rows = blank_rows(FIELD_SIZE, FIELD_SIZE);
    place(&mut rows, 0, 0, 'S');
    RoundPlan {
        name: "open_field".to_owned(),
        layout: rows,
        towers: vec![tower(3, 3, 1.0, 0.0)],
    }
}

/// Two tower pairs raking the field from the east and south edges.
#[must_use]
pub fn crossfire() -> RoundPlan {
    let mut rows = blank_rows(FIELD_SIZE, FIELD_SIZE);
    place(&mut rows, 0, 0, 'S');
    RoundPlan {
        name: "crossfire".to_owned(),
        layout: rows,
        towers: vec![
            tower(14, 1, -1.0, 0.0),
            tower(14, 2, -1.0, 0.0),
            tower(1, 14, 0.0, -1.0),
            tower(2, 14, 0.0, -1.0),
        ],
    }
}

/// Four towers back to back in the center, firing outward, ringed by wall
/// fragments with open corners.
#[must_use]
pub fn garden() -> RoundPlan {
    let mut rows = blank_rows(FIELD_SIZE, FIELD_SIZE);
    place(&mut rows, 0, 0, 'S');
    for (x, y) in [
        (7, 4),
        (8, 4),
        (7, 11),
        (8, 11),
        (4, 7),
        (4, 8),
        (11, 7),
        (11, 8),
    ] {
        place(&mut rows, x, y, '#');
    }
    RoundPlan {
        name: "garden".to_owned(),
        layout: rows,
        towers: vec![
            tower(7, 7, -1.0, 0.0),
            tower(7, 8, 0.0, 1.0),
            tower(8, 7, 0.0, -1.0),
            tower(8, 8, 1.0, 0.0),
        ],
    }
}

fn blank_rows(width: usize, height: usize) -> Vec<String> {
    (0..height).map(|_| ".".repeat(width)).collect()
}

fn place(rows: &mut [String], x: usize, y: usize, symbol: char) {
    rows[y].replace_range(x..=x, &symbol.to_string());
}

fn tower(x: i32, y: i32, dx: f32, dy: f32) -> TowerPlan {
    TowerPlan {
        x,
        y,
        dx,
        dy,
        rate: grid_siege_world::DEFAULT_FIRE_RATE,
        health: grid_siege_world::STARTING_HEALTH.get(),
    }
}
