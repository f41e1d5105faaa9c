#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round initialization from explicit plan descriptions.
//!
//! A [`RoundPlan`] is a plain configuration value — deserializable from
//! TOML or any other serde format — that fully describes one round: the
//! symbol layout of the grid and the tower garrison. Nothing here reaches
//! for global state; callers hand the plan in and receive a fresh
//! [`RoundState`] back, optionally spun through a random spatial
//! augmentation the way training resets do.

pub mod presets;

use grid_siege_core::{CellKind, GridPos, GridVec, Health, TowerId};
use grid_siege_world::{transform, Grid, RoundState, Tower};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declarative description of one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    /// Human-readable name of the plan, echoed in diagnostics.
    pub name: String,
    /// Row-major symbol grid: `.` empty, `#` wall, `S` start, `T` tower
    /// marker. Every row must have the same width.
    pub layout: Vec<String>,
    /// Towers to garrison, in identifier order.
    pub towers: Vec<TowerPlan>,
}

/// Placement and tuning of a single tower within a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerPlan {
    /// Column of the cell the tower occupies.
    pub x: i32,
    /// Row of the cell the tower occupies.
    pub y: i32,
    /// Horizontal component of the firing direction.
    pub dx: f32,
    /// Vertical component of the firing direction.
    pub dy: f32,
    /// Ticks between shots.
    #[serde(default = "default_rate")]
    pub rate: u32,
    /// Starting hit points.
    #[serde(default = "default_tower_health")]
    pub health: i32,
}

fn default_rate() -> u32 {
    grid_siege_world::DEFAULT_FIRE_RATE
}

fn default_tower_health() -> i32 {
    grid_siege_world::STARTING_HEALTH.get()
}

/// Reasons a round plan cannot be turned into a playable round.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The layout has no rows, or rows with no cells.
    #[error("plan layout has no cells")]
    EmptyLayout,
    /// A layout row differs in width from the first row.
    #[error("layout row {row} has width {found}, expected {expected}")]
    RaggedLayout {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width actually found.
        found: usize,
    },
    /// The layout contains a symbol outside the plan alphabet.
    #[error("unknown layout symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol {
        /// The unrecognized character.
        symbol: char,
        /// Column of the offending cell.
        x: i32,
        /// Row of the offending cell.
        y: i32,
    },
    /// No `S` cell exists to spawn the agent on.
    #[error("layout contains no start cell")]
    MissingStart,
    /// A tower sits outside the layout bounds.
    #[error("tower {index} at ({x}, {y}) is outside the grid")]
    TowerOutOfBounds {
        /// Index of the tower within the plan.
        index: usize,
        /// Column the plan asked for.
        x: i32,
        /// Row the plan asked for.
        y: i32,
    },
    /// A tower sits on a wall cell.
    #[error("tower {index} at ({x}, {y}) overlaps a wall")]
    TowerOnWall {
        /// Index of the tower within the plan.
        index: usize,
        /// Column the plan asked for.
        x: i32,
        /// Row the plan asked for.
        y: i32,
    },
}

/// Builds a fresh round from the provided plan.
///
/// The agent spawns on the first `S` cell in row-major order; additional
/// start cells stay in the grid as [`CellKind::Start`] markers so drivers
/// that randomize spawn points can find them. Tower cells are stamped
/// [`CellKind::Tower`] for renderer encoding.
pub fn build_round(plan: &RoundPlan) -> Result<RoundState, PlanError> {
    if plan.layout.is_empty() {
        return Err(PlanError::EmptyLayout);
    }
    let height = plan.layout.len() as i32;
    let width_cells = plan.layout[0].chars().count();
    if width_cells == 0 {
        return Err(PlanError::EmptyLayout);
    }
    let width = width_cells as i32;

    let mut grid = Grid::new(width, height);
    let mut start = None;
    for (y, row) in plan.layout.iter().enumerate() {
        let row_width = row.chars().count();
        if row_width != width_cells {
            return Err(PlanError::RaggedLayout {
                row: y,
                expected: width_cells,
                found: row_width,
            });
        }
        for (x, symbol) in row.chars().enumerate() {
            let pos = GridPos::new(x as i32, y as i32);
            let kind = match symbol {
                '.' | ' ' => CellKind::Empty,
                '#' => CellKind::Wall,
                'S' => {
                    if start.is_none() {
                        start = Some(pos);
                    }
                    CellKind::Start
                }
                'T' => CellKind::Tower,
                other => {
                    return Err(PlanError::UnknownSymbol {
                        symbol: other,
                        x: pos.x(),
                        y: pos.y(),
                    })
                }
            };
            grid.set_kind(pos, kind);
        }
    }
    let start = start.ok_or(PlanError::MissingStart)?;

    let mut towers = Vec::with_capacity(plan.towers.len());
    for (index, entry) in plan.towers.iter().enumerate() {
        let position = GridPos::new(entry.x, entry.y);
        if !grid.contains(position) {
            return Err(PlanError::TowerOutOfBounds {
                index,
                x: entry.x,
                y: entry.y,
            });
        }
        if grid.kind_at(position) == Some(CellKind::Wall) {
            return Err(PlanError::TowerOnWall {
                index,
                x: entry.x,
                y: entry.y,
            });
        }
        grid.set_kind(position, CellKind::Tower);
        towers.push(
            Tower::new(
                TowerId::new(index as u32),
                position,
                GridVec::new(entry.dx, entry.dy),
            )
            .with_rate(entry.rate)
            .with_health(Health::new(entry.health)),
        );
    }

    Ok(RoundState::new(grid, towers, start))
}

/// Builds a round and spins it through a random rotation and mirroring.
///
/// This is the reset path training drivers use to diversify episodes; the
/// generator is caller-supplied so seeding stays in their hands.
pub fn build_round_randomized<R: Rng + ?Sized>(
    plan: &RoundPlan,
    rng: &mut R,
) -> Result<RoundState, PlanError> {
    let state = build_round(plan)?;
    Ok(transform::random_transform(&state, rng))
}
