//! Deterministic A* pathfinding over the round grid.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use grid_siege_core::GridPos;

use crate::RoundState;

/// Probe order for the four cardinal neighbors: south, east, north, west.
///
/// The order is part of the contract — together with the insertion counter
/// it fixes the expansion order of equal-cost frontiers, so replays stay
/// deterministic.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Finds a shortest walkable path from `start` to `goal`, inclusive of both
/// endpoints.
///
/// Returns `vec![start]` when the endpoints coincide and an empty path when
/// either endpoint is outside the grid or not walkable, when no route
/// exists, or when the search budget of `4 × width × height` expansions is
/// exhausted. Goal validity is the caller's precondition; this routine
/// never substitutes a nearby cell (see [`nearest_valid_neighbor`]).
#[must_use]
pub fn find_path(state: &RoundState, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    if start == goal {
        return vec![start];
    }

    let width = state.grid().width();
    let height = state.grid().height();

    if !state.grid().contains(start) || !state.grid().contains(goal) {
        tracing::error!(?start, ?goal, width, height, "path endpoint out of bounds");
        return Vec::new();
    }
    if !state.is_position_valid(start) {
        tracing::error!(?start, "path start is not walkable");
        return Vec::new();
    }
    if !state.is_position_valid(goal) {
        tracing::error!(?goal, "path goal is not walkable");
        return Vec::new();
    }

    let cell_count = (width * height) as usize;
    let mut g_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<GridPos>> = vec![None; cell_count];
    let mut in_open = vec![false; cell_count];

    // Heap entries are (f, counter, cell) behind `Reverse`, so ties on f
    // resolve by insertion order rather than by cell coordinates.
    let mut open: BinaryHeap<Reverse<(u32, u64, GridPos)>> = BinaryHeap::new();
    let mut counter: u64 = 0;

    let start_index = dense_index(width, start);
    g_score[start_index] = 0;
    in_open[start_index] = true;
    open.push(Reverse((start.manhattan_distance(goal), counter, start)));

    let budget = cell_count * 4;
    let mut expansions = 0usize;

    while expansions < budget {
        let Some(Reverse((_, _, current))) = open.pop() else {
            break;
        };
        expansions += 1;
        let current_index = dense_index(width, current);
        in_open[current_index] = false;

        if current == goal {
            return reconstruct(width, &came_from, current);
        }

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let neighbor = current.offset(dx, dy);
            if !state.is_position_valid(neighbor) {
                continue;
            }

            let tentative = g_score[current_index] + 1;
            let neighbor_index = dense_index(width, neighbor);
            if tentative < g_score[neighbor_index] {
                came_from[neighbor_index] = Some(current);
                g_score[neighbor_index] = tentative;
                if !in_open[neighbor_index] {
                    counter += 1;
                    open.push(Reverse((
                        tentative + neighbor.manhattan_distance(goal),
                        counter,
                        neighbor,
                    )));
                    in_open[neighbor_index] = true;
                }
            }
        }
    }

    if expansions >= budget {
        tracing::error!(?start, ?goal, budget, "path search budget exhausted");
    } else {
        tracing::error!(?start, ?goal, expansions, "no path between endpoints");
    }
    Vec::new()
}

/// First walkable cell adjacent to `pos`, probed south, east, north, west.
///
/// Planning helper for callers that want to stand next to a cell that is
/// itself occupied, such as a tower under attack.
#[must_use]
pub fn nearest_valid_neighbor(state: &RoundState, pos: GridPos) -> Option<GridPos> {
    let found = NEIGHBOR_OFFSETS
        .iter()
        .map(|&(dx, dy)| pos.offset(dx, dy))
        .find(|&candidate| state.is_position_valid(candidate));
    if found.is_none() {
        tracing::error!(?pos, "no walkable neighbor around cell");
    }
    found
}

fn dense_index(width: i32, pos: GridPos) -> usize {
    (pos.y() * width + pos.x()) as usize
}

fn reconstruct(width: i32, came_from: &[Option<GridPos>], tail: GridPos) -> Vec<GridPos> {
    let mut path = vec![tail];
    let mut cursor = tail;
    while let Some(parent) = came_from[dense_index(width, cursor)] {
        path.push(parent);
        cursor = parent;
    }
    path.reverse();
    path
}
