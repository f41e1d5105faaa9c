//! Spatial remapping of round states for training-time augmentation.
//!
//! Training drivers diversify episodes by rotating and mirroring whole
//! rounds at reset; the game loop itself never calls into this module.

use grid_siege_core::{GridPos, GridVec};
use rand::Rng;

use crate::{Grid, Projectile, RoundState};

/// Produces a copy of the round rotated by `rotate_quarters` quarter turns
/// clockwise and then mirrored over the destination grid.
///
/// The quarter count is masked to `0..=3`; odd counts swap the grid
/// dimensions. Cells, the agent, tower positions and projectile positions
/// all pass through the same rotation-then-flip map (projectile positions
/// are snapped to the lattice first); tower and projectile direction
/// vectors are rotated and sign-flipped without translation. Health, fire
/// counters, the directive slots and the tick counter carry over
/// untouched. Stored directives keep their pre-transform target
/// coordinates, which is why augmentation belongs at round reset, before
/// any plan exists.
#[must_use]
pub fn transform(state: &RoundState, rotate_quarters: u8, flip_h: bool, flip_v: bool) -> RoundState {
    let quarters = rotate_quarters & 3;
    let src_w = state.grid.width();
    let src_h = state.grid.height();
    let (dst_w, dst_h) = if quarters % 2 == 0 {
        (src_w, src_h)
    } else {
        (src_h, src_w)
    };

    let remap = |pos: GridPos| -> GridPos {
        flip_point(
            rotate_point(pos, src_w, src_h, quarters),
            dst_w,
            dst_h,
            flip_h,
            flip_v,
        )
    };
    let remap_vec =
        |vec: GridVec| -> GridVec { flip_vec(rotate_vec(vec, quarters), flip_h, flip_v) };

    let mut grid = Grid::new(dst_w, dst_h);
    for y in 0..src_h {
        for x in 0..src_w {
            let source = GridPos::new(x, y);
            if let Some(kind) = state.grid.kind_at(source) {
                grid.set_kind(remap(source), kind);
            }
        }
    }

    let towers = state
        .towers
        .iter()
        .map(|tower| tower.remapped(remap(tower.position), remap_vec(tower.direction)))
        .collect();

    let projectiles = state
        .projectiles
        .iter()
        .map(|projectile| {
            let cell = remap(projectile.position.rounded());
            Projectile::new(
                GridVec::new(cell.x() as f32, cell.y() as f32),
                remap_vec(projectile.direction),
            )
        })
        .collect();

    RoundState {
        grid,
        towers,
        projectiles,
        position: remap(state.position),
        health: state.health,
        active_directive: state.active_directive,
        interrupted_directive: state.interrupted_directive,
        tick_index: state.tick_index,
    }
}

/// Applies [`transform`] with a uniformly random quarter count and two
/// independent random flips.
///
/// The generator is caller-supplied so training drivers own the seeding.
#[must_use]
pub fn random_transform<R: Rng + ?Sized>(state: &RoundState, rng: &mut R) -> RoundState {
    let quarters = rng.gen_range(0..4u8);
    let flip_h = rng.gen::<bool>();
    let flip_v = rng.gen::<bool>();
    transform(state, quarters, flip_h, flip_v)
}

fn rotate_point(pos: GridPos, width: i32, height: i32, quarters: u8) -> GridPos {
    match quarters & 3 {
        0 => pos,
        1 => GridPos::new(height - 1 - pos.y(), pos.x()),
        2 => GridPos::new(width - 1 - pos.x(), height - 1 - pos.y()),
        _ => GridPos::new(pos.y(), width - 1 - pos.x()),
    }
}

fn flip_point(pos: GridPos, width: i32, height: i32, flip_h: bool, flip_v: bool) -> GridPos {
    let x = if flip_h { width - 1 - pos.x() } else { pos.x() };
    let y = if flip_v { height - 1 - pos.y() } else { pos.y() };
    GridPos::new(x, y)
}

fn rotate_vec(vec: GridVec, quarters: u8) -> GridVec {
    match quarters & 3 {
        0 => vec,
        1 => GridVec::new(-vec.y(), vec.x()),
        2 => GridVec::new(-vec.x(), -vec.y()),
        _ => GridVec::new(vec.y(), -vec.x()),
    }
}

fn flip_vec(vec: GridVec, flip_h: bool, flip_v: bool) -> GridVec {
    GridVec::new(
        if flip_h { -vec.x() } else { vec.x() },
        if flip_v { -vec.y() } else { vec.y() },
    )
}
