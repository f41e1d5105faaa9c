#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for Grid Siege.
//!
//! A [`RoundState`] owns everything one play session needs: the static
//! grid, the tower garrison, in-flight projectiles, the agent, the stored
//! directive slots, and the tick counter. External drivers advance it one
//! tick at a time through [`step`], which never mutates its input and
//! always returns a well-formed successor state.

pub mod navigation;
pub mod transform;
mod transition;

pub use transition::{step, StepOutcome};

use grid_siege_core::{CellKind, Directive, GridPos, GridVec, Health, TowerId};

/// Hit points the agent and towers start a round with.
pub const STARTING_HEALTH: Health = Health::new(100);

/// Ticks a tower waits between shots unless configured otherwise.
pub const DEFAULT_FIRE_RATE: u32 = 8;

pub(crate) const AGENT_STRIKE_DAMAGE: i32 = 20;
pub(crate) const PROJECTILE_DAMAGE: i32 = 10;

/// Static cell layout of a round, immutable once the round starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid of the provided dimensions filled with empty cells.
    ///
    /// Non-positive dimensions produce an empty grid.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![CellKind::Empty; (width * height) as usize],
        }
    }

    /// Number of cell columns in the grid.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of cell rows in the grid.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Reports whether the position lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x() >= 0 && pos.x() < self.width && pos.y() >= 0 && pos.y() < self.height
    }

    /// Kind of the cell at the provided position, if it is in bounds.
    #[must_use]
    pub fn kind_at(&self, pos: GridPos) -> Option<CellKind> {
        self.index(pos).map(|index| self.cells[index])
    }

    /// Overwrites the cell at the provided position.
    ///
    /// Writes outside the grid are ignored.
    pub fn set_kind(&mut self, pos: GridPos, kind: CellKind) {
        if let Some(index) = self.index(pos) {
            self.cells[index] = kind;
        }
    }

    /// Dense row-major cell slice consumed by observation encoders.
    #[must_use]
    pub fn kinds(&self) -> &[CellKind] {
        &self.cells
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y() * self.width + pos.x()) as usize)
        } else {
            None
        }
    }
}

/// Stationary defender that periodically fires projectiles.
///
/// Towers are created at round initialization and never leave the tower
/// list; a destroyed tower keeps its slot with depleted health and stops
/// blocking movement.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    pub(crate) id: TowerId,
    pub(crate) position: GridPos,
    pub(crate) direction: GridVec,
    pub(crate) health: Health,
    pub(crate) rate: u32,
    pub(crate) tick: u32,
}

impl Tower {
    /// Creates a tower with full health and the default fire rate.
    #[must_use]
    pub fn new(id: TowerId, position: GridPos, direction: GridVec) -> Self {
        Self {
            id,
            position,
            direction,
            health: STARTING_HEALTH,
            rate: DEFAULT_FIRE_RATE,
            tick: 0,
        }
    }

    /// Overrides the number of ticks between shots.
    #[must_use]
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    /// Overrides the starting health.
    #[must_use]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Clones the tower onto a new position and firing direction, keeping
    /// identity, health and fire-counter state.
    #[must_use]
    pub fn remapped(&self, position: GridPos, direction: GridVec) -> Self {
        Self {
            position,
            direction,
            ..self.clone()
        }
    }

    /// Identifier allocated to the tower at round initialization.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Cell the tower occupies.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Unit vector the tower fires along.
    #[must_use]
    pub const fn direction(&self) -> GridVec {
        self.direction
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Number of ticks between shots.
    #[must_use]
    pub const fn rate(&self) -> u32 {
        self.rate
    }

    /// Reports whether the tower has been reduced to rubble.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health.is_depleted()
    }
}

/// Projectile in flight across the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub(crate) position: GridVec,
    pub(crate) direction: GridVec,
}

impl Projectile {
    /// Creates a projectile at the provided position and velocity.
    #[must_use]
    pub const fn new(position: GridVec, direction: GridVec) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Continuous position of the projectile.
    #[must_use]
    pub const fn position(&self) -> GridVec {
        self.position
    }

    /// Per-tick displacement of the projectile.
    #[must_use]
    pub const fn direction(&self) -> GridVec {
        self.direction
    }

    pub(crate) fn advanced(&self) -> Self {
        Self {
            position: GridVec::new(
                self.position.x() + self.direction.x(),
                self.position.y() + self.direction.y(),
            ),
            direction: self.direction,
        }
    }
}

/// Complete state of one round, advanced tick by tick through [`step`].
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub(crate) grid: Grid,
    pub(crate) towers: Vec<Tower>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) position: GridPos,
    pub(crate) health: Health,
    pub(crate) active_directive: Option<Directive>,
    pub(crate) interrupted_directive: Option<Directive>,
    pub(crate) tick_index: u64,
}

impl RoundState {
    /// Creates a fresh round: full agent health, no projectiles, empty
    /// directive slots, tick counter at zero.
    #[must_use]
    pub fn new(grid: Grid, towers: Vec<Tower>, position: GridPos) -> Self {
        Self {
            grid,
            towers,
            projectiles: Vec::new(),
            position,
            health: STARTING_HEALTH,
            active_directive: None,
            interrupted_directive: None,
            tick_index: 0,
        }
    }

    /// Overrides the agent's starting health.
    #[must_use]
    pub fn with_agent_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Static cell layout of the round.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Towers garrisoned in the round, destroyed ones included.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Cell the agent occupies.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Agent hit points remaining.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Directive the agent is currently executing, if any.
    #[must_use]
    pub const fn active_directive(&self) -> Option<Directive> {
        self.active_directive
    }

    /// Directive that was interrupted by the active one, if any.
    #[must_use]
    pub const fn interrupted_directive(&self) -> Option<Directive> {
        self.interrupted_directive
    }

    /// Number of ticks processed since round initialization.
    #[must_use]
    pub const fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Looks up a tower by its identifier.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|tower| tower.id == id)
    }

    /// Reports whether the agent may occupy the provided cell.
    ///
    /// A cell is walkable when it lies inside the grid, is not a wall, and
    /// holds no living tower. Destroyed towers do not block.
    #[must_use]
    pub fn is_position_valid(&self, pos: GridPos) -> bool {
        if !self.grid.contains(pos) {
            return false;
        }
        if self.grid.kind_at(pos) == Some(CellKind::Wall) {
            return false;
        }
        !self
            .towers
            .iter()
            .any(|tower| !tower.is_destroyed() && tower.position == pos)
    }

    /// Reports whether the round has ended.
    ///
    /// The round is over once the agent's health is depleted or every tower
    /// is destroyed. A round initialized with no towers is therefore over
    /// from the start.
    #[must_use]
    pub fn is_round_over(&self) -> bool {
        self.health.is_depleted() || self.towers.iter().all(Tower::is_destroyed)
    }
}
