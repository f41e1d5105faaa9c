#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Siege engine.
//!
//! This crate defines the surface that connects round initializers, the
//! authoritative round state, and external drivers. Drivers submit one
//! [`Action`] per tick, the world resolves it against the stored
//! [`Directive`] slots, and broadcasts [`Event`] values describing what
//! happened so that renderers and training adapters can react without
//! inspecting internal state.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as x/y coordinates.
///
/// The x axis increases rightward and the y axis increases downward.
/// Coordinates are signed so neighbor probing and rotation arithmetic can
/// momentarily step outside the grid before a bounds check rejects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the other position sits exactly one cell away.
    #[must_use]
    pub fn is_adjacent_to(self, other: GridPos) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Continuous vector used for firing directions and projectile motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridVec {
    x: f32,
    y: f32,
}

impl GridVec {
    /// Creates a new continuous vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the vector.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the vector.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Rounds both components to the nearest lattice cell.
    #[must_use]
    pub fn rounded(&self) -> GridPos {
        GridPos::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hit points carried by the agent and by towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(i32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Returns the health after absorbing the given damage, floored at zero.
    #[must_use]
    pub fn damaged(self, amount: i32) -> Self {
        Self((self.0 - amount).max(0))
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }
}

/// Static classification of a single grid cell.
///
/// The numeric codes form the encoding consumed by renderers and
/// observation adapters. Only [`CellKind::Wall`] blocks movement and
/// projectiles; [`CellKind::Tower`] and [`CellKind::Start`] are markers
/// written during round setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellKind {
    /// Open ground the agent can traverse.
    Empty = 0,
    /// Impassable terrain that also stops projectiles.
    Wall = 1,
    /// Cell occupied by a tower at round start.
    Tower = 2,
    /// Candidate spawn cell for the agent.
    Start = 3,
}

impl CellKind {
    /// Numeric code used by external encoders.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a numeric cell code, if it names a known kind.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::Tower),
            3 => Some(Self::Start),
            _ => None,
        }
    }
}

/// Per-tick input decision submitted by the external driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Walk toward the target cell over as many ticks as needed.
    Move {
        /// Cell the agent should reach.
        target: GridPos,
    },
    /// Keep striking the named tower until it falls.
    Attack {
        /// Identifier of the tower to attack.
        tower: TowerId,
    },
    /// Hold position for one tick.
    Stand,
    /// Keep executing whatever directive is already active.
    Resume,
}

/// The agent's stored multi-tick plan.
///
/// [`Action::Resume`] has no counterpart here: resuming means "leave the
/// stored plan alone", so it can never itself be stored. Conversions from
/// actions go through [`Directive::from_action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directive {
    /// Walk toward the target cell.
    Move {
        /// Cell the agent should reach.
        target: GridPos,
    },
    /// Strike the named tower.
    Attack {
        /// Identifier of the tower to attack.
        tower: TowerId,
    },
    /// Hold position for one tick.
    Stand,
}

impl Directive {
    /// Translates an input action into a storable directive.
    ///
    /// Returns `None` for [`Action::Resume`], which carries no plan of its
    /// own.
    #[must_use]
    pub const fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::Move { target } => Some(Self::Move { target }),
            Action::Attack { tower } => Some(Self::Attack { tower }),
            Action::Stand => Some(Self::Stand),
            Action::Resume => None,
        }
    }
}

/// Events broadcast by the round transition after processing a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that the agent advanced to a new cell.
    AgentMoved {
        /// Cell the agent occupies after moving.
        position: GridPos,
    },
    /// Reports that a projectile struck the agent.
    AgentDamaged {
        /// Hit points subtracted by the strike.
        damage: i32,
        /// Agent health remaining after the strike.
        health_remaining: Health,
    },
    /// Reports that the agent struck a tower.
    TowerDamaged {
        /// Identifier of the tower that was hit.
        tower: TowerId,
        /// Hit points subtracted by the strike.
        damage: i32,
        /// Tower health remaining after the strike.
        health_remaining: Health,
    },
    /// Announces that a tower ran out of hit points.
    TowerDestroyed {
        /// Identifier of the tower that fell.
        tower: TowerId,
    },
    /// Confirms that a tower fired a projectile.
    ProjectileCreated {
        /// Cell the projectile spawned at.
        position: GridVec,
        /// Per-tick displacement of the projectile.
        direction: GridVec,
    },
    /// Reports that a projectile left play.
    ProjectileRemoved {
        /// Continuous position the projectile reached before removal.
        position: GridVec,
    },
    /// Announces that the round ended this tick.
    RoundOver {
        /// `true` when the agent outlived every tower.
        agent_survived: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::{Action, CellKind, Directive, Event, GridPos, GridVec, Health, TowerId};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = GridPos::new(1, 1);
        let destination = GridPos::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn adjacency_requires_exactly_one_step() {
        let origin = GridPos::new(2, 2);
        assert!(origin.is_adjacent_to(GridPos::new(3, 2)));
        assert!(origin.is_adjacent_to(GridPos::new(2, 1)));
        assert!(!origin.is_adjacent_to(origin));
        assert!(!origin.is_adjacent_to(GridPos::new(3, 3)));
    }

    #[test]
    fn rounding_snaps_to_the_nearest_cell() {
        assert_eq!(GridVec::new(2.4, 3.6).rounded(), GridPos::new(2, 4));
        assert_eq!(GridVec::new(-0.6, 0.0).rounded(), GridPos::new(-1, 0));
    }

    #[test]
    fn damage_floors_at_zero() {
        let health = Health::new(15);
        assert_eq!(health.damaged(10), Health::new(5));
        assert_eq!(health.damaged(20), Health::new(0));
        assert!(health.damaged(20).is_depleted());
        assert!(!health.is_depleted());
    }

    #[test]
    fn cell_codes_round_trip() {
        for kind in [
            CellKind::Empty,
            CellKind::Wall,
            CellKind::Tower,
            CellKind::Start,
        ] {
            assert_eq!(CellKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(CellKind::from_code(4), None);
    }

    #[test]
    fn resume_yields_no_directive() {
        assert_eq!(Directive::from_action(Action::Resume), None);
        assert_eq!(
            Directive::from_action(Action::Stand),
            Some(Directive::Stand)
        );
        let target = GridPos::new(7, 2);
        assert_eq!(
            Directive::from_action(Action::Move { target }),
            Some(Directive::Move { target })
        );
        let tower = TowerId::new(3);
        assert_eq!(
            Directive::from_action(Action::Attack { tower }),
            Some(Directive::Attack { tower })
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn grid_pos_round_trips_through_bincode() {
        assert_round_trip(&GridPos::new(-3, 11));
    }

    #[test]
    fn action_round_trips_through_bincode() {
        assert_round_trip(&Action::Move {
            target: GridPos::new(5, 9),
        });
        assert_round_trip(&Action::Attack {
            tower: TowerId::new(2),
        });
        assert_round_trip(&Action::Resume);
    }

    #[test]
    fn event_round_trips_through_bincode() {
        assert_round_trip(&Event::ProjectileCreated {
            position: GridVec::new(3.0, 3.0),
            direction: GridVec::new(1.0, 0.0),
        });
        assert_round_trip(&Event::TowerDamaged {
            tower: TowerId::new(1),
            damage: 20,
            health_remaining: Health::new(80),
        });
        assert_round_trip(&Event::RoundOver {
            agent_survived: true,
        });
    }
}
