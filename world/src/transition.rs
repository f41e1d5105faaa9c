//! Per-tick round transition: directive resolution, tower fire counters,
//! projectile physics, reward shaping and round-over detection.

use grid_siege_core::{Action, CellKind, Directive, Event, GridPos, GridVec};

use crate::navigation::find_path;
use crate::{Projectile, RoundState, AGENT_STRIKE_DAMAGE, PROJECTILE_DAMAGE};

const STEP_PENALTY: f32 = -0.2;
const TOWER_DAMAGED_BONUS: f32 = 5.0;
const TOWER_DESTROYED_BONUS: f32 = 30.0;
const AGENT_DAMAGED_PENALTY: f32 = 5.0;
const APPROACH_BONUS: f32 = 1.0;
const SURVIVAL_BONUS: f32 = 200.0;
const DEATH_PENALTY: f32 = 100.0;

/// Result of advancing a round by one tick.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// Round state after the tick.
    pub state: RoundState,
    /// Ordered events describing what happened during the tick.
    pub events: Vec<Event>,
    /// Scalar shaping reward for training drivers.
    pub reward: f32,
}

/// Advances the round by one tick.
///
/// The input state is never mutated; the returned outcome owns a fresh
/// successor state. Invalid directive parameters (unwalkable targets,
/// unreachable paths, missing towers) abort the stored directive and are
/// logged — the transition itself never fails.
#[must_use]
pub fn step(state: &RoundState, action: Action) -> StepOutcome {
    let mut next = state.clone();
    let mut events = Vec::new();
    let mut reward = STEP_PENALTY;

    next.tick_index += 1;

    // Seed of the order-dependent approach fold in the reward shaping
    // below: the distance to the first living tower in list order.
    let mut running_distance = 0u32;
    for tower in &next.towers {
        if !tower.is_destroyed() {
            running_distance = next.position.manhattan_distance(tower.position);
            break;
        }
    }
    let old_position = next.position;

    // Any action other than Resume replaces the active directive and
    // parks the previous one in the interrupted slot, identical plans
    // included. Resume leaves both slots alone.
    if let Some(directive) = Directive::from_action(action) {
        next.interrupted_directive = next.active_directive;
        next.active_directive = Some(directive);
    }

    let Some(directive) = next.active_directive else {
        tracing::error!(
            tick = next.tick_index,
            "tick arrived with no active directive"
        );
        return StepOutcome {
            state: next,
            events,
            reward,
        };
    };

    match directive {
        Directive::Move { target } => {
            if !next.is_position_valid(target) {
                tracing::error!(?target, "move target is not walkable");
                next.active_directive = None;
                next.interrupted_directive = None;
                return StepOutcome {
                    state: next,
                    events,
                    reward,
                };
            }
            if next.position == target {
                next.active_directive = None;
                next.interrupted_directive = None;
                return StepOutcome {
                    state: next,
                    events,
                    reward,
                };
            }
            // Fresh search every tick: towers fall and the walkable set
            // changes under the agent, so cached paths would go stale.
            let path = find_path(&next, next.position, target);
            if path.len() > 1 {
                next.position = path[1];
                events.push(Event::AgentMoved {
                    position: next.position,
                });
            } else {
                next.active_directive = None;
                next.interrupted_directive = None;
                tracing::error!(from = ?next.position, ?target, "move target unreachable");
            }
        }
        Directive::Attack { tower: requested } => {
            // The victim is whichever living tower stands next to the
            // agent; the requested id does not participate in selection.
            match adjacent_living_tower(&next) {
                Some(index) => {
                    let tower = &mut next.towers[index];
                    tower.health = tower.health.damaged(AGENT_STRIKE_DAMAGE);
                    events.push(Event::TowerDamaged {
                        tower: tower.id,
                        damage: AGENT_STRIKE_DAMAGE,
                        health_remaining: tower.health,
                    });
                    if tower.health.is_depleted() {
                        events.push(Event::TowerDestroyed { tower: tower.id });
                        next.active_directive = None;
                        next.interrupted_directive = None;
                    }
                }
                None => {
                    next.active_directive = None;
                    next.interrupted_directive = None;
                    tracing::error!(
                        requested = requested.get(),
                        "no living tower adjacent to the agent"
                    );
                }
            }
        }
        Directive::Stand => {
            // Standing promotes whatever was interrupted back to active,
            // so a single Stand pauses exactly one tick.
            next.active_directive = next.interrupted_directive.take();
        }
    }

    // A Move that has just arrived at its target retires on the same tick.
    if let Some(Directive::Move { target }) = next.active_directive {
        if next.position == target {
            events.push(Event::AgentMoved {
                position: next.position,
            });
            next.active_directive = None;
            next.interrupted_directive = None;
        }
    }

    advance_towers(&mut next, &mut events);

    let crossed_from = (old_position != next.position).then_some(old_position);
    advance_projectiles(&mut next, &mut events, crossed_from);

    for event in &events {
        match event {
            Event::TowerDamaged { .. } => reward += TOWER_DAMAGED_BONUS,
            Event::TowerDestroyed { .. } => reward += TOWER_DESTROYED_BONUS,
            Event::AgentDamaged { .. } => reward -= AGENT_DAMAGED_PENALTY,
            _ => {}
        }
    }

    // Approach shaping: +1 for every living tower the agent ended up
    // closer to than the running distance, which each tower then
    // overwrites. The fold is left-to-right over the tower list and is
    // deliberately order-dependent.
    for tower in &next.towers {
        if tower.is_destroyed() {
            continue;
        }
        let distance = next.position.manhattan_distance(tower.position);
        if distance < running_distance {
            reward += APPROACH_BONUS;
        }
        running_distance = distance;
    }

    if next.is_round_over() {
        let agent_survived = !next.health.is_depleted();
        events.push(Event::RoundOver { agent_survived });
        reward += if agent_survived {
            SURVIVAL_BONUS
        } else {
            -DEATH_PENALTY
        };
    }

    StepOutcome {
        state: next,
        events,
        reward,
    }
}

fn adjacent_living_tower(state: &RoundState) -> Option<usize> {
    state
        .towers
        .iter()
        .position(|tower| !tower.is_destroyed() && state.position.is_adjacent_to(tower.position))
}

fn advance_towers(state: &mut RoundState, events: &mut Vec<Event>) {
    let RoundState {
        towers,
        projectiles,
        ..
    } = state;

    for tower in towers.iter_mut() {
        if tower.is_destroyed() {
            continue;
        }
        tower.tick += 1;
        if tower.tick >= tower.rate {
            let position = GridVec::new(tower.position.x() as f32, tower.position.y() as f32);
            projectiles.push(Projectile::new(position, tower.direction));
            events.push(Event::ProjectileCreated {
                position,
                direction: tower.direction,
            });
            tower.tick = 0;
        }
    }
}

/// Moves every projectile one tick forward and resolves collisions.
///
/// `crossed_from` carries the agent's pre-tick cell when the agent moved
/// this tick; a projectile that lands there while the agent landed on the
/// projectile's own previous cell counts as a hit even though the two
/// swapped cells without ever sharing one.
fn advance_projectiles(
    state: &mut RoundState,
    events: &mut Vec<Event>,
    crossed_from: Option<GridPos>,
) {
    let in_flight = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(in_flight.len());

    for projectile in in_flight {
        let origin_cell = projectile.position.rounded();
        let moved = projectile.advanced();
        let landing_cell = moved.position.rounded();

        if landing_cell == state.position {
            state.health = state.health.damaged(PROJECTILE_DAMAGE);
            events.push(Event::AgentDamaged {
                damage: PROJECTILE_DAMAGE,
                health_remaining: state.health,
            });
            events.push(Event::ProjectileRemoved {
                position: moved.position,
            });
        } else if crossed_from == Some(landing_cell) && state.position == origin_cell {
            state.health = state.health.damaged(PROJECTILE_DAMAGE);
            events.push(Event::AgentDamaged {
                damage: PROJECTILE_DAMAGE,
                health_remaining: state.health,
            });
            events.push(Event::ProjectileRemoved {
                position: moved.position,
            });
        } else if !state.grid.contains(landing_cell)
            || state.grid.kind_at(landing_cell) == Some(CellKind::Wall)
        {
            events.push(Event::ProjectileRemoved {
                position: moved.position,
            });
        } else if state
            .towers
            .iter()
            .any(|tower| !tower.is_destroyed() && tower.position == landing_cell)
        {
            events.push(Event::ProjectileRemoved {
                position: moved.position,
            });
        } else {
            survivors.push(moved);
        }
    }

    state.projectiles = survivors;
}

#[cfg(test)]
mod tests {
    use super::step;
    use crate::{Grid, Projectile, RoundState, Tower};
    use grid_siege_core::{Action, CellKind, Directive, Event, GridPos, GridVec, Health, TowerId};

    fn distant_tower() -> Tower {
        Tower::new(TowerId::new(0), GridPos::new(7, 7), GridVec::new(0.0, -1.0))
    }

    fn open_state() -> RoundState {
        RoundState::new(Grid::new(8, 8), vec![distant_tower()], GridPos::new(2, 2))
    }

    fn agent_damage_events(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, Event::AgentDamaged { .. }))
            .count()
    }

    #[test]
    fn projectile_landing_on_agent_deals_damage() {
        let mut state = open_state();
        state
            .projectiles
            .push(Projectile::new(GridVec::new(3.0, 2.0), GridVec::new(-1.0, 0.0)));

        let outcome = step(&state, Action::Stand);

        assert_eq!(agent_damage_events(&outcome.events), 1);
        assert_eq!(outcome.state.health(), Health::new(90));
        assert!(outcome.state.projectiles().is_empty());
        assert!(outcome
            .events
            .iter()
            .any(|event| matches!(event, Event::ProjectileRemoved { .. })));
    }

    #[test]
    fn swapping_cells_with_a_projectile_still_hits() {
        let mut state = open_state();
        state
            .projectiles
            .push(Projectile::new(GridVec::new(3.0, 2.0), GridVec::new(-1.0, 0.0)));

        let outcome = step(
            &state,
            Action::Move {
                target: GridPos::new(3, 2),
            },
        );

        assert_eq!(outcome.state.position(), GridPos::new(3, 2));
        assert_eq!(agent_damage_events(&outcome.events), 1);
        assert_eq!(outcome.state.health(), Health::new(90));
        assert!(outcome.state.projectiles().is_empty());
    }

    #[test]
    fn passing_projectile_misses_a_stationary_agent() {
        let mut state = open_state();
        // Flies along the row above the agent.
        state
            .projectiles
            .push(Projectile::new(GridVec::new(3.0, 1.0), GridVec::new(-1.0, 0.0)));

        let outcome = step(&state, Action::Stand);

        assert_eq!(agent_damage_events(&outcome.events), 0);
        assert_eq!(outcome.state.projectiles().len(), 1);
        assert_eq!(
            outcome.state.projectiles()[0].position(),
            GridVec::new(2.0, 1.0)
        );
    }

    #[test]
    fn projectiles_despawn_on_walls_and_grid_edges() {
        let mut state = open_state();
        state.grid.set_kind(GridPos::new(5, 5), CellKind::Wall);
        state
            .projectiles
            .push(Projectile::new(GridVec::new(4.0, 5.0), GridVec::new(1.0, 0.0)));
        state
            .projectiles
            .push(Projectile::new(GridVec::new(7.0, 0.0), GridVec::new(1.0, 0.0)));

        let outcome = step(&state, Action::Stand);

        assert!(outcome.state.projectiles().is_empty());
        assert_eq!(
            outcome
                .events
                .iter()
                .filter(|event| matches!(event, Event::ProjectileRemoved { .. }))
                .count(),
            2
        );
        assert_eq!(agent_damage_events(&outcome.events), 0);
    }

    #[test]
    fn living_towers_absorb_projectiles_but_rubble_does_not() {
        let mut state = open_state();
        state
            .projectiles
            .push(Projectile::new(GridVec::new(6.0, 7.0), GridVec::new(1.0, 0.0)));

        let blocked = step(&state, Action::Stand);
        assert!(blocked.state.projectiles().is_empty());

        state.towers[0].health = Health::new(0);
        let through = step(&state, Action::Stand);
        // The round is over with the garrison razed, but physics still ran.
        assert_eq!(through.state.projectiles().len(), 1);
        assert_eq!(
            through.state.projectiles()[0].position(),
            GridVec::new(7.0, 7.0)
        );
    }

    #[test]
    fn tick_without_directive_freezes_the_field() {
        let mut state = open_state();
        state.towers[0].rate = 1;
        state
            .projectiles
            .push(Projectile::new(GridVec::new(5.0, 5.0), GridVec::new(1.0, 0.0)));

        let outcome = step(&state, Action::Resume);

        assert!(outcome.events.is_empty());
        assert_eq!(outcome.state.tick_index(), 1);
        assert_eq!(outcome.state.projectiles(), state.projectiles());
        assert!((outcome.reward + 0.2).abs() < 1e-6);
    }

    #[test]
    fn fresh_projectiles_advance_on_their_spawn_tick() {
        let mut state = open_state();
        state.towers[0].rate = 1;

        let outcome = step(&state, Action::Stand);

        assert!(outcome.events.iter().any(|event| matches!(
            event,
            Event::ProjectileCreated { position, .. } if *position == GridVec::new(7.0, 7.0)
        )));
        assert_eq!(outcome.state.projectiles().len(), 1);
        assert_eq!(
            outcome.state.projectiles()[0].position(),
            GridVec::new(7.0, 6.0)
        );
    }

    #[test]
    fn stand_promotes_the_interrupted_directive() {
        let state = open_state();
        let target = GridPos::new(5, 2);

        let first = step(&state, Action::Move { target });
        assert_eq!(first.state.position(), GridPos::new(3, 2));

        let second = step(&first.state, Action::Stand);
        assert_eq!(second.state.position(), GridPos::new(3, 2));
        assert_eq!(
            second.state.active_directive(),
            Some(Directive::Move { target })
        );
        assert_eq!(second.state.interrupted_directive(), None);

        let third = step(&second.state, Action::Resume);
        assert_eq!(third.state.position(), GridPos::new(4, 2));
    }

    #[test]
    fn any_plan_replaces_and_parks_the_previous_one() {
        let state = open_state();
        let first_target = GridPos::new(5, 2);
        let second_target = GridPos::new(2, 5);

        let first = step(
            &state,
            Action::Move {
                target: first_target,
            },
        );
        let second = step(
            &first.state,
            Action::Move {
                target: second_target,
            },
        );

        assert_eq!(
            second.state.active_directive(),
            Some(Directive::Move {
                target: second_target
            })
        );
        assert_eq!(
            second.state.interrupted_directive(),
            Some(Directive::Move {
                target: first_target
            })
        );
    }

    #[test]
    fn lethal_hit_ends_the_round_against_the_agent() {
        let mut state = open_state().with_agent_health(Health::new(10));
        state
            .projectiles
            .push(Projectile::new(GridVec::new(3.0, 2.0), GridVec::new(-1.0, 0.0)));

        let outcome = step(&state, Action::Stand);

        assert_eq!(outcome.state.health(), Health::new(0));
        assert_eq!(
            outcome.events.last(),
            Some(&Event::RoundOver {
                agent_survived: false
            })
        );
        // -0.2 step, -5 hit, -100 death.
        assert!((outcome.reward + 105.2).abs() < 1e-3);
    }

    #[test]
    fn closing_on_the_garrison_earns_the_approach_bonus() {
        let state = open_state();

        let outcome = step(
            &state,
            Action::Move {
                target: GridPos::new(7, 6),
            },
        );

        // -0.2 step, +1 for ending the tick closer to the only tower.
        assert!((outcome.reward - 0.8).abs() < 1e-6);
    }
}
