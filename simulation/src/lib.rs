#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-tick loop composing the world with the steering, pathfinding and
//! animation systems.
//!
//! Agents update one after another in roster order. Each update vacates the
//! agent's dynamic cell, proposes a motion, submits it to the world and writes
//! the animated tile value back, so later agents observe the moves of earlier
//! ones within the same tick.
//!
//! A pursuer whose target cannot be reached stays in pursuit and takes its
//! wander motion instead. The walkability grid is rebuilt and searched again
//! on every such tick, which costs one A* search per stranded pursuer per
//! tick until the target comes within reach or leaves the view range.

mod config;
mod controller;

use tilewalk_core::{
    AgentId, AgentKind, AgentSnapshot, AgentView, Command, DirectionFlags, Event, MotionVector,
};
use tilewalk_system_animation::Animator;
use tilewalk_system_pathfinding::Pathfinder;
use tilewalk_system_steering::{Follow, FollowStep};
use tilewalk_world::{self as world, query, World};

pub use config::{
    AnimationConfig, ConfigError, PursuitConfig, SimulationConfig, WanderConfig, DEFAULT_SEED,
};
pub use controller::{AutonomousMode, PlayerInput};

use crate::controller::Controller;

const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Overall state of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Neither side has been defeated.
    Ongoing,
    /// A player agent died.
    PlayerDefeated,
    /// Every autonomous agent died.
    AutonomousDefeated,
}

/// Simulation context owning the world and every per-agent controller.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    config: SimulationConfig,
    controllers: Vec<Controller>,
    animators: Vec<Animator>,
    pathfinder: Pathfinder,
    ticks: u64,
}

impl Simulation {
    /// Wraps a loaded world, creating one controller and animator per agent.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration fails validation.
    pub fn new(world: World, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let view = query::agent_view(&world);
        let mut controllers = Vec::new();
        let mut animators = Vec::new();
        for agent in view.iter() {
            let seed = config.seed
                ^ u64::from(agent.id.get())
                    .wrapping_add(1)
                    .wrapping_mul(SEED_STRIDE);
            controllers.push(Controller::new(agent.kind, config.wander.into(), seed));

            let base = query::catalog(&world, agent.catalog)
                .map_or(agent.tile_value, |catalog| catalog.first_value());
            animators.push(Animator::new(base, config.animation.into()));
        }

        Ok(Self {
            world,
            config,
            controllers,
            animators,
            pathfinder: Pathfinder::default(),
            ticks: 0,
        })
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the simulation runs with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshot of every agent in roster order.
    #[must_use]
    pub fn agent_view(&self) -> AgentView {
        query::agent_view(&self.world)
    }

    /// Current behaviour of an autonomous agent; `None` for players and
    /// unknown identifiers.
    #[must_use]
    pub fn mode(&self, id: AgentId) -> Option<AutonomousMode> {
        slot(id)
            .and_then(|slot| self.controllers.get(slot))
            .and_then(Controller::mode)
    }

    /// Overwrites an agent's health. Agents below one die at the start of the
    /// next tick.
    pub fn set_health(&mut self, id: AgentId, health: i32) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetHealth { agent: id, health },
            &mut events,
        );
    }

    /// Reports whether either side has been defeated.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let view = query::agent_view(&self.world);
        if view
            .iter()
            .any(|agent| agent.kind == AgentKind::Player && !agent.alive)
        {
            return Outcome::PlayerDefeated;
        }

        let mut autonomous = view
            .iter()
            .filter(|agent| agent.kind == AgentKind::Autonomous)
            .peekable();
        if autonomous.peek().is_some() && autonomous.all(|agent| !agent.alive) {
            Outcome::AutonomousDefeated
        } else {
            Outcome::Ongoing
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Liveness is refreshed first; every live agent is then updated once in
    /// roster order.
    pub fn tick(&mut self, input: PlayerInput, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::RefreshLiveness, out_events);

        let live: Vec<AgentId> = query::agent_view(&self.world)
            .iter()
            .filter(|agent| agent.alive)
            .map(|agent| agent.id)
            .collect();
        for id in live {
            self.update(id, input, out_events);
        }
        self.ticks += 1;
    }

    /// Runs a single agent's behaviour, movement and animation step.
    ///
    /// Dead and unknown agents are skipped.
    pub fn update(&mut self, id: AgentId, input: PlayerInput, out_events: &mut Vec<Event>) {
        let Some(agent) = query::agent(&self.world, id).filter(|agent| agent.alive) else {
            return;
        };
        let Some(slot) = slot(id) else {
            return;
        };

        world::apply(&mut self.world, Command::VacateCell { agent: id }, out_events);

        let motion = self.propose(slot, &agent, input);
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MoveAgent { agent: id, motion },
            &mut events,
        );
        let rejected = events
            .iter()
            .any(|event| matches!(event, Event::MoveRejected { .. }));
        if rejected {
            if let Some(Controller::Autonomous {
                mode: AutonomousMode::Pursuing,
                follow,
                ..
            }) = self.controllers.get_mut(slot)
            {
                follow.invalidate();
            }
        }
        out_events.append(&mut events);

        let flags = DirectionFlags::from_motion(motion);
        let tile_value = self
            .animators
            .get_mut(slot)
            .map_or(agent.tile_value, |animator| {
                animator.next_tile_value(agent.tile_value, flags)
            });
        world::apply(
            &mut self.world,
            Command::OccupyCell {
                agent: id,
                tile_value,
            },
            out_events,
        );
    }

    fn propose(&mut self, slot: usize, agent: &AgentSnapshot, input: PlayerInput) -> MotionVector {
        let target = self.pursuit_target();
        let world = &self.world;
        let config = &self.config;
        let pathfinder = &mut self.pathfinder;

        let Some(controller) = self.controllers.get_mut(slot) else {
            return MotionVector::ZERO;
        };
        let Controller::Autonomous {
            mode,
            wander,
            follow,
        } = controller
        else {
            return input.motion(agent.speed);
        };

        let in_view = target.as_ref().is_some_and(|target| {
            agent.cell.manhattan_distance(target.cell) < config.pursuit.view_range
        });
        match (*mode, in_view) {
            (AutonomousMode::Wandering, true) => {
                log::debug!("agent `{}` starts pursuing", agent.name);
                *mode = AutonomousMode::Pursuing;
                *follow = Follow::new();
                return MotionVector::ZERO;
            }
            (AutonomousMode::Pursuing, false) => {
                log::debug!("agent `{}` resumes wandering", agent.name);
                *mode = AutonomousMode::Wandering;
                return MotionVector::ZERO;
            }
            _ => {}
        }

        let target = match (*mode, target) {
            (AutonomousMode::Pursuing, Some(target)) => target,
            _ => return wander.next_motion(agent.speed),
        };

        let grid = query::tile_grid(world);
        let ignored = [agent.catalog, target.catalog];
        let step = follow.step(
            &grid,
            agent.bounds.origin(),
            target.cell,
            config.pursuit.retarget_distance,
            agent.speed,
            || {
                let walkable = query::walkability(world, &ignored);
                pathfinder.find_path(&walkable, agent.cell, target.cell)
            },
        );
        match step {
            FollowStep::Move(motion) => motion,
            FollowStep::NoRoute => wander.next_motion(agent.speed),
        }
    }

    fn pursuit_target(&self) -> Option<AgentSnapshot> {
        query::agent_view(&self.world)
            .into_vec()
            .into_iter()
            .find(|agent| agent.alive && agent.kind == AgentKind::Player)
    }
}

fn slot(id: AgentId) -> Option<usize> {
    usize::try_from(id.get()).ok()
}
