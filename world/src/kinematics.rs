//! Reconciles per-tick pixel displacement with discrete tile coordinates.

use tilewalk_core::{AgentId, CellCoord, MotionVector, PixelOffset};

use crate::{collision, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Moved {
        from: CellCoord,
        to: CellCoord,
        offset: PixelOffset,
    },
    Blocked,
    Stationary,
}

/// Applies `motion` to the agent if the displaced bounds are free.
///
/// The delta is accepted or rejected as a whole. The dynamic layer is left
/// untouched; the caller rewrites the agent's cell afterwards.
pub(crate) fn try_move(world: &mut World, id: AgentId, motion: MotionVector) -> MoveOutcome {
    let grid = *world.grid();
    let Some(agent) = world.agent(id) else {
        return MoveOutcome::Stationary;
    };
    if !agent.alive || motion.is_zero() {
        return MoveOutcome::Stationary;
    }

    let candidate = agent.bounds(&grid).translated(motion.dx, motion.dy);
    if collision::static_collision(world, &candidate)
        || collision::dynamic_collision(world, id, &candidate)
    {
        return MoveOutcome::Blocked;
    }

    let tile_size = i32::try_from(grid.tile_size()).unwrap_or(i32::MAX);
    let (column_steps, dx) = wrap_offset(agent.offset.dx + motion.dx, tile_size);
    let (row_steps, dy) = wrap_offset(agent.offset.dy + motion.dy, tile_size);
    let from = agent.cell;
    let Some(to) = from.offset(column_steps, row_steps) else {
        return MoveOutcome::Blocked;
    };

    let offset = PixelOffset::new(dx, dy);
    if let Some(agent) = world.agent_mut(id) {
        agent.cell = to;
        agent.offset = offset;
    }
    MoveOutcome::Moved { from, to, offset }
}

/// Folds an offset back into `[-tile_size / 2, tile_size / 2]`, returning the
/// number of whole cells crossed and the wrapped offset.
pub(crate) fn wrap_offset(offset: i32, tile_size: i32) -> (i32, i32) {
    let half = tile_size / 2;
    let mut steps = 0;
    let mut offset = offset;
    while offset > half {
        offset -= tile_size;
        steps += 1;
    }
    while offset < -half {
        offset += tile_size;
        steps -= 1;
    }
    (steps, offset)
}
