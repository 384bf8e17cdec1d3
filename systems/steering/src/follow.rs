use tilewalk_core::{CellCoord, MotionVector, PixelPoint, TileGrid};

use crate::AxisStepper;

/// Result of a single follow step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowStep {
    /// Motion toward the current waypoint.
    Move(MotionVector),
    /// No path with at least two waypoints exists; the caller should fall back.
    NoRoute,
}

/// Path-directed pursuit stepping from waypoint to waypoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Follow {
    path: Vec<CellCoord>,
    next_waypoint: usize,
    leg: Option<AxisStepper>,
    invalidated: bool,
}

impl Follow {
    /// Creates a follower without a path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waypoints of the current path, source first.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Forces a new plan on the next step.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
        self.leg = None;
    }

    /// Proposes the motion for this tick.
    ///
    /// `position` is the agent's pixel origin. `plan` is only called when a
    /// new path is required: none is held, it was invalidated or exhausted, or
    /// the target strayed more than `retarget_distance` cells from its end.
    ///
    /// A fresh path starts with a leg back to the origin of its first
    /// waypoint, so a sub-tile offset is cancelled before the agent heads for
    /// the next cell and every later leg runs along a single axis.
    pub fn step<P>(
        &mut self,
        grid: &TileGrid,
        position: PixelPoint,
        target: CellCoord,
        retarget_distance: u32,
        speed: u32,
        plan: P,
    ) -> FollowStep
    where
        P: FnOnce() -> Vec<CellCoord>,
    {
        if let Some(leg) = self.leg.as_mut().filter(|leg| !leg.is_finished()) {
            return FollowStep::Move(leg.next_motion());
        }

        if self.needs_plan(target, retarget_distance) {
            self.path = plan();
            self.next_waypoint = 0;
            self.invalidated = false;
            if self.path.len() < 2 {
                log::debug!("no route toward {target:?}");
                self.path.clear();
                self.leg = None;
                return FollowStep::NoRoute;
            }
            log::debug!("planned {} waypoints toward {target:?}", self.path.len());
        }

        while let Some(waypoint) = self.path.get(self.next_waypoint).copied() {
            self.next_waypoint += 1;
            let destination = grid.cell_origin(waypoint);
            let displacement =
                MotionVector::new(destination.x - position.x, destination.y - position.y);
            if displacement.is_zero() {
                continue;
            }
            let mut leg = AxisStepper::new(displacement, speed);
            let motion = leg.next_motion();
            self.leg = Some(leg);
            return FollowStep::Move(motion);
        }

        self.leg = None;
        FollowStep::NoRoute
    }

    fn needs_plan(&self, target: CellCoord, retarget_distance: u32) -> bool {
        if self.invalidated || self.next_waypoint >= self.path.len() {
            return true;
        }
        self.path
            .last()
            .map_or(true, |end| end.manhattan_distance(target) > retarget_distance)
    }
}
