#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Steering behaviours that propose per-tick motion vectors.
//!
//! Both behaviours walk toward a displacement target one axis at a time
//! through [`AxisStepper`]: the motion vector is computed once per target and
//! each axis stops contributing as soon as its share is covered.

mod follow;
mod wander;

use tilewalk_core::{MotionVector, PixelPoint};

pub use follow::{Follow, FollowStep};
pub use wander::{Wander, WanderSettings};

/// Steps toward a fixed displacement with a constant motion vector.
///
/// Displacement is tracked from the proposed steps, not from accepted moves,
/// so a stepper always finishes after a bounded number of calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AxisStepper {
    target: MotionVector,
    velocity: MotionVector,
    travelled: MotionVector,
}

impl AxisStepper {
    /// Creates a stepper covering `target` pixels at `speed` per tick.
    #[must_use]
    pub fn new(target: MotionVector, speed: u32) -> Self {
        let velocity = MotionVector::toward(
            PixelPoint::new(0, 0),
            PixelPoint::new(target.dx, target.dy),
            speed,
        );
        Self {
            target,
            velocity,
            travelled: MotionVector::ZERO,
        }
    }

    /// Total displacement the stepper covers.
    #[must_use]
    pub const fn target(&self) -> MotionVector {
        self.target
    }

    /// Displacement proposed so far.
    #[must_use]
    pub const fn travelled(&self) -> MotionVector {
        self.travelled
    }

    /// Reports whether both axes reached their target.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.travelled.dx == self.target.dx && self.travelled.dy == self.target.dy
    }

    /// Proposes the next step. Finished axes contribute zero and the final
    /// step on an axis is clipped so the target is never overshot.
    pub fn next_motion(&mut self) -> MotionVector {
        let step = MotionVector::new(
            axis_step(self.velocity.dx, self.target.dx - self.travelled.dx),
            axis_step(self.velocity.dy, self.target.dy - self.travelled.dy),
        );
        self.travelled.dx += step.dx;
        self.travelled.dy += step.dy;
        step
    }
}

fn axis_step(velocity: i32, remaining: i32) -> i32 {
    if remaining > 0 {
        velocity.clamp(1, remaining)
    } else if remaining < 0 {
        velocity.clamp(remaining, -1)
    } else {
        0
    }
}
