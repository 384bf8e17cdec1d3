use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilewalk_core::MotionVector;

use crate::AxisStepper;

/// Tuning for the wander behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WanderSettings {
    /// Ticks spent idle between two roams.
    pub pause_ticks: u32,
    /// Horizontal roam range in pixels; targets fall within `[-range_x, range_x)`.
    pub range_x: u32,
    /// Vertical roam range in pixels; targets fall within `[-range_y, range_y)`.
    pub range_y: u32,
}

impl Default for WanderSettings {
    fn default() -> Self {
        Self {
            pause_ticks: 120,
            range_x: 32,
            range_y: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum WanderState {
    Paused { remaining: u32 },
    Roaming(AxisStepper),
}

/// Bounded random roaming separated by fixed pauses.
#[derive(Clone, Debug)]
pub struct Wander {
    settings: WanderSettings,
    state: WanderState,
    rng: ChaCha8Rng,
}

impl Wander {
    /// Creates a wander behaviour that samples its first target on the next call.
    #[must_use]
    pub fn new(settings: WanderSettings, seed: u64) -> Self {
        Self {
            settings,
            state: WanderState::Paused { remaining: 0 },
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Reports whether the behaviour is idling between roams.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, WanderState::Paused { .. })
    }

    /// Current roam, if any.
    #[must_use]
    pub fn roam(&self) -> Option<&AxisStepper> {
        match &self.state {
            WanderState::Roaming(stepper) => Some(stepper),
            WanderState::Paused { .. } => None,
        }
    }

    /// Proposes the motion for this tick.
    pub fn next_motion(&mut self, speed: u32) -> MotionVector {
        if let WanderState::Paused { remaining } = &mut self.state {
            if *remaining > 0 {
                *remaining -= 1;
                return MotionVector::ZERO;
            }
            let target = MotionVector::new(
                sample_offset(&mut self.rng, self.settings.range_x),
                sample_offset(&mut self.rng, self.settings.range_y),
            );
            self.state = WanderState::Roaming(AxisStepper::new(target, speed));
        }

        let WanderState::Roaming(stepper) = &mut self.state else {
            return MotionVector::ZERO;
        };
        let motion = stepper.next_motion();
        if stepper.is_finished() {
            self.state = WanderState::Paused {
                remaining: self.settings.pause_ticks,
            };
        }
        motion
    }
}

fn sample_offset(rng: &mut ChaCha8Rng, range: u32) -> i32 {
    let range = i32::try_from(range).unwrap_or(i32::MAX);
    if range == 0 {
        return 0;
    }
    rng.gen_range(-range..range)
}
