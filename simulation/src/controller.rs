use tilewalk_core::{AgentKind, MotionVector};
use tilewalk_system_steering::{Follow, Wander, WanderSettings};

/// Behaviour an autonomous agent is currently running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutonomousMode {
    /// Roaming randomly around its position.
    Wandering,
    /// Following a path toward the player.
    Pursuing,
}

/// Keys held by the player during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerInput {
    /// Move toward decreasing rows.
    pub up: bool,
    /// Move toward increasing rows.
    pub down: bool,
    /// Move toward decreasing columns.
    pub left: bool,
    /// Move toward increasing columns.
    pub right: bool,
}

impl PlayerInput {
    /// Input with no key held.
    pub const IDLE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Motion requested by the held keys for an agent moving at `speed`.
    ///
    /// Up wins over down and right wins over left.
    #[must_use]
    pub fn motion(&self, speed: u32) -> MotionVector {
        let speed = i32::try_from(speed).unwrap_or(i32::MAX);
        let dy = if self.up {
            -speed
        } else if self.down {
            speed
        } else {
            0
        };
        let dx = if self.right {
            speed
        } else if self.left {
            -speed
        } else {
            0
        };
        MotionVector::new(dx, dy)
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Controller {
    Player,
    Autonomous {
        mode: AutonomousMode,
        wander: Wander,
        follow: Follow,
    },
}

impl Controller {
    pub(crate) fn new(kind: AgentKind, wander: WanderSettings, seed: u64) -> Self {
        match kind {
            AgentKind::Player => Self::Player,
            AgentKind::Autonomous => Self::Autonomous {
                mode: AutonomousMode::Wandering,
                wander: Wander::new(wander, seed),
                follow: Follow::new(),
            },
        }
    }

    pub(crate) const fn mode(&self) -> Option<AutonomousMode> {
        match self {
            Self::Player => None,
            Self::Autonomous { mode, .. } => Some(*mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_keys_resolve_to_up_and_right() {
        let input = PlayerInput {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        assert_eq!(input.motion(2), MotionVector::new(2, -2));
    }

    #[test]
    fn single_keys_move_one_axis() {
        let left = PlayerInput {
            left: true,
            ..PlayerInput::IDLE
        };
        assert_eq!(left.motion(3), MotionVector::new(-3, 0));
        assert!(PlayerInput::IDLE.motion(3).is_zero());
    }
}
