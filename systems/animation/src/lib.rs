#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Derives sprite tile values from per-tick movement.
//!
//! An agent catalog is laid out in four groups of eight values starting at
//! its base: down, right, left, up. Within a group the first two values are
//! the standing frames and values four to seven are the moving frames.

use tilewalk_core::{DirectionFlags, TileValue};

const GROUP_SPAN: u32 = 8;
const GROUP_COUNT: u32 = 4;
const STANDING_FRAMES: u32 = 2;
const MOVING_START: u32 = 4;
const MOVING_FRAMES: u32 = 4;

/// Number of consecutive catalog values used by an animated agent.
pub const ANIMATION_SPAN: u32 = GROUP_SPAN * GROUP_COUNT;

/// Frame pacing for the animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationSettings {
    /// Calls between two moving frames.
    pub moving_period: u32,
    /// Calls between two standing frames.
    pub standing_period: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            moving_period: 10,
            standing_period: 25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Facing {
    Down,
    Right,
    Left,
    Up,
}

impl Facing {
    const fn group(self) -> u32 {
        match self {
            Self::Down => 0,
            Self::Right => 1,
            Self::Left => 2,
            Self::Up => 3,
        }
    }

    const fn from_group(group: u32) -> Option<Self> {
        match group {
            0 => Some(Self::Down),
            1 => Some(Self::Right),
            2 => Some(Self::Left),
            3 => Some(Self::Up),
            _ => None,
        }
    }

    // Right wins over left, left over up, up over down.
    const fn from_flags(flags: DirectionFlags) -> Option<Self> {
        if flags.right {
            Some(Self::Right)
        } else if flags.left {
            Some(Self::Left)
        } else if flags.up {
            Some(Self::Up)
        } else if flags.down {
            Some(Self::Down)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Mode {
    Standing,
    Moving,
}

/// Stateful animator for a single agent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Animator {
    base: TileValue,
    settings: AnimationSettings,
    mode: Option<Mode>,
    moving_counter: u32,
    standing_counter: u32,
}

impl Animator {
    /// Creates an animator for a catalog whose first value is `base`.
    #[must_use]
    pub fn new(base: TileValue, settings: AnimationSettings) -> Self {
        Self {
            base,
            settings,
            mode: None,
            moving_counter: 0,
            standing_counter: 0,
        }
    }

    /// Computes the tile value to display after a tick with `flags`.
    ///
    /// Counters restart whenever the agent switches between standing and
    /// moving.
    pub fn next_tile_value(&mut self, current: TileValue, flags: DirectionFlags) -> TileValue {
        let facing = Facing::from_flags(flags);
        let mode = if facing.is_some() {
            Mode::Moving
        } else {
            Mode::Standing
        };
        if self.mode != Some(mode) {
            self.mode = Some(mode);
            self.moving_counter = 0;
            self.standing_counter = 0;
        }

        match facing {
            Some(facing) => self.moving(current, facing),
            None => self.standing(current),
        }
    }

    fn moving(&mut self, current: TileValue, facing: Facing) -> TileValue {
        match self.classify(current) {
            Some((current_facing, frame)) if current_facing == facing && frame >= MOVING_START => {
                if advance(&mut self.moving_counter, self.settings.moving_period) {
                    let next = (frame - MOVING_START + 1) % MOVING_FRAMES;
                    self.frame(facing, MOVING_START + next)
                } else {
                    current
                }
            }
            _ => self.frame(facing, MOVING_START),
        }
    }

    fn standing(&mut self, current: TileValue) -> TileValue {
        match self.classify(current) {
            Some((facing, frame)) if frame < STANDING_FRAMES => {
                if advance(&mut self.standing_counter, self.settings.standing_period) {
                    self.frame(facing, (frame + 1) % STANDING_FRAMES)
                } else {
                    current
                }
            }
            Some((facing, _)) => self.frame(facing, 0),
            None => self.base,
        }
    }

    fn classify(&self, value: TileValue) -> Option<(Facing, u32)> {
        let relative = value.get().checked_sub(self.base.get())?;
        let facing = Facing::from_group(relative / GROUP_SPAN)?;
        Some((facing, relative % GROUP_SPAN))
    }

    fn frame(&self, facing: Facing, frame: u32) -> TileValue {
        self.base.offset(facing.group() * GROUP_SPAN + frame)
    }
}

fn advance(counter: &mut u32, period: u32) -> bool {
    *counter += 1;
    if *counter >= period {
        *counter = 0;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 3;

    fn animator(moving_period: u32, standing_period: u32) -> Animator {
        Animator::new(
            TileValue::new(BASE),
            AnimationSettings {
                moving_period,
                standing_period,
            },
        )
    }

    fn flags(up: bool, down: bool, left: bool, right: bool) -> DirectionFlags {
        DirectionFlags {
            up,
            down,
            left,
            right,
        }
    }

    fn run(animator: &mut Animator, start: u32, flags: DirectionFlags, calls: usize) -> Vec<u32> {
        let mut value = TileValue::new(start);
        (0..calls)
            .map(|_| {
                value = animator.next_tile_value(value, flags);
                value.get()
            })
            .collect()
    }

    #[test]
    fn moving_right_jumps_to_the_moving_frames_then_cycles() {
        let mut animator = animator(2, 25);
        let values = run(&mut animator, BASE, flags(false, false, false, true), 10);
        assert_eq!(values, vec![15, 15, 16, 16, 17, 17, 18, 18, 15, 15]);
    }

    #[test]
    fn stopping_returns_to_the_standing_frame_of_the_same_direction() {
        let mut animator = animator(2, 25);
        let idle = flags(false, false, false, false);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE + 21), idle).get(), BASE + 16);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE + 30), idle).get(), BASE + 24);
    }

    #[test]
    fn standing_alternates_two_frames_on_the_slow_counter() {
        let mut animator = animator(2, 3);
        let values = run(&mut animator, BASE + 8, flags(false, false, false, false), 7);
        assert_eq!(
            values,
            vec![BASE + 8, BASE + 8, BASE + 9, BASE + 9, BASE + 9, BASE + 8, BASE + 8]
        );
    }

    #[test]
    fn horizontal_flags_take_priority_over_vertical() {
        let mut animator = animator(2, 25);
        let diagonal = flags(true, false, true, false);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE), diagonal).get(), BASE + 20);

        let mut animator = self::animator(2, 25);
        let down_right = flags(false, true, false, true);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE), down_right).get(), BASE + 12);
    }

    #[test]
    fn changing_direction_restarts_in_the_new_group() {
        let mut animator = animator(1, 25);
        let up = flags(true, false, false, false);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE + 14), up).get(), BASE + 28);
        assert_eq!(animator.next_tile_value(TileValue::new(BASE + 28), up).get(), BASE + 29);
    }

    #[test]
    fn values_outside_the_catalog_fall_back_to_the_base() {
        let mut animator = animator(2, 25);
        let idle = flags(false, false, false, false);
        assert_eq!(animator.next_tile_value(TileValue::new(1), idle).get(), BASE);
        assert_eq!(
            animator.next_tile_value(TileValue::new(BASE + ANIMATION_SPAN), idle).get(),
            BASE
        );
    }
}
