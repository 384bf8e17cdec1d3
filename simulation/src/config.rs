use serde::Deserialize;
use thiserror::Error;
use tilewalk_system_animation::AnimationSettings;
use tilewalk_system_steering::WanderSettings;

/// Seed used when a configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x5eed_7113_a9e5_0001;

/// Tunable parameters of a simulation run.
///
/// Every field falls back to its default when omitted from a config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base seed from which every agent's generator is derived.
    pub seed: u64,
    /// Roaming behaviour of wandering agents.
    pub wander: WanderConfig,
    /// Proximity policy of autonomous agents.
    pub pursuit: PursuitConfig,
    /// Sprite frame pacing.
    pub animation: AnimationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            wander: WanderConfig::default(),
            pursuit: PursuitConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Checks the configuration for values the simulation cannot honour.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero animation period or a wander
    /// range that does not fit a signed pixel delta.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.moving_period == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "animation.moving_period",
            });
        }
        if self.animation.standing_period == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "animation.standing_period",
            });
        }
        for (field, range) in [
            ("wander.range_x", self.wander.range_x),
            ("wander.range_y", self.wander.range_y),
        ] {
            if i32::try_from(range).is_err() {
                return Err(ConfigError::RangeTooLarge { field, range });
            }
        }
        Ok(())
    }
}

/// Wander parameters, in ticks and pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Idle ticks between two roams.
    pub pause_ticks: u32,
    /// Horizontal roam range.
    pub range_x: u32,
    /// Vertical roam range.
    pub range_y: u32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        let settings = WanderSettings::default();
        Self {
            pause_ticks: settings.pause_ticks,
            range_x: settings.range_x,
            range_y: settings.range_y,
        }
    }
}

impl From<WanderConfig> for WanderSettings {
    fn from(config: WanderConfig) -> Self {
        Self {
            pause_ticks: config.pause_ticks,
            range_x: config.range_x,
            range_y: config.range_y,
        }
    }
}

/// Pursuit parameters, in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Manhattan distance below which an autonomous agent starts pursuing.
    pub view_range: u32,
    /// Distance the target may stray from the end of the path before a
    /// new plan is made at the next waypoint.
    pub retarget_distance: u32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            view_range: 5,
            retarget_distance: 1,
        }
    }
}

/// Animation pacing, in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Ticks between two moving frames.
    pub moving_period: u32,
    /// Ticks between two standing frames.
    pub standing_period: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let settings = AnimationSettings::default();
        Self {
            moving_period: settings.moving_period,
            standing_period: settings.standing_period,
        }
    }
}

impl From<AnimationConfig> for AnimationSettings {
    fn from(config: AnimationConfig) -> Self {
        Self {
            moving_period: config.moving_period,
            standing_period: config.standing_period,
        }
    }
}

/// Errors reported for an unusable [`SimulationConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An animation period of zero ticks.
    #[error("`{field}` must be at least one tick")]
    ZeroPeriod {
        /// Offending field.
        field: &'static str,
    },
    /// A wander range that does not fit a signed pixel delta.
    #[error("`{field}` of {range} pixels exceeds the signed pixel range")]
    RangeTooLarge {
        /// Offending field.
        field: &'static str,
        /// Configured range.
        range: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_their_defaults() {
        let config: SimulationConfig =
            toml::from_str("[pursuit]\nview_range = 8\n").expect("config parses");
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.pursuit.view_range, 8);
        assert_eq!(config.pursuit.retarget_distance, 1);
        assert_eq!(config.wander, WanderConfig::default());
        assert_eq!(config.animation.moving_period, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_documents_use_the_same_field_names() {
        let config: SimulationConfig = toml::from_str(
            "seed = 7\n[wander]\npause_ticks = 60\n[animation]\nstanding_period = 20\n",
        )
        .expect("config parses");
        assert_eq!(config.seed, 7);
        assert_eq!(config.wander.pause_ticks, 60);
        assert_eq!(config.wander.range_x, 32);
        assert_eq!(config.animation.standing_period, 20);
        assert_eq!(config.pursuit, PursuitConfig::default());
    }

    #[test]
    fn zero_periods_are_rejected() {
        let mut config = SimulationConfig::default();
        config.animation.standing_period = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod {
                field: "animation.standing_period",
            })
        );
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let mut config = SimulationConfig::default();
        config.wander.range_y = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeTooLarge {
                field: "wander.range_y",
                ..
            })
        ));
    }
}
