//! Controller and sandbox tuning, loaded from YAML.

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the demo simulation.
///
/// Every section may be omitted; missing fields fall back to the defaults
/// below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub patrol: PatrolConfig,
    pub oscillator: OscillatorConfig,
    pub sandbox: SandboxConfig,
}

/// Patrol/chase controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// A waypoint counts as reached once the agent is closer than this.
    pub arrival_distance: f32,

    /// Force magnitude applied towards the current waypoint.
    pub patrol_force: f32,

    /// Force magnitude applied towards a visible target.
    pub chase_force: f32,

    /// Add "Chase Player" in front of the patrol loop.
    pub chase: bool,

    /// Pause and turn after every waypoint.
    pub look_around: bool,

    /// Pause before turning, in seconds.
    pub look_around_seconds: f32,

    /// Yaw applied when a look-around pause ends.
    pub look_around_degrees: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            arrival_distance: 1.0,
            patrol_force: 20.0,
            chase_force: 10.0,
            chase: false,
            look_around: false,
            look_around_seconds: 1.0,
            look_around_degrees: 5.0,
        }
    }
}

/// Oscillating controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    /// Translation applied every tick while in "move left".
    pub left_step: Vec3,
    /// Translation applied every tick while in "move right".
    pub right_step: Vec3,
    pub upper_bound: f32,
    pub lower_bound: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            left_step: Vec3::new(0.5, 0.0, 0.0),
            right_step: Vec3::new(-0.5, 0.0, 0.0),
            upper_bound: 1.0,
            lower_bound: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Linear damping applied to body velocities, per second.
    pub damping: f32,
    pub body_mass: f32,
    pub body_radius: f32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            damping: 2.0,
            body_mass: 1.0,
            body_radius: 0.5,
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
