//! TOML-backed launch configuration for the Shellcaster binary.

use anyhow::{Context, Result};
use serde::Deserialize;
use shellcaster_core::{ObstacleMask, ShellKind, WorldPoint, WorldRect};
use shellcaster_system_trajectory::SamplingConfig;
use std::{fs, path::Path};

/// Launch parameters controlling the simulation and the cast tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Energy available to the caster when the world boots.
    pub starting_energy: f32,
    /// Energy debited for every prepared shell.
    pub cast_energy_cost: f32,
    /// Launch speed applied along the aim direction.
    pub shells_start_speed: f32,
    /// Kind of shell prepared by every cast.
    pub shell_kind: ShellKind,
    /// Spacing between consecutive aim preview samples in world units.
    pub segment_size: f32,
    /// Total arc length covered by the aim preview in world units.
    pub line_length: f32,
    /// Obstacle layers considered when truncating the aim preview.
    pub preview_layers: u32,
    /// Obstacles placed into the world before the simulation starts.
    pub obstacles: Vec<ObstacleConfig>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let sampling = SamplingConfig::default();

        Self {
            starting_energy: 100.0,
            cast_energy_cost: 10.0,
            shells_start_speed: 10.0,
            shell_kind: ShellKind::Standard,
            segment_size: sampling.segment_size,
            line_length: sampling.line_length,
            preview_layers: ObstacleMask::ALL.bits(),
            obstacles: vec![
                ObstacleConfig {
                    min_x: 30.0,
                    min_y: -40.0,
                    max_x: 32.0,
                    max_y: 10.0,
                    layers: ObstacleMask::ALL.bits(),
                },
                ObstacleConfig {
                    min_x: -200.0,
                    min_y: -52.0,
                    max_x: 200.0,
                    max_y: -50.0,
                    layers: ObstacleMask::ALL.bits(),
                },
            ],
        }
    }
}

impl CliConfig {
    /// Loads a configuration from the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Sampling parameters derived from the configured preview geometry.
    pub(crate) fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            segment_size: self.segment_size,
            line_length: self.line_length,
        }
    }

    /// Obstacle mask consulted by the aim preview.
    pub(crate) fn preview_mask(&self) -> ObstacleMask {
        ObstacleMask::from_bits(self.preview_layers)
    }
}

/// Axis-aligned obstacle loaded from the launch configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObstacleConfig {
    /// Minimum x coordinate of the rectangle.
    pub min_x: f32,
    /// Minimum y coordinate of the rectangle.
    pub min_y: f32,
    /// Maximum x coordinate of the rectangle.
    pub max_x: f32,
    /// Maximum y coordinate of the rectangle.
    pub max_y: f32,
    /// Layer bits occupied by the obstacle.
    pub layers: u32,
}

impl ObstacleConfig {
    /// Rectangle described by the configured corners.
    pub(crate) fn rect(&self) -> WorldRect {
        WorldRect::from_corners(
            WorldPoint::new(self.min_x, self.min_y),
            WorldPoint::new(self.max_x, self.max_y),
        )
    }

    /// Layer mask occupied by the obstacle.
    pub(crate) fn mask(&self) -> ObstacleMask {
        ObstacleMask::from_bits(self.layers)
    }
}
