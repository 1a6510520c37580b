#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Shellcaster adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use shellcaster_core::{CasterPose, LocalPoint, ShellId, WorldPoint};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Aim direction requested by the player, expressed in world units
    /// relative to the caster. `None` when the adapter captured no aim input.
    pub aim_vector: Option<Vec2>,
    /// Whether the adapter detected a cast press on this frame.
    pub cast_pressed: bool,
    /// Whether the adapter detected a cast release on this frame.
    pub cast_released: bool,
    /// Horizontal movement axis in the range -1.0..=1.0.
    pub move_axis: f32,
}

/// Immutable snapshot describing the caster rendered within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CasterPresentation {
    /// World-space position of the caster.
    pub position: Vec2,
    /// Rotation of the caster in radians.
    pub rotation: f32,
    /// Horizontal facing sign, -1.0 for left and 1.0 for right.
    pub facing_sign: f32,
    /// Radius of the caster's body in world units.
    pub radius: f32,
    /// Fill color of the caster's body.
    pub color: Color,
}

impl CasterPresentation {
    /// Creates a new caster presentation descriptor.
    #[must_use]
    pub const fn new(
        position: Vec2,
        rotation: f32,
        facing_sign: f32,
        radius: f32,
        color: Color,
    ) -> Self {
        Self {
            position,
            rotation,
            facing_sign,
            radius,
            color,
        }
    }
}

/// Axis-aligned obstacle rendered as a filled rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObstacle {
    /// Minimum corner of the rectangle in world units.
    pub min: Vec2,
    /// Maximum corner of the rectangle in world units.
    pub max: Vec2,
    /// Fill color of the obstacle.
    pub color: Color,
}

impl SceneObstacle {
    /// Creates a new obstacle descriptor.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2, color: Color) -> Self {
        Self { min, max, color }
    }
}

/// In-flight shell rendered as a filled circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneShell {
    /// Identifier allocated to the shell by the world.
    pub id: ShellId,
    /// World-space position of the shell.
    pub position: Vec2,
    /// Radius of the shell's body in world units.
    pub radius: f32,
    /// Fill color of the shell's body.
    pub color: Color,
}

impl SceneShell {
    /// Creates a new shell descriptor.
    #[must_use]
    pub const fn new(id: ShellId, position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            id,
            position,
            radius,
            color,
        }
    }
}

/// Style applied when drawing the aim preview polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimLinePresentation {
    /// Color used for every segment of the polyline.
    pub color: Color,
    /// Stroke width of the polyline in world units.
    pub width: f32,
}

impl AimLinePresentation {
    /// Creates a new aim line descriptor.
    ///
    /// Returns an error when `width` is not strictly positive.
    pub fn new(color: Color, width: f32) -> std::result::Result<Self, RenderingError> {
        if width <= 0.0 {
            return Err(RenderingError::InvalidLineWidth { width });
        }

        Ok(Self { color, width })
    }
}

/// Aim preview polyline expressed in the caster's local frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AimPathPresentation {
    /// Whether the preview should be drawn at all.
    pub visible: bool,
    /// Polyline vertices, starting at the caster's own position.
    pub points: Vec<Vec2>,
}

impl AimPathPresentation {
    /// Creates a visible aim path from local-frame polyline vertices.
    #[must_use]
    pub fn visible(points: Vec<Vec2>) -> Self {
        Self {
            visible: true,
            points,
        }
    }

    /// Creates a hidden aim path carrying no vertices.
    #[must_use]
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Scene description combining the caster, obstacles, shells and aim preview.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Casting entity at the center of the view.
    pub caster: CasterPresentation,
    /// Obstacles currently blocking shell flight.
    pub obstacles: Vec<SceneObstacle>,
    /// Shells currently in flight.
    pub shells: Vec<SceneShell>,
    /// Stroke style applied to the aim preview.
    pub aim_line: AimLinePresentation,
    /// Aim preview polyline in the caster's local frame.
    pub aim_path: AimPathPresentation,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        caster: CasterPresentation,
        obstacles: Vec<SceneObstacle>,
        shells: Vec<SceneShell>,
        aim_line: AimLinePresentation,
        aim_path: AimPathPresentation,
    ) -> Self {
        Self {
            caster,
            obstacles,
            shells,
            aim_line,
            aim_path,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Shellcaster scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered, allowing adapters to animate world snapshots
    /// deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Converts a world-frame point into the vector type consumed by backends.
#[must_use]
pub fn world_point_to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
}

/// Converts a caster-local point into a world-space vector for drawing.
#[must_use]
pub fn local_point_to_vec2(point: LocalPoint, pose: &CasterPose) -> Vec2 {
    let world = pose.to_world(point);
    Vec2::new(world.x, world.y)
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Aim line strokes must have positive width to be drawable.
    InvalidLineWidth {
        /// Provided stroke width that failed validation.
        width: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLineWidth { width } => {
                write!(f, "aim line width must be positive (received {width})")
            }
        }
    }
}

impl Error for RenderingError {}
