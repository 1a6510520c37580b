#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shellcaster engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Shellcaster.";

/// Threshold below which a floating-point magnitude is treated as zero.
pub const FLOAT_PRECISION: f32 = 1e-4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the latest raw aim vector captured from an input device.
    SetAimInput {
        /// Unnormalized 2D aim vector; may be arbitrarily small.
        vector: Vec2,
    },
    /// Updates the caster's horizontal facing.
    SetFacing {
        /// Facing the caster should adopt.
        facing: Facing,
    },
    /// Moves the caster to a new pose within the world.
    SetCasterPose {
        /// World-space position of the caster.
        position: WorldPoint,
        /// Rotation of the caster in radians, counter-clockwise.
        rotation: f32,
    },
    /// Signals that the cast button was pressed this tick.
    PressCast,
    /// Signals that the cast button was released this tick.
    ReleaseCast,
    /// Requests that a shell be prepared for the caster.
    PrepareShell {
        /// Kind of shell to prepare.
        kind: ShellKind,
        /// Energy debited from the pool when the guard passes.
        cost: Energy,
    },
    /// Requests that the prepared shell be launched with the given velocity.
    LaunchShell {
        /// World-space launch velocity of the shell.
        velocity: Vec2,
    },
    /// Inserts a static obstacle into the world.
    AddObstacle {
        /// Axis-aligned footprint of the obstacle.
        rect: WorldRect,
        /// Collision layers the obstacle belongs to.
        layers: ObstacleMask,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that a new raw aim vector was recorded.
    AimInputChanged {
        /// The raw aim vector as captured by the input adapter.
        vector: Vec2,
    },
    /// Reports that the caster's horizontal facing flipped.
    FacingChanged {
        /// Facing that became active.
        facing: Facing,
    },
    /// Confirms that the cast button press reached the world.
    CastPressed,
    /// Confirms that the cast button release reached the world.
    CastReleased,
    /// Confirms that a shell was prepared and energy debited.
    ShellPrepared {
        /// Identifier assigned to the prepared shell.
        shell: ShellId,
        /// World-space position frozen at the moment of preparation.
        origin: WorldPoint,
        /// Gravity scalar pulled from the shell's definition.
        gravity_factor: f32,
    },
    /// Confirms that the prepared shell became a live projectile.
    ShellLaunched {
        /// Identifier of the launched shell.
        shell: ShellId,
        /// Velocity handed to the shell's physical simulation.
        velocity: Vec2,
    },
    /// Reports that a live shell struck an obstacle and was removed.
    ShellImpacted {
        /// Identifier of the shell that impacted.
        shell: ShellId,
        /// World-space point of first contact.
        point: WorldPoint,
    },
}

/// Unique identifier assigned to a shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShellId(u32);

impl ShellId {
    /// Creates a new shell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of shells that the caster can prepare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellKind {
    /// Default magic-arrow shell.
    Standard,
    /// Heavier shell that drops more steeply.
    Heavy,
}

impl ShellKind {
    /// Returns the constant gravity scalar applied to shells of this kind.
    ///
    /// Negative values accelerate the shell downward along the y axis.
    #[must_use]
    pub const fn gravity_factor(self) -> f32 {
        match self {
            Self::Standard => -9.8,
            Self::Heavy => -14.7,
        }
    }
}

/// Horizontal facing of the caster, used as the aim fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
}

impl Facing {
    /// Signed unit scalar for the facing direction along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Plain 2D vector used for velocities and raw input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// Vector with both components set to zero.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the unit-length vector, or `None` when the magnitude is
    /// below [`FLOAT_PRECISION`].
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let length = self.length();
        if length < FLOAT_PRECISION {
            return None;
        }
        Some(Self::new(self.x / length, self.y / length))
    }

    /// Returns the vector scaled by the provided factor.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Point expressed in the fixed world coordinate frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Vertical world coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the point translated by the provided vector.
    #[must_use]
    pub fn offset_by(self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

/// Point expressed in the coordinate frame local to the caster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    /// Horizontal offset from the caster.
    pub x: f32,
    /// Vertical offset from the caster.
    pub y: f32,
}

impl LocalPoint {
    /// The caster's own position in its local frame.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new local-frame point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Position and rotation of the casting entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CasterPose {
    /// World-space position of the caster.
    pub position: WorldPoint,
    /// Rotation in radians, counter-clockwise from the world x axis.
    pub rotation: f32,
}

impl CasterPose {
    /// Creates a new caster pose.
    #[must_use]
    pub const fn new(position: WorldPoint, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Maps a world-space point through the inverse of this pose.
    ///
    /// The inverse applies the negated translation followed by the negated
    /// rotation, so a point coincident with the caster maps to local zero.
    #[must_use]
    pub fn to_local(&self, point: WorldPoint) -> LocalPoint {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        let (sin, cos) = self.rotation.sin_cos();
        LocalPoint::new(cos * dx + sin * dy, cos * dy - sin * dx)
    }

    /// Maps a local-frame point back into world space.
    #[must_use]
    pub fn to_world(&self, point: LocalPoint) -> WorldPoint {
        let (sin, cos) = self.rotation.sin_cos();
        WorldPoint::new(
            self.position.x + cos * point.x - sin * point.y,
            self.position.y + sin * point.x + cos * point.y,
        )
    }
}

/// Scalar energy amount stored in the caster's resource pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Energy(f32);

impl Energy {
    /// Creates a new energy amount.
    #[must_use]
    pub const fn new(amount: f32) -> Self {
        Self(amount)
    }

    /// Retrieves the raw scalar amount.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }

    /// Reports whether this pool covers the provided cost.
    #[must_use]
    pub fn can_afford(&self, cost: Energy) -> bool {
        self.0 >= cost.0
    }

    /// Returns the pool reduced by the provided cost, clamped at zero.
    #[must_use]
    pub fn debited(self, cost: Energy) -> Self {
        Self((self.0 - cost.0).max(0.0))
    }
}

/// Bitmask selecting which obstacle layers participate in a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleMask(u32);

impl ObstacleMask {
    /// Mask matching every obstacle layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Mask matching no obstacle layer.
    pub const NONE: Self = Self(0);

    /// Creates a mask from raw layer bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Retrieves the raw layer bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Reports whether the two masks share at least one layer.
    #[must_use]
    pub const fn intersects(&self, other: ObstacleMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Axis-aligned rectangle expressed in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    min: WorldPoint,
    max: WorldPoint,
}

impl WorldRect {
    /// Constructs a rectangle from two opposite corners.
    ///
    /// The corners may be provided in any order; components are sorted so the
    /// stored minimum never exceeds the stored maximum on either axis.
    #[must_use]
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            min: WorldPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: WorldPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Corner with the smallest coordinates on both axes.
    #[must_use]
    pub const fn min(&self) -> WorldPoint {
        self.min
    }

    /// Corner with the largest coordinates on both axes.
    #[must_use]
    pub const fn max(&self) -> WorldPoint {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn normalized_rejects_near_zero_vectors() {
        assert!(Vec2::ZERO.normalized().is_none());
        assert!(Vec2::new(FLOAT_PRECISION / 2.0, 0.0).normalized().is_none());

        let unit = Vec2::new(3.0, 4.0).normalized().expect("non-degenerate");
        assert!((unit.length() - 1.0).abs() < 1e-6);
        assert!((unit.x - 0.6).abs() < 1e-6);
        assert!((unit.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn pose_inverse_maps_caster_position_to_local_zero() {
        let pose = CasterPose::new(WorldPoint::new(12.5, -3.0), 0.75);
        let local = pose.to_local(WorldPoint::new(12.5, -3.0));

        assert!(local.x.abs() < 1e-6);
        assert!(local.y.abs() < 1e-6);
    }

    #[test]
    fn pose_round_trips_points_through_both_frames() {
        let pose = CasterPose::new(WorldPoint::new(4.0, 7.0), std::f32::consts::FRAC_PI_3);
        let original = WorldPoint::new(-2.5, 9.25);

        let restored = pose.to_world(pose.to_local(original));

        assert!((restored.x - original.x).abs() < 1e-4);
        assert!((restored.y - original.y).abs() < 1e-4);
    }

    #[test]
    fn pose_rotation_is_inverted_for_local_points() {
        let pose = CasterPose::new(WorldPoint::new(0.0, 0.0), std::f32::consts::FRAC_PI_2);
        let local = pose.to_local(WorldPoint::new(0.0, 1.0));

        assert!((local.x - 1.0).abs() < 1e-6);
        assert!(local.y.abs() < 1e-6);
    }

    #[test]
    fn energy_debit_is_exact_and_clamped() {
        let pool = Energy::new(15.0);
        let cost = Energy::new(10.0);

        assert!(pool.can_afford(cost));
        assert_eq!(pool.debited(cost), Energy::new(5.0));
        assert_eq!(Energy::new(3.0).debited(cost), Energy::new(0.0));
        assert!(!Energy::new(9.99).can_afford(cost));
    }

    #[test]
    fn obstacle_mask_intersection_matches_layer_bits() {
        let walls = ObstacleMask::from_bits(0b01);
        let hazards = ObstacleMask::from_bits(0b10);

        assert!(walls.intersects(ObstacleMask::ALL));
        assert!(!walls.intersects(hazards));
        assert!(!walls.intersects(ObstacleMask::NONE));
        assert!(walls.intersects(ObstacleMask::from_bits(0b11)));
    }

    #[test]
    fn world_rect_sorts_corners() {
        let rect = WorldRect::from_corners(WorldPoint::new(5.0, -1.0), WorldPoint::new(2.0, 4.0));

        assert_eq!(rect.min(), WorldPoint::new(2.0, -1.0));
        assert_eq!(rect.max(), WorldPoint::new(5.0, 4.0));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn shell_id_round_trips_through_bincode() {
        assert_round_trip(&ShellId::new(42));
    }

    #[test]
    fn shell_kind_round_trips_through_bincode() {
        assert_round_trip(&ShellKind::Heavy);
    }

    #[test]
    fn world_rect_round_trips_through_bincode() {
        let rect = WorldRect::from_corners(WorldPoint::new(0.0, 0.0), WorldPoint::new(3.0, 2.0));
        assert_round_trip(&rect);
    }

    #[test]
    fn obstacle_mask_round_trips_through_bincode() {
        assert_round_trip(&ObstacleMask::from_bits(0b1010));
    }
}
