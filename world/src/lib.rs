#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Shellcaster.
//!
//! The world owns the energy pool, the caster's pose and facing, the static
//! obstacle geometry, the at-most-one prepared shell, and every live shell in
//! flight. All mutation flows through [`apply`]; adapters and systems observe
//! the result through broadcast [`Event`]s and the read-only [`query`] module.

use std::time::Duration;

use shellcaster_core::{
    Command, Energy, Event, Facing, ObstacleMask, ShellId, Vec2, WorldPoint, WorldRect,
    FLOAT_PRECISION, WELCOME_BANNER,
};

const STARTING_ENERGY: Energy = Energy::new(100.0);

/// Represents the authoritative Shellcaster world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    energy: Energy,
    caster: Caster,
    aim_input: Vec2,
    obstacles: Vec<Obstacle>,
    prepared: Option<PreparedShell>,
    shells: Vec<LiveShell>,
    next_shell: u32,
}

impl World {
    /// Creates a new Shellcaster world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_starting_energy(STARTING_ENERGY)
    }

    /// Creates a world whose energy pool starts at the provided amount.
    #[must_use]
    pub fn with_starting_energy(energy: Energy) -> Self {
        Self {
            banner: WELCOME_BANNER,
            energy,
            caster: Caster::default(),
            aim_input: Vec2::ZERO,
            obstacles: Vec::new(),
            prepared: None,
            shells: Vec::new(),
            next_shell: 0,
        }
    }

    fn allocate_shell_id(&mut self) -> ShellId {
        let id = ShellId::new(self.next_shell);
        self.next_shell = self.next_shell.saturating_add(1);
        id
    }

    fn advance_shells(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt_seconds = dt.as_secs_f32();
        if dt_seconds <= 0.0 {
            return;
        }

        let mut impacted: Vec<(ShellId, WorldPoint)> = Vec::new();
        for shell in &mut self.shells {
            shell.velocity.y += shell.gravity_factor * dt_seconds;
            let destination = shell.position.offset_by(shell.velocity.scaled(dt_seconds));

            // Live shells collide with every layer; the mask only narrows
            // queries issued by systems.
            match nearest_obstacle_hit(
                &self.obstacles,
                shell.position,
                destination,
                ObstacleMask::ALL,
            ) {
                Some(point) => impacted.push((shell.id, point)),
                None => shell.position = destination,
            }
        }

        for (id, point) in impacted {
            self.shells.retain(|shell| shell.id != id);
            out_events.push(Event::ShellImpacted { shell: id, point });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_shells(dt, out_events);
        }
        Command::SetAimInput { vector } => {
            world.aim_input = vector;
            out_events.push(Event::AimInputChanged { vector });
        }
        Command::SetFacing { facing } => {
            if world.caster.facing != facing {
                world.caster.facing = facing;
                out_events.push(Event::FacingChanged { facing });
            }
        }
        Command::SetCasterPose { position, rotation } => {
            world.caster.position = position;
            world.caster.rotation = rotation;
        }
        Command::PressCast => out_events.push(Event::CastPressed),
        Command::ReleaseCast => out_events.push(Event::CastReleased),
        Command::PrepareShell { kind, cost } => {
            // Both guards degrade to silent no-ops: preparing is a gameplay
            // gate, not a fault.
            if world.prepared.is_some() || !world.energy.can_afford(cost) {
                return;
            }

            world.energy = world.energy.debited(cost);
            let shell = world.allocate_shell_id();
            let origin = world.caster.position;
            let gravity_factor = kind.gravity_factor();
            world.prepared = Some(PreparedShell {
                id: shell,
                origin,
                gravity_factor,
            });
            out_events.push(Event::ShellPrepared {
                shell,
                origin,
                gravity_factor,
            });
        }
        Command::LaunchShell { velocity } => {
            let Some(prepared) = world.prepared.take() else {
                return;
            };

            world.shells.push(LiveShell {
                id: prepared.id,
                position: prepared.origin,
                velocity,
                gravity_factor: prepared.gravity_factor,
            });
            out_events.push(Event::ShellLaunched {
                shell: prepared.id,
                velocity,
            });
        }
        Command::AddObstacle { rect, layers } => {
            world.obstacles.push(Obstacle { rect, layers });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{nearest_obstacle_hit, World};
    use shellcaster_core::{CasterPose, Energy, Facing, ObstacleMask, ShellId, Vec2, WorldPoint};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current contents of the caster's energy pool.
    #[must_use]
    pub fn energy(world: &World) -> Energy {
        world.energy
    }

    /// Current pose of the casting entity.
    #[must_use]
    pub fn caster_pose(world: &World) -> CasterPose {
        CasterPose::new(world.caster.position, world.caster.rotation)
    }

    /// Current horizontal facing of the caster.
    #[must_use]
    pub fn facing(world: &World) -> Facing {
        world.caster.facing
    }

    /// Latest raw aim vector recorded by the world.
    #[must_use]
    pub fn aim_input(world: &World) -> Vec2 {
        world.aim_input
    }

    /// Snapshot of the shell currently held in the prepared slot, if any.
    #[must_use]
    pub fn prepared_shell(world: &World) -> Option<PreparedShellSnapshot> {
        world.prepared.as_ref().map(|prepared| PreparedShellSnapshot {
            shell: prepared.id,
            origin: prepared.origin,
            gravity_factor: prepared.gravity_factor,
        })
    }

    /// Captures a read-only view of every live shell in flight.
    #[must_use]
    pub fn shell_view(world: &World) -> ShellView {
        let mut snapshots: Vec<ShellSnapshot> = world
            .shells
            .iter()
            .map(|shell| ShellSnapshot {
                shell: shell.id,
                position: shell.position,
                velocity: shell.velocity,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.shell);
        ShellView { snapshots }
    }

    /// Enumerates the static obstacle footprints for presentation purposes.
    #[must_use]
    pub fn obstacle_rects(world: &World) -> Vec<shellcaster_core::WorldRect> {
        world.obstacles.iter().map(|obstacle| obstacle.rect).collect()
    }

    /// Reports the nearest obstacle intersection along a straight segment.
    ///
    /// Only obstacles whose layers intersect `mask` participate; returns the
    /// world-space point of first contact or `None` for a clear segment.
    #[must_use]
    pub fn linecast(
        world: &World,
        from: WorldPoint,
        to: WorldPoint,
        mask: ObstacleMask,
    ) -> Option<WorldPoint> {
        nearest_obstacle_hit(&world.obstacles, from, to, mask)
    }

    /// Immutable representation of the prepared shell used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PreparedShellSnapshot {
        /// Identifier assigned to the prepared shell.
        pub shell: ShellId,
        /// World-space position frozen at the moment of preparation.
        pub origin: WorldPoint,
        /// Gravity scalar pulled from the shell's definition.
        pub gravity_factor: f32,
    }

    /// Read-only snapshot describing all live shells in flight.
    #[derive(Clone, Debug, Default)]
    pub struct ShellView {
        snapshots: Vec<ShellSnapshot>,
    }

    impl ShellView {
        /// Iterator over the captured shell snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &ShellSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ShellSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single live shell's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ShellSnapshot {
        /// Identifier of the shell.
        pub shell: ShellId,
        /// Current world-space position.
        pub position: WorldPoint,
        /// Current world-space velocity.
        pub velocity: Vec2,
    }
}

#[derive(Clone, Copy, Debug)]
struct Caster {
    position: WorldPoint,
    rotation: f32,
    facing: Facing,
}

impl Default for Caster {
    fn default() -> Self {
        Self {
            position: WorldPoint::new(0.0, 0.0),
            rotation: 0.0,
            facing: Facing::Right,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PreparedShell {
    id: ShellId,
    origin: WorldPoint,
    gravity_factor: f32,
}

#[derive(Clone, Copy, Debug)]
struct LiveShell {
    id: ShellId,
    position: WorldPoint,
    velocity: Vec2,
    gravity_factor: f32,
}

#[derive(Clone, Copy, Debug)]
struct Obstacle {
    rect: WorldRect,
    layers: ObstacleMask,
}

fn nearest_obstacle_hit(
    obstacles: &[Obstacle],
    from: WorldPoint,
    to: WorldPoint,
    mask: ObstacleMask,
) -> Option<WorldPoint> {
    let mut nearest: Option<f32> = None;
    for obstacle in obstacles {
        if !obstacle.layers.intersects(mask) {
            continue;
        }

        if let Some(entry) = segment_entry(from, to, obstacle.rect) {
            nearest = Some(match nearest {
                None => entry,
                Some(best) => best.min(entry),
            });
        }
    }

    nearest.map(|t| {
        WorldPoint::new(
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
        )
    })
}

/// Slab test clipping the segment `from..to` against an axis-aligned
/// rectangle. Returns the parametric entry time in `[0, 1]`, where zero means
/// the segment starts inside the rectangle.
fn segment_entry(from: WorldPoint, to: WorldPoint, rect: WorldRect) -> Option<f32> {
    let spans = [
        (from.x, to.x - from.x, rect.min().x, rect.max().x),
        (from.y, to.y - from.y, rect.min().y, rect.max().y),
    ];

    let mut t_entry = 0.0_f32;
    let mut t_exit = 1.0_f32;
    for (start, delta, low, high) in spans {
        if delta.abs() < FLOAT_PRECISION {
            if start < low || start > high {
                return None;
            }
            continue;
        }

        let inverse = 1.0 / delta;
        let to_low = (low - start) * inverse;
        let to_high = (high - start) * inverse;
        let (near, far) = if to_low <= to_high {
            (to_low, to_high)
        } else {
            (to_high, to_low)
        };

        t_entry = t_entry.max(near);
        t_exit = t_exit.min(far);
        if t_entry > t_exit {
            return None;
        }
    }

    Some(t_entry)
}
