#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives the charge/fire cycle and the aim-line preview.
//!
//! The controller consumes world events, owns the transient aim state, and
//! emits commands. While a shell is prepared it refreshes the preview on every
//! tick and on every aim or facing change; the preview is hidden the instant
//! the shell launches. Every guard degrades to a silent no-op: an unaffordable
//! press, a release with nothing prepared, and a press while previewing all
//! leave the world untouched.

use shellcaster_core::{
    CasterPose, Command, Energy, Event, Facing, LocalPoint, ObstacleMask, ShellId, ShellKind,
    Vec2, WorldPoint,
};
use shellcaster_system_trajectory::{sample_path, SamplingConfig};

/// Static configuration for the cast controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastConfig {
    /// Energy debited from the pool by one cast.
    pub cast_energy_cost: Energy,
    /// Launch speed of prepared shells, in world units per second.
    pub shells_start_speed: f32,
    /// Kind of shell this controller prepares.
    pub shell_kind: ShellKind,
    /// Obstacle layers the aim line collides with.
    pub obstacle_mask: ObstacleMask,
    /// Sampling horizon used for the preview polyline.
    pub sampling: SamplingConfig,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            cast_energy_cost: Energy::new(10.0),
            shells_start_speed: 10.0,
            shell_kind: ShellKind::Standard,
            obstacle_mask: ObstacleMask::ALL,
            sampling: SamplingConfig::default(),
        }
    }
}

/// Renderable preview polyline in the caster's local frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AimPreview {
    visible: bool,
    points: Vec<LocalPoint>,
}

impl AimPreview {
    /// Whether the preview should currently be drawn.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Ordered local-frame points of the polyline, origin first.
    #[must_use]
    pub fn points(&self) -> &[LocalPoint] {
        &self.points
    }

    fn hide(&mut self) {
        self.visible = false;
        self.points.clear();
    }
}

/// Cast controller that owns aim state and the preview polyline.
#[derive(Clone, Debug)]
pub struct CastControl {
    config: CastConfig,
    aim_input: Vec2,
    facing: Facing,
    prepared: Option<PreparedShell>,
    preview: AimPreview,
}

#[derive(Clone, Copy, Debug)]
struct PreparedShell {
    shell: ShellId,
    origin: WorldPoint,
    gravity_factor: f32,
}

impl CastControl {
    /// Creates a new controller with the provided configuration.
    #[must_use]
    pub fn new(config: CastConfig) -> Self {
        Self {
            config,
            aim_input: Vec2::ZERO,
            facing: Facing::Right,
            prepared: None,
            preview: AimPreview::default(),
        }
    }

    /// Read-only access to the current preview polyline.
    #[must_use]
    pub fn preview(&self) -> &AimPreview {
        &self.preview
    }

    /// Identifier of the shell currently tracked as prepared, if any.
    #[must_use]
    pub fn prepared_shell(&self) -> Option<ShellId> {
        self.prepared.map(|prepared| prepared.shell)
    }

    /// Unit-length aim direction derived from raw input and the facing
    /// fallback; never degenerate.
    #[must_use]
    pub fn effective_aim(&self) -> Vec2 {
        match self.aim_input.normalized() {
            Some(direction) => direction,
            None => Vec2::new(self.facing.sign(), 0.0),
        }
    }

    /// Consumes world events and immutable views to drive the cast cycle.
    ///
    /// `energy` and `pose` are the world's current snapshots; `linecast` is
    /// the obstacle-query capability used while refreshing the preview. Called
    /// once per fixed simulation step with that step's event batch, and again
    /// with any follow-up events produced by the emitted commands.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        energy: Energy,
        pose: &CasterPose,
        linecast: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(WorldPoint, WorldPoint, ObstacleMask) -> Option<WorldPoint>,
    {
        let mut refresh = false;

        for event in events {
            match event {
                Event::AimInputChanged { vector } => {
                    self.aim_input = *vector;
                    refresh = true;
                }
                Event::FacingChanged { facing } => {
                    self.facing = *facing;
                    refresh = true;
                }
                Event::TimeAdvanced { .. } => {
                    // Unconditional per-tick refresh keeps the polyline
                    // anchored to the caster even without new input.
                    refresh = true;
                }
                Event::CastPressed => {
                    if self.prepared.is_none() && energy.can_afford(self.config.cast_energy_cost) {
                        out.push(Command::PrepareShell {
                            kind: self.config.shell_kind,
                            cost: self.config.cast_energy_cost,
                        });
                    }
                }
                Event::CastReleased => {
                    if self.prepared.is_some() {
                        let velocity = self
                            .effective_aim()
                            .scaled(self.config.shells_start_speed);
                        out.push(Command::LaunchShell { velocity });
                    }
                }
                Event::ShellPrepared {
                    shell,
                    origin,
                    gravity_factor,
                } => {
                    self.prepared = Some(PreparedShell {
                        shell: *shell,
                        origin: *origin,
                        gravity_factor: *gravity_factor,
                    });
                    refresh = true;
                }
                Event::ShellLaunched { .. } => {
                    self.prepared = None;
                    self.preview.hide();
                }
                Event::ShellImpacted { .. } => {}
            }
        }

        if refresh {
            self.refresh_preview(pose, &linecast);
        }
    }

    fn refresh_preview<F>(&mut self, pose: &CasterPose, linecast: &F)
    where
        F: Fn(WorldPoint, WorldPoint, ObstacleMask) -> Option<WorldPoint>,
    {
        let Some(prepared) = self.prepared else {
            return;
        };

        let mask = self.config.obstacle_mask;
        self.preview.points = sample_path(
            prepared.origin,
            self.effective_aim(),
            self.config.shells_start_speed,
            prepared.gravity_factor,
            self.config.sampling,
            pose,
            |from, to| linecast(from, to, mask),
        );
        self.preview.visible = true;
    }
}

impl Default for CastControl {
    fn default() -> Self {
        Self::new(CastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear(_from: WorldPoint, _to: WorldPoint, _mask: ObstacleMask) -> Option<WorldPoint> {
        None
    }

    fn origin_pose() -> CasterPose {
        CasterPose::new(WorldPoint::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn fallback_aim_uses_the_facing_sign() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::FacingChanged {
                facing: Facing::Left,
            }],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert_eq!(control.effective_aim(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn press_emits_prepare_when_affordable() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::CastPressed],
            Energy::new(15.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::PrepareShell {
                kind: ShellKind::Standard,
                cost: Energy::new(10.0),
            }]
        );
    }

    #[test]
    fn press_is_silent_without_energy() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::CastPressed],
            Energy::new(9.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert!(out.is_empty());
        assert!(!control.preview().visible());
    }

    #[test]
    fn release_is_silent_with_nothing_prepared() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::CastReleased],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn press_while_previewing_emits_nothing() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::ShellPrepared {
                shell: ShellId::new(0),
                origin: WorldPoint::new(0.0, 0.0),
                gravity_factor: -9.8,
            }],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );
        control.handle(
            &[Event::CastPressed],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn prepared_event_populates_the_preview_immediately() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[Event::ShellPrepared {
                shell: ShellId::new(3),
                origin: WorldPoint::new(0.0, 0.0),
                gravity_factor: -9.8,
            }],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert!(control.preview().visible());
        assert_eq!(control.preview().points()[0], LocalPoint::ZERO);
        assert!(control.preview().points().len() > 1);
    }

    #[test]
    fn launch_event_hides_the_preview_instantly() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[
                Event::ShellPrepared {
                    shell: ShellId::new(0),
                    origin: WorldPoint::new(0.0, 0.0),
                    gravity_factor: -9.8,
                },
                Event::ShellLaunched {
                    shell: ShellId::new(0),
                    velocity: Vec2::new(10.0, 0.0),
                },
            ],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert!(!control.preview().visible());
        assert!(control.preview().points().is_empty());
        assert!(control.prepared_shell().is_none());
    }

    #[test]
    fn release_launches_with_the_configured_speed() {
        let mut control = CastControl::default();
        let mut out = Vec::new();

        control.handle(
            &[
                Event::ShellPrepared {
                    shell: ShellId::new(0),
                    origin: WorldPoint::new(0.0, 0.0),
                    gravity_factor: -9.8,
                },
                Event::AimInputChanged {
                    vector: Vec2::new(0.3, 0.0),
                },
                Event::CastReleased,
            ],
            Energy::new(100.0),
            &origin_pose(),
            clear,
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::LaunchShell {
                velocity: Vec2::new(10.0, 0.0),
            }]
        );
    }
}
