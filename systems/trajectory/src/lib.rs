#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure trajectory sampling for the aim-line preview.
//!
//! Positions along the arc are evaluated analytically from the closed-form
//! constant-acceleration solution, never through an iterative integrator, so
//! repeated calls with identical inputs always reproduce the same polyline.

use shellcaster_core::{CasterPose, LocalPoint, Vec2, WorldPoint, FLOAT_PRECISION};

/// Fixed-interval sampling horizon for the aim line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    /// Arc length covered by a single sampling segment, in world units.
    pub segment_size: f32,
    /// Total arc length covered by the preview, in world units.
    pub line_length: f32,
}

impl SamplingConfig {
    /// Default length of a single sampling segment.
    pub const DEFAULT_SEGMENT_SIZE: f32 = 5.0;

    /// Default total length of the aim line.
    pub const DEFAULT_LINE_LENGTH: f32 = 100.0;

    /// Creates a new sampling configuration.
    #[must_use]
    pub const fn new(segment_size: f32, line_length: f32) -> Self {
        Self {
            segment_size,
            line_length,
        }
    }

    /// Number of segments in the horizon, rounded to the nearest integer.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        if self.segment_size <= 0.0 {
            return 0;
        }
        (self.line_length / self.segment_size).round() as usize
    }

    /// Flight time spanned by one segment at the configured launch speed.
    ///
    /// The time step derives from the configured scalar speed rather than the
    /// instantaneous velocity magnitude, keeping direction and speed decoupled.
    #[must_use]
    pub fn segment_time(&self, speed: f32) -> f32 {
        self.segment_size / speed
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEGMENT_SIZE, Self::DEFAULT_LINE_LENGTH)
    }
}

/// Closed-form position along a constant-gravity arc at time `time`.
#[must_use]
pub fn position_at(origin: WorldPoint, velocity: Vec2, gravity: f32, time: f32) -> WorldPoint {
    WorldPoint::new(
        origin.x + velocity.x * time,
        origin.y + velocity.y * time + gravity * time * time / 2.0,
    )
}

/// Samples the ballistic arc and converts it into the caster's local frame.
///
/// The returned polyline always starts at exactly local zero. Between each
/// consecutive pair of samples a single `linecast` query is issued; the first
/// reported hit is appended (in local coordinates) and sampling stops, so no
/// point is ever emitted beyond an obstacle. With no hit the polyline ends at
/// the horizon sample. The function keeps no state and is safe to call every
/// tick.
#[must_use]
pub fn sample_path<F>(
    origin: WorldPoint,
    direction: Vec2,
    speed: f32,
    gravity: f32,
    sampling: SamplingConfig,
    pose: &CasterPose,
    linecast: F,
) -> Vec<LocalPoint>
where
    F: Fn(WorldPoint, WorldPoint) -> Option<WorldPoint>,
{
    let mut points = vec![LocalPoint::ZERO];
    if speed < FLOAT_PRECISION {
        return points;
    }

    let segment_count = sampling.segment_count();
    let segment_time = sampling.segment_time(speed);
    let velocity = direction.scaled(speed);

    let mut previous = origin;
    for index in 1..segment_count {
        let point = position_at(origin, velocity, gravity, index as f32 * segment_time);

        if let Some(hit) = linecast(previous, point) {
            points.push(pose.to_local(hit));
            break;
        }

        points.push(pose.to_local(point));
        previous = point;
    }

    points
}
