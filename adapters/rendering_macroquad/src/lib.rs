#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Shellcaster.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::BLACK,
    input::{
        is_key_down, is_key_pressed, is_key_released, mouse_position, KeyCode,
    },
};
use shellcaster_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene,
};
use std::time::Duration;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `Space` pressed this frame to start charging a cast.
    cast_pressed: bool,
    /// `Space` released this frame to fire the charged cast.
    cast_released: bool,
    /// `A`/`D` horizontal movement axis in -1.0..=1.0.
    move_axis: f32,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let cast_pressed = is_key_pressed(KeyCode::Space);
        let cast_released = is_key_released(KeyCode::Space);
        let mut move_axis = 0.0;
        if is_key_down(KeyCode::A) {
            move_axis -= 1.0;
        }
        if is_key_down(KeyCode::D) {
            move_axis += 1.0;
        }

        Self {
            quit_requested,
            cast_pressed,
            cast_released,
            move_axis,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    pixels_per_unit: f32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            pixels_per_unit: 12.0,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints the average frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures how many screen pixels one world unit occupies.
    #[must_use]
    pub fn with_pixels_per_unit(mut self, pixels_per_unit: f32) -> Self {
        self.pixels_per_unit = pixels_per_unit.max(1.0);
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame, returning the per-second average once one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        self.elapsed = Duration::ZERO;
        self.frames = 0;

        if seconds <= f32::EPSILON {
            return None;
        }

        Some(frames as f32 / seconds)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            pixels_per_unit,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let camera = Camera::centered_on(
                    scene.caster.position,
                    screen_width,
                    screen_height,
                    pixels_per_unit,
                );

                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &scene,
                    &camera,
                    Vec2::new(cursor_x, cursor_y),
                    keyboard,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let camera = Camera::centered_on(
                    scene.caster.position,
                    screen_width,
                    screen_height,
                    pixels_per_unit,
                );

                draw_obstacles(&scene, &camera);
                draw_aim_path(&scene, &camera);
                draw_shells(&scene, &camera);
                draw_caster(&scene, &camera);

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        println!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Mapping between world units and screen pixels with the caster centered.
#[derive(Clone, Copy, Debug)]
struct Camera {
    center: Vec2,
    half_screen: Vec2,
    pixels_per_unit: f32,
}

impl Camera {
    fn centered_on(
        center: Vec2,
        screen_width: f32,
        screen_height: f32,
        pixels_per_unit: f32,
    ) -> Self {
        Self {
            center,
            half_screen: Vec2::new(screen_width * 0.5, screen_height * 0.5),
            pixels_per_unit,
        }
    }

    /// Maps a world-space point to screen pixels. World y points up, screen y down.
    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.half_screen.x + (world.x - self.center.x) * self.pixels_per_unit,
            self.half_screen.y - (world.y - self.center.y) * self.pixels_per_unit,
        )
    }

    /// Maps a screen-pixel position back into world space.
    fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            self.center.x + (screen.x - self.half_screen.x) / self.pixels_per_unit,
            self.center.y - (screen.y - self.half_screen.y) / self.pixels_per_unit,
        )
    }

    fn scale(&self, length: f32) -> f32 {
        length * self.pixels_per_unit
    }
}

fn gather_frame_input_from_observations(
    scene: &Scene,
    camera: &Camera,
    cursor_position: Vec2,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let cursor_world = camera.to_world(cursor_position);
    let aim = cursor_world - scene.caster.position;
    let aim_vector = if aim.length_squared() > f32::EPSILON {
        Some(aim)
    } else {
        None
    };

    FrameInput {
        aim_vector,
        cast_pressed: keyboard.cast_pressed,
        cast_released: keyboard.cast_released,
        move_axis: keyboard.move_axis,
    }
}

fn draw_obstacles(scene: &Scene, camera: &Camera) {
    for obstacle in &scene.obstacles {
        let top_left = camera.to_screen(Vec2::new(obstacle.min.x, obstacle.max.y));
        let width = camera.scale(obstacle.max.x - obstacle.min.x);
        let height = camera.scale(obstacle.max.y - obstacle.min.y);
        macroquad::shapes::draw_rectangle(
            top_left.x,
            top_left.y,
            width,
            height,
            to_macroquad_color(obstacle.color),
        );
    }
}

fn draw_aim_path(scene: &Scene, camera: &Camera) {
    if !scene.aim_path.visible || scene.aim_path.points.len() < 2 {
        return;
    }

    let color = to_macroquad_color(scene.aim_line.color);
    let thickness = camera.scale(scene.aim_line.width).max(1.0);
    let caster = scene.caster;
    let (sin, cos) = caster.rotation.sin_cos();
    // Polyline vertices are caster-local and follow the caster's rotation.
    let place = |local: Vec2| {
        caster.position + Vec2::new(cos * local.x - sin * local.y, sin * local.x + cos * local.y)
    };

    for segment in scene.aim_path.points.windows(2) {
        let from = camera.to_screen(place(segment[0]));
        let to = camera.to_screen(place(segment[1]));
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }
}

fn draw_shells(scene: &Scene, camera: &Camera) {
    for shell in &scene.shells {
        let center = camera.to_screen(shell.position);
        let radius = camera.scale(shell.radius).max(1.0);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius,
            to_macroquad_color(shell.color),
        );
    }
}

fn draw_caster(scene: &Scene, camera: &Camera) {
    let caster = scene.caster;
    let center = camera.to_screen(caster.position);
    let radius = camera.scale(caster.radius).max(2.0);
    let body = if scene.aim_path.visible {
        caster.color.lighten(0.3)
    } else {
        caster.color
    };
    let border_thickness = (radius * 0.2).max(1.0);

    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(body));
    macroquad::shapes::draw_circle_lines(center.x, center.y, radius, border_thickness, BLACK);

    // Short bar showing which way the caster faces while idle.
    let tip = camera.to_screen(caster.position + Vec2::new(caster.facing_sign * caster.radius * 1.6, 0.0));
    macroquad::shapes::draw_line(
        center.x,
        center.y,
        tip.x,
        tip.y,
        border_thickness,
        BLACK,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellcaster_core::ShellId;
    use shellcaster_rendering::{
        AimLinePresentation, AimPathPresentation, CasterPresentation, SceneObstacle, SceneShell,
    };

    fn sample_scene() -> Scene {
        Scene::new(
            CasterPresentation::new(
                Vec2::new(2.0, 1.0),
                0.0,
                1.0,
                0.5,
                Color::from_rgb_u8(200, 180, 60),
            ),
            vec![SceneObstacle::new(
                Vec2::new(5.0, -1.0),
                Vec2::new(6.0, 3.0),
                Color::from_rgb_u8(90, 90, 90),
            )],
            vec![SceneShell::new(
                ShellId::new(1),
                Vec2::new(3.0, 2.0),
                0.2,
                Color::from_rgb_u8(255, 80, 40),
            )],
            AimLinePresentation::new(Color::from_rgb_u8(255, 255, 255), 0.1)
                .expect("valid width"),
            AimPathPresentation::hidden(),
        )
    }

    #[test]
    fn camera_round_trips_world_positions() {
        let camera = Camera::centered_on(Vec2::new(2.0, 1.0), 960.0, 720.0, 12.0);
        let world = Vec2::new(-3.5, 7.25);

        let round_tripped = camera.to_world(camera.to_screen(world));

        assert!((round_tripped - world).length() < 1e-4);
    }

    #[test]
    fn camera_keeps_the_caster_at_screen_center() {
        let camera = Camera::centered_on(Vec2::new(10.0, -4.0), 800.0, 600.0, 8.0);

        let screen = camera.to_screen(Vec2::new(10.0, -4.0));

        assert_eq!(screen, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn camera_flips_the_vertical_axis() {
        let camera = Camera::centered_on(Vec2::ZERO, 800.0, 600.0, 10.0);

        let above = camera.to_screen(Vec2::new(0.0, 5.0));

        assert!(above.y < 300.0);
    }

    #[test]
    fn cursor_aim_is_measured_from_the_caster() {
        let scene = sample_scene();
        let camera = Camera::centered_on(scene.caster.position, 960.0, 720.0, 12.0);
        let cursor = camera.to_screen(scene.caster.position + Vec2::new(4.0, 3.0));

        let input = gather_frame_input_from_observations(
            &scene,
            &camera,
            cursor,
            KeyboardShortcuts::default(),
        );

        let aim = input.aim_vector.expect("cursor away from caster should aim");
        assert!((aim - Vec2::new(4.0, 3.0)).length() < 1e-3);
    }

    #[test]
    fn cursor_on_the_caster_yields_no_aim_vector() {
        let scene = sample_scene();
        let camera = Camera::centered_on(scene.caster.position, 960.0, 720.0, 12.0);
        let cursor = camera.to_screen(scene.caster.position);

        let input = gather_frame_input_from_observations(
            &scene,
            &camera,
            cursor,
            KeyboardShortcuts::default(),
        );

        assert!(input.aim_vector.is_none());
    }

    #[test]
    fn keyboard_cast_edges_pass_through_to_frame_input() {
        let scene = sample_scene();
        let camera = Camera::centered_on(scene.caster.position, 960.0, 720.0, 12.0);
        let keyboard = KeyboardShortcuts {
            cast_pressed: true,
            cast_released: false,
            move_axis: -1.0,
            ..KeyboardShortcuts::default()
        };

        let input =
            gather_frame_input_from_observations(&scene, &camera, Vec2::ZERO, keyboard);

        assert!(input.cast_pressed);
        assert!(!input.cast_released);
        assert_eq!(input.move_axis, -1.0);
    }
}
