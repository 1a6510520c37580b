#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Shellcaster experience.

mod config;

use anyhow::Result;
use clap::Parser;
use glam::Vec2 as GlamVec2;
use shellcaster_core::{Command, Energy, Event, Facing, Vec2, WorldPoint};
use shellcaster_rendering::{
    world_point_to_vec2, AimLinePresentation, AimPathPresentation, CasterPresentation, Color,
    FrameInput, Presentation, RenderingBackend, Scene, SceneObstacle, SceneShell,
};
use shellcaster_rendering_macroquad::MacroquadBackend;
use shellcaster_system_cast_control::{CastConfig, CastControl};
use shellcaster_world::{self as world, query, World};
use std::{path::PathBuf, time::Duration};

use crate::config::CliConfig;

const FIXED_TICK: Duration = Duration::from_nanos(16_666_667);
const CASTER_MOVE_SPEED: f32 = 20.0;

const CLEAR_COLOR: Color = Color::from_rgb_u8(18, 22, 30);
const CASTER_COLOR: Color = Color::from_rgb_u8(214, 181, 63);
const OBSTACLE_COLOR: Color = Color::from_rgb_u8(96, 96, 104);
const SHELL_COLOR: Color = Color::from_rgb_u8(240, 92, 48);
const AIM_LINE_COLOR: Color = Color::from_rgb_u8(235, 235, 245);

const CASTER_RADIUS: f32 = 1.0;
const SHELL_RADIUS: f32 = 0.4;
const AIM_LINE_WIDTH: f32 = 0.15;

/// Command-line options accepted by the Shellcaster binary.
#[derive(Debug, Parser)]
#[command(name = "shellcaster", about = "Ballistic shell casting playground")]
struct Args {
    /// Run a deterministic scripted session without opening a window.
    #[arg(long)]
    headless: bool,

    /// Number of fixed ticks simulated in headless mode.
    #[arg(long, default_value_t = 240)]
    ticks: u32,

    /// Path to a TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the average frame rate once per second in windowed mode.
    #[arg(long)]
    show_fps: bool,

    /// Disable vertical sync in windowed mode.
    #[arg(long)]
    no_vsync: bool,
}

/// Entry point for the Shellcaster command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    if args.headless {
        run_headless(&config, args.ticks);
        return Ok(());
    }

    run_windowed(config, args.show_fps, !args.no_vsync)
}

fn build_session(config: &CliConfig) -> (World, CastControl) {
    let mut world = World::with_starting_energy(Energy::new(config.starting_energy));
    for obstacle in &config.obstacles {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::AddObstacle {
                rect: obstacle.rect(),
                layers: obstacle.mask(),
            },
            &mut events,
        );
    }

    let control = CastControl::new(CastConfig {
        cast_energy_cost: Energy::new(config.cast_energy_cost),
        shells_start_speed: config.shells_start_speed,
        shell_kind: config.shell_kind,
        obstacle_mask: config.preview_mask(),
        sampling: config.sampling(),
    });

    (world, control)
}

/// Applies a command and pumps the event/command exchange until it settles,
/// returning every event observed along the way.
fn submit(world: &mut World, control: &mut CastControl, command: Command) -> Vec<Event> {
    let mut observed = Vec::new();
    let mut events = Vec::new();
    world::apply(world, command, &mut events);

    loop {
        if events.is_empty() {
            break;
        }
        observed.extend(events.iter().cloned());

        let energy = query::energy(world);
        let pose = query::caster_pose(world);
        let mut commands = Vec::new();
        control.handle(
            &events,
            energy,
            &pose,
            |from, to, mask| query::linecast(world, from, to, mask),
            &mut commands,
        );
        if commands.is_empty() {
            break;
        }

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }

    observed
}

fn run_headless(config: &CliConfig, ticks: u32) {
    let (mut world, mut control) = build_session(config);
    println!("{}", query::welcome_banner(&world));
    println!("energy: {}", query::energy(&world).get());

    let release_tick = ticks / 2;
    let _ = submit(
        &mut world,
        &mut control,
        Command::SetAimInput {
            vector: Vec2::new(1.0, 0.5),
        },
    );

    for tick in 0..ticks {
        if tick == 0 {
            let events = submit(&mut world, &mut control, Command::PressCast);
            report_events(&events);
            print_preview(&control);
        }
        if tick == release_tick {
            let events = submit(&mut world, &mut control, Command::ReleaseCast);
            report_events(&events);
        }

        let events = submit(&mut world, &mut control, Command::Tick { dt: FIXED_TICK });
        report_events(&events);
    }

    println!("energy remaining: {}", query::energy(&world).get());
}

fn print_preview(control: &CastControl) {
    let preview = control.preview();
    if !preview.visible() {
        return;
    }

    println!("aim preview ({} points):", preview.points().len());
    for point in preview.points() {
        println!("  ({:.2}, {:.2})", point.x, point.y);
    }
}

fn report_events(events: &[Event]) {
    for event in events {
        match event {
            Event::ShellPrepared { shell, origin, .. } => {
                println!(
                    "shell {} prepared at ({:.2}, {:.2})",
                    shell.get(),
                    origin.x,
                    origin.y
                );
            }
            Event::ShellLaunched { shell, velocity } => {
                println!(
                    "shell {} launched with velocity ({:.2}, {:.2})",
                    shell.get(),
                    velocity.x,
                    velocity.y
                );
            }
            Event::ShellImpacted { shell, point } => {
                println!(
                    "shell {} impacted at ({:.2}, {:.2})",
                    shell.get(),
                    point.x,
                    point.y
                );
            }
            _ => {}
        }
    }
}

fn run_windowed(config: CliConfig, show_fps: bool, vsync: bool) -> Result<()> {
    let (mut world, mut control) = build_session(&config);
    println!("{}", query::welcome_banner(&world));

    let aim_line = AimLinePresentation::new(AIM_LINE_COLOR, AIM_LINE_WIDTH)?;
    let mut scene = Scene::new(
        caster_presentation(&world),
        Vec::new(),
        Vec::new(),
        aim_line,
        AimPathPresentation::hidden(),
    );
    populate_scene(&world, &control, &mut scene);

    let presentation = Presentation::new("Shellcaster", CLEAR_COLOR, scene.clone());
    let backend = MacroquadBackend::new()
        .with_vsync(vsync)
        .with_show_fps(show_fps);

    let mut accumulator = Duration::ZERO;
    backend.run(presentation, move |frame_dt, input, scene| {
        handle_frame_input(&mut world, &mut control, &input, frame_dt);

        accumulator += frame_dt;
        while accumulator >= FIXED_TICK {
            accumulator -= FIXED_TICK;
            let _ = submit(&mut world, &mut control, Command::Tick { dt: FIXED_TICK });
        }

        populate_scene(&world, &control, scene);
    })
}

fn handle_frame_input(
    world: &mut World,
    control: &mut CastControl,
    input: &FrameInput,
    frame_dt: Duration,
) {
    if input.move_axis.abs() > f32::EPSILON {
        let pose = query::caster_pose(world);
        let step = input.move_axis * CASTER_MOVE_SPEED * frame_dt.as_secs_f32();
        let _ = submit(
            world,
            control,
            Command::SetCasterPose {
                position: WorldPoint::new(pose.position.x + step, pose.position.y),
                rotation: pose.rotation,
            },
        );
        let facing = if input.move_axis < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        let _ = submit(world, control, Command::SetFacing { facing });
    }

    if let Some(aim) = input.aim_vector {
        let _ = submit(
            world,
            control,
            Command::SetAimInput {
                vector: Vec2::new(aim.x, aim.y),
            },
        );
    }

    if input.cast_pressed {
        let _ = submit(world, control, Command::PressCast);
    }
    if input.cast_released {
        let _ = submit(world, control, Command::ReleaseCast);
    }
}

fn caster_presentation(world: &World) -> CasterPresentation {
    let pose = query::caster_pose(world);

    CasterPresentation::new(
        world_point_to_vec2(pose.position),
        pose.rotation,
        query::facing(world).sign(),
        CASTER_RADIUS,
        CASTER_COLOR,
    )
}

fn populate_scene(world: &World, control: &CastControl, scene: &mut Scene) {
    scene.caster = caster_presentation(world);

    scene.obstacles.clear();
    for rect in query::obstacle_rects(world) {
        scene.obstacles.push(SceneObstacle::new(
            world_point_to_vec2(rect.min()),
            world_point_to_vec2(rect.max()),
            OBSTACLE_COLOR,
        ));
    }

    scene.shells.clear();
    for shell in query::shell_view(world).iter() {
        scene.shells.push(SceneShell::new(
            shell.shell,
            world_point_to_vec2(shell.position),
            SHELL_RADIUS,
            SHELL_COLOR,
        ));
    }

    let preview = control.preview();
    scene.aim_path = if preview.visible() {
        let points = preview
            .points()
            .iter()
            .map(|point| GlamVec2::new(point.x, point.y))
            .collect::<Vec<GlamVec2>>();
        AimPathPresentation::visible(points)
    } else {
        AimPathPresentation::hidden()
    };
}
