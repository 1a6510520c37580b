use std::time::Duration;

use shellcaster_core::{
    Command, Energy, Event, Facing, LocalPoint, ObstacleMask, Vec2, WorldPoint, WorldRect,
};
use shellcaster_system_cast_control::{CastConfig, CastControl};
use shellcaster_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(16);

fn pump(world: &mut World, control: &mut CastControl, mut events: Vec<Event>) {
    loop {
        if events.is_empty() {
            break;
        }
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
}

fn submit(world: &mut World, control: &mut CastControl, command: Command) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    pump(world, control, events);
}

#[test]
fn charge_preview_and_fire_complete_a_full_cycle() {
    let mut world = World::with_starting_energy(Energy::new(15.0));
    let mut control = CastControl::new(CastConfig {
        cast_energy_cost: Energy::new(10.0),
        shells_start_speed: 10.0,
        ..CastConfig::default()
    });

    submit(
        &mut world,
        &mut control,
        Command::SetAimInput {
            vector: Vec2::new(1.0, 0.0),
        },
    );
    submit(&mut world, &mut control, Command::PressCast);

    // Preparing debits the pool down to five and starts the preview.
    assert_eq!(query::energy(&world), Energy::new(5.0));
    assert!(query::prepared_shell(&world).is_some());
    let preview = control.preview();
    assert!(preview.visible());
    assert_eq!(preview.points()[0], LocalPoint::ZERO);

    // Fifth sample: t = 5 * (5 / 10) = 2.5 seconds of flight.
    let fifth = preview.points()[5];
    assert!((fifth.x - 25.0).abs() < 1e-3);
    assert!((fifth.y - (-30.625)).abs() < 1e-3);

    submit(&mut world, &mut control, Command::ReleaseCast);

    assert!(query::prepared_shell(&world).is_none());
    assert!(!control.preview().visible());
    let shells = query::shell_view(&world).into_vec();
    assert_eq!(shells.len(), 1);
    assert!((shells[0].velocity.x - 10.0).abs() < 1e-5);
    assert!(shells[0].velocity.y.abs() < 1e-5);
}

#[test]
fn insufficient_energy_leaves_the_pool_and_slot_untouched() {
    let mut world = World::with_starting_energy(Energy::new(9.0));
    let mut control = CastControl::default();

    submit(&mut world, &mut control, Command::PressCast);

    assert_eq!(query::energy(&world), Energy::new(9.0));
    assert!(query::prepared_shell(&world).is_none());
    assert!(!control.preview().visible());
}

#[test]
fn zero_input_falls_back_to_the_facing_direction() {
    let mut world = World::new();
    let mut control = CastControl::default();

    submit(
        &mut world,
        &mut control,
        Command::SetFacing {
            facing: Facing::Left,
        },
    );
    submit(&mut world, &mut control, Command::PressCast);
    submit(&mut world, &mut control, Command::ReleaseCast);

    let shells = query::shell_view(&world).into_vec();
    assert_eq!(shells.len(), 1);
    assert!((shells[0].velocity.x - (-10.0)).abs() < 1e-5);
    assert!(shells[0].velocity.y.abs() < 1e-5);
}

#[test]
fn firing_frees_the_slot_for_the_next_cast() {
    let mut world = World::with_starting_energy(Energy::new(30.0));
    let mut control = CastControl::default();

    submit(&mut world, &mut control, Command::PressCast);
    submit(&mut world, &mut control, Command::ReleaseCast);
    submit(&mut world, &mut control, Command::PressCast);

    assert_eq!(query::energy(&world), Energy::new(10.0));
    assert!(query::prepared_shell(&world).is_some());
    assert!(control.preview().visible());
}

#[test]
fn preview_refreshes_every_tick_and_tracks_caster_movement() {
    let mut world = World::new();
    let mut control = CastControl::default();

    submit(&mut world, &mut control, Command::PressCast);
    let before = control.preview().points().to_vec();

    // The origin stays frozen while the caster walks away, so local-frame
    // samples shift by the movement delta; the first point never does.
    submit(
        &mut world,
        &mut control,
        Command::SetCasterPose {
            position: WorldPoint::new(4.0, 0.0),
            rotation: 0.0,
        },
    );
    submit(&mut world, &mut control, Command::Tick { dt: TICK });

    let after = control.preview().points();
    assert_eq!(after[0], LocalPoint::ZERO);
    assert!((after[1].x - (before[1].x - 4.0)).abs() < 1e-4);
}

#[test]
fn preview_stops_at_an_obstacle_on_the_configured_layer() {
    let mut world = World::new();
    let mut control = CastControl::new(CastConfig {
        obstacle_mask: ObstacleMask::from_bits(0b01),
        ..CastConfig::default()
    });

    submit(
        &mut world,
        &mut control,
        Command::AddObstacle {
            rect: WorldRect::from_corners(
                WorldPoint::new(12.0, -100.0),
                WorldPoint::new(13.0, 100.0),
            ),
            layers: ObstacleMask::from_bits(0b01),
        },
    );
    submit(
        &mut world,
        &mut control,
        Command::SetAimInput {
            vector: Vec2::new(1.0, 0.0),
        },
    );
    submit(&mut world, &mut control, Command::PressCast);

    let points = control.preview().points();
    let last = points.last().expect("non-empty preview");

    assert!(points.len() < 20, "polyline must truncate at the wall");
    assert!((last.x - 12.0).abs() < 1e-3);
}
