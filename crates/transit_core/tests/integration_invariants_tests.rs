//! Quantified invariants that must hold throughout a mixed bus/minibus run
//! (§8): occupancy bounds, no double-presence, waiting-list consistency, and
//! passenger-count conservation.

use bevy_ecs::prelude::{Entity, World};

use transit_core::engine::{self, EngineConfig, PendingAppearance};
use transit_core::oracle::TravelTimeOracle;
use transit_core::passenger::{Passenger, PassengerStatus};
use transit_core::runner::{run_next_event, simulation_schedule};
use transit_core::station::{StationId, StationRegistry};
use transit_core::vehicles::{Bus, Minibus};

fn flat_oracle(num_stations: usize) -> TravelTimeOracle {
    let mut data = vec![150.0_f64; num_stations * num_stations];
    for o in 0..num_stations {
        data[o * num_stations + o] = 0.0;
    }
    TravelTimeOracle::new(num_stations, 1, 3600, data)
}

fn check_invariants(world: &mut World) {
    let mut onboard_everywhere: Vec<Entity> = Vec::new();

    let mut buses = world.query::<&Bus>();
    for bus in buses.iter(world) {
        assert!(bus.occupancy() <= bus.capacity, "bus {} over capacity", bus.id);
        onboard_everywhere.extend(bus.onboard.iter().copied());
    }

    let mut minibuses = world.query::<&Minibus>();
    for minibus in minibuses.iter(world) {
        assert!(minibus.occupancy() <= minibus.capacity, "minibus {} over capacity", minibus.id);
    }

    // No passenger entity appears onboard more than one bus simultaneously.
    let mut seen = std::collections::HashSet::new();
    for entity in &onboard_everywhere {
        assert!(seen.insert(*entity), "passenger onboard more than one vehicle");
    }

    let registry = world.resource::<StationRegistry>();
    let mut waiting_everywhere: Vec<Entity> = Vec::new();
    for station in registry.station_ids() {
        waiting_everywhere.extend(registry.waiting(station).iter().copied());
    }

    let mut counts = [0usize; 5];
    let mut total = 0usize;
    let mut passengers = world.query::<(Entity, &Passenger)>();
    for (entity, passenger) in passengers.iter(world) {
        total += 1;
        match passenger.status {
            PassengerStatus::Waiting => counts[0] += 1,
            PassengerStatus::Assigned => counts[1] += 1,
            PassengerStatus::Onboard => counts[2] += 1,
            PassengerStatus::Arrived => counts[3] += 1,
            PassengerStatus::Abandoned => counts[4] += 1,
        }

        let in_waiting = waiting_everywhere.contains(&entity);
        let in_onboard = onboard_everywhere.contains(&entity);
        assert!(!(in_waiting && in_onboard), "passenger in both a waiting list and onboard");

        if in_waiting {
            assert!(
                matches!(passenger.status, PassengerStatus::Waiting | PassengerStatus::Assigned),
                "waiting-list passenger has status {:?}",
                passenger.status
            );
        }
    }

    assert_eq!(counts.iter().sum::<usize>(), total, "status counts must partition all passengers");
}

#[test]
fn invariants_hold_after_every_event_in_a_mixed_run() {
    let config = EngineConfig::default()
        .with_duration_secs(2000)
        .with_minibus_fleet(2, 3)
        .with_optimization_interval_secs(200);

    let mut world = World::new();
    let mut registry = StationRegistry::default();
    for name in ["A", "B", "C", "D"] {
        registry.register(name);
    }
    world.insert_resource(registry);
    world.insert_resource(flat_oracle(4));
    engine::initialize(&mut world, &config);

    let (a, b, c, d) = (StationId(0), StationId(1), StationId(2), StationId(3));
    let bus = Bus::new("BUS_1", vec![a, b, c, d], vec![0, 300, 600, 900], 3).unwrap();
    engine::spawn_bus(&mut world, bus);
    engine::spawn_minibus_fleet(&mut world, &config);

    for (i, (origin, destination)) in [(a, c), (b, d), (c, a), (d, b), (a, d)].iter().enumerate() {
        let spec = PendingAppearance {
            id: format!("P{i}"),
            origin: *origin,
            destination: *destination,
            max_wait: 500,
        };
        engine::schedule_passenger_appearance(&mut world, spec, (i as u64) * 50);
    }

    let mut schedule = simulation_schedule();
    let mut steps = 0;
    while run_next_event(&mut world, &mut schedule) && steps < 5000 {
        check_invariants(&mut world);
        steps += 1;
    }
    check_invariants(&mut world);
    assert!(steps > 0);
}
