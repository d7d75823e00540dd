//! Run a small mixed bus/minibus scenario and print the final summary.
//!
//! Run with: cargo run -p transit_core --example scenario_run

use bevy_ecs::prelude::World;
use transit_core::engine::{self, EngineConfig};
use transit_core::runner::{run_until_empty, simulation_schedule};
use transit_core::scenario::{BusRouteSpec, ScenarioParams};

fn main() {
    env_logger::init();

    const SIMULATION_HOURS: u64 = 2;

    let config = EngineConfig::default()
        .with_duration_secs(SIMULATION_HOURS * 3600)
        .with_bus_capacity(40)
        .with_minibus_fleet(4, 6)
        .with_optimization_interval_secs(60)
        .with_random_seed(123);

    let params = ScenarioParams::default()
        .with_stations(vec!["A".into(), "B".into(), "C".into(), "D".into(), "E".into()])
        .with_flat_travel_time(180.0)
        .with_bus_routes(vec![
            BusRouteSpec {
                id: "BUS_1".into(),
                stations: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                arrival_times_secs: vec![0, 300, 600, 900],
            },
            BusRouteSpec {
                id: "BUS_2".into(),
                stations: vec!["D".into(), "C".into(), "B".into(), "A".into()],
                arrival_times_secs: vec![0, 300, 600, 900],
            },
        ])
        .with_demo_passenger_rate(0.02)
        .with_engine_config(config);

    let mut world = World::new();
    transit_core::scenario::build_scenario(&mut world, params);

    let mut schedule = simulation_schedule();
    let max_steps = 2_000_000;
    let steps = run_until_empty(&mut world, &mut schedule, max_steps);
    let summary = engine::finalize(&mut world);

    println!("--- Scenario run ({SIMULATION_HOURS}h, seed 123) ---");
    println!("Steps executed: {steps}");
    println!(
        "Passengers: {} total, {} arrived, {} abandoned, {} waiting, {} onboard, {} assigned",
        summary.total_passengers,
        summary.arrived,
        summary.abandoned,
        summary.waiting,
        summary.onboard,
        summary.assigned,
    );

    println!("\nBus boardings:");
    for (id, served) in &summary.bus_served {
        println!("  {id}: {served}");
    }
    println!("\nMinibus boardings:");
    for (id, served) in &summary.minibus_served {
        println!("  {id}: {served}");
    }
}
