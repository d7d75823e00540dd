//! Large-scale scenario: a 30-station network, a dense bus timetable, and a
//! sizeable minibus fleet. Demonstrates throughput at scale.
//!
//! Run with: cargo run -p transit_core --example scenario_run_large --release

use std::time::Instant;

use bevy_ecs::prelude::World;
use transit_core::engine::{self, EngineConfig};
use transit_core::runner::{run_until_empty, simulation_schedule};
use transit_core::scenario::{BusRouteSpec, ScenarioParams};

fn main() {
    env_logger::init();

    const NUM_STATIONS: usize = 30;
    const NUM_MINIBUSES: usize = 40;
    const SIMULATION_HOURS: u64 = 6;

    println!("=== Large-Scale Scenario ({NUM_STATIONS} stations, {NUM_MINIBUSES} minibuses, {SIMULATION_HOURS}h) ===\n");

    let station_ids: Vec<String> = (0..NUM_STATIONS).map(|i| format!("S{i}")).collect();

    // Two long bus routes threading the station list end to end and back.
    let forward_route: Vec<String> = station_ids.clone();
    let forward_arrivals: Vec<u64> = (0..NUM_STATIONS as u64).map(|i| i * 240).collect();
    let mut backward_route = station_ids.clone();
    backward_route.reverse();
    let backward_arrivals = forward_arrivals.clone();

    let config = EngineConfig::default()
        .with_duration_secs(SIMULATION_HOURS * 3600)
        .with_bus_capacity(60)
        .with_minibus_fleet(NUM_MINIBUSES, 8)
        .with_optimization_interval_secs(45)
        .with_random_seed(42);

    let params = ScenarioParams::default()
        .with_stations(station_ids)
        .with_flat_travel_time(150.0)
        .with_bus_routes(vec![
            BusRouteSpec {
                id: "LOOP_FWD".into(),
                stations: forward_route,
                arrival_times_secs: forward_arrivals,
            },
            BusRouteSpec {
                id: "LOOP_BACK".into(),
                stations: backward_route,
                arrival_times_secs: backward_arrivals,
            },
        ])
        .with_demo_passenger_rate(0.3)
        .with_engine_config(config);

    let build_start = Instant::now();
    let mut world = World::new();
    transit_core::scenario::build_scenario(&mut world, params);
    let build_elapsed = build_start.elapsed();
    println!("Build time: {:.2}s", build_elapsed.as_secs_f64());

    let run_start = Instant::now();
    let mut schedule = simulation_schedule();
    let max_steps = 20_000_000;
    let steps = run_until_empty(&mut world, &mut schedule, max_steps);
    let run_elapsed = run_start.elapsed();

    let summary = engine::finalize(&mut world);

    println!("\n--- Simulation Results ---");
    println!("Steps executed:      {steps}");
    println!("Wall-clock time:     {:.2}s", run_elapsed.as_secs_f64());
    println!(
        "Events per second:   {:.0}",
        steps as f64 / run_elapsed.as_secs_f64().max(1e-9)
    );

    println!("\n--- Outcomes ---");
    println!("Total passengers:   {}", summary.total_passengers);
    println!("Arrived:            {}", summary.arrived);
    println!("Abandoned:          {}", summary.abandoned);
    println!("Still waiting:      {}", summary.waiting);
    println!("Onboard at cutoff:  {}", summary.onboard);
    println!("Assigned at cutoff: {}", summary.assigned);

    let total_bus_served: u64 = summary.bus_served.iter().map(|(_, n)| n).sum();
    let total_minibus_served: u64 = summary.minibus_served.iter().map(|(_, n)| n).sum();
    println!("\nTotal bus boardings:     {total_bus_served}");
    println!("Total minibus boardings: {total_minibus_served}");

    println!("\n=== Done ===");
}
