//! Demo scenario construction: wires a runnable [World] together from a
//! small, explicit description of stations, travel times, bus routes, and a
//! minibus fleet — this crate's analogue of a `ScenarioParams` /
//! `build_scenario` pair, scoped down to the flat station-graph this engine
//! actually needs instead of a geospatial ride-hailing one.
//!
//! The real ingestion paths named by `EngineConfig`'s `*_source` fields
//! (§6 — CSV, a database, whatever a caller picks) are out of scope (§1);
//! this module is the in-memory stand-in a caller (or the demo binaries)
//! assembles data for directly.

use bevy_ecs::prelude::World;

use crate::demo::{self, DemoGeneratorConfig};
use crate::engine::{self, EngineConfig};
use crate::error::Result;
use crate::oracle::TravelTimeOracle;
use crate::station::StationRegistry;
use crate::vehicles::Bus;

/// A fixed bus route: station ids in visit order with a parallel arrival
/// schedule (§6 `bus_schedule_source`, already resolved by the caller).
#[derive(Debug, Clone)]
pub struct BusRouteSpec {
    pub id: String,
    pub stations: Vec<String>,
    pub arrival_times_secs: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub station_ids: Vec<String>,
    /// Flattened `[num_stations * num_stations * num_slots]` travel-time
    /// tensor. `None` falls back to a flat `travel_time_secs` for every
    /// off-diagonal origin/destination pair.
    pub travel_time_tensor: Option<Vec<f64>>,
    pub travel_time_secs: f64,
    pub num_slots: usize,
    pub slot_duration_secs: u64,
    pub bus_routes: Vec<BusRouteSpec>,
    /// Poisson rate for the seeded demo passenger generator (§10); 0 disables it.
    pub demo_passenger_rate_per_sec: f64,
    pub engine: EngineConfig,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            station_ids: Vec::new(),
            travel_time_tensor: None,
            travel_time_secs: 300.0,
            num_slots: 1,
            slot_duration_secs: 3600,
            bus_routes: Vec::new(),
            demo_passenger_rate_per_sec: 0.0,
            engine: EngineConfig::default(),
        }
    }
}

impl ScenarioParams {
    pub fn with_stations(mut self, station_ids: Vec<String>) -> Self {
        self.station_ids = station_ids;
        self
    }

    pub fn with_flat_travel_time(mut self, travel_time_secs: f64) -> Self {
        self.travel_time_secs = travel_time_secs;
        self
    }

    pub fn with_bus_routes(mut self, bus_routes: Vec<BusRouteSpec>) -> Self {
        self.bus_routes = bus_routes;
        self
    }

    pub fn with_demo_passenger_rate(mut self, rate_per_sec: f64) -> Self {
        self.demo_passenger_rate_per_sec = rate_per_sec;
        self
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Builds a complete runnable world: registers stations, loads the
/// travel-time oracle, runs engine initialization, spawns buses and the
/// minibus fleet, and (optionally) schedules the seeded demo passenger
/// stream. Individual bus-build failures are logged and skipped rather than
/// aborting the whole scenario (§4.3 — a malformed route is a data problem,
/// not grounds to refuse every other vehicle).
pub fn build_scenario(world: &mut World, params: ScenarioParams) {
    let mut registry = StationRegistry::default();
    for id in &params.station_ids {
        registry.register(id.clone());
    }
    let num_stations = registry.num_stations();
    world.insert_resource(registry);

    match build_oracle(&params, num_stations) {
        Ok(oracle) => world.insert_resource(oracle),
        Err(err) => {
            log::error!("scenario travel-time tensor invalid: {err}; building an empty oracle");
            world.insert_resource(TravelTimeOracle::new(num_stations.max(1), 1, 3600, vec![0.0]));
        }
    }

    engine::initialize(world, &params.engine);

    for route in &params.bus_routes {
        build_bus(world, route, &params.engine);
    }

    engine::spawn_minibus_fleet(world, &params.engine);

    if params.demo_passenger_rate_per_sec > 0.0 {
        let demo_config = DemoGeneratorConfig::from_engine_config(&params.engine, params.demo_passenger_rate_per_sec);
        demo::generate_and_schedule(world, &demo_config);
    }
}

fn build_oracle(params: &ScenarioParams, num_stations: usize) -> Result<TravelTimeOracle> {
    let num_slots = params.num_slots.max(1);
    let data = match &params.travel_time_tensor {
        Some(data) => data.clone(),
        None => flat_tensor(num_stations, num_slots, params.travel_time_secs),
    };
    TravelTimeOracle::load(
        num_stations,
        num_slots,
        params.slot_duration_secs,
        data,
        params.engine.strict_tensor_validation,
    )
}

fn flat_tensor(num_stations: usize, num_slots: usize, travel_time_secs: f64) -> Vec<f64> {
    let mut data = vec![travel_time_secs.max(0.0); num_stations * num_stations * num_slots];
    for o in 0..num_stations {
        for s in 0..num_slots {
            data[o * num_stations * num_slots + o * num_slots + s] = 0.0;
        }
    }
    data
}

fn build_bus(world: &mut World, route: &BusRouteSpec, config: &EngineConfig) {
    let stations: Result<Vec<_>> = route
        .stations
        .iter()
        .map(|id| world.resource::<StationRegistry>().resolve(id))
        .collect();
    let stations = match stations {
        Ok(stations) => stations,
        Err(err) => {
            log::error!("bus route {} references an unknown station: {err}", route.id);
            return;
        }
    };

    match Bus::new(route.id.clone(), stations, route.arrival_times_secs.clone(), config.bus_capacity) {
        Ok(bus) => {
            engine::spawn_bus(world, bus);
        }
        Err(err) => log::error!("failed to build bus {}: {err}", route.id),
    }
}
