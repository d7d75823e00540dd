//! Simulation engine (C5, §4.6): owns initialization, the pending-request
//! pool, and the optimizer cadence — the glue between [crate::clock]'s event
//! queue and the per-component methods in [crate::vehicles], [crate::passenger],
//! and [crate::optimizer]. Event dispatch itself lives in `crate::systems`,
//! driven by `crate::runner`, matching how this crate already splits "what a
//! component does" from "what reacts to an event".

pub mod config;

pub use config::{EngineConfig, MinibusInitialLocations, PassengerSourceKind};

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::optimizer::OptimizerBackend;
use crate::passenger::PassengerStatus;
use crate::station::{StationId, StationRegistry};
use crate::vehicles::{Bus, Minibus};

/// A passenger appearance not yet materialized into an ECS entity. Kept out
/// of [crate::clock::Event] itself so `Event` stays `Copy`.
#[derive(Debug, Clone)]
pub struct PendingAppearance {
    pub id: String,
    pub origin: StationId,
    pub destination: StationId,
    pub max_wait: u64,
}

#[derive(Default, Resource)]
pub struct PendingAppearances {
    next_handle: u64,
    specs: HashMap<u64, PendingAppearance>,
}

impl PendingAppearances {
    pub fn push(&mut self, spec: PendingAppearance) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.specs.insert(handle, spec);
        handle
    }

    /// Consumes and returns the spec for `handle`. A handle is used exactly
    /// once, matching the event it was created for.
    pub fn take(&mut self, handle: u64) -> Option<PendingAppearance> {
        self.specs.remove(&handle)
    }
}

/// Maps passenger string ids — the optimizer's wire currency (§6) and a
/// minibus's own bookkeeping currency (§4.4) — to the ECS entity actually
/// carrying the `Passenger` component.
#[derive(Default, Resource)]
pub struct PassengerIndex {
    by_id: HashMap<String, Entity>,
}

impl PassengerIndex {
    pub fn insert(&mut self, id: impl Into<String>, entity: Entity) {
        self.by_id.insert(id.into(), entity);
    }

    pub fn get(&self, id: &str) -> Option<Entity> {
        self.by_id.get(id).copied()
    }
}

/// Passengers that are `WAITING` and not yet `ASSIGNED` to a minibus — the
/// optimizer's `pending_requests` input (§6). A bus boarding a passenger
/// directly and the optimizer tick assigning one both remove the id here.
#[derive(Debug, Default, Resource)]
pub struct PendingPool {
    ids: Vec<String>,
}

impl PendingPool {
    pub fn push(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| x == id) {
            self.ids.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Selects the optimizer backend and the `OPTIMIZE_CALL` cadence (§4.5, §6).
#[derive(Debug, Clone, Copy, Resource)]
pub struct OptimizerState {
    pub backend: OptimizerBackend,
    pub interval_secs: u64,
    /// Simulation duration, so `OPTIMIZE_CALL` can stop rescheduling itself
    /// once a next tick would land at or past `SIMULATION_END` (§4.6 step 5).
    pub duration_secs: u64,
}

/// Final counts reported at `SIMULATION_END` (§7 "user-visible behavior").
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_passengers: usize,
    pub arrived: usize,
    pub abandoned: usize,
    pub waiting: usize,
    pub onboard: usize,
    pub assigned: usize,
    pub bus_served: Vec<(String, u64)>,
    pub minibus_served: Vec<(String, u64)>,
}

/// Inserts the engine-owned resources a fresh world needs before any event is
/// processed, and schedules `SIMULATION_END` (§4.6 step 5). Bus/minibus first
/// arrivals and passenger appearances are scheduled as each is spawned; this
/// only sets up the resources and the terminal event.
pub fn initialize(world: &mut World, config: &EngineConfig) {
    world.insert_resource(SimulationClock::default());
    world.insert_resource(PendingAppearances::default());
    world.insert_resource(PassengerIndex::default());
    world.insert_resource(PendingPool::default());
    world.insert_resource(OptimizerState {
        backend: config.optimizer_kind,
        interval_secs: config.optimization_interval_secs,
        duration_secs: config.duration_secs,
    });

    world
        .resource_mut::<SimulationClock>()
        .schedule_at(config.duration_secs, EventKind::SimulationEnd, None);

    if config.enable_minibus {
        world.resource_mut::<SimulationClock>().schedule_at(
            config.optimization_interval_secs,
            EventKind::OptimizeCall,
            None,
        );
    }

    log::info!(
        "engine initialized: duration={}s, bus_capacity={}, minibus_enabled={}",
        config.duration_secs,
        config.bus_capacity,
        config.enable_minibus,
    );
}

/// Spawns one bus entity and schedules its first arrival event (§4.6 step 2).
/// The bus is assumed already built (route/schedule/capacity validated by
/// [crate::vehicles::bus::Bus::new]) from an externally ingested schedule.
pub fn spawn_bus(world: &mut World, bus: Bus) -> Entity {
    let first_stop = bus.next_stop();
    let id = bus.id.clone();
    let entity = world.spawn(bus).id();
    match first_stop {
        Some((_station, scheduled_time)) => {
            world.resource_mut::<SimulationClock>().schedule_at(
                scheduled_time,
                EventKind::BusArrival,
                Some(EventSubject::Bus(entity)),
            );
        }
        None => log::warn!("bus {id} has an empty route and will never move"),
    }
    entity
}

/// Spawns the minibus fleet (§4.6 step 3). Initial locations come either from
/// an explicit per-minibus list or are drawn uniformly at random from the
/// station set using `config.random_seed` (§10 — the same seeded source the
/// demo passenger generator uses, so one seed reproduces a whole run). A
/// freshly spawned minibus starts `IDLE` with an empty plan, so unlike a bus
/// it gets no initial arrival event — its first move comes from the first
/// `OPTIMIZE_CALL`.
pub fn spawn_minibus_fleet(world: &mut World, config: &EngineConfig) -> Vec<Entity> {
    if !config.enable_minibus || config.num_minibuses == 0 {
        return Vec::new();
    }

    let station_ids: Vec<StationId> = world.resource::<StationRegistry>().station_ids().collect();
    if station_ids.is_empty() {
        log::error!("cannot place minibuses: station registry is empty");
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut entities = Vec::with_capacity(config.num_minibuses);

    for i in 0..config.num_minibuses {
        let location = match &config.minibus_initial_locations {
            MinibusInitialLocations::Explicit(ids) if !ids.is_empty() => {
                let raw = &ids[i % ids.len()];
                match world.resource::<StationRegistry>().resolve(raw) {
                    Ok(station) => station,
                    Err(_) => {
                        log::warn!(
                            "initial location {raw:?} for minibus {} not found, placing randomly",
                            i + 1
                        );
                        station_ids[rng.gen_range(0..station_ids.len())]
                    }
                }
            }
            _ => station_ids[rng.gen_range(0..station_ids.len())],
        };

        let id = format!("MINIBUS_{}", i + 1);
        match Minibus::new(id.clone(), config.minibus_capacity, location) {
            Ok(minibus) => entities.push(world.spawn(minibus).id()),
            Err(err) => log::error!("failed to create minibus {id}: {err}"),
        }
    }

    log::info!("spawned {} minibuses", entities.len());
    entities
}

/// Registers a passenger's appearance for a future `PASSENGER_APPEAR` event
/// (§4.6 step 4). The passenger is not yet an entity; the
/// `passenger_appear_system` materializes it when the event fires.
pub fn schedule_passenger_appearance(world: &mut World, spec: PendingAppearance, appear_time: u64) {
    let handle = world.resource_mut::<PendingAppearances>().push(spec);
    world.resource_mut::<SimulationClock>().schedule_at(
        appear_time,
        EventKind::PassengerAppear,
        Some(EventSubject::PassengerAppearRequest(handle)),
    );
}

/// Tallies final passenger/vehicle counts at `SIMULATION_END` (§7).
pub fn finalize(world: &mut World) -> RunSummary {
    let mut summary = RunSummary::default();

    let mut passengers = world.query::<&crate::passenger::Passenger>();
    for passenger in passengers.iter(world) {
        summary.total_passengers += 1;
        match passenger.status {
            PassengerStatus::Arrived => summary.arrived += 1,
            PassengerStatus::Abandoned => summary.abandoned += 1,
            PassengerStatus::Waiting => summary.waiting += 1,
            PassengerStatus::Onboard => summary.onboard += 1,
            PassengerStatus::Assigned => summary.assigned += 1,
        }
    }

    let mut buses = world.query::<&Bus>();
    for bus in buses.iter(world) {
        summary.bus_served.push((bus.id.clone(), bus.total_passengers_served));
    }

    let mut minibuses = world.query::<&Minibus>();
    for minibus in minibuses.iter(world) {
        summary
            .minibus_served
            .push((minibus.id.clone(), minibus.total_passengers_served));
    }

    log::info!(
        "simulation summary: {} total, {} arrived, {} abandoned, {} waiting, {} onboard, {} assigned",
        summary.total_passengers,
        summary.arrived,
        summary.abandoned,
        summary.waiting,
        summary.onboard,
        summary.assigned,
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::TravelTimeOracle;

    fn flat_oracle(num_stations: usize) -> TravelTimeOracle {
        let mut data = vec![100.0_f64; num_stations * num_stations];
        for o in 0..num_stations {
            data[o * num_stations + o] = 0.0;
        }
        TravelTimeOracle::new(num_stations, 1, 3600, data)
    }

    fn world_with_stations(n: usize) -> World {
        let mut world = World::new();
        let mut registry = StationRegistry::default();
        for i in 0..n {
            registry.register(format!("S{i}"));
        }
        world.insert_resource(registry);
        world.insert_resource(flat_oracle(n));
        world
    }

    #[test]
    fn initialize_schedules_simulation_end_and_first_optimize_call() {
        let mut world = world_with_stations(3);
        let config = EngineConfig::default()
            .with_duration_secs(1000)
            .with_minibus_fleet(2, 4)
            .with_optimization_interval_secs(30);
        initialize(&mut world, &config);

        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.pending_event_count(), 2);
    }

    #[test]
    fn initialize_without_minibus_only_schedules_simulation_end() {
        let mut world = world_with_stations(3);
        let config = EngineConfig::default().with_duration_secs(500);
        initialize(&mut world, &config);

        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.pending_event_count(), 1);
    }

    #[test]
    fn minibu_fleet_is_placed_on_real_stations() {
        let mut world = world_with_stations(3);
        let config = EngineConfig::default().with_minibus_fleet(5, 4);
        world.insert_resource(SimulationClock::default());
        let entities = spawn_minibus_fleet(&mut world, &config);
        assert_eq!(entities.len(), 5);
        for entity in entities {
            let minibus = world.get::<Minibus>(entity).unwrap();
            assert!(minibus.is_idle());
            assert!(minibus.current_stop().is_none());
        }
    }

    #[test]
    fn explicit_initial_locations_are_honored() {
        let mut world = world_with_stations(3);
        let config = EngineConfig::default()
            .with_minibus_fleet(2, 4)
            .with_minibus_initial_locations(MinibusInitialLocations::Explicit(vec![
                "S1".to_string(),
                "S2".to_string(),
            ]));
        world.insert_resource(SimulationClock::default());
        let entities = spawn_minibus_fleet(&mut world, &config);
        let s1 = world.resource::<StationRegistry>().resolve("S1").unwrap();
        let s2 = world.resource::<StationRegistry>().resolve("S2").unwrap();
        assert_eq!(world.get::<Minibus>(entities[0]).unwrap().current_location(), s1);
        assert_eq!(world.get::<Minibus>(entities[1]).unwrap().current_location(), s2);
    }

    #[test]
    fn spawn_bus_schedules_its_first_arrival() {
        let mut world = world_with_stations(3);
        world.insert_resource(SimulationClock::default());
        let bus = Bus::new(
            "BUS_1",
            vec![StationId(0), StationId(1)],
            vec![0, 300],
            10,
        )
        .unwrap();
        spawn_bus(&mut world, bus);
        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.pending_event_count(), 1);
    }
}
