//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across
//! the per-module `#[cfg(test)]` blocks: building a flat (time-independent)
//! travel-time oracle and a minimal world with the resources the engine
//! always needs.

use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::engine::{OptimizerState, PassengerIndex, PendingAppearances, PendingPool};
use crate::optimizer::OptimizerBackend;
use crate::oracle::TravelTimeOracle;
use crate::station::StationRegistry;

/// A travel-time oracle with a single time slot and the same travel time
/// between every distinct pair of stations (0 on the diagonal).
pub fn flat_oracle(num_stations: usize, travel_time_secs: f64) -> TravelTimeOracle {
    let mut data = vec![travel_time_secs; num_stations * num_stations];
    for o in 0..num_stations {
        data[o * num_stations + o] = 0.0;
    }
    TravelTimeOracle::new(num_stations, 1, 3600, data)
}

/// A registry with `count` stations named `S0`, `S1`, ...
pub fn station_registry(count: usize) -> StationRegistry {
    let mut registry = StationRegistry::default();
    for i in 0..count {
        registry.register(format!("S{i}"));
    }
    registry
}

/// A world with `count` flat-travel-time stations and the resources every
/// event-kind system expects to find, wired with a greedy-insertion
/// optimizer running every 30 seconds over a 3600-second horizon.
pub fn create_test_world(count: usize, travel_time_secs: f64) -> World {
    let mut world = World::new();
    world.insert_resource(station_registry(count));
    world.insert_resource(flat_oracle(count, travel_time_secs));
    world.insert_resource(SimulationClock::default());
    world.insert_resource(PendingAppearances::default());
    world.insert_resource(PassengerIndex::default());
    world.insert_resource(PendingPool::default());
    world.insert_resource(OptimizerState {
        backend: OptimizerBackend::GreedyInsertion,
        interval_secs: 30,
        duration_secs: 3600,
    });
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_oracle_has_zero_diagonal() {
        let oracle = flat_oracle(3, 120.0);
        assert_eq!(oracle.travel_time(crate::station::StationId(0), crate::station::StationId(0), 0), 0.0);
        assert_eq!(oracle.travel_time(crate::station::StationId(0), crate::station::StationId(1), 0), 120.0);
    }

    #[test]
    fn create_test_world_has_expected_station_count() {
        let world = create_test_world(3, 100.0);
        assert_eq!(world.resource::<StationRegistry>().num_stations(), 3);
    }
}
