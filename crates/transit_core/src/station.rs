//! Station registry: interns station ids to dense indices and owns the
//! per-station waiting lists.
//!
//! Stations are created once at load time and never destroyed (§3), so unlike
//! passengers, buses, and minibuses they are not ECS entities — they live in
//! this single [Resource] as a flat `Vec` indexed by [StationId], the "flat
//! arena keyed by a stable id" the specification calls for. Waiting lists hold
//! [bevy_ecs::prelude::Entity] handles only, never passenger data, so no
//! entity holds a back-pointer into another's owned state.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};
use log::warn;

use crate::error::{Result, TransitError};

/// Dense index into the station registry / travel-time tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(pub u32);

struct Station {
    id: String,
    waiting: Vec<Entity>,
}

#[derive(Default, Resource)]
pub struct StationRegistry {
    stations: Vec<Station>,
    by_id: HashMap<String, StationId>,
}

impl StationRegistry {
    /// Intern a station id, assigning it the next dense index. Re-registering
    /// the same string id returns the existing [StationId] (idempotent).
    pub fn register(&mut self, id: impl Into<String>) -> StationId {
        let id = id.into();
        if let Some(existing) = self.by_id.get(&id) {
            return *existing;
        }
        let station_id = StationId(self.stations.len() as u32);
        self.by_id.insert(id.clone(), station_id);
        self.stations.push(Station {
            id,
            waiting: Vec::new(),
        });
        station_id
    }

    pub fn resolve(&self, id: &str) -> Result<StationId> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| TransitError::UnknownStation {
                station_id: id.to_string(),
            })
    }

    pub fn string_id(&self, station: StationId) -> &str {
        &self.stations[station.0 as usize].id
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn station_ids(&self) -> impl Iterator<Item = StationId> + '_ {
        (0..self.stations.len()).map(|i| StationId(i as u32))
    }

    /// Idempotent: re-adding a passenger already waiting at this station is a
    /// no-op with a warning (§4.2), not an error.
    pub fn add_waiting(&mut self, station: StationId, passenger: Entity) {
        let waiting = &mut self.stations[station.0 as usize].waiting;
        if waiting.contains(&passenger) {
            warn!(
                "passenger {:?} is already waiting at station {}",
                passenger,
                self.stations[station.0 as usize].id
            );
            return;
        }
        waiting.push(passenger);
    }

    /// Removes a passenger from the waiting list. Returns `true` if it was present.
    pub fn remove_waiting(&mut self, station: StationId, passenger: Entity) -> bool {
        let waiting = &mut self.stations[station.0 as usize].waiting;
        if let Some(pos) = waiting.iter().position(|&p| p == passenger) {
            waiting.remove(pos);
            true
        } else {
            false
        }
    }

    /// All waiting passengers at a station, in arrival order.
    pub fn waiting(&self, station: StationId) -> &[Entity] {
        &self.stations[station.0 as usize].waiting
    }

    pub fn waiting_count(&self, station: StationId) -> usize {
        self.stations[station.0 as usize].waiting.len()
    }

    /// Waiting passengers at `station` bound for `destination`, in arrival
    /// order (§4.2). This registry holds entity handles only, never passenger
    /// data (see module docs), so the caller supplies `destination_of` to
    /// resolve each entity's destination rather than this type depending on
    /// [crate::passenger::Passenger] directly.
    pub fn waiting_for_destination(
        &self,
        station: StationId,
        destination: StationId,
        destination_of: impl Fn(Entity) -> Option<StationId>,
    ) -> Vec<Entity> {
        self.waiting(station)
            .iter()
            .copied()
            .filter(|&passenger| destination_of(passenger) == Some(destination))
            .collect()
    }
}
