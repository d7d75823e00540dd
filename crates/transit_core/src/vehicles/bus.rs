//! Fixed-route bus (C3a, §4.3): mechanically follows a predetermined route
//! and timetable. A bus never re-routes and never consults the optimizer —
//! it only alights, boards, and advances.

use bevy_ecs::prelude::{Component, Entity};

use crate::error::{Result, TransitError};
use crate::station::StationId;

#[derive(Debug, Clone, Component)]
pub struct Bus {
    pub id: String,
    route: Vec<StationId>,
    /// Scheduled arrival time (seconds) at `route[i]`, parallel to `route`.
    schedule: Vec<u64>,
    pub capacity: usize,
    current_route_index: usize,
    pub onboard: Vec<Entity>,
    pub total_passengers_served: u64,
}

impl Bus {
    pub fn new(
        id: impl Into<String>,
        route: Vec<StationId>,
        schedule: Vec<u64>,
        capacity: usize,
    ) -> Result<Self> {
        if route.is_empty() {
            return Err(TransitError::Configuration {
                message: "bus route cannot be empty".to_string(),
            });
        }
        if capacity == 0 {
            return Err(TransitError::Configuration {
                message: "bus capacity must be greater than 0".to_string(),
            });
        }
        if route.len() != schedule.len() {
            return Err(TransitError::Configuration {
                message: "bus schedule must have one entry per route stop".to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            route,
            schedule,
            capacity,
            current_route_index: 0,
            onboard: Vec::new(),
            total_passengers_served: 0,
        })
    }

    pub fn is_at_terminal(&self) -> bool {
        self.current_route_index >= self.route.len()
    }

    /// The next station the bus will stop at, and its scheduled arrival time.
    /// `None` once the bus has reached the end of its route.
    pub fn next_stop(&self) -> Option<(StationId, u64)> {
        if self.is_at_terminal() {
            None
        } else {
            Some((self.route[self.current_route_index], self.schedule[self.current_route_index]))
        }
    }

    pub fn is_full(&self) -> bool {
        self.onboard.len() >= self.capacity
    }

    pub fn occupancy(&self) -> usize {
        self.onboard.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.onboard.len()
    }

    /// Whether `destination` appears later on the route than the stop the
    /// bus is currently servicing — i.e. whether a passenger boarding now
    /// could ever alight there.
    pub fn is_destination_on_route(&self, destination: StationId) -> bool {
        self.route
            .iter()
            .position(|&s| s == destination)
            .map(|idx| idx > self.current_route_index)
            .unwrap_or(false)
    }

    pub fn can_board(&self, destination: StationId) -> bool {
        !self.is_full() && self.is_destination_on_route(destination)
    }

    /// Adds a passenger to the onboard list. Caller is responsible for
    /// driving the passenger's own state transition (§4.2); this only
    /// tracks the bus's manifest.
    pub fn board(&mut self, passenger: Entity) {
        self.onboard.push(passenger);
        self.total_passengers_served += 1;
    }

    /// Removes a passenger from the onboard list. Returns `false` if the
    /// passenger was not on this bus.
    pub fn alight(&mut self, passenger: Entity) -> bool {
        if let Some(pos) = self.onboard.iter().position(|&p| p == passenger) {
            self.onboard.remove(pos);
            true
        } else {
            false
        }
    }

    /// Advances past the stop just serviced. Call once alighting and
    /// boarding for the current stop are complete.
    pub fn advance(&mut self) {
        self.current_route_index += 1;
    }

    pub fn should_be_removed(&self) -> bool {
        self.is_at_terminal()
    }
}
