//! Flexibly-routed minibus (C3b, §4.4): executes whatever [RoutePlan] the
//! optimizer last gave it, stop by stop, with defensive checks at the point
//! of execution so an invalid plan can never produce negative occupancy.
//!
//! Unlike [crate::vehicles::bus::Bus], a minibus works entirely in passenger
//! *ids* rather than entities — this is the shape the optimizer contract
//! exchanges (§6), and it keeps this module free of any ECS dependency. The
//! system that drives arrivals (`crate::systems`) is responsible for
//! resolving ids to entities when it needs to mutate a `Passenger` component
//! or a station's waiting list.

use bevy_ecs::prelude::Component;

use crate::error::{Result, TransitError};
use crate::oracle::TravelTimeOracle;
use crate::route_plan::{self, RoutePlan, Stop, StopAction};
use crate::station::StationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinibusStatus {
    Idle,
    EnRoute,
    Serving,
}

/// Outcome of a pickup attempt at the current stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    Boarded,
    Full,
    AlreadyOnboard,
}

/// Whether `update_plan` replaced the live plan or left it untouched because
/// the remaining plan was already semantically equivalent (§4.4 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePlanOutcome {
    Applied,
    NoOp,
}

#[derive(Debug, Clone, Component)]
pub struct Minibus {
    pub id: String,
    pub capacity: usize,
    current_location: StationId,
    pub onboard: Vec<String>,
    route_plan: RoutePlan,
    status: MinibusStatus,
    next_station: Option<StationId>,
    next_arrival: Option<u64>,
    pub total_passengers_served: u64,
}

impl Minibus {
    pub fn new(id: impl Into<String>, capacity: usize, initial_location: StationId) -> Result<Self> {
        if capacity == 0 {
            return Err(TransitError::Configuration {
                message: "minibus capacity must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            capacity,
            current_location: initial_location,
            onboard: Vec::new(),
            route_plan: RoutePlan::empty(),
            status: MinibusStatus::Idle,
            next_station: None,
            next_arrival: None,
            total_passengers_served: 0,
        })
    }

    pub fn status(&self) -> MinibusStatus {
        self.status
    }

    pub fn current_location(&self) -> StationId {
        self.current_location
    }

    pub fn next_station(&self) -> Option<StationId> {
        self.next_station
    }

    pub fn next_arrival(&self) -> Option<u64> {
        self.next_arrival
    }

    pub fn is_idle(&self) -> bool {
        self.status == MinibusStatus::Idle
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

    /// The stop the minibus will execute on its next arrival, if any.
    pub fn current_stop(&self) -> Option<&Stop> {
        self.route_plan.head()
    }

    /// The full live plan, for the optimizer's per-tick snapshot (§4.5, §6).
    pub fn current_plan(&self) -> &RoutePlan {
        &self.route_plan
    }

    /// All ids with a pending assignment on this minibus: onboard plus
    /// anyone named in the route plan.
    pub fn assigned_passenger_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.onboard.clone();
        for stop in &self.route_plan.0 {
            for id in &stop.passenger_ids {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    /// Attempts to board one passenger at the current stop. Does not touch
    /// the station's waiting list or the passenger's own state — the caller
    /// (`crate::systems`) does that only when this returns [PickupOutcome::Boarded].
    pub fn try_pickup(&mut self, passenger_id: &str) -> PickupOutcome {
        if self.is_full() {
            return PickupOutcome::Full;
        }
        if self.onboard.iter().any(|id| id == passenger_id) {
            return PickupOutcome::AlreadyOnboard;
        }
        self.onboard.push(passenger_id.to_string());
        self.total_passengers_served += 1;
        PickupOutcome::Boarded
    }

    /// Attempts to drop off one passenger at the current stop. Returns
    /// `false` — the critical defensive check (§4.4 step 2) — if the
    /// passenger is not actually onboard; the caller must refuse the
    /// individual dropoff and log it rather than mutate any other state.
    pub fn try_dropoff(&mut self, passenger_id: &str) -> bool {
        if let Some(pos) = self.onboard.iter().position(|id| id == passenger_id) {
            self.onboard.remove(pos);
            true
        } else {
            false
        }
    }

    /// Pops the executed stop, moves `current_location` to it, and sets up
    /// the next leg: next station/arrival from the new head, or `IDLE` if
    /// the plan is now empty (§4.4 step 3).
    pub fn finish_stop(&mut self, at_station: StationId, now: u64, oracle: &TravelTimeOracle) {
        self.current_location = at_station;
        self.route_plan.pop_head();
        self.retarget(now, oracle);
    }

    fn retarget(&mut self, now: u64, oracle: &TravelTimeOracle) {
        match self.route_plan.head() {
            Some(stop) => {
                let travel = oracle.travel_time(self.current_location, stop.station, now);
                self.next_station = Some(stop.station);
                self.next_arrival = Some(now + travel.round() as u64);
                self.status = MinibusStatus::EnRoute;
            }
            None => {
                self.next_station = None;
                self.next_arrival = None;
                self.status = MinibusStatus::Idle;
            }
        }
    }

    /// Marks the vehicle as actively serving its current stop, between
    /// arrival and the pickup/dropoff execution completing.
    pub fn begin_serving(&mut self) {
        self.status = MinibusStatus::Serving;
    }

    /// Applies a freshly produced or directly-injected route plan (§4.4).
    /// Validates structurally and against live state first; an invalid plan
    /// is rejected outright (the caller is responsible for not shipping one —
    /// this mirrors the illegal-passenger-transition treatment of "scheduler
    /// bug, not data problem"). If the vehicle is `EN_ROUTE` and its
    /// remaining plan is already semantically equivalent to `new_plan`, the
    /// update is a no-op that preserves the current ETA.
    pub fn update_plan(
        &mut self,
        new_plan: RoutePlan,
        now: u64,
        oracle: &TravelTimeOracle,
    ) -> Result<UpdatePlanOutcome> {
        let issues = route_plan::validate(&new_plan, &self.onboard, self.capacity);
        if !issues.is_empty() {
            return Err(TransitError::Configuration {
                message: format!(
                    "route plan for {} violates invariants: {}",
                    self.id,
                    issues.join("; ")
                ),
            });
        }

        if self.status == MinibusStatus::EnRoute
            && route_plan::stops_equivalent(&self.route_plan.0, &new_plan.0)
        {
            return Ok(UpdatePlanOutcome::NoOp);
        }

        self.route_plan = new_plan;
        self.retarget(now, oracle);
        Ok(UpdatePlanOutcome::Applied)
    }
}
