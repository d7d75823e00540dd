//! Route plans: the data a minibus executes and the optimizer produces (§3).
//!
//! A [RoutePlan] is expressed entirely in passenger *ids* (not entities) —
//! this is the wire shape the optimizer contract (§6) exchanges with the
//! engine, and it is also what a minibus stores as its live plan. The engine
//! resolves ids to entities only at the point of actually boarding/alighting
//! (see `crate::vehicles::minibus`), keeping this module free of any ECS
//! dependency.

use std::collections::HashSet;

use crate::station::StationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAction {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub station: StationId,
    pub action: StopAction,
    pub passenger_ids: Vec<String>,
}

impl Stop {
    pub fn new(station: StationId, action: StopAction, passenger_ids: Vec<String>) -> Self {
        Self {
            station,
            action,
            passenger_ids,
        }
    }
}

/// Ordered sequence of stops a minibus will execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePlan(pub Vec<Stop>);

impl RoutePlan {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn head(&self) -> Option<&Stop> {
        self.0.first()
    }

    pub fn pop_head(&mut self) -> Option<Stop> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0))
        }
    }

    /// All passenger ids appearing in any PICKUP stop, in plan order.
    pub fn pickup_ids(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|s| s.action == StopAction::Pickup)
            .flat_map(|s| s.passenger_ids.iter().cloned())
            .collect()
    }
}

/// Validates the five route-plan invariants of §3 against a vehicle's live
/// onboard set and capacity. Returns a list of human-readable issues; an
/// empty list means the plan is valid. Used both by the optimizer's output
/// validation (C4) and by a minibus's `update_plan` (C3b) — the same rules
/// apply to a freshly produced plan and to one injected directly.
pub fn validate(plan: &RoutePlan, onboard: &[String], capacity: usize) -> Vec<String> {
    let mut issues = Vec::new();
    let mut seen_pickup: HashSet<&str> = HashSet::new();
    let mut seen_dropoff: HashSet<&str> = HashSet::new();

    for stop in &plan.0 {
        for id in &stop.passenger_ids {
            match stop.action {
                StopAction::Pickup => {
                    if !seen_pickup.insert(id.as_str()) {
                        issues.push(format!("passenger {id} appears in two PICKUP stops"));
                    }
                }
                StopAction::Dropoff => {
                    if !seen_dropoff.insert(id.as_str()) {
                        issues.push(format!("passenger {id} appears in two DROPOFF stops"));
                    }
                }
            }
        }
    }

    let onboard_set: HashSet<&str> = onboard.iter().map(String::as_str).collect();
    let mut picked_up: HashSet<&str> = HashSet::new();
    let mut occupancy: i64 = onboard.len() as i64;

    for stop in &plan.0 {
        match stop.action {
            StopAction::Dropoff => {
                for id in &stop.passenger_ids {
                    if !onboard_set.contains(id.as_str()) && !picked_up.contains(id.as_str()) {
                        issues.push(format!(
                            "passenger {id} is dropped off but was never onboard or picked up earlier"
                        ));
                    }
                    occupancy -= 1;
                }
            }
            StopAction::Pickup => {
                for id in &stop.passenger_ids {
                    if onboard_set.contains(id.as_str()) {
                        issues.push(format!("passenger {id} is picked up but already onboard"));
                    }
                    picked_up.insert(id.as_str());
                    occupancy += 1;
                }
            }
        }
        if occupancy < 0 {
            issues.push("occupancy goes negative while simulating the plan".to_string());
        }
        if occupancy > capacity as i64 {
            issues.push(format!(
                "occupancy {occupancy} exceeds capacity {capacity} while simulating the plan"
            ));
        }
    }

    issues
}

/// Whether two stop sequences are "semantically identical": same sequence of
/// (station, action) pairs, with passenger ids compared as unordered sets
/// rather than lists (§4.4 step 3).
pub fn stops_equivalent(a: &[Stop], b: &[Stop]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| {
        x.station == y.station
            && x.action == y.action
            && x.passenger_ids.iter().collect::<HashSet<_>>()
                == y.passenger_ids.iter().collect::<HashSet<_>>()
    })
}
