//! Per-request greedy best-fit insertion (§4.5).
//!
//! Each vehicle's current plan is deconstructed into an ordered list `r` of
//! *station occurrences* — not a station-keyed map, so a vehicle that
//! legitimately visits the same station twice (for two unrelated actions)
//! keeps two distinct tracker entries instead of merging them, which is the
//! bug the original station-keyed tracker in
//! `examples/original_source/optimizer/greedy_insertion.py` had. Each pending
//! request is tried against every vehicle's four insertion cases (both
//! stations reused, only one reused, neither reused); the cheapest feasible
//! candidate across all vehicles wins.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::oracle::TravelTimeOracle;
use crate::route_plan::{RoutePlan, Stop, StopAction};
use crate::station::StationId;

use super::types::{OptimizerSnapshot, PendingRequest, VehicleSnapshot};

#[derive(Debug, Clone)]
struct Occurrence {
    station: StationId,
    pickup: Vec<String>,
    dropoff: Vec<String>,
}

struct WorkingVehicle {
    minibus_id: String,
    current_location: StationId,
    capacity: usize,
    onboard: Vec<String>,
    r: Vec<Occurrence>,
}

impl WorkingVehicle {
    fn from_snapshot(snapshot: &VehicleSnapshot) -> Self {
        Self {
            minibus_id: snapshot.minibus_id.clone(),
            current_location: snapshot.current_location,
            capacity: snapshot.capacity,
            onboard: snapshot.onboard.clone(),
            r: plan_to_occurrences(&snapshot.current_plan),
        }
    }
}

/// Deconstructs a plan into occurrences, merging a PICKUP stop immediately
/// followed by a DROPOFF stop at the same station back into one occurrence —
/// the inverse of [occurrences_to_plan], which always emits them that way.
fn plan_to_occurrences(plan: &RoutePlan) -> Vec<Occurrence> {
    let mut r: Vec<Occurrence> = Vec::new();
    let mut open_pickup_station: Option<StationId> = None;

    for stop in &plan.0 {
        match stop.action {
            StopAction::Pickup => {
                r.push(Occurrence {
                    station: stop.station,
                    pickup: stop.passenger_ids.clone(),
                    dropoff: Vec::new(),
                });
                open_pickup_station = Some(stop.station);
            }
            StopAction::Dropoff => {
                if open_pickup_station == Some(stop.station) {
                    r.last_mut().unwrap().dropoff = stop.passenger_ids.clone();
                } else {
                    r.push(Occurrence {
                        station: stop.station,
                        pickup: Vec::new(),
                        dropoff: stop.passenger_ids.clone(),
                    });
                }
                open_pickup_station = None;
            }
        }
    }
    r
}

/// Reconstructs a plan from occurrences, PICKUP before DROPOFF at any
/// occurrence that has both (§4.5 output reconstruction).
fn occurrences_to_plan(r: &[Occurrence]) -> RoutePlan {
    let mut stops = Vec::new();
    for occurrence in r {
        if !occurrence.pickup.is_empty() {
            stops.push(Stop::new(
                occurrence.station,
                StopAction::Pickup,
                occurrence.pickup.clone(),
            ));
        }
        if !occurrence.dropoff.is_empty() {
            stops.push(Stop::new(
                occurrence.station,
                StopAction::Dropoff,
                occurrence.dropoff.clone(),
            ));
        }
    }
    RoutePlan(stops)
}

/// Walks the candidate occurrence list applying dropoff-before-pickup at
/// each stop; rejects on capacity overflow, negative occupancy, a dropoff of
/// a passenger not onboard/previously picked up, or a pickup of a passenger
/// already onboard.
fn capacity_feasible(vehicle: &WorkingVehicle, r: &[Occurrence]) -> bool {
    let mut onboard: HashSet<&str> = vehicle.onboard.iter().map(String::as_str).collect();
    let mut occupancy = onboard.len() as i64;

    for occurrence in r {
        for id in &occurrence.dropoff {
            if !onboard.remove(id.as_str()) {
                return false;
            }
            occupancy -= 1;
        }
        for id in &occurrence.pickup {
            if !onboard.insert(id.as_str()) {
                return false;
            }
            occupancy += 1;
        }
        if occupancy < 0 || occupancy > vehicle.capacity as i64 {
            return false;
        }
    }
    true
}

/// Cumulative time-dependent cost of a candidate: legs *within* `r` only
/// (§4.5 step 3) — the leg from the vehicle's current location to `r[0]` is
/// deliberately not charged, matching the original algorithm's cost model.
fn route_cost(r: &[Occurrence], oracle: &TravelTimeOracle, now: u64) -> f64 {
    if r.len() <= 1 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut arrival_time = now;
    for pair in r.windows(2) {
        let travel = oracle.travel_time(pair[0].station, pair[1].station, arrival_time);
        total += travel;
        arrival_time += travel.round() as u64;
    }
    total
}

/// Tries every candidate insertion of `request` into `vehicle`'s current
/// route, returning the minimum-cost feasible one, if any.
fn try_insert_request(
    vehicle: &WorkingVehicle,
    request: &PendingRequest,
    oracle: &TravelTimeOracle,
    now: u64,
) -> Option<(Vec<Occurrence>, f64)> {
    let pid = &request.passenger_id;
    let origin = request.origin;
    let destination = request.destination;

    let origin_positions: Vec<usize> = vehicle
        .r
        .iter()
        .enumerate()
        .filter(|(_, o)| o.station == origin)
        .map(|(i, _)| i)
        .collect();
    let dest_positions: Vec<usize> = vehicle
        .r
        .iter()
        .enumerate()
        .filter(|(_, o)| o.station == destination)
        .map(|(i, _)| i)
        .collect();

    let mut best: Option<(Vec<Occurrence>, f64)> = None;
    let mut consider = |candidate: Vec<Occurrence>| {
        if capacity_feasible(vehicle, &candidate) {
            let cost = route_cost(&candidate, oracle, now);
            if best.as_ref().map_or(true, |(_, best_cost)| cost < *best_cost) {
                best = Some((candidate, cost));
            }
        }
    };

    if !origin_positions.is_empty() && !dest_positions.is_empty() {
        // Case 1: both stations already occur in the route, origin before destination.
        for &o_pos in &origin_positions {
            for &d_pos in &dest_positions {
                if o_pos < d_pos {
                    let mut candidate = vehicle.r.clone();
                    candidate[o_pos].pickup.push(pid.clone());
                    candidate[d_pos].dropoff.push(pid.clone());
                    consider(candidate);
                }
            }
        }
    } else if !origin_positions.is_empty() {
        // Case 2: origin reused, destination inserted after it.
        for &o_pos in &origin_positions {
            for d_insert_pos in (o_pos + 1)..=vehicle.r.len() {
                let mut candidate = vehicle.r.clone();
                candidate[o_pos].pickup.push(pid.clone());
                candidate.insert(
                    d_insert_pos,
                    Occurrence {
                        station: destination,
                        pickup: Vec::new(),
                        dropoff: vec![pid.clone()],
                    },
                );
                consider(candidate);
            }
        }
    } else if !dest_positions.is_empty() {
        // Case 3: destination reused, origin inserted at or before it.
        for &d_pos in &dest_positions {
            for o_insert_pos in 0..=d_pos {
                let mut candidate = vehicle.r.clone();
                candidate.insert(
                    o_insert_pos,
                    Occurrence {
                        station: origin,
                        pickup: vec![pid.clone()],
                        dropoff: Vec::new(),
                    },
                );
                candidate[d_pos + 1].dropoff.push(pid.clone());
                consider(candidate);
            }
        }
    } else {
        // Case 4: neither station occurs; insert both.
        let len = vehicle.r.len();
        for i in 0..=len {
            for j in (i + 1)..=(len + 1) {
                let mut candidate = vehicle.r.clone();
                candidate.insert(
                    i,
                    Occurrence {
                        station: origin,
                        pickup: vec![pid.clone()],
                        dropoff: Vec::new(),
                    },
                );
                candidate.insert(
                    j,
                    Occurrence {
                        station: destination,
                        pickup: Vec::new(),
                        dropoff: vec![pid.clone()],
                    },
                );
                consider(candidate);
            }
        }
    }

    best
}

/// Runs the greedy insertion pass over every pending request, in order,
/// against every vehicle, committing each request to the cheapest feasible
/// vehicle found. Requests with no feasible vehicle are left pending and
/// logged (§4.5 step 5). Returns each vehicle's current plan unchanged when
/// there are no pending requests at all.
pub fn optimize(snapshot: &OptimizerSnapshot, oracle: &TravelTimeOracle) -> HashMap<String, RoutePlan> {
    if snapshot.pending.is_empty() {
        log::debug!("no pending requests, returning existing routes unchanged");
        return snapshot
            .vehicles
            .iter()
            .map(|v| (v.minibus_id.clone(), v.current_plan.clone()))
            .collect();
    }

    let mut vehicles: Vec<WorkingVehicle> =
        snapshot.vehicles.iter().map(WorkingVehicle::from_snapshot).collect();

    for request in &snapshot.pending {
        let mut best: Option<(usize, Vec<Occurrence>, f64)> = None;
        for (idx, vehicle) in vehicles.iter().enumerate() {
            if let Some((candidate, cost)) =
                try_insert_request(vehicle, request, oracle, snapshot.current_time)
            {
                if best.as_ref().map_or(true, |(_, _, best_cost)| cost < *best_cost) {
                    best = Some((idx, candidate, cost));
                }
            }
        }

        match best {
            Some((idx, candidate, cost)) => {
                log::debug!(
                    "assigned {} to {}, cost={:.2}",
                    request.passenger_id,
                    vehicles[idx].minibus_id,
                    cost
                );
                vehicles[idx].r = candidate;
            }
            None => {
                log::warn!(
                    "could not assign passenger {} to any vehicle",
                    request.passenger_id
                );
            }
        }
    }

    vehicles
        .iter()
        .map(|v| (v.minibus_id.clone(), occurrences_to_plan(&v.r)))
        .collect()
}
