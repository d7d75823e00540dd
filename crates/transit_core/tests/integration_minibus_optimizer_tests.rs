//! End-to-end minibus / greedy-insertion-optimizer scenarios and the
//! route-plan safety net that backs "phantom dropoff is refused".

use transit_core::oracle::TravelTimeOracle;
use transit_core::optimizer::{OptimizerBackend, OptimizerSnapshot, PendingRequest, VehicleSnapshot};
use transit_core::route_plan::{validate, RoutePlan, Stop, StopAction};
use transit_core::station::StationId;
use transit_core::vehicles::Minibus;

fn s(id: u32) -> StationId {
    StationId(id)
}

fn rush_hour_oracle(num_stations: usize) -> TravelTimeOracle {
    // Two slots of one hour each; slot 0 is free-flow, slot 1 (rush hour,
    // covering t=28_800s) applies a 1.5x multiplier.
    let slot_duration = 3600;
    let num_slots = 9; // covers up to t=28_800 (slot 8) plus margin
    let mut data = vec![0.0_f64; num_stations * num_stations * num_slots];
    for o in 0..num_stations {
        for d in 0..num_stations {
            for slot in 0..num_slots {
                if o == d {
                    continue;
                }
                let base = 200.0;
                let multiplier = if slot == 28_800 / slot_duration { 1.5 } else { 1.0 };
                data[o * num_stations * num_slots + d * num_slots + slot] = base * multiplier;
            }
        }
    }
    TravelTimeOracle::new(num_stations, num_slots, slot_duration, data)
}

fn independent_round_trip_cost(oracle: &TravelTimeOracle, now: u64, legs: &[(StationId, StationId)]) -> f64 {
    legs.iter().map(|&(from, to)| oracle.travel_time(from, to, now)).sum()
}

/// Scenario 4: greedy insertion, time-dependent — a single minibus must
/// serve three requests more cheaply than three independent round trips,
/// while staying feasible.
#[test]
fn greedy_insertion_beats_independent_round_trips_at_rush_hour() {
    let oracle = rush_hour_oracle(4);
    let now = 28_800;
    let (a, b, c, d) = (s(0), s(1), s(2), s(3));

    let vehicle = VehicleSnapshot {
        minibus_id: "M1".to_string(),
        current_location: a,
        capacity: 4,
        onboard: vec![],
        current_plan: RoutePlan::empty(),
    };
    let snapshot = OptimizerSnapshot {
        current_time: now,
        pending: vec![
            PendingRequest { passenger_id: "P1".into(), origin: a, destination: d },
            PendingRequest { passenger_id: "P2".into(), origin: b, destination: c },
            PendingRequest { passenger_id: "P3".into(), origin: a, destination: c },
        ],
        vehicles: vec![vehicle],
    };

    let plans = OptimizerBackend::GreedyInsertion.optimize(&snapshot, &oracle);
    let plan = &plans["M1"];

    let issues = validate(plan, &[], 4);
    assert!(issues.is_empty(), "plan must be feasible: {issues:?}");

    let served: Vec<_> = plan.pickup_ids();
    assert!(served.contains(&"P1".to_string()));
    assert!(served.contains(&"P2".to_string()));
    assert!(served.contains(&"P3".to_string()));

    // Cumulative cost of executing the combined plan (legs within the plan).
    let mut combined_cost = 0.0;
    let mut arrival_time = now;
    for pair in plan.0.windows(2) {
        let travel = oracle.travel_time(pair[0].station, pair[1].station, arrival_time);
        combined_cost += travel;
        arrival_time += travel.round() as u64;
    }

    let independent_cost = independent_round_trip_cost(&oracle, now, &[(a, d), (b, c), (a, c)])
        + independent_round_trip_cost(&oracle, now, &[(d, a), (c, b), (c, a)]);

    assert!(
        combined_cost < independent_cost,
        "combined cost {combined_cost} should beat independent round trips {independent_cost}"
    );
}

/// Scenario 5: capacity enforcement during insertion — at most 2 of 3 new
/// requests are assigned when only one onboard seat is free, and the
/// returned plan never exceeds capacity or goes negative when executed.
#[test]
fn capacity_enforcement_during_insertion_caps_new_assignments() {
    let oracle = rush_hour_oracle(5);
    let (d_station, x1, x2, x3, e_station) = (s(0), s(1), s(2), s(3), s(4));

    let vehicle = VehicleSnapshot {
        minibus_id: "M1".to_string(),
        current_location: d_station,
        capacity: 3,
        onboard: vec!["Pe".to_string()],
        current_plan: RoutePlan(vec![Stop::new(e_station, StopAction::Dropoff, vec!["Pe".to_string()])]),
    };
    let snapshot = OptimizerSnapshot {
        current_time: 0,
        pending: vec![
            PendingRequest { passenger_id: "Q1".into(), origin: x1, destination: d_station },
            PendingRequest { passenger_id: "Q2".into(), origin: x2, destination: d_station },
            PendingRequest { passenger_id: "Q3".into(), origin: x3, destination: d_station },
        ],
        vehicles: vec![vehicle],
    };

    let plans = OptimizerBackend::GreedyInsertion.optimize(&snapshot, &oracle);
    let plan = &plans["M1"];

    let issues = validate(plan, &["Pe".to_string()], 3);
    assert!(issues.is_empty(), "plan must stay feasible: {issues:?}");

    let assigned = ["Q1", "Q2", "Q3"]
        .iter()
        .filter(|id| plan.pickup_ids().contains(&id.to_string()))
        .count();
    assert!(assigned <= 2, "at most 2 of 3 new requests should fit alongside Pe");

    // Re-simulate occupancy across the plan to confirm it never exceeds 3 or
    // goes negative, matching the capacity-feasibility check (§8).
    let mut occupancy: i64 = 1; // Pe already onboard
    for stop in &plan.0 {
        match stop.action {
            StopAction::Pickup => occupancy += stop.passenger_ids.len() as i64,
            StopAction::Dropoff => occupancy -= stop.passenger_ids.len() as i64,
        }
        assert!(occupancy >= 0 && occupancy <= 3);
    }
}

/// Scenario 6: phantom dropoff is refused at all three layers named in §8 —
/// optimizer output validation, `update_plan`, and `execute_dropoff`.
#[test]
fn phantom_dropoff_is_refused_at_every_layer() {
    let oracle = rush_hour_oracle(3);
    let bad_plan = RoutePlan(vec![Stop::new(s(1), StopAction::Dropoff, vec!["ghost".to_string()])]);

    // Layer 1: optimizer output validation (via route_plan::validate directly,
    // the same check `OptimizerBackend::optimize` runs on every produced plan).
    let issues = validate(&bad_plan, &[], 4);
    assert!(!issues.is_empty());

    // Layer 2: `update_plan` rejects the same plan when injected directly.
    let mut minibus = Minibus::new("M1", 4, s(0)).unwrap();
    let result = minibus.update_plan(bad_plan, 0, &oracle);
    assert!(result.is_err());

    // Layer 3: even if a dropoff for a never-onboard passenger somehow
    // reaches execution, `try_dropoff` refuses it and occupancy is unchanged.
    let occupancy_before = minibus.occupancy();
    assert!(!minibus.try_dropoff("ghost"));
    assert_eq!(minibus.occupancy(), occupancy_before);
}

/// Round-trip law: deconstructing a plan into occurrences and reconstructing
/// it (what the greedy optimizer does internally every call) yields a
/// semantically equivalent plan when there are no pending requests to merge in.
#[test]
fn optimizer_round_trip_preserves_a_plan_with_no_pending_requests() {
    let oracle = rush_hour_oracle(3);
    let plan = RoutePlan(vec![
        Stop::new(s(1), StopAction::Pickup, vec!["p1".to_string()]),
        Stop::new(s(2), StopAction::Dropoff, vec!["p1".to_string()]),
    ]);
    let vehicle = VehicleSnapshot {
        minibus_id: "M1".to_string(),
        current_location: s(0),
        capacity: 4,
        onboard: vec![],
        current_plan: plan.clone(),
    };
    let snapshot = OptimizerSnapshot {
        current_time: 0,
        pending: vec![],
        vehicles: vec![vehicle],
    };
    let out = OptimizerBackend::GreedyInsertion.optimize(&snapshot, &oracle);
    assert_eq!(out["M1"], plan);
}
