//! `OPTIMIZE_CALL` handler (§4.5, §4.6 step 2): snapshots pending requests and
//! minibus state, runs the selected optimizer backend, applies the returned
//! plans, and assigns any newly-picked-up passengers to their vehicle.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::engine::{OptimizerState, PassengerIndex, PendingPool};
use crate::oracle::TravelTimeOracle;
use crate::optimizer::{OptimizerSnapshot, PendingRequest, VehicleSnapshot};
use crate::passenger::{Passenger, PassengerStatus};
use crate::vehicles::minibus::UpdatePlanOutcome;
use crate::vehicles::Minibus;

pub fn optimize_call_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    oracle: Res<TravelTimeOracle>,
    optimizer_state: Res<OptimizerState>,
    mut pending: ResMut<PendingPool>,
    passenger_index: Res<PassengerIndex>,
    mut minibuses: Query<(Entity, &mut Minibus)>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::OptimizeCall {
        return;
    }
    let now = clock.now();

    let pending_requests: Vec<PendingRequest> = pending
        .ids()
        .iter()
        .filter_map(|id| {
            let entity = passenger_index.get(id)?;
            let passenger = passengers.get(entity).ok()?;
            (passenger.status == PassengerStatus::Waiting).then(|| PendingRequest {
                passenger_id: id.clone(),
                origin: passenger.origin,
                destination: passenger.destination,
            })
        })
        .collect();

    let vehicles: Vec<VehicleSnapshot> = minibuses
        .iter()
        .map(|(_, minibus)| VehicleSnapshot {
            minibus_id: minibus.id.clone(),
            current_location: minibus.current_location(),
            capacity: minibus.capacity,
            onboard: minibus.onboard.clone(),
            current_plan: minibus.current_plan().clone(),
        })
        .collect();

    let snapshot = OptimizerSnapshot {
        current_time: now,
        pending: pending_requests,
        vehicles,
    };
    let plans = optimizer_state.backend.optimize(&snapshot, &oracle);

    let mut picked_up: Vec<(Entity, String)> = Vec::new();
    for (entity, mut minibus) in minibuses.iter_mut() {
        let Some(new_plan) = plans.get(&minibus.id) else {
            continue;
        };
        for passenger_id in new_plan.pickup_ids() {
            picked_up.push((entity, passenger_id));
        }

        match minibus.update_plan(new_plan.clone(), now, &oracle) {
            Ok(UpdatePlanOutcome::Applied) => {
                if let Some(next_arrival) = minibus.next_arrival() {
                    clock.schedule_at(
                        next_arrival,
                        EventKind::MinibusArrival,
                        Some(EventSubject::Minibus(entity)),
                    );
                }
            }
            Ok(UpdatePlanOutcome::NoOp) => {}
            Err(err) => {
                log::error!("optimizer produced a plan update_plan rejected for {}: {err}", minibus.id);
            }
        }
    }

    for (vehicle_entity, passenger_id) in picked_up {
        if let Some(passenger_entity) = passenger_index.get(&passenger_id) {
            if let Ok(mut passenger) = passengers.get_mut(passenger_entity) {
                if passenger.status == PassengerStatus::Waiting {
                    if let Err(err) = passenger.assign(vehicle_entity, now) {
                        log::error!("failed to assign passenger {passenger_id}: {err}");
                    }
                }
            }
        }
        pending.remove(&passenger_id);
    }

    if now + optimizer_state.interval_secs < optimizer_state.duration_secs {
        clock.schedule_at(now + optimizer_state.interval_secs, EventKind::OptimizeCall, None);
    }
}
