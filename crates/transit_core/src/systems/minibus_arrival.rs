//! `MINIBUS_ARRIVAL` handler (§4.4, §4.6 step 2): executes the head stop of a
//! minibus's live route plan, then retargets to the new head.
//!
//! A popped event can be stale if an `OPTIMIZE_CALL` replaced the plan after
//! this event was scheduled but before it fired (§4.4 step 3 only suppresses
//! a *no-op* replacement's duplicate event, not every replan). Rather than
//! track event generations, this checks the live `next_arrival()` against the
//! event's own timestamp and silently drops the stale one — the same
//! check-liveness-at-execution shape used for a phantom dropoff.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::engine::{PassengerIndex, PendingPool};
use crate::oracle::TravelTimeOracle;
use crate::passenger::Passenger;
use crate::route_plan::StopAction;
use crate::station::StationRegistry;
use crate::vehicles::minibus::PickupOutcome;
use crate::vehicles::Minibus;

pub fn minibus_arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    oracle: Res<TravelTimeOracle>,
    mut stations: ResMut<StationRegistry>,
    mut pending: ResMut<PendingPool>,
    passenger_index: Res<PassengerIndex>,
    mut minibuses: Query<&mut Minibus>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::MinibusArrival {
        return;
    }
    let Some(EventSubject::Minibus(entity)) = event.0.subject else {
        return;
    };
    let Ok(mut minibus) = minibuses.get_mut(entity) else {
        return;
    };

    let now = clock.now();
    if minibus.next_arrival() != Some(now) {
        log::debug!(
            "stale minibus arrival event for {} ignored, plan changed since scheduling",
            minibus.id
        );
        return;
    }

    let Some(stop) = minibus.current_stop().cloned() else {
        return;
    };
    let station = stop.station;
    minibus.begin_serving();

    match stop.action {
        StopAction::Pickup => {
            for passenger_id in &stop.passenger_ids {
                if minibus.is_full() {
                    log::warn!(
                        "minibus {} is full, skipping pickup of {passenger_id}",
                        minibus.id
                    );
                    continue;
                }
                if minibus.onboard.contains(passenger_id) {
                    log::error!(
                        "minibus {}: optimizer scheduled pickup of already-onboard passenger {passenger_id}",
                        minibus.id
                    );
                    continue;
                }
                let Some(passenger_entity) = passenger_index.get(passenger_id) else {
                    log::warn!("pickup target {passenger_id} has no known passenger entity");
                    continue;
                };
                if !stations.waiting(station).contains(&passenger_entity) {
                    log::warn!(
                        "minibus {}: pickup target {passenger_id} is not waiting at the stop, skipping",
                        minibus.id
                    );
                    continue;
                }
                let Ok(mut passenger) = passengers.get_mut(passenger_entity) else {
                    continue;
                };
                if passenger.board(now).is_err() {
                    log::error!("minibus {}: passenger {passenger_id} rejected boarding", minibus.id);
                    continue;
                }
                match minibus.try_pickup(passenger_id) {
                    PickupOutcome::Boarded => {
                        stations.remove_waiting(station, passenger_entity);
                        pending.remove(passenger_id);
                    }
                    other => log::error!(
                        "minibus {}: unexpected pickup outcome {other:?} for {passenger_id} after gating checks",
                        minibus.id
                    ),
                }
            }
        }
        StopAction::Dropoff => {
            for passenger_id in &stop.passenger_ids {
                if !minibus.try_dropoff(passenger_id) {
                    log::error!(
                        "minibus {} refused to drop off non-onboard passenger {passenger_id}",
                        minibus.id
                    );
                    continue;
                }
                if let Some(passenger_entity) = passenger_index.get(passenger_id) {
                    if let Ok(mut passenger) = passengers.get_mut(passenger_entity) {
                        if passenger.arrive(now).is_err() {
                            log::error!(
                                "minibus {} delivered {passenger_id} in an unexpected state",
                                minibus.id
                            );
                        }
                    }
                }
            }
        }
    }

    minibus.finish_stop(station, now, &oracle);
    if let Some(next_time) = minibus.next_arrival() {
        clock.schedule_at(next_time, EventKind::MinibusArrival, Some(EventSubject::Minibus(entity)));
    }
}
