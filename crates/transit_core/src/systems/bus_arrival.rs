//! `BUS_ARRIVAL` handler (§4.3, §4.6 step 2): runs a fixed-route bus's
//! alight/board protocol at the station it has just reached, then advances
//! its route index and schedules the next arrival, if any.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::engine::PendingPool;
use crate::passenger::{Passenger, PassengerStatus};
use crate::station::StationRegistry;
use crate::vehicles::Bus;

pub fn bus_arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut stations: ResMut<StationRegistry>,
    mut pending: ResMut<PendingPool>,
    mut buses: Query<&mut Bus>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::BusArrival {
        return;
    }
    let Some(EventSubject::Bus(bus_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut bus) = buses.get_mut(bus_entity) else {
        return;
    };

    let now = clock.now();
    let Some((station, _)) = bus.next_stop() else {
        return;
    };

    // 1. Alight every onboard passenger whose destination is this station.
    let alighting: Vec<_> = bus
        .onboard
        .iter()
        .copied()
        .filter(|&entity| {
            passengers
                .get(entity)
                .map(|p| p.destination == station)
                .unwrap_or(false)
        })
        .collect();
    for entity in alighting {
        if let Ok(mut passenger) = passengers.get_mut(entity) {
            if passenger.arrive(now).is_ok() {
                bus.alight(entity);
            } else {
                log::error!("bus {} could not deliver passenger {}", bus.id, passenger.id);
            }
        }
    }

    // 2. Board waiting passengers in arrival order until the bus is full,
    // skipping anyone whose destination isn't strictly ahead on the route.
    let waiting: Vec<_> = stations.waiting(station).to_vec();
    for entity in waiting {
        if bus.is_full() {
            break;
        }
        let Ok(mut passenger) = passengers.get_mut(entity) else {
            continue;
        };
        // A passenger the optimizer has ASSIGNED to a minibus is still on the
        // station's waiting list (only the pending pool and, later, the
        // minibus pickup remove it) but must not be boardable by a bus in
        // the meantime (§4.6).
        if passenger.status != PassengerStatus::Waiting {
            continue;
        }
        if !bus.can_board(passenger.destination) {
            continue;
        }
        if passenger.board(now).is_err() {
            continue;
        }
        bus.board(entity);
        stations.remove_waiting(station, entity);
        pending.remove(&passenger.id);
    }

    // 3. Advance past this stop and schedule the next one, if the route continues.
    bus.advance();
    if let Some((_, next_time)) = bus.next_stop() {
        clock.schedule_at(next_time, EventKind::BusArrival, Some(EventSubject::Bus(bus_entity)));
    } else {
        log::debug!(
            "bus {} reached its terminal, {} passengers served",
            bus.id,
            bus.total_passengers_served
        );
    }
}
