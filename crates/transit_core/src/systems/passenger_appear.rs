//! `PASSENGER_APPEAR` handler (§4.2, §4.6 step 4): materializes a pending
//! passenger appearance into a real `Passenger` entity, adds it to its
//! origin's waiting list, and makes it visible to the optimizer via the
//! pending pool.

use bevy_ecs::prelude::{Commands, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::engine::{PassengerIndex, PendingAppearances, PendingPool};
use crate::passenger::Passenger;
use crate::station::StationRegistry;

pub fn passenger_appear_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut appearances: ResMut<PendingAppearances>,
    mut passenger_index: ResMut<PassengerIndex>,
    mut stations: ResMut<StationRegistry>,
    mut pending: ResMut<PendingPool>,
    mut commands: Commands,
) {
    if event.0.kind != EventKind::PassengerAppear {
        return;
    }
    let Some(EventSubject::PassengerAppearRequest(handle)) = event.0.subject else {
        return;
    };
    let Some(spec) = appearances.take(handle) else {
        log::warn!("passenger appear event fired with no matching pending spec (handle {handle})");
        return;
    };
    if passenger_index.get(&spec.id).is_some() {
        log::warn!("passenger {} already materialized, ignoring duplicate appearance", spec.id);
        return;
    }

    let now = clock.now();
    let entity = commands
        .spawn(Passenger::new(spec.id.clone(), spec.origin, spec.destination, now, spec.max_wait))
        .id();

    passenger_index.insert(spec.id.clone(), entity);
    stations.add_waiting(spec.origin, entity);
    pending.push(spec.id);
}
