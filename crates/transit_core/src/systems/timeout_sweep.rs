//! Passenger-timeout sweep (§4.2, §4.6 "After every event"): abandons any
//! still-`WAITING` passenger whose wait has exceeded its cap. Runs
//! unconditionally after every event, not gated to one `EventKind` — §9
//! calls this "small and O(pending pool size)", so running it every tick
//! rather than on a separate timer is the simplest faithful reading.
//!
//! An `ASSIGNED` passenger is not touched here (§4.2): once a vehicle has
//! committed to it, only a pickup or an explicit re-plan changes its status.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::SimulationClock;
use crate::engine::PendingPool;
use crate::passenger::{Passenger, PassengerStatus};
use crate::station::StationRegistry;

pub fn timeout_sweep_system(
    clock: Res<SimulationClock>,
    mut pending: ResMut<PendingPool>,
    mut stations: ResMut<StationRegistry>,
    passenger_index: Res<crate::engine::PassengerIndex>,
    mut passengers: Query<&mut Passenger>,
) {
    let now = clock.now();
    let ids: Vec<String> = pending.ids().to_vec();

    for id in ids {
        let Some(entity) = passenger_index.get(&id) else {
            continue;
        };
        let Ok(mut passenger) = passengers.get_mut(entity) else {
            continue;
        };
        if passenger.status != PassengerStatus::Waiting {
            continue;
        }
        if passenger.exceeded_wait(now) {
            if passenger.abandon(now).is_ok() {
                stations.remove_waiting(passenger.origin, entity);
                pending.remove(&id);
                log::debug!("passenger {id} abandoned after waiting past its cap");
            }
        }
    }
}
