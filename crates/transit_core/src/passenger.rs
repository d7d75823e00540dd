//! Passenger lifecycle state machine (§3, §4.2).
//!
//! A passenger is an ECS entity carrying a single [Passenger] component. The
//! component never references a [crate::station::StationRegistry] or vehicle
//! back; it only records an `assigned_vehicle` handle, following the
//! arena-plus-index ownership model (§9): mutation happens through the
//! methods below, never by another entity reaching in directly.

use bevy_ecs::prelude::{Component, Entity};

use crate::error::{Result, TransitError};
use crate::station::StationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerStatus {
    Waiting,
    Assigned,
    Onboard,
    Arrived,
    Abandoned,
}

impl PassengerStatus {
    fn label(self) -> &'static str {
        match self {
            PassengerStatus::Waiting => "WAITING",
            PassengerStatus::Assigned => "ASSIGNED",
            PassengerStatus::Onboard => "ONBOARD",
            PassengerStatus::Arrived => "ARRIVED",
            PassengerStatus::Abandoned => "ABANDONED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PassengerStatus::Arrived | PassengerStatus::Abandoned)
    }
}

#[derive(Debug, Clone, Component)]
pub struct Passenger {
    pub id: String,
    pub origin: StationId,
    pub destination: StationId,
    pub appear_time: u64,
    pub max_wait: u64,
    pub status: PassengerStatus,
    pub assigned_vehicle: Option<Entity>,
    pub pickup_time: Option<u64>,
    pub arrival_time: Option<u64>,
}

impl Passenger {
    pub fn new(
        id: impl Into<String>,
        origin: StationId,
        destination: StationId,
        appear_time: u64,
        max_wait: u64,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            destination,
            appear_time,
            max_wait,
            status: PassengerStatus::Waiting,
            assigned_vehicle: None,
            pickup_time: None,
            arrival_time: None,
        }
    }

    fn illegal(&self, to: PassengerStatus, at: u64) -> TransitError {
        TransitError::IllegalTransition {
            passenger_id: self.id.clone(),
            from: self.status.label().to_string(),
            to: to.label().to_string(),
            at: at as f64,
        }
    }

    /// `WAITING → ASSIGNED`: the optimizer attaches a vehicle.
    pub fn assign(&mut self, vehicle: Entity, now: u64) -> Result<()> {
        if self.status != PassengerStatus::Waiting {
            return Err(self.illegal(PassengerStatus::Assigned, now));
        }
        self.status = PassengerStatus::Assigned;
        self.assigned_vehicle = Some(vehicle);
        Ok(())
    }

    /// `WAITING | ASSIGNED → ONBOARD`: a vehicle arrives and boards the passenger.
    pub fn board(&mut self, now: u64) -> Result<()> {
        if !matches!(
            self.status,
            PassengerStatus::Waiting | PassengerStatus::Assigned
        ) {
            return Err(self.illegal(PassengerStatus::Onboard, now));
        }
        if now < self.appear_time {
            return Err(self.illegal(PassengerStatus::Onboard, now));
        }
        self.status = PassengerStatus::Onboard;
        self.pickup_time = Some(now);
        Ok(())
    }

    /// `ONBOARD → ARRIVED`: the vehicle delivers the passenger to their destination.
    pub fn arrive(&mut self, now: u64) -> Result<()> {
        if self.status != PassengerStatus::Onboard {
            return Err(self.illegal(PassengerStatus::Arrived, now));
        }
        if let Some(pickup) = self.pickup_time {
            if now < pickup {
                return Err(self.illegal(PassengerStatus::Arrived, now));
            }
        }
        self.status = PassengerStatus::Arrived;
        self.arrival_time = Some(now);
        Ok(())
    }

    /// `WAITING | ASSIGNED → ABANDONED`: wait time exceeded the passenger's cap.
    pub fn abandon(&mut self, now: u64) -> Result<()> {
        if !matches!(
            self.status,
            PassengerStatus::Waiting | PassengerStatus::Assigned
        ) {
            return Err(self.illegal(PassengerStatus::Abandoned, now));
        }
        self.status = PassengerStatus::Abandoned;
        Ok(())
    }

    /// Whether this passenger's wait (measured from appearance) exceeds its cap.
    pub fn exceeded_wait(&self, now: u64) -> bool {
        now.saturating_sub(self.appear_time) > self.max_wait
    }

    pub fn wait_time(&self, now: u64) -> u64 {
        now.saturating_sub(self.appear_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger() -> Passenger {
        Passenger::new("P1", StationId(0), StationId(1), 0, 600)
    }

    #[test]
    fn happy_path_waiting_assigned_onboard_arrived() {
        let mut p = passenger();
        let vehicle = Entity::from_raw(7);
        p.assign(vehicle, 10).unwrap();
        assert_eq!(p.status, PassengerStatus::Assigned);
        assert_eq!(p.assigned_vehicle, Some(vehicle));

        p.board(20).unwrap();
        assert_eq!(p.status, PassengerStatus::Onboard);
        assert_eq!(p.pickup_time, Some(20));

        p.arrive(50).unwrap();
        assert_eq!(p.status, PassengerStatus::Arrived);
        assert_eq!(p.arrival_time, Some(50));
        assert!(p.status.is_terminal());
    }

    #[test]
    fn bus_boards_directly_from_waiting_without_assignment() {
        let mut p = passenger();
        p.board(5).unwrap();
        assert_eq!(p.status, PassengerStatus::Onboard);
        assert_eq!(p.assigned_vehicle, None);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut p = passenger();
        let err = p.arrive(10).unwrap_err();
        assert!(matches!(err, TransitError::IllegalTransition { .. }));
    }

    #[test]
    fn abandon_from_waiting_or_assigned_only() {
        let mut p = passenger();
        p.board(1).unwrap();
        assert!(p.abandon(2).is_err());

        let mut p2 = passenger();
        p2.abandon(5).unwrap();
        assert_eq!(p2.status, PassengerStatus::Abandoned);
        assert!(p2.status.is_terminal());
    }

    #[test]
    fn exceeded_wait_is_strictly_greater_than_cap() {
        let p = passenger();
        assert!(!p.exceeded_wait(600));
        assert!(p.exceeded_wait(601));
    }
}
