//! Snapshot types exchanged with the optimizer (§4.5, §6): read-only copies
//! of pending requests and vehicle state, never live ECS handles.

use crate::route_plan::RoutePlan;
use crate::station::StationId;

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub passenger_id: String,
    pub origin: StationId,
    pub destination: StationId,
}

#[derive(Debug, Clone)]
pub struct VehicleSnapshot {
    pub minibus_id: String,
    pub current_location: StationId,
    pub capacity: usize,
    pub onboard: Vec<String>,
    pub current_plan: RoutePlan,
}

#[derive(Debug, Clone)]
pub struct OptimizerSnapshot {
    pub current_time: u64,
    pub pending: Vec<PendingRequest>,
    pub vehicles: Vec<VehicleSnapshot>,
}
