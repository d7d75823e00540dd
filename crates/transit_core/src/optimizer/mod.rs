//! Optimizer backends (C4, §4.5): a closed sum type so callers can match
//! exhaustively on which strategy assigns pending requests to minibuses.

mod greedy;
pub mod types;

use std::collections::HashMap;

use crate::oracle::TravelTimeOracle;
use crate::route_plan::{self, RoutePlan};

pub use types::{OptimizerSnapshot, PendingRequest, VehicleSnapshot};

/// The selectable optimizer backend. `External` is a placeholder so a
/// conforming core can still express the selection and reject it cleanly,
/// without implementing the out-of-process contract (§6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptimizerBackend {
    /// Returns every vehicle's current plan unchanged — a no-op pass,
    /// distinct from replacing it with an empty plan.
    None,
    #[default]
    GreedyInsertion,
    External,
}

impl OptimizerBackend {
    /// Runs this backend over a snapshot, then validates every produced plan
    /// against its vehicle's live state (§4.5 "Output validation"); any
    /// invalid plan is replaced with the empty plan and logged as an
    /// optimizer bug rather than propagated.
    pub fn optimize(&self, snapshot: &OptimizerSnapshot, oracle: &TravelTimeOracle) -> HashMap<String, RoutePlan> {
        let raw = match self {
            OptimizerBackend::None => snapshot
                .vehicles
                .iter()
                .map(|v| (v.minibus_id.clone(), v.current_plan.clone()))
                .collect(),
            OptimizerBackend::GreedyInsertion => greedy::optimize(snapshot, oracle),
            OptimizerBackend::External => {
                log::error!("External optimizer backend is not implemented by this core");
                HashMap::new()
            }
        };

        snapshot
            .vehicles
            .iter()
            .map(|vehicle| {
                let plan = raw.get(&vehicle.minibus_id).cloned().unwrap_or_default();
                let issues = route_plan::validate(&plan, &vehicle.onboard, vehicle.capacity);
                if issues.is_empty() {
                    (vehicle.minibus_id.clone(), plan)
                } else {
                    log::error!(
                        "optimizer produced an invalid plan for {}: {}; replacing with the empty plan",
                        vehicle.minibus_id,
                        issues.join("; ")
                    );
                    (vehicle.minibus_id.clone(), RoutePlan::empty())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_plan::{Stop, StopAction};
    use crate::station::StationId;

    fn flat_oracle(num_stations: usize) -> TravelTimeOracle {
        let mut data = vec![100.0_f64; num_stations * num_stations];
        for o in 0..num_stations {
            data[o * num_stations + o] = 0.0;
        }
        TravelTimeOracle::new(num_stations, 1, 3600, data)
    }

    #[test]
    fn none_backend_passes_plans_through_unchanged() {
        let oracle = flat_oracle(3);
        let plan = RoutePlan(vec![Stop::new(
            StationId(1),
            StopAction::Pickup,
            vec!["p1".to_string()],
        )]);
        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![],
            vehicles: vec![VehicleSnapshot {
                minibus_id: "M1".to_string(),
                current_location: StationId(0),
                capacity: 4,
                onboard: vec![],
                current_plan: plan.clone(),
            }],
        };
        let out = OptimizerBackend::None.optimize(&snapshot, &oracle);
        assert_eq!(out["M1"], plan);
    }

    #[test]
    fn invalid_plan_is_replaced_with_the_empty_plan() {
        let oracle = flat_oracle(3);
        // A hand-crafted invalid current plan: dropoff of a passenger never onboard.
        let bad_plan = RoutePlan(vec![Stop::new(
            StationId(1),
            StopAction::Dropoff,
            vec!["ghost".to_string()],
        )]);
        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![],
            vehicles: vec![VehicleSnapshot {
                minibus_id: "M1".to_string(),
                current_location: StationId(0),
                capacity: 4,
                onboard: vec![],
                current_plan: bad_plan,
            }],
        };
        let out = OptimizerBackend::None.optimize(&snapshot, &oracle);
        assert!(out["M1"].is_empty());
    }

    #[test]
    fn external_backend_logs_and_returns_empty_plans() {
        let oracle = flat_oracle(3);
        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![],
            vehicles: vec![VehicleSnapshot {
                minibus_id: "M1".to_string(),
                current_location: StationId(0),
                capacity: 4,
                onboard: vec![],
                current_plan: RoutePlan::empty(),
            }],
        };
        let out = OptimizerBackend::External.optimize(&snapshot, &oracle);
        assert!(out["M1"].is_empty());
    }
}
