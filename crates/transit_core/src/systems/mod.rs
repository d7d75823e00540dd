//! ECS systems: event-driven logic that reacts to the current simulation
//! event (§4.6).
//!
//! Each event-kind system guards on `CurrentEvent` and returns immediately if
//! it doesn't match (see `crate::runner::simulation_schedule`, which also
//! conditions these with `.run_if`). [timeout_sweep] is the one exception:
//! it runs after every event, not gated to a single kind.

pub mod bus_arrival;
pub mod minibus_arrival;
pub mod optimize_call;
pub mod passenger_appear;
pub mod timeout_sweep;
