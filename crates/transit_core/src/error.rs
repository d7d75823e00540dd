//! Fatal error taxonomy for the simulation core.
//!
//! Only the categories the specification calls *fatal* — configuration,
//! data-integrity, and transition errors — are represented here. Recoverable
//! situations (a plan-invariant violation, a missing passenger at pickup, a
//! dropoff of a non-onboard passenger) are handled in place and reported
//! through `log`, never through this enum.

use thiserror::Error;

/// Fatal errors that signal a bug in upstream data or in the scheduler itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitError {
    #[error("unknown station id {station_id:?}")]
    UnknownStation { station_id: String },

    #[error("negative time queried: {time}")]
    NegativeTime { time: f64 },

    #[error(
        "illegal passenger transition for {passenger_id:?}: {from:?} -> {to:?} at t={at}"
    )]
    IllegalTransition {
        passenger_id: String,
        from: String,
        to: String,
        at: f64,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("event scheduled with negative time: {time}")]
    NegativeEventTime { time: f64 },
}

pub type Result<T> = std::result::Result<T, TransitError>;
