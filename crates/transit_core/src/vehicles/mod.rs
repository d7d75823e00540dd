//! Vehicle kinds (§3, §4.3, §4.4): fixed-route buses and flexibly-routed minibuses.

pub mod bus;
pub mod minibus;

pub use bus::Bus;
pub use minibus::{Minibus, MinibusStatus};
