//! Engine configuration (§6, §9 "Configuration"): a plain struct with
//! `Default` plus a small `with_*` builder surface, following this crate's
//! established `ScenarioParams` idiom (`crate::scenario::params`).
//!
//! Fields whose natural source is external data (`stations_source`,
//! `travel_time_tensor_source`, `bus_schedule_source`, ...) are retained as
//! opaque locators: the engine's initialization sequence reads from data the
//! caller already loaded however it sees fit, without this crate depending on
//! any particular ingest mechanism (CSV, JSON, a database — §1 non-goals).

use crate::optimizer::OptimizerBackend;

/// How a minibus fleet's starting stations are chosen (§6
/// `minibus_initial_locations`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinibusInitialLocations {
    /// One station id per minibus, in order, cycling if shorter than the fleet.
    Explicit(Vec<String>),
    /// Assigned uniformly at random from the station set using `random_seed`
    /// (§10 — the same seeded source the demo passenger generator uses).
    Random,
}

impl Default for MinibusInitialLocations {
    fn default() -> Self {
        MinibusInitialLocations::Random
    }
}

/// Where passengers come from at initialization (§6 `passenger_source_kind`).
/// Both variants are external collaborators (§1 non-goals); the engine only
/// needs to know which the caller intends to wire in before falling back to
/// the bundled seeded demo generator (§10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerSourceKind {
    OdMatrix,
    ExplicitList,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Simulation duration in seconds, derived by the caller from wall-clock
    /// `simulation_start_time`/`simulation_end_time` anchors (§6) — this core
    /// only ever works in simulation-relative seconds (§9 clock design note).
    pub duration_secs: u64,

    /// Opaque locator for station definitions; resolved by an external loader.
    pub stations_source: Option<String>,
    /// Opaque locator for the travel-time tensor.
    pub travel_time_tensor_source: Option<String>,
    /// Opaque locator for the travel-time tensor's slot/station metadata.
    pub travel_time_metadata_source: Option<String>,
    /// Opaque locator for the bus schedule
    /// (`bus_id, route_name, stop_sequence, station_id, arrival_time` rows).
    pub bus_schedule_source: Option<String>,

    pub bus_capacity: usize,

    pub enable_minibus: bool,
    pub num_minibuses: usize,
    pub minibus_capacity: usize,
    pub minibus_initial_locations: MinibusInitialLocations,

    pub optimizer_kind: OptimizerBackend,
    pub optimization_interval_secs: u64,

    pub max_waiting_time_secs: u64,
    /// Advisory only: accepted for configuration-surface completeness but not
    /// consulted by the greedy insertion backend (§4.5).
    pub max_detour_time_secs: u64,

    pub random_seed: u64,
    pub passenger_source_kind: PassengerSourceKind,

    /// Unused by the core; retained so a statistics collaborator has
    /// somewhere to read an output location from (§1 non-goals).
    pub output_dir: Option<String>,
    /// Ambient: verbosity for the engine's own structured logging (§9). This
    /// crate never installs a logger itself; this field is a hint for a
    /// bundled demo binary or the test suite to configure `env_logger` with.
    pub log_level: log::LevelFilter,
    /// Whether travel-time tensor validation failures abort at load time
    /// (`true`) or only log and continue (`false`, the default — §4.1).
    pub strict_tensor_validation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            duration_secs: 3600,
            stations_source: None,
            travel_time_tensor_source: None,
            travel_time_metadata_source: None,
            bus_schedule_source: None,
            bus_capacity: 50,
            enable_minibus: false,
            num_minibuses: 0,
            minibus_capacity: 6,
            minibus_initial_locations: MinibusInitialLocations::default(),
            optimizer_kind: OptimizerBackend::GreedyInsertion,
            optimization_interval_secs: 30,
            max_waiting_time_secs: 900,
            max_detour_time_secs: 600,
            random_seed: 42,
            passenger_source_kind: PassengerSourceKind::ExplicitList,
            output_dir: None,
            log_level: log::LevelFilter::Info,
            strict_tensor_validation: false,
        }
    }
}

impl EngineConfig {
    pub fn with_duration_secs(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    pub fn with_minibus_fleet(mut self, num_minibuses: usize, capacity: usize) -> Self {
        self.enable_minibus = num_minibuses > 0;
        self.num_minibuses = num_minibuses;
        self.minibus_capacity = capacity;
        self
    }

    pub fn with_minibus_initial_locations(mut self, locations: MinibusInitialLocations) -> Self {
        self.minibus_initial_locations = locations;
        self
    }

    pub fn with_optimizer_kind(mut self, kind: OptimizerBackend) -> Self {
        self.optimizer_kind = kind;
        self
    }

    pub fn with_optimization_interval_secs(mut self, interval: u64) -> Self {
        self.optimization_interval_secs = interval;
        self
    }

    pub fn with_max_waiting_time_secs(mut self, max_wait: u64) -> Self {
        self.max_waiting_time_secs = max_wait;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_strict_tensor_validation(mut self, strict: bool) -> Self {
        self.strict_tensor_validation = strict;
        self
    }
}
