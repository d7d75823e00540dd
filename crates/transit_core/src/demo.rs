//! Seeded demo passenger generator (§10, supplemental — not a core module).
//!
//! §1 places the real passenger-demand collaborator (an OD-matrix-driven
//! Poisson process) out of scope. This is a small, explicitly non-canonical
//! stand-in so the engine is runnable end to end without wiring one in: a
//! seeded exponential inter-arrival process over a fixed window, with
//! origin/destination drawn uniformly at random (origin != destination).
//!
//! Sampling reseeds a fresh [StdRng] per draw from `(seed, count)` rather
//! than keeping mutable RNG state across calls — the same shape this
//! workspace already used for its inter-arrival sampling.

use bevy_ecs::prelude::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{schedule_passenger_appearance, EngineConfig, PendingAppearance};
use crate::station::StationRegistry;

#[derive(Debug, Clone)]
pub struct DemoGeneratorConfig {
    /// Poisson arrival rate, passengers per second.
    pub rate_per_sec: f64,
    pub window_secs: u64,
    pub max_wait_secs: u64,
    pub seed: u64,
}

impl DemoGeneratorConfig {
    pub fn from_engine_config(config: &EngineConfig, rate_per_sec: f64) -> Self {
        Self {
            rate_per_sec,
            window_secs: config.duration_secs,
            max_wait_secs: config.max_waiting_time_secs,
            seed: config.random_seed,
        }
    }
}

/// Samples the next inter-arrival gap (seconds), reseeding a fresh RNG per
/// draw so no mutable RNG state needs to be carried across calls.
fn sample_gap_secs(rate_per_sec: f64, seed: u64, count: u64) -> f64 {
    if rate_per_sec <= 0.0 {
        return f64::INFINITY;
    }
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(count));
    let u: f64 = rng.gen::<f64>().max(1e-12);
    -u.ln() / rate_per_sec
}

/// Schedules a `PASSENGER_APPEAR` event for every draw of a seeded Poisson
/// arrival process over `[0, window_secs)`. Needs at least 2 registered
/// stations. Returns the number of passengers scheduled.
pub fn generate_and_schedule(world: &mut World, config: &DemoGeneratorConfig) -> usize {
    let station_ids: Vec<_> = world.resource::<StationRegistry>().station_ids().collect();
    if station_ids.len() < 2 {
        log::warn!(
            "demo generator needs at least 2 stations, found {}; scheduling nothing",
            station_ids.len()
        );
        return 0;
    }

    let mut placement_rng = StdRng::seed_from_u64(config.seed ^ 0xD39A_53C5);
    let mut t = 0.0_f64;
    let mut draws = 0u64;
    let mut scheduled = 0usize;

    loop {
        let gap = sample_gap_secs(config.rate_per_sec, config.seed, draws);
        if !gap.is_finite() {
            break;
        }
        t += gap;
        draws += 1;
        if t >= config.window_secs as f64 {
            break;
        }

        let origin = station_ids[placement_rng.gen_range(0..station_ids.len())];
        let mut destination = station_ids[placement_rng.gen_range(0..station_ids.len())];
        while destination == origin {
            destination = station_ids[placement_rng.gen_range(0..station_ids.len())];
        }

        scheduled += 1;
        let spec = PendingAppearance {
            id: format!("DEMO_P{scheduled}"),
            origin,
            destination,
            max_wait: config.max_wait_secs,
        };
        schedule_passenger_appearance(world, spec, t.round() as u64);
    }

    log::info!(
        "demo generator scheduled {scheduled} passengers over a {}s window (rate={}/s)",
        config.window_secs,
        config.rate_per_sec,
    );
    scheduled
}
