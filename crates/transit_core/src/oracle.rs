//! Travel-time oracle (C1): time-of-day–indexed station→station lookup.
//!
//! The oracle is a pure function of `(origin, dest, at_time)` over an
//! immutable tensor — it never mutates its own travel-time data. The LRU
//! cache is a memoization detail behind a [std::sync::Mutex]; correctness
//! never depends on it, only hot-loop throughput during the optimizer's
//! per-request search (§4.1, §4.5). Grounded in the same global-LRU-cache
//! shape this workspace used for geographic distance memoization, scoped
//! here to one cache per oracle instance since travel times (unlike
//! geometric distance) are scenario-specific data, not a universal constant.

use std::sync::Mutex;

use bevy_ecs::prelude::Resource;
use log::warn;
use lru::LruCache;

use crate::error::{Result, TransitError};
use crate::station::StationId;

const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A loaded, validated travel-time tensor plus its slotting metadata.
#[derive(Resource)]
pub struct TravelTimeOracle {
    num_stations: usize,
    num_slots: usize,
    slot_duration_secs: u64,
    /// Flattened `[origin * num_stations * num_slots + dest * num_slots + slot]`.
    data: Vec<f64>,
    cache: Mutex<LruCache<(u32, u32, u32), f64>>,
}

impl TravelTimeOracle {
    /// Build an oracle from a dense tensor. `data[o][d][s]` must be supplied
    /// flattened in that order. Does not validate; call [Self::validate] (or
    /// [Self::load] for the validate-then-construct convenience) separately
    /// so a caller can choose strict vs. logged-and-continue semantics.
    pub fn new(
        num_stations: usize,
        num_slots: usize,
        slot_duration_secs: u64,
        data: Vec<f64>,
    ) -> Self {
        assert_eq!(
            data.len(),
            num_stations * num_stations * num_slots,
            "travel-time tensor data does not match declared shape"
        );
        Self {
            num_stations,
            num_slots,
            slot_duration_secs,
            data,
            cache: Mutex::new(LruCache::new(
                std::num::NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap(),
            )),
        }
    }

    /// Construct and validate in one step. `strict` turns validation
    /// failures into a fatal [TransitError::Configuration]; otherwise
    /// failures are logged and the oracle is returned anyway (§4.1).
    pub fn load(
        num_stations: usize,
        num_slots: usize,
        slot_duration_secs: u64,
        data: Vec<f64>,
        strict: bool,
    ) -> Result<Self> {
        let oracle = Self::new(num_stations, num_slots, slot_duration_secs, data);
        let issues = oracle.validate();
        if !issues.is_empty() {
            if strict {
                return Err(TransitError::Configuration {
                    message: format!("travel-time tensor validation failed: {}", issues.join("; ")),
                });
            }
            for issue in &issues {
                warn!("travel-time tensor validation issue: {issue}");
            }
        }
        Ok(oracle)
    }

    fn index(&self, origin: StationId, dest: StationId, slot: usize) -> usize {
        (origin.0 as usize) * self.num_stations * self.num_slots
            + (dest.0 as usize) * self.num_slots
            + slot
    }

    /// Map a simulation time (seconds) to a slot index, clamped to the last
    /// slot when the query exceeds tensor coverage (§4.1 — a deliberate
    /// degraded-operation policy, not an error).
    pub fn time_to_slot(&self, at_time: u64) -> usize {
        if self.slot_duration_secs == 0 {
            return 0;
        }
        let slot = (at_time / self.slot_duration_secs) as usize;
        slot.min(self.num_slots.saturating_sub(1))
    }

    /// `travel_time(origin, dest, at_time) → seconds`. Same-station queries
    /// return 0 without touching the tensor or the cache.
    pub fn travel_time(&self, origin: StationId, dest: StationId, at_time: u64) -> f64 {
        if origin == dest {
            return 0.0;
        }
        let slot = self.time_to_slot(at_time);
        let key = (origin.0, dest.0, slot as u32);

        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return *cached;
        }

        let value = self.data[self.index(origin, dest, slot)];
        self.cache.lock().unwrap().put(key, value);
        value
    }

    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Validates diagonal-zero, non-negative, finite, and shape invariants
    /// (§4.1). Returns a list of human-readable issues; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.data.len() != self.num_stations * self.num_stations * self.num_slots {
            issues.push(format!(
                "tensor length {} does not match shape {}x{}x{}",
                self.data.len(),
                self.num_stations,
                self.num_stations,
                self.num_slots
            ));
            return issues;
        }

        for o in 0..self.num_stations {
            for d in 0..self.num_stations {
                for s in 0..self.num_slots {
                    let v = self.data[o * self.num_stations * self.num_slots + d * self.num_slots + s];
                    if !v.is_finite() {
                        issues.push(format!("non-finite entry at [{o},{d},{s}]"));
                    } else if v < 0.0 {
                        issues.push(format!("negative entry at [{o},{d},{s}]: {v}"));
                    } else if o == d && v != 0.0 {
                        issues.push(format!("non-zero diagonal at [{o},{o},{s}]: {v}"));
                    }
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_oracle(num_stations: usize, num_slots: usize, value: f64) -> TravelTimeOracle {
        let mut data = vec![value; num_stations * num_stations * num_slots];
        for o in 0..num_stations {
            for s in 0..num_slots {
                data[o * num_stations * num_slots + o * num_slots + s] = 0.0;
            }
        }
        TravelTimeOracle::new(num_stations, num_slots, 600, data)
    }

    #[test]
    fn same_station_is_always_zero() {
        let oracle = flat_oracle(3, 4, 450.0);
        assert_eq!(oracle.travel_time(StationId(1), StationId(1), 99999), 0.0);
    }

    #[test]
    fn out_of_range_time_clamps_to_last_slot() {
        let oracle = flat_oracle(3, 4, 450.0);
        assert_eq!(oracle.time_to_slot(0), 0);
        assert_eq!(oracle.time_to_slot(10_000_000), 3);
    }

    #[test]
    fn caching_does_not_change_the_result() {
        let oracle = flat_oracle(3, 4, 450.0);
        let first = oracle.travel_time(StationId(0), StationId(1), 2100);
        let second = oracle.travel_time(StationId(0), StationId(1), 2100);
        assert_eq!(first, second);
        assert_eq!(first, 450.0);
    }

    #[test]
    fn validate_flags_negative_and_nonzero_diagonal() {
        let mut data = vec![100.0_f64; 2 * 2 * 1];
        data[0] = 1.0; // diagonal [0,0,0] nonzero
        data[3] = -5.0; // [1,1,0] negative diagonal
        let oracle = TravelTimeOracle::new(2, 1, 600, data);
        let issues = oracle.validate();
        assert!(!issues.is_empty());
    }

    #[test]
    fn load_strict_mode_fails_fast_on_bad_tensor() {
        let mut data = vec![100.0_f64; 2 * 2 * 1];
        data[0] = 1.0;
        let result = TravelTimeOracle::load(2, 1, 600, data, true);
        assert!(result.is_err());
    }
}
