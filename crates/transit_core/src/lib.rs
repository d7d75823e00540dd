//! # Transit Fleet Simulation Core
//!
//! A discrete-event simulation engine for a mixed-mode urban transit fleet:
//! fixed-schedule buses running published routes alongside flexible-route
//! minibuses whose stops are re-planned on demand by a pluggable optimizer.
//!
//! ## Overview
//!
//! This crate provides the core simulation engine, including:
//!
//! - **Event Scheduling**: Second-precision discrete event system
//! - **ECS Framework**: Entity Component System for vehicle/passenger state
//! - **Travel-Time Oracle**: Time-of-day-aware station-to-station travel times
//! - **Route Planning**: Greedy insertion optimizer for minibus dispatch
//! - **Deterministic**: Seeded RNG ensures reproducible results
//!
//! ## Key Concepts
//!
//! - **Discrete Events**: All simulation progress happens through scheduled events
//! - **Targeted Events**: Events target specific entities (buses, minibuses) or
//!   opaque passenger-appearance handles
//! - **Deterministic**: Seeded RNG and a strict event-priority ordering make a
//!   run reproducible from its seed alone
//! - **Arena Ownership**: stations are a flat registry, never back-references;
//!   vehicles and passengers are ECS entities
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use transit_core::scenario::{build_scenario, ScenarioParams};
//! use transit_core::runner::{run_until_empty, simulation_schedule};
//!
//! let mut world = World::new();
//! build_scenario(&mut world, ScenarioParams::default().with_stations(vec!["A".into(), "B".into()]));
//!
//! let mut schedule = simulation_schedule();
//! let steps = run_until_empty(&mut world, &mut schedule, 1_000_000);
//! ```

pub mod clock;
pub mod demo;
pub mod engine;
pub mod error;
pub mod optimizer;
pub mod oracle;
pub mod passenger;
pub mod route_plan;
pub mod runner;
pub mod scenario;
pub mod station;
pub mod systems;
pub mod vehicles;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
