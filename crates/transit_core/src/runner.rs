//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each
//! step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. `SIMULATION_END` is special-cased
//! here rather than in a system: popping it drains the remaining queue so a
//! run terminates cleanly at the configured duration (§4.6 step 5).

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::systems::{
    bus_arrival::bus_arrival_system,
    minibus_arrival::minibus_arrival_system,
    optimize_call::optimize_call_system,
    passenger_appear::passenger_appear_system,
    timeout_sweep::timeout_sweep_system,
};

fn is_bus_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::BusArrival).unwrap_or(false)
}

fn is_minibus_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::MinibusArrival).unwrap_or(false)
}

fn is_passenger_appear(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::PassengerAppear).unwrap_or(false)
}

fn is_optimize_call(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::OptimizeCall).unwrap_or(false)
}

/// Runs one simulation step: pops the next event, inserts it as
/// [CurrentEvent], then runs the schedule. Returns `false` once the clock is
/// empty or the popped event was `SIMULATION_END`, which also clears any
/// events still queued (§4.6 step 5).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);

    if event.kind == EventKind::SimulationEnd {
        world.resource_mut::<SimulationClock>().clear();
        log::info!("simulation end reached at t={}s", event.timestamp);
        return false;
    }
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);

    if event.kind == EventKind::SimulationEnd {
        world.resource_mut::<SimulationClock>().clear();
        log::info!("simulation end reached at t={}s", event.timestamp);
        return false;
    }
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs simulation steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// Builds the default simulation schedule (§4.6): one conditioned system per
/// event kind, then [apply_deferred] so a passenger entity spawned by
/// `PASSENGER_APPEAR` is queryable, then the unconditional timeout sweep that
/// runs after every event regardless of kind.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        bus_arrival_system.run_if(is_bus_arrival),
        minibus_arrival_system.run_if(is_minibus_arrival),
        passenger_appear_system.run_if(is_passenger_appear),
        optimize_call_system.run_if(is_optimize_call),
        apply_deferred,
    ));

    schedule.add_systems(timeout_sweep_system);

    schedule
}
