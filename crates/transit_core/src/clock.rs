//! Simulation time: a whole-seconds timeline driven by a priority-queue of events.
//!
//! All timestamps and `clock.now()` are in **simulation seconds**, matching the
//! travel-time tensor's native time unit. The timeline advances by popping the
//! next scheduled event: ties on timestamp are broken by [EventKind] priority,
//! and remaining ties by a monotonic insertion sequence number so that a run
//! seeded identically is ordered identically regardless of heap internals.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

/// Event kinds, declared in their tie-break priority order (lower = earlier).
/// This mirrors the specification's explicit defaults: bus 0, minibus 1,
/// appear 2, optimize 3, end 10 — expressed here as declaration order rather
/// than magic numbers, since `derive(Ord)` on a fieldless enum orders variants
/// by declaration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    BusArrival,
    MinibusArrival,
    PassengerAppear,
    OptimizeCall,
    SimulationEnd,
}

/// What an event is about. [EventSubject::PassengerAppearRequest] carries a
/// small integer handle rather than the passenger payload itself — the
/// payload lives in the [crate::engine::PendingAppearances] resource so that
/// [Event] stays `Copy` and cheap to push onto the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Bus(Entity),
    Minibus(Entity),
    PassengerAppearRequest(u64),
}

/// A discrete simulation event. `timestamp` is in whole simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
    /// Monotonic insertion order, used only as the final tie-break key.
    pub seq: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse every key so the "smallest" event
        // (earliest time, then lowest priority, then lowest seq) pops first.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Simulation clock: time in whole seconds, advances to the next scheduled event.
#[derive(Debug, Clone, Resource)]
pub struct SimulationClock {
    now: u64,
    events: BinaryHeap<Event>,
    next_seq: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            now: 0,
            events: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl SimulationClock {
    /// Current simulation time in seconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule an event at an absolute simulation timestamp (seconds).
    pub fn schedule_at(&mut self, at: u64, kind: EventKind, subject: Option<EventSubject>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.schedule(Event {
            timestamp: at,
            kind,
            subject,
            seq,
        });
    }

    /// Schedule an event at `now + delta` seconds.
    pub fn schedule_in(&mut self, delta: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delta), kind, subject);
    }

    /// Push a fully-formed event. Prefer [Self::schedule_at] / [Self::schedule_in]
    /// so the sequence counter stays monotonic; exposed for test fixtures that
    /// need to construct an [Event] directly.
    pub fn schedule(&mut self, event: Event) {
        debug_assert!(
            event.timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        self.events.push(event);
    }

    /// Pop the next event (earliest timestamp; ties by priority then seq).
    /// Advances `now` to that event's timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Timestamp of the next scheduled event without popping it.
    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops every queued event. Called when `SIMULATION_END` pops (§4.6 step
    /// 5) so the run terminates even if other events were still scheduled.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events still in the queue (for tests and scenario validation).
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_then_priority_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(20, EventKind::PassengerAppear, None);
        clock.schedule_at(5, EventKind::PassengerAppear, None);
        clock.schedule_at(20, EventKind::BusArrival, None);
        clock.schedule_at(10, EventKind::PassengerAppear, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);

        // Same timestamp (20): BusArrival (priority 0) before PassengerAppear (priority 2).
        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(third.kind, EventKind::BusArrival);
        let fourth = clock.pop_next().expect("fourth event");
        assert_eq!(fourth.timestamp, 20);
        assert_eq!(fourth.kind, EventKind::PassengerAppear);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_time_and_priority_breaks_tie_by_sequence() {
        let mut clock = SimulationClock::default();
        // Two PassengerAppear events at the same time: insertion order must
        // be preserved via the monotonic seq, regardless of heap internals.
        clock.schedule_at(
            10,
            EventKind::PassengerAppear,
            Some(EventSubject::PassengerAppearRequest(1)),
        );
        clock.schedule_at(
            10,
            EventKind::PassengerAppear,
            Some(EventSubject::PassengerAppearRequest(2)),
        );

        let first = clock.pop_next().unwrap();
        let second = clock.pop_next().unwrap();
        assert_eq!(
            first.subject,
            Some(EventSubject::PassengerAppearRequest(1))
        );
        assert_eq!(
            second.subject,
            Some(EventSubject::PassengerAppearRequest(2))
        );
    }

    #[test]
    fn simulation_end_sorts_after_everything_at_same_time() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::SimulationEnd, None);
        clock.schedule_at(100, EventKind::OptimizeCall, None);
        clock.schedule_at(100, EventKind::MinibusArrival, None);

        assert_eq!(clock.pop_next().unwrap().kind, EventKind::MinibusArrival);
        assert_eq!(clock.pop_next().unwrap().kind, EventKind::OptimizeCall);
        assert_eq!(clock.pop_next().unwrap().kind, EventKind::SimulationEnd);
    }
}
