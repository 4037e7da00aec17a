//! Event log of agent state transitions
//!
//! Every transition is published on a broadcast bus. Consumers render events
//! as text lines (`Display`) or JSON lines (`Serialize`). Publishing never
//! blocks; slow consumers lose the oldest events.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{sync::broadcast, time::Instant};

use crate::{agent::AgentId, termination::StopReason};

/// Default number of events buffered per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Thinking { duration_ms: u64 },
    Hungry,
    LeftAcquired,
    WaitingRight,
    Eating { duration_ms: u64 },
    ForksReleased,
    DeadlockDetected,
    Migrated { to: usize, seat: usize },
    MigrationRejected { to: usize },
    Terminated,
    GlobalDeadlock,
    Stopped { reason: StopReason },
}

/// An event in the simulation
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    /// Time since the bus was created
    pub elapsed_ms: u64,
    pub table: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    #[serde(flatten)]
    pub kind: EventKind,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn human(ms: u64) -> String {
    format!("{:.1?}", Duration::from_millis(ms))
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = self
            .agent
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let t = self.table;
        match &self.kind {
            EventKind::Thinking { duration_ms } => {
                write!(f, "{who} is thinking for {} at table {t}.", human(*duration_ms))
            }
            EventKind::Hungry => write!(f, "{who} is hungry and trying to pick up the left fork."),
            EventKind::LeftAcquired => write!(f, "{who} picked up the left fork."),
            EventKind::WaitingRight => write!(f, "{who} is trying to pick up the right fork."),
            EventKind::Eating { duration_ms } => write!(
                f,
                "{who} picked up the right fork and is eating for {}.",
                human(*duration_ms)
            ),
            EventKind::ForksReleased => write!(f, "{who} is putting down forks."),
            EventKind::DeadlockDetected => write!(f, "Deadlock at table {t}! Moving {who}."),
            EventKind::Migrated { to, seat } => {
                write!(f, "{who} moved from table {t} to table {to}, seat {seat}.")
            }
            EventKind::MigrationRejected { to } => write!(
                f,
                "{who} left table {t} but table {to} has no vacant seat; {who} stops."
            ),
            EventKind::Terminated => write!(f, "{who} has stopped."),
            EventKind::GlobalDeadlock => write!(f, "Overflow table {t} is deadlocked."),
            EventKind::Stopped { reason } => write!(f, "Simulation stopped: {reason}."),
        }
    }
}

/// Broadcast bus for [`Event`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    started: Instant,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            started: Instant::now(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, table: usize, agent: Option<&AgentId>, kind: EventKind) {
        let event = Event {
            timestamp: Utc::now(),
            elapsed_ms: millis(self.started.elapsed()),
            table,
            agent: agent.cloned(),
            kind,
        };
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub(crate) fn duration_ms(d: Duration) -> u64 {
        millis(d)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
