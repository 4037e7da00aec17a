//! Configuration structure definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed parameters of one simulation run.
///
/// All timing fields are expressed in time units; `time_unit_ms` gives the
/// length of one unit. See `defaults.rs` for the documented defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of regular tables (the overflow table is added on top)
    pub table_count: usize,
    /// Seats and forks per table, overflow table included
    pub seats_per_table: usize,
    /// Upper bound (inclusive) of a think period
    pub think_max: u64,
    /// Upper bound (inclusive) of an eat period
    pub eat_max: u64,
    /// Pause between picking up the left fork and trying the right one
    pub settle_delay: u64,
    /// Retry interval of the right-fork poll and of the controller check
    pub poll_interval: u64,
    /// Length of one time unit in milliseconds
    pub time_unit_ms: u64,
    /// Seed for the delay generator; random when unset
    pub seed: Option<u64>,
    /// Stop with a timeout outcome after this many time units
    pub max_runtime: Option<u64>,
    /// How long stopped agents get to wind down before being aborted
    pub shutdown_grace_ms: u64,
}

/// A config layer where every key is optional.
///
/// Files and environment variables produce partial layers that are merged
/// on top of a complete [`SimulationConfig`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub table_count: Option<usize>,
    pub seats_per_table: Option<usize>,
    pub think_max: Option<u64>,
    pub eat_max: Option<u64>,
    pub settle_delay: Option<u64>,
    pub poll_interval: Option<u64>,
    pub time_unit_ms: Option<u64>,
    pub seed: Option<u64>,
    pub max_runtime: Option<u64>,
    pub shutdown_grace_ms: Option<u64>,
}

impl SimulationConfig {
    /// Length of one time unit
    #[must_use]
    pub const fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// Convert a count of time units into a duration
    #[must_use]
    pub fn units(&self, count: u64) -> Duration {
        Duration::from_millis(self.time_unit_ms.saturating_mul(count))
    }

    #[must_use]
    pub fn think_bound(&self) -> Duration {
        self.units(self.think_max)
    }

    #[must_use]
    pub fn eat_bound(&self) -> Duration {
        self.units(self.eat_max)
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        self.units(self.settle_delay)
    }

    #[must_use]
    pub fn poll(&self) -> Duration {
        self.units(self.poll_interval)
    }

    #[must_use]
    pub fn max_runtime_duration(&self) -> Option<Duration> {
        self.max_runtime.map(|units| self.units(units))
    }

    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Index of the overflow table
    #[must_use]
    pub const fn overflow_index(&self) -> usize {
        self.table_count
    }

    /// Agents created at startup
    #[must_use]
    pub const fn agent_count(&self) -> usize {
        self.table_count.saturating_mul(self.seats_per_table)
    }
}
