//! Layering of partial configs (immutable pattern)

use super::types::{PartialConfig, SimulationConfig};

impl SimulationConfig {
    /// Apply every key set in `layer`, returning the new config
    #[must_use]
    pub fn merge(self, layer: PartialConfig) -> Self {
        Self {
            table_count: layer.table_count.unwrap_or(self.table_count),
            seats_per_table: layer.seats_per_table.unwrap_or(self.seats_per_table),
            think_max: layer.think_max.unwrap_or(self.think_max),
            eat_max: layer.eat_max.unwrap_or(self.eat_max),
            settle_delay: layer.settle_delay.unwrap_or(self.settle_delay),
            poll_interval: layer.poll_interval.unwrap_or(self.poll_interval),
            time_unit_ms: layer.time_unit_ms.unwrap_or(self.time_unit_ms),
            seed: layer.seed.or(self.seed),
            max_runtime: layer.max_runtime.or(self.max_runtime),
            shutdown_grace_ms: layer.shutdown_grace_ms.unwrap_or(self.shutdown_grace_ms),
        }
    }
}

impl PartialConfig {
    /// Combine two layers; keys set in `over` win
    #[must_use]
    pub fn overlay(self, over: Self) -> Self {
        Self {
            table_count: over.table_count.or(self.table_count),
            seats_per_table: over.seats_per_table.or(self.seats_per_table),
            think_max: over.think_max.or(self.think_max),
            eat_max: over.eat_max.or(self.eat_max),
            settle_delay: over.settle_delay.or(self.settle_delay),
            poll_interval: over.poll_interval.or(self.poll_interval),
            time_unit_ms: over.time_unit_ms.or(self.time_unit_ms),
            seed: over.seed.or(self.seed),
            max_runtime: over.max_runtime.or(self.max_runtime),
            shutdown_grace_ms: over.shutdown_grace_ms.or(self.shutdown_grace_ms),
        }
    }
}
