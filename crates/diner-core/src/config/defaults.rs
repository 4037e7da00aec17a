//! Default configuration values

use super::types::SimulationConfig;

pub const DEFAULT_TABLE_COUNT: usize = 5;
pub const DEFAULT_SEATS_PER_TABLE: usize = 5;
pub const DEFAULT_THINK_MAX: u64 = 10;
pub const DEFAULT_EAT_MAX: u64 = 5;
/// Pause after the left fork is taken; this is what makes circular wait likely
pub const DEFAULT_SETTLE_DELAY: u64 = 4;
pub const DEFAULT_POLL_INTERVAL: u64 = 2;
pub const DEFAULT_TIME_UNIT_MS: u64 = 1000;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 2000;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            table_count: DEFAULT_TABLE_COUNT,
            seats_per_table: DEFAULT_SEATS_PER_TABLE,
            think_max: DEFAULT_THINK_MAX,
            eat_max: DEFAULT_EAT_MAX,
            settle_delay: DEFAULT_SETTLE_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
            seed: None,
            max_runtime: None,
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}
