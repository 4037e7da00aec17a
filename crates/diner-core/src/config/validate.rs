//! Configuration validation

use super::types::SimulationConfig;
use crate::{Error, Result};

/// Think and eat bounds above this many units are almost certainly typos
pub const MAX_PHASE_UNITS: u64 = 3600;

impl SimulationConfig {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range
    pub fn validate(&self) -> Result<()> {
        if self.table_count == 0 {
            return Err(Error::invalid_config("table_count must be at least 1"));
        }

        // A one-seat ring would use the same fork as left and right
        if self.seats_per_table < 2 {
            return Err(Error::invalid_config("seats_per_table must be at least 2"));
        }

        if self.poll_interval == 0 {
            return Err(Error::invalid_config("poll_interval must be at least 1"));
        }

        if self.time_unit_ms == 0 {
            return Err(Error::invalid_config("time_unit_ms must be at least 1"));
        }

        if self.think_max > MAX_PHASE_UNITS || self.eat_max > MAX_PHASE_UNITS {
            return Err(Error::invalid_config(format!(
                "think_max and eat_max must be at most {MAX_PHASE_UNITS}"
            )));
        }

        if self.max_runtime == Some(0) {
            return Err(Error::invalid_config("max_runtime must be at least 1 when set"));
        }

        Ok(())
    }
}
