//! Simulation configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/diner/config.toml
//! 3. Project config: ./diner.toml
//! 4. Explicit config file (`--config`)
//! 5. Environment variables: DINER_*
//! 6. CLI flags
//!
//! # Example Config
//!
//! ```toml
//! table_count = 5
//! seats_per_table = 5
//! think_max = 10
//! eat_max = 5
//! settle_delay = 4
//! poll_interval = 2
//! time_unit_ms = 1000
//! seed = 42
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Layering partial configs
//! - `validate`: Validation

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{global_config_path, load_config, load_toml_file, project_config_path};
pub use types::{PartialConfig, SimulationConfig};
