//! Diner-core - deadlock-prone dining tables with migration recovery
//!
//! This crate provides:
//! - Forks (exclusive resource slots) and tables arranged as rings
//! - Agents that think, eat and stall on their own tasks
//! - Per-table circular-wait detection
//! - Migration of one stalled agent per episode to the overflow table
//! - The controller that stops the run once the overflow table deadlocks

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod delay;
pub mod detector;
pub mod error;
pub mod events;
pub mod migration;
pub mod simulation;
pub mod slot;
pub mod table;
pub mod tasks;
pub mod termination;

pub use agent::{Agent, AgentExit, AgentId, AgentReport, AgentState};
pub use config::{load_config, PartialConfig, SimulationConfig};
pub use delay::{FixedDelay, RandomDelay, UniformDelay, ZeroDelay};
pub use error::{Error, Result};
pub use events::{Event, EventBus, EventKind};
pub use migration::{MigrationCoordinator, MigrationOutcome};
pub use simulation::{Simulation, Summary};
pub use slot::{ResourceSlot, SlotId};
pub use table::{Table, TableKind};
pub use termination::{StopReason, Termination};
