//! Error types for diner-core

use thiserror::Error;

use crate::{agent::AgentId, slot::SlotId};

/// Core error type for simulation operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Configuration values out of range or malformed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Filesystem errors while loading configuration
    #[error("IO error: {0}")]
    Io(String),

    /// TOML or value parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// A slot was released by an agent that does not hold it
    #[error("{caller} released {slot} but it is held by {}", describe_holder(.holder))]
    NotHolder {
        slot: SlotId,
        caller: AgentId,
        holder: Option<AgentId>,
    },

    /// The stop signal was observed while waiting
    #[error("Interrupted while waiting")]
    Interrupted,

    /// An agent task panicked or was aborted
    #[error("Agent task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Create a validation error from an invalid config
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// True when the error only means "stop was requested"
    #[must_use]
    pub const fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

fn describe_holder(holder: &Option<AgentId>) -> String {
    holder
        .as_ref()
        .map_or_else(|| "nobody".to_string(), ToString::to_string)
}

/// Result type alias for diner-core operations
pub type Result<T> = std::result::Result<T, Error>;
