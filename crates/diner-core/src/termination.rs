//! Write-once stop flag shared by the controller and every agent
//!
//! Wraps a [`CancellationToken`] and remembers the first reason given and
//! when it was given. Later declarations still cancel but do not overwrite.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why the simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The overflow table is full and every member holds its left fork
    OverflowDeadlocked,
    /// The configured run cap elapsed first
    TimedOut,
    /// An external interrupt (Ctrl-C)
    Interrupted,
    /// An agent hit an invariant violation
    Fault,
}

impl StopReason {
    /// Process exit code for a run that ended this way
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::OverflowDeadlocked => 0,
            Self::TimedOut => 2,
            Self::Interrupted => 130,
            Self::Fault => 1,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverflowDeadlocked => write!(f, "overflow table deadlocked"),
            Self::TimedOut => write!(f, "run time cap reached"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Fault => write!(f, "agent fault"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Termination {
    token: CancellationToken,
    declared: Arc<OnceLock<(StopReason, Instant)>>,
}

impl Termination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag; returns true only for the first declaration
    pub fn declare(&self, reason: StopReason) -> bool {
        let first = self.declared.set((reason, Instant::now())).is_ok();
        self.token.cancel();
        first
    }

    #[must_use]
    pub fn is_declared(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn reason(&self) -> Option<StopReason> {
        self.declared.get().map(|(reason, _)| *reason)
    }

    #[must_use]
    pub fn declared_at(&self) -> Option<Instant> {
        self.declared.get().map(|(_, at)| *at)
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Resolves once any declaration has been made
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
