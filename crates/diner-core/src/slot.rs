//! Resource slots (forks)
//!
//! A slot is an exclusive resource with a blocking, cancellable acquire and
//! a non-blocking try-acquire. The holder is tracked so that a release by
//! anyone else is reported as an invariant violation.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::{agent::AgentId, Error, Result};

/// Identity of a slot: owning table and position in its ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId {
    pub table: usize,
    pub index: usize,
}

impl SlotId {
    #[must_use]
    pub const fn new(table: usize, index: usize) -> Self {
        Self { table, index }
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fork {} at table {}", self.index, self.table)
    }
}

/// A mutually exclusive resource shared by two neighbouring seats
#[derive(Debug)]
pub struct ResourceSlot {
    id: SlotId,
    holder: Mutex<Option<AgentId>>,
    released: Notify,
}

impl ResourceSlot {
    #[must_use]
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            holder: Mutex::new(None),
            released: Notify::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SlotId {
        self.id
    }

    /// Take the slot if it is free; never waits
    pub fn try_acquire(&self, agent: &AgentId) -> bool {
        let mut holder = self.lock_holder();
        if holder.is_some() {
            return false;
        }
        *holder = Some(agent.clone());
        true
    }

    /// Wait until the slot is free, then take it
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] if `cancel` fires first; the slot is
    /// not taken in that case.
    pub async fn acquire(&self, agent: &AgentId, cancel: &CancellationToken) -> Result<()> {
        loop {
            // Register interest before checking so a release in between is not lost
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.try_acquire(agent) {
                return Ok(());
            }

            tokio::select! {
                () = cancel.cancelled() => return Err(Error::Interrupted),
                () = &mut notified => {}
            }
        }
    }

    /// Free the slot
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotHolder`] if `agent` does not hold the slot. The
    /// slot state is left untouched.
    pub fn release(&self, agent: &AgentId) -> Result<()> {
        let mut holder = self.lock_holder();
        if holder.as_ref() != Some(agent) {
            return Err(Error::NotHolder {
                slot: self.id,
                caller: agent.clone(),
                holder: holder.clone(),
            });
        }
        *holder = None;
        drop(holder);
        self.released.notify_one();
        Ok(())
    }

    /// Current holder, if any
    #[must_use]
    pub fn holder(&self) -> Option<AgentId> {
        self.lock_holder().clone()
    }

    #[must_use]
    pub fn is_held_by(&self, agent: &AgentId) -> bool {
        self.lock_holder().as_ref() == Some(agent)
    }

    fn lock_holder(&self) -> MutexGuard<'_, Option<AgentId>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
