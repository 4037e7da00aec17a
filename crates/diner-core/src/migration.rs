//! Recovery by migration
//!
//! When a table is in circular wait, exactly one of its stalled members
//! claims the episode, puts down its left fork and moves to the overflow
//! table if a seat is free there. Without a free seat it leaves its table
//! and stops.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use crate::{
    agent::AgentId,
    table::{SeatAssignment, Table},
};

/// Proof that `agent` claimed the current stall episode at `from`
#[derive(Debug)]
#[must_use = "a claimed migration must be completed with MigrationCoordinator::migrate"]
pub struct MigrationTicket {
    from: Arc<Table>,
    agent: AgentId,
}

impl MigrationTicket {
    #[must_use]
    pub fn from_table(&self) -> usize {
        self.from.index()
    }

    #[must_use]
    pub const fn agent(&self) -> &AgentId {
        &self.agent
    }
}

/// Result of completing a migration
#[derive(Debug)]
pub enum MigrationOutcome {
    /// Seated at the overflow table with a fresh fork pair
    Seated(SeatAssignment),
    /// Overflow table full; the agent has left its table and must stop
    NoVacancy,
}

#[derive(Debug)]
pub struct MigrationCoordinator {
    overflow: Arc<Table>,
    last_migrated: Mutex<Option<AgentId>>,
    rejected: Mutex<Vec<AgentId>>,
    migrations: AtomicUsize,
}

impl MigrationCoordinator {
    #[must_use]
    pub fn new(overflow: Arc<Table>) -> Self {
        Self {
            overflow,
            last_migrated: Mutex::new(None),
            rejected: Mutex::new(Vec::new()),
            migrations: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn overflow(&self) -> &Arc<Table> {
        &self.overflow
    }

    /// Claim the stall episode at `from` for `agent`
    ///
    /// Returns `None` if `from` is the overflow table, the table is not in
    /// circular wait, `agent` is not seated there, or another member already
    /// claimed this episode.
    pub fn claim(&self, from: &Arc<Table>, agent: &AgentId) -> Option<MigrationTicket> {
        if from.is_overflow() {
            return None;
        }
        from.lock_members().claim(agent).then(|| MigrationTicket {
            from: Arc::clone(from),
            agent: agent.clone(),
        })
    }

    /// Move the ticket holder to the overflow table
    ///
    /// The caller must have put down its forks at the origin first. Origin
    /// and overflow are locked together (origin first) so the agent is never
    /// seen at both tables.
    pub fn migrate(&self, ticket: MigrationTicket) -> MigrationOutcome {
        let MigrationTicket { from, agent } = ticket;
        let mut origin = from.lock_members();
        let mut dest = self.overflow.lock_members();

        origin.remove(&agent);
        let seated = self.overflow.seat_locked(&mut dest, &agent);
        drop(dest);
        drop(origin);

        match seated {
            Some(seat) => {
                *self
                    .last_migrated
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(agent);
                self.migrations.fetch_add(1, Ordering::AcqRel);
                MigrationOutcome::Seated(seat)
            }
            None => {
                self.rejected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(agent);
                MigrationOutcome::NoVacancy
            }
        }
    }

    /// The agent that most recently moved to the overflow table
    #[must_use]
    pub fn last_migrated(&self) -> Option<AgentId> {
        self.last_migrated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Agents turned away because the overflow table was full
    #[must_use]
    pub fn rejected(&self) -> Vec<AgentId> {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn migrations(&self) -> usize {
        self.migrations.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    fn deadlocked_table(index: usize, capacity: usize, first_agent: usize) -> Arc<Table> {
        let table = Arc::new(Table::new(index, capacity, TableKind::Regular));
        for i in 0..capacity {
            if let Some(seat) = table.seat(&AgentId::from_index(first_agent + i)) {
                seat.set_holds_left(true);
            }
        }
        table
    }

    #[test]
    fn test_claim_and_migrate() {
        let overflow = Arc::new(Table::new(1, 3, TableKind::Overflow));
        let coordinator = MigrationCoordinator::new(Arc::clone(&overflow));
        let table = deadlocked_table(0, 3, 0);
        let b = AgentId::from_index(1);

        let ticket = coordinator.claim(&table, &b);
        assert!(ticket.is_some());
        let Some(ticket) = ticket else { return };
        assert_eq!(ticket.from_table(), 0);

        let outcome = coordinator.migrate(ticket);
        assert!(matches!(outcome, MigrationOutcome::Seated(ref s) if s.table == 1 && s.seat == 0));
        assert_eq!(table.len(), 2);
        assert_eq!(overflow.len(), 1);
        assert_eq!(coordinator.last_migrated(), Some(b));
        assert_eq!(coordinator.migrations(), 1);
    }

    #[test]
    fn test_second_claim_same_episode_refused() {
        let overflow = Arc::new(Table::new(1, 3, TableKind::Overflow));
        let coordinator = MigrationCoordinator::new(overflow);
        let table = deadlocked_table(0, 3, 0);

        let first = coordinator.claim(&table, &AgentId::from_index(0));
        assert!(first.is_some());
        assert!(coordinator.claim(&table, &AgentId::from_index(2)).is_none());
    }

    #[test]
    fn test_no_claim_from_overflow() {
        let overflow = Arc::new(Table::new(1, 2, TableKind::Overflow));
        let coordinator = MigrationCoordinator::new(Arc::clone(&overflow));
        for i in 0..2 {
            if let Some(seat) = overflow.seat(&AgentId::from_index(i)) {
                seat.set_holds_left(true);
            }
        }
        assert!(coordinator.claim(&overflow, &AgentId::from_index(0)).is_none());
    }

    #[test]
    fn test_overflow_seats_follow_insertion_order() {
        let overflow = Arc::new(Table::new(3, 3, TableKind::Overflow));
        let coordinator = MigrationCoordinator::new(Arc::clone(&overflow));

        let seats: Vec<usize> = (0..3)
            .filter_map(|t| {
                let table = deadlocked_table(t, 3, t * 3);
                let ticket = coordinator.claim(&table, &AgentId::from_index(t * 3))?;
                match coordinator.migrate(ticket) {
                    MigrationOutcome::Seated(seat) => Some(seat.seat),
                    MigrationOutcome::NoVacancy => None,
                }
            })
            .collect();

        assert_eq!(seats, vec![0, 1, 2]);
        assert_eq!(coordinator.last_migrated(), Some(AgentId::from_index(6)));
    }
}
