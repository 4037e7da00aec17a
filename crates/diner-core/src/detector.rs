//! Circular-wait detection
//!
//! In a ring where every seat takes its left fork first, "every member holds
//! its left fork" is the same as a closed cycle of wait-for edges. Flags are
//! read without stopping the agents, so a check can miss a wait that is just
//! forming; callers retry on their next poll.

use crate::table::Table;

/// True iff there is at least one flag and every flag is set
pub fn circular_wait(flags: impl IntoIterator<Item = bool>) -> bool {
    let mut seen_any = false;
    for holds_left in flags {
        if !holds_left {
            return false;
        }
        seen_any = true;
    }
    seen_any
}

/// Every current member of `table` holds its left fork
///
/// An empty table is never deadlocked.
#[must_use]
pub fn is_deadlocked(table: &Table) -> bool {
    circular_wait(table.lock_members().holds_left_flags())
}

/// Terminal condition: the table is full and every member holds its left fork
#[must_use]
pub fn is_terminally_deadlocked(table: &Table) -> bool {
    let members = table.lock_members();
    members.len() == table.capacity() && circular_wait(members.holds_left_flags())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agent::AgentId, table::TableKind};

    #[test]
    fn test_empty_is_not_circular() {
        assert!(!circular_wait(Vec::new()));
    }

    #[test]
    fn test_all_set_is_circular() {
        assert!(circular_wait([true, true, true]));
    }

    #[test]
    fn test_one_thinker_breaks_cycle() {
        assert!(!circular_wait([true, false, true, true, true]));
    }

    #[test]
    fn test_table_predicates() {
        let table = Table::new(5, 3, TableKind::Overflow);
        assert!(!is_deadlocked(&table));

        let seats: Vec<_> = (0..2)
            .filter_map(|i| table.seat(&AgentId::from_index(i)))
            .collect();
        seats.iter().for_each(|s| s.set_holds_left(true));
        assert!(is_deadlocked(&table));
        assert!(!is_terminally_deadlocked(&table));

        let last = table.seat(&AgentId::from_index(2));
        assert!(!is_terminally_deadlocked(&table));
        if let Some(last) = last {
            last.set_holds_left(true);
        }
        assert!(is_terminally_deadlocked(&table));
    }
}
