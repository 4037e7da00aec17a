//! Tables: a ring of forks shared by a bounded set of seated agents
//!
//! Seat `i` uses fork `i` as its left fork and fork `(i + 1) % C` as its
//! right fork. Membership, the meal counter and the migration claim marker
//! live in one structure behind the table's lock.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use serde::Serialize;

use crate::{
    agent::AgentId,
    detector,
    slot::{ResourceSlot, SlotId},
};

/// Role of a table in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Starts fully seated; members may be migrated away
    Regular,
    /// Starts empty; only receives migrated agents
    Overflow,
}

/// The fork pair handed to a seated agent.
///
/// `holds_left` is shared with the table so the detector can read it
/// while the agent updates it.
#[derive(Debug, Clone)]
pub struct SeatAssignment {
    pub table: usize,
    pub seat: usize,
    pub left: Arc<ResourceSlot>,
    pub right: Arc<ResourceSlot>,
    pub holds_left: Arc<AtomicBool>,
}

impl SeatAssignment {
    /// Publish whether the left fork is held
    pub fn set_holds_left(&self, held: bool) {
        self.holds_left.store(held, Ordering::Release);
    }

    #[must_use]
    pub fn holds_left(&self) -> bool {
        self.holds_left.load(Ordering::Acquire)
    }
}

/// Point-in-time view of one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSnapshot {
    pub agent: AgentId,
    pub seat: usize,
    pub holds_left: bool,
}

#[derive(Debug)]
struct Seat {
    agent: AgentId,
    index: usize,
    holds_left: Arc<AtomicBool>,
}

/// Lock-protected table state
#[derive(Debug, Default)]
pub(crate) struct Membership {
    seats: Vec<Seat>,
    meals: u64,
    claimed_at_meal: Option<u64>,
}

impl Membership {
    pub(crate) fn len(&self) -> usize {
        self.seats.len()
    }

    pub(crate) fn contains(&self, agent: &AgentId) -> bool {
        self.seats.iter().any(|s| &s.agent == agent)
    }

    pub(crate) fn holds_left_flags(&self) -> impl Iterator<Item = bool> + '_ {
        self.seats.iter().map(|s| s.holds_left.load(Ordering::Acquire))
    }

    pub(crate) fn remove(&mut self, agent: &AgentId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| &s.agent != agent);
        self.seats.len() != before
    }

    /// Mark the current stall episode as handled by `agent`.
    ///
    /// Succeeds at most once per episode; a new episode starts when some
    /// member begins a meal. The claimer's flag is cleared so neighbours stop
    /// seeing a circular wait on its account.
    pub(crate) fn claim(&mut self, agent: &AgentId) -> bool {
        if self.claimed_at_meal == Some(self.meals) {
            return false;
        }
        if !detector::circular_wait(self.holds_left_flags()) {
            return false;
        }
        let Some(seat) = self.seats.iter().find(|s| &s.agent == agent) else {
            return false;
        };
        seat.holds_left.store(false, Ordering::Release);
        self.claimed_at_meal = Some(self.meals);
        true
    }

    fn lowest_free_seat(&self, capacity: usize) -> Option<usize> {
        (0..capacity).find(|i| self.seats.iter().all(|s| s.index != *i))
    }
}

/// A ring of `capacity` forks and up to `capacity` members
#[derive(Debug)]
pub struct Table {
    index: usize,
    kind: TableKind,
    slots: Vec<Arc<ResourceSlot>>,
    members: Mutex<Membership>,
}

impl Table {
    #[must_use]
    pub fn new(index: usize, capacity: usize, kind: TableKind) -> Self {
        let slots = (0..capacity)
            .map(|i| Arc::new(ResourceSlot::new(SlotId::new(index, i))))
            .collect();
        Self {
            index,
            kind,
            slots,
            members: Mutex::new(Membership::default()),
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn kind(&self) -> TableKind {
        self.kind
    }

    #[must_use]
    pub fn is_overflow(&self) -> bool {
        self.kind == TableKind::Overflow
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slots(&self) -> &[Arc<ResourceSlot>] {
        &self.slots
    }

    /// Seat `agent` at the lowest free seat
    ///
    /// Returns `None` when the table is full or the agent is already seated.
    pub fn seat(&self, agent: &AgentId) -> Option<SeatAssignment> {
        let mut members = self.lock_members();
        self.seat_locked(&mut members, agent)
    }

    /// Remove `agent`; returns whether it was seated here
    pub fn unseat(&self, agent: &AgentId) -> bool {
        self.lock_members().remove(agent)
    }

    #[must_use]
    pub fn has_vacancy(&self) -> bool {
        self.lock_members().len() < self.capacity()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_members().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Members in insertion order
    #[must_use]
    pub fn members(&self) -> Vec<MemberSnapshot> {
        self.lock_members()
            .seats
            .iter()
            .map(|s| MemberSnapshot {
                agent: s.agent.clone(),
                seat: s.index,
                holds_left: s.holds_left.load(Ordering::Acquire),
            })
            .collect()
    }

    #[must_use]
    pub fn holds_left_flags(&self) -> Vec<bool> {
        self.lock_members().holds_left_flags().collect()
    }

    /// Count a meal; this also ends the current stall episode
    pub fn record_meal(&self) {
        let mut members = self.lock_members();
        members.meals = members.meals.saturating_add(1);
    }

    #[must_use]
    pub fn meals(&self) -> u64 {
        self.lock_members().meals
    }

    pub(crate) fn lock_members(&self) -> MutexGuard<'_, Membership> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn seat_locked(
        &self,
        members: &mut Membership,
        agent: &AgentId,
    ) -> Option<SeatAssignment> {
        if members.contains(agent) {
            return None;
        }
        let capacity = self.capacity();
        let seat = members.lowest_free_seat(capacity)?;
        let holds_left = Arc::new(AtomicBool::new(false));
        members.seats.push(Seat {
            agent: agent.clone(),
            index: seat,
            holds_left: Arc::clone(&holds_left),
        });
        Some(SeatAssignment {
            table: self.index,
            seat,
            left: Arc::clone(&self.slots[seat]),
            right: Arc::clone(&self.slots[(seat + 1) % capacity]),
            holds_left,
        })
    }
}
