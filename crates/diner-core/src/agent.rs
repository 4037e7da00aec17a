//! Agents (philosophers)
//!
//! Each agent runs as its own task and cycles through
//! think → pick up left → settle → poll right → eat → put down.
//! A stalled agent that confirms circular wait at its table migrates to the
//! overflow table; at the overflow table it instead checks the terminal
//! condition.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    config::SimulationConfig,
    delay::RandomDelay,
    detector,
    events::{EventBus, EventKind},
    migration::{MigrationCoordinator, MigrationOutcome, MigrationTicket},
    table::{SeatAssignment, Table},
    termination::{StopReason, Termination},
    Error, Result,
};

/// Unique agent identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Spreadsheet-style name: 0 → `A`, 25 → `Z`, 26 → `AA`
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let mut n = index.saturating_add(1);
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(u8::try_from(rem).map_or('?', |r| char::from(b'A' + r)));
            n = (n - 1) / 26;
        }
        Self(letters.into_iter().rev().collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Behavioural state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Thinking,
    WaitingLeft,
    HoldingLeft,
    WaitingRight,
    Eating,
    Migrating,
    Terminated,
}

impl AgentState {
    /// Returns true if this state allows transition to `next`
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Thinking, Self::WaitingLeft)
                | (Self::WaitingLeft, Self::HoldingLeft)
                | (Self::HoldingLeft, Self::WaitingRight)
                | (Self::WaitingRight, Self::Eating | Self::Migrating)
                | (Self::Eating | Self::Migrating, Self::Thinking)
                | (
                    Self::Thinking
                        | Self::WaitingLeft
                        | Self::HoldingLeft
                        | Self::WaitingRight
                        | Self::Eating
                        | Self::Migrating,
                    Self::Terminated
                )
        )
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thinking => write!(f, "thinking"),
            Self::WaitingLeft => write!(f, "waiting-left"),
            Self::HoldingLeft => write!(f, "holding-left"),
            Self::WaitingRight => write!(f, "waiting-right"),
            Self::Eating => write!(f, "eating"),
            Self::Migrating => write!(f, "migrating"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// How an agent task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentExit {
    /// Observed the stop flag
    Stopped,
    /// Left its table for a full overflow table
    Evicted,
}

/// Final account of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    pub id: AgentId,
    pub exit: AgentExit,
    pub meals: u64,
    pub final_table: usize,
}

/// Collaborators shared by every agent of a simulation
#[derive(Clone)]
pub struct AgentContext {
    pub config: SimulationConfig,
    pub delay: Arc<dyn RandomDelay>,
    pub coordinator: Arc<MigrationCoordinator>,
    pub termination: Termination,
    pub events: EventBus,
}

enum RightFork {
    Acquired,
    Migrate(MigrationTicket),
}

pub struct Agent {
    id: AgentId,
    table: Arc<Table>,
    seat: SeatAssignment,
    state: AgentState,
    meals: u64,
    ctx: AgentContext,
}

impl Agent {
    #[must_use]
    pub fn new(id: AgentId, table: Arc<Table>, seat: SeatAssignment, ctx: AgentContext) -> Self {
        Self {
            id,
            table,
            seat,
            state: AgentState::Thinking,
            meals: 0,
            ctx,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    #[must_use]
    pub const fn state(&self) -> AgentState {
        self.state
    }

    /// Run until stopped or evicted
    ///
    /// Forks still held when the loop ends are put down before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotHolder`] if the fork protocol was violated; the
    /// whole simulation is stopped with [`StopReason::Fault`] in that case.
    pub async fn run(mut self) -> Result<AgentReport> {
        let result = self.cycle().await;
        self.put_down_everything();
        self.transition(AgentState::Terminated);
        self.publish(EventKind::Terminated);

        let exit = match result {
            Ok(exit) => exit,
            Err(e) if e.is_interruption() => AgentExit::Stopped,
            Err(e) => {
                tracing::error!(agent = %self.id, error = %e, "fork protocol violated");
                self.ctx.termination.declare(StopReason::Fault);
                return Err(e);
            }
        };

        Ok(AgentReport {
            id: self.id,
            exit,
            meals: self.meals,
            final_table: self.table.index(),
        })
    }

    async fn cycle(&mut self) -> Result<AgentExit> {
        loop {
            self.check_stop()?;
            self.think().await?;
            self.pick_up_left().await?;
            self.pause(self.ctx.config.settle()).await?;

            match self.pick_up_right().await? {
                RightFork::Acquired => {
                    self.eat().await?;
                    self.put_down()?;
                }
                RightFork::Migrate(ticket) => {
                    if !self.migrate(ticket)? {
                        return Ok(AgentExit::Evicted);
                    }
                }
            }
        }
    }

    async fn think(&mut self) -> Result<()> {
        self.transition(AgentState::Thinking);
        let duration = self
            .ctx
            .delay
            .delay(Duration::ZERO, self.ctx.config.think_bound());
        self.publish(EventKind::Thinking {
            duration_ms: EventBus::duration_ms(duration),
        });
        self.pause(duration).await
    }

    async fn pick_up_left(&mut self) -> Result<()> {
        self.transition(AgentState::WaitingLeft);
        self.publish(EventKind::Hungry);

        self.seat
            .left
            .acquire(&self.id, self.ctx.termination.token())
            .await?;
        self.seat.set_holds_left(true);

        self.transition(AgentState::HoldingLeft);
        self.publish(EventKind::LeftAcquired);
        Ok(())
    }

    async fn pick_up_right(&mut self) -> Result<RightFork> {
        self.transition(AgentState::WaitingRight);
        self.publish(EventKind::WaitingRight);

        loop {
            self.check_stop()?;

            if self.seat.right.try_acquire(&self.id) {
                // An eating member is no longer waiting on anyone
                self.seat.set_holds_left(false);
                return Ok(RightFork::Acquired);
            }

            if self.table.is_overflow() {
                if detector::is_terminally_deadlocked(&self.table) {
                    self.declare_global_deadlock();
                    return Err(Error::Interrupted);
                }
            } else if detector::is_deadlocked(&self.table) {
                if let Some(ticket) = self.ctx.coordinator.claim(&self.table, &self.id) {
                    self.publish(EventKind::DeadlockDetected);
                    return Ok(RightFork::Migrate(ticket));
                }
            }

            self.pause(self.ctx.config.poll()).await?;
        }
    }

    async fn eat(&mut self) -> Result<()> {
        self.transition(AgentState::Eating);
        self.table.record_meal();
        self.meals = self.meals.saturating_add(1);

        let duration = self
            .ctx
            .delay
            .delay(Duration::ZERO, self.ctx.config.eat_bound());
        self.publish(EventKind::Eating {
            duration_ms: EventBus::duration_ms(duration),
        });
        self.pause(duration).await
    }

    fn put_down(&mut self) -> Result<()> {
        self.publish(EventKind::ForksReleased);
        self.seat.right.release(&self.id)?;
        self.seat.left.release(&self.id)?;
        self.seat.set_holds_left(false);
        Ok(())
    }

    /// Returns false when there was no seat and the agent must stop
    fn migrate(&mut self, ticket: MigrationTicket) -> Result<bool> {
        self.transition(AgentState::Migrating);
        self.seat.set_holds_left(false);
        self.seat.left.release(&self.id)?;

        let from = self.table.index();
        let overflow = Arc::clone(self.ctx.coordinator.overflow());
        match self.ctx.coordinator.migrate(ticket) {
            MigrationOutcome::Seated(seat) => {
                tracing::info!(agent = %self.id, from, to = seat.table, seat = seat.seat, "agent migrated");
                self.publish(EventKind::Migrated {
                    to: seat.table,
                    seat: seat.seat,
                });
                self.table = overflow;
                self.seat = seat;
                Ok(true)
            }
            MigrationOutcome::NoVacancy => {
                tracing::warn!(agent = %self.id, from, "overflow table full, agent stops");
                self.publish(EventKind::MigrationRejected {
                    to: overflow.index(),
                });
                Ok(false)
            }
        }
    }

    fn declare_global_deadlock(&self) {
        if self.ctx.termination.declare(StopReason::OverflowDeadlocked) {
            tracing::info!(agent = %self.id, table = self.table.index(), "overflow table deadlocked");
            self.publish(EventKind::GlobalDeadlock);
        }
    }

    /// Put down whatever is still held; used on every exit path
    fn put_down_everything(&mut self) {
        self.seat.set_holds_left(false);
        for slot in [&self.seat.right, &self.seat.left] {
            if slot.is_held_by(&self.id) {
                // Only the holder can release, and we just checked we are it
                let _ = slot.release(&self.id);
            }
        }
    }

    /// Sleep for `duration`, waking early if the stop flag is set
    async fn pause(&self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return self.check_stop();
        }
        tokio::select! {
            () = self.ctx.termination.cancelled() => Err(Error::Interrupted),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn check_stop(&self) -> Result<()> {
        if self.ctx.termination.is_declared() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, next: AgentState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            tracing::error!(agent = %self.id, from = %self.state, to = %next, "unexpected state transition");
        }
        tracing::debug!(agent = %self.id, table = self.table.index(), from = %self.state, to = %next);
        self.state = next;
    }

    fn publish(&self, kind: EventKind) {
        self.ctx
            .events
            .publish(self.table.index(), Some(&self.id), kind);
    }
}
