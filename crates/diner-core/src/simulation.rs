//! Simulation controller
//!
//! Builds the regular tables and the overflow table, seats one agent per
//! regular seat, starts every agent on its own task and polls the overflow
//! table until it deadlocks (or the run is stopped another way).

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::broadcast,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    agent::{Agent, AgentContext, AgentId, AgentReport},
    config::SimulationConfig,
    delay::{RandomDelay, UniformDelay},
    detector,
    events::{Event, EventBus, EventKind},
    migration::MigrationCoordinator,
    table::{Table, TableKind},
    tasks::AgentTasks,
    termination::{StopReason, Termination},
    Error, Result,
};

/// What a finished run looked like
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub outcome: StopReason,
    /// From start until the stop was declared
    pub elapsed: Duration,
    pub last_migrated: Option<AgentId>,
    pub migrations: usize,
    /// Agents that found the overflow table full
    pub rejected: Vec<AgentId>,
    /// Overflow members in seating order
    pub overflow_members: Vec<AgentId>,
    /// Meals eaten per table, overflow last
    pub meals_per_table: Vec<u64>,
    pub agents: Vec<AgentReport>,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = self
            .last_migrated
            .as_ref()
            .map_or_else(|| "none migrated".to_string(), ToString::to_string);
        match self.outcome {
            StopReason::OverflowDeadlocked => write!(
                f,
                "Overflow table deadlocked after {:.1?}. Last agent to migrate: {last}",
                self.elapsed
            ),
            other => write!(
                f,
                "Simulation stopped ({other}) after {:.1?}. Last agent to migrate: {last}",
                self.elapsed
            ),
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    tables: Vec<Arc<Table>>,
    coordinator: Arc<MigrationCoordinator>,
    termination: Termination,
    events: EventBus,
    agents: Vec<Agent>,
}

impl Simulation {
    /// Build a simulation with uniformly random delays
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails validation
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_delay(config, Arc::new(UniformDelay::new(config.seed)))
    }

    /// Build a simulation with a caller-supplied delay source
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails validation
    pub fn with_delay(config: SimulationConfig, delay: Arc<dyn RandomDelay>) -> Result<Self> {
        config.validate()?;

        let capacity = config.seats_per_table;
        let tables: Vec<Arc<Table>> = (0..=config.table_count)
            .map(|i| {
                let kind = if i == config.overflow_index() {
                    TableKind::Overflow
                } else {
                    TableKind::Regular
                };
                Arc::new(Table::new(i, capacity, kind))
            })
            .collect();

        let overflow = Arc::clone(&tables[config.overflow_index()]);
        let coordinator = Arc::new(MigrationCoordinator::new(overflow));
        let termination = Termination::new();
        let events = EventBus::default();

        let ctx = AgentContext {
            config,
            delay,
            coordinator: Arc::clone(&coordinator),
            termination: termination.clone(),
            events: events.clone(),
        };

        let mut agents = Vec::with_capacity(config.agent_count());
        for table in tables.iter().filter(|t| !t.is_overflow()) {
            for _ in 0..capacity {
                let id = AgentId::from_index(agents.len());
                let seat = table.seat(&id).ok_or_else(|| {
                    Error::invalid_config(format!("table {} has no seat for {id}", table.index()))
                })?;
                agents.push(Agent::new(id, Arc::clone(table), seat, ctx.clone()));
            }
        }

        Ok(Self {
            config,
            tables,
            coordinator,
            termination,
            events,
            agents,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Regular tables followed by the overflow table
    #[must_use]
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    #[must_use]
    pub fn overflow(&self) -> &Arc<Table> {
        self.coordinator.overflow()
    }

    /// Receive the event log; subscribe before calling [`Self::run`]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Handle for stopping the run from outside (e.g. on Ctrl-C)
    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination.clone()
    }

    /// Run until the overflow table deadlocks or the run is stopped
    ///
    /// # Errors
    ///
    /// Returns the agent's error if an agent violated the fork protocol
    pub async fn run(mut self) -> Result<Summary> {
        let start = Instant::now();
        let deadline = self.config.max_runtime_duration().map(|cap| start + cap);
        let overflow = Arc::clone(self.coordinator.overflow());

        let mut tasks = AgentTasks::new();
        for agent in self.agents.drain(..) {
            tasks.spawn(agent);
        }
        tracing::info!(
            agents = tasks.len(),
            tables = self.config.table_count,
            seats = self.config.seats_per_table,
            "simulation started"
        );

        let mut ticker = tokio::time::interval(self.config.poll());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.termination.cancelled() => break,
                _ = ticker.tick() => {
                    if detector::is_terminally_deadlocked(&overflow) {
                        if self.termination.declare(StopReason::OverflowDeadlocked) {
                            tracing::info!(table = overflow.index(), "overflow table deadlocked");
                            self.events.publish(overflow.index(), None, EventKind::GlobalDeadlock);
                        }
                        break;
                    }
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        self.termination.declare(StopReason::TimedOut);
                        break;
                    }
                }
            }
        }

        let outcome = self.termination.reason().unwrap_or(StopReason::Interrupted);
        let elapsed = self
            .termination
            .declared_at()
            .map_or_else(|| start.elapsed(), |at| at.saturating_duration_since(start));
        self.events
            .publish(overflow.index(), None, EventKind::Stopped { reason: outcome });

        let mut agents = Vec::new();
        for result in tasks.join_all(self.config.shutdown_grace()).await {
            match result {
                Ok(report) => agents.push(report),
                Err(e @ Error::NotHolder { .. }) => return Err(e),
                Err(e) => tracing::warn!(error = %e, "agent task did not finish cleanly"),
            }
        }
        // Name order is seating order: shorter names first, then alphabetical
        agents.sort_by(|a, b| {
            (a.id.as_str().len(), a.id.as_str()).cmp(&(b.id.as_str().len(), b.id.as_str()))
        });

        Ok(Summary {
            outcome,
            elapsed,
            last_migrated: self.coordinator.last_migrated(),
            migrations: self.coordinator.migrations(),
            rejected: self.coordinator.rejected(),
            overflow_members: overflow.members().into_iter().map(|m| m.agent).collect(),
            meals_per_table: self.tables.iter().map(|t| t.meals()).collect(),
            agents,
        })
    }
}
