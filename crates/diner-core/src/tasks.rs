//! Task set for running agents
//!
//! One tokio task per agent. On shutdown the set is drained with a grace
//! period; tasks that have not finished by then are aborted so nothing leaks.

use std::time::Duration;

use tokio::task::JoinSet;

use crate::{
    agent::{Agent, AgentReport},
    Error, Result,
};

#[derive(Default)]
pub struct AgentTasks {
    set: JoinSet<Result<AgentReport>>,
}

impl AgentTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `agent` on its own task
    pub fn spawn(&mut self, agent: Agent) {
        self.set.spawn(agent.run());
    }

    /// Tasks not yet joined
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Join every task, aborting whatever is still running after `grace`
    ///
    /// Panicked or aborted tasks are reported as [`Error::TaskFailed`].
    pub async fn join_all(&mut self, grace: Duration) -> Vec<Result<AgentReport>> {
        let mut results = Vec::with_capacity(self.set.len());

        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = self.set.join_next().await {
                results.push(flatten(joined));
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(remaining = self.set.len(), "agents did not stop in time, aborting");
            self.set.abort_all();
            while let Some(joined) = self.set.join_next().await {
                results.push(flatten(joined));
            }
        }

        results
    }
}

fn flatten(
    joined: std::result::Result<Result<AgentReport>, tokio::task::JoinError>,
) -> Result<AgentReport> {
    joined.map_err(|e| Error::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        agent::{AgentContext, AgentExit, AgentId},
        config::SimulationConfig,
        delay::ZeroDelay,
        events::EventBus,
        migration::MigrationCoordinator,
        table::{Table, TableKind},
        termination::{StopReason, Termination},
    };

    fn context(termination: &Termination) -> AgentContext {
        let overflow = Arc::new(Table::new(1, 2, TableKind::Overflow));
        AgentContext {
            config: SimulationConfig {
                time_unit_ms: 10,
                ..SimulationConfig::default()
            },
            delay: Arc::new(ZeroDelay),
            coordinator: Arc::new(MigrationCoordinator::new(overflow)),
            termination: termination.clone(),
            events: EventBus::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_all_collects_stopped_agents() {
        let termination = Termination::new();
        let ctx = context(&termination);
        let table = Arc::new(Table::new(0, 2, TableKind::Regular));
        let mut tasks = AgentTasks::new();

        for i in 0..2 {
            let id = AgentId::from_index(i);
            if let Some(seat) = table.seat(&id) {
                tasks.spawn(Agent::new(id, Arc::clone(&table), seat, ctx.clone()));
            }
        }
        assert_eq!(tasks.len(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        termination.declare(StopReason::Interrupted);

        let results = tasks.join_all(Duration::from_secs(1)).await;
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| matches!(r, Ok(report) if report.exit == AgentExit::Stopped)));
        assert!(tasks.is_empty());
        assert!(table.slots().iter().all(|s| s.holder().is_none()));
    }
}
