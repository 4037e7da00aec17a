//! Event log and summary output on stdout

use std::io::{self, Write};

use anyhow::{Context, Result};
use diner_core::{Event, Summary};
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
    quiet: bool,
}

impl Renderer {
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Print events until every publisher is gone
    pub async fn follow(self, mut events: broadcast::Receiver<Event>) -> Result<()> {
        loop {
            match events.recv().await {
                Ok(event) => self.event(&event)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log fell behind, dropping events");
                }
                Err(RecvError::Closed) => return Ok(()),
            }
        }
    }

    fn event(self, event: &Event) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.json {
            serde_json::to_string(event).context("Failed to encode event")?
        } else {
            event.to_string()
        };
        writeln!(io::stdout().lock(), "{line}").context("Failed to write event")
    }

    pub fn summary(self, summary: &Summary) -> Result<()> {
        let line = if self.json {
            serde_json::to_string(summary).context("Failed to encode summary")?
        } else {
            summary.to_string()
        };
        writeln!(io::stdout().lock(), "{line}").context("Failed to write summary")
    }
}
