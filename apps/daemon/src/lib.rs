//! # Platform Thermal Framework Daemon
//!
//! Starts the framework, creates the participants described by the
//! `[platform]` configuration section, loads the built-in event log policy,
//! dispatches the requested events and shuts down cleanly.
//!
//! ## Example
//! ```no_run
//! use ptf_daemon::Daemon;
//! use ptf::domain::config::FrameworkConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let summary = Daemon::builder().config(FrameworkConfig::default()).build().run()?;
//!     println!("{} work items executed", summary.executed);
//!     Ok(())
//! }
//! ```

pub mod args;
mod event_log;

pub use event_log::EventLogPolicy;

use anyhow::{Context, Result};
use ptf::domain::config::FrameworkConfig;
use ptf::events::{ActivityBus, ActivityRecord, ParticipantEvent};
use ptf::manager::{Framework, FrameworkStatus, ReportHook, WorkItem};
use ptf::platform;
use ptf::policy::Policy;
use std::sync::{Arc, mpsc};
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::{info, warn};

/// A fluent builder for configuring the [`Daemon`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct DaemonBuilder {
    cfg: FrameworkConfig,
    events: Vec<WorkItem>,
    activity: bool,
}

impl DaemonBuilder {
    pub fn config(mut self, cfg: FrameworkConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Work items dispatched, in order, once the platform is up.
    pub fn events(mut self, events: impl IntoIterator<Item = WorkItem>) -> Self {
        self.events.extend(events);
        self
    }

    /// Turns on activity logging for every participant first.
    pub const fn activity(mut self, enabled: bool) -> Self {
        self.activity = enabled;
        self
    }

    pub fn build(self) -> Daemon {
        Daemon { cfg: self.cfg, events: self.events, activity: self.activity, bus: ActivityBus::new() }
    }
}

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    pub executed: usize,
    /// Framework status taken after every event was dispatched.
    pub status: FrameworkStatus,
    pub activity: Vec<Arc<ActivityRecord>>,
    /// Events the built-in policy saw.
    pub policy_events: usize,
}

#[derive(Debug)]
pub struct Daemon {
    cfg: FrameworkConfig,
    events: Vec<WorkItem>,
    activity: bool,
    bus: ActivityBus,
}

impl Daemon {
    pub fn builder() -> DaemonBuilder {
        DaemonBuilder::default()
    }

    /// Runs one batch: build the platform, dispatch, drain, shut down.
    ///
    /// # Errors
    /// Fails if the framework cannot start, the platform configuration is
    /// invalid, or an event cannot be queued.
    pub fn run(self) -> Result<RunSummary> {
        let mut activity_rx = self.bus.subscribe();
        let (done_tx, done_rx) = mpsc::channel();
        let hook: ReportHook = Box::new(move |_| {
            let _ = done_tx.send(());
        });
        let framework = Framework::start_with_hook(&self.cfg.dispatch, hook).context("Failed to start framework")?;

        let policy = Arc::new(EventLogPolicy::new());
        framework
            .load_shared_policy(Arc::clone(&policy) as Arc<dyn Policy>)
            .context("Failed to load event log policy")?;

        let participants = platform::populate(&framework, &self.cfg.platform, Some(&self.bus))
            .context("Failed to build configured platform")?;
        info!(participants = participants.len(), events = self.events.len(), "Platform ready");
        // PolicyCreate, then ParticipantCreate plus one DomainCreate per domain.
        let mut queued = 1 + participants.iter().map(|p| 1 + p.domains().len()).sum::<usize>();

        if self.activity {
            for participant in &participants {
                framework
                    .enqueue(WorkItem::new(ParticipantEvent::ParticipantActivityLoggingEnabled, participant.index()))?;
                queued += 1;
            }
        }
        for item in self.events {
            framework.enqueue(item).with_context(|| format!("Failed to queue {item}"))?;
            queued += 1;
        }

        for _ in 0..queued {
            done_rx.recv().context("Dispatch worker stopped early")?;
        }
        let status = framework.status();

        let executed = framework.shutdown().context("Dispatch worker failed")?;
        let activity = drain(&mut activity_rx);

        match serde_json::to_string(&status) {
            Ok(json) => info!(executed, activity = activity.len(), status = %json, "Run complete"),
            Err(e) => warn!(error = %e, "Failed to serialize framework status"),
        }

        Ok(RunSummary { executed, status, activity, policy_events: policy.seen() })
    }
}

fn drain(rx: &mut Receiver<Arc<ActivityRecord>>) -> Vec<Arc<ActivityRecord>> {
    let mut records = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(record) => records.push(record),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Activity records dropped"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break records,
        }
    }
}
