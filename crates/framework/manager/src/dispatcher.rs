//! Execution of a single [`WorkItem`].
//!
//! Phase 1 hands the event to the addressed participant; framework-scope
//! events address none and skip it. Phase 2 fans the event out
//! to every policy in the registry snapshot taken when the phase starts. Each
//! consumer is isolated: an invalid handle, an `Err` or a panic is logged at
//! the boundary of that one consumer and the rest still receive the event.

use crate::work_item::WorkItem;
use ptf_domain::PolicyIndex;
use ptf_events::{EventScope, FrameworkEvent};
use ptf_participant::ParticipantRegistry;
use ptf_policy::{PolicyEvent, PolicyManager};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// What happened on the participant side of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantOutcome {
    Handled,
    /// Framework-scope event; no participant was addressed.
    NotAddressed,
    /// The participant or domain handle did not resolve.
    InvalidIndex,
    /// The participant handler returned an error or panicked.
    Faulted,
}

/// Per-consumer result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub item: WorkItem,
    pub participant: ParticipantOutcome,
    /// Policies whose handler returned `Ok`.
    pub delivered: Vec<PolicyIndex>,
    /// Policies unloaded between the snapshot and their turn.
    pub skipped: Vec<PolicyIndex>,
    /// Policies whose handler returned an error or panicked.
    pub faulted: Vec<PolicyIndex>,
}

/// Runs work items against the participant and policy registries.
///
/// Holds no resolved participant or policy between calls; every handle is
/// looked up at the moment of use.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    participants: Arc<ParticipantRegistry>,
    policies: Arc<PolicyManager>,
}

impl Dispatcher {
    pub const fn new(participants: Arc<ParticipantRegistry>, policies: Arc<PolicyManager>) -> Self {
        Self { participants, policies }
    }

    /// Executes both phases. Never fails and never panics on consumer faults.
    pub fn execute(&self, item: WorkItem) -> DispatchReport {
        debug!(%item, "Executing work item");

        let participant = self.deliver_to_participant(&item);
        let mut report = DispatchReport {
            item,
            participant,
            delivered: Vec::new(),
            skipped: Vec::new(),
            faulted: Vec::new(),
        };
        self.fan_out(&item, &mut report);

        if item.event() == FrameworkEvent::ParticipantDestroy {
            self.retire_participant(&item);
        }

        trace!(
            %item,
            delivered = report.delivered.len(),
            skipped = report.skipped.len(),
            faulted = report.faulted.len(),
            "Work item executed"
        );
        report
    }

    fn deliver_to_participant(&self, item: &WorkItem) -> ParticipantOutcome {
        let event = item.event();
        if event.scope() == EventScope::Framework {
            return ParticipantOutcome::NotAddressed;
        }
        let Some(participant_index) = item.participant() else {
            warn!(%event, "Participant-scoped work item carries no participant");
            return ParticipantOutcome::InvalidIndex;
        };

        let participant = match self.participants.get(participant_index) {
            Ok(participant) => participant,
            Err(e) => {
                warn!(
                    %event,
                    participant = %participant_index,
                    domain = ?item.domain(),
                    operation = "ParticipantRegistry::get",
                    error = %e,
                    "Participant not available for work item"
                );
                return ParticipantOutcome::InvalidIndex;
            },
        };

        match panic::catch_unwind(AssertUnwindSafe(|| participant.handle_event(event, item.domain()))) {
            Ok(Ok(())) => ParticipantOutcome::Handled,
            Ok(Err(e)) if e.is_invalid_index() => {
                warn!(
                    %event,
                    participant = %participant_index,
                    domain = ?item.domain(),
                    operation = "Participant::handle_event",
                    error = %e,
                    "Work item addressed an invalid index"
                );
                ParticipantOutcome::InvalidIndex
            },
            Ok(Err(e)) => {
                error!(
                    %event,
                    participant = %participant_index,
                    domain = ?item.domain(),
                    operation = "Participant::handle_event",
                    kind = e.kind(),
                    error = %e,
                    "Participant handler failed"
                );
                ParticipantOutcome::Faulted
            },
            Err(payload) => {
                error!(
                    %event,
                    participant = %participant_index,
                    domain = ?item.domain(),
                    operation = "Participant::handle_event",
                    panic = panic_message(payload.as_ref()),
                    "Participant handler panicked"
                );
                ParticipantOutcome::Faulted
            },
        }
    }

    fn fan_out(&self, item: &WorkItem, report: &mut DispatchReport) {
        let policy_event = match item.participant() {
            Some(participant) => PolicyEvent::new(item.event(), participant, item.domain()),
            None => PolicyEvent::framework(item.event(), item.policy()),
        };

        for index in self.policies.policy_indexes() {
            let policy = match self.policies.policy(index) {
                Ok(policy) => policy,
                Err(e) => {
                    trace!(policy = %index, error = %e, "Policy unloaded before delivery");
                    report.skipped.push(index);
                    continue;
                },
            };

            match panic::catch_unwind(AssertUnwindSafe(|| policy.on_event(&policy_event))) {
                Ok(Ok(())) => report.delivered.push(index),
                Ok(Err(e)) => {
                    error!(
                        event = %item.event(),
                        participant = ?item.participant(),
                        policy = %index,
                        policy_name = policy.name(),
                        operation = "Policy::on_event",
                        error = %e,
                        "Policy handler failed"
                    );
                    report.faulted.push(index);
                },
                Err(payload) => {
                    error!(
                        event = %item.event(),
                        participant = ?item.participant(),
                        policy = %index,
                        policy_name = policy.name(),
                        operation = "Policy::on_event",
                        panic = panic_message(payload.as_ref()),
                        "Policy handler panicked"
                    );
                    report.faulted.push(index);
                },
            }
        }
    }

    fn retire_participant(&self, item: &WorkItem) {
        let Some(index) = item.participant() else {
            return;
        };
        if let Err(e) = self.participants.destroy(index) {
            debug!(participant = %index, error = %e, "Participant already gone at destroy");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
