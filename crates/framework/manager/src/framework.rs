use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::service::{DispatchService, ReportHook, WorkQueue};
use crate::work_item::WorkItem;
use ptf_domain::config::DispatchConfig;
use ptf_domain::{ParticipantIndex, PolicyIndex};
use ptf_events::FrameworkEvent;
use ptf_participant::{Participant, ParticipantBuilder, ParticipantError, ParticipantRegistry, ParticipantStatus};
use ptf_policy::{Policy, PolicyError, PolicyManager};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::info;

#[ptf_derive::ptf_error]
pub enum FrameworkError {
    #[error("Participant operation failed{}: {source}", format_context(.context))]
    Participant { source: ParticipantError, context: Option<Cow<'static, str>> },

    #[error("Policy operation failed{}: {source}", format_context(.context))]
    Policy { source: PolicyError, context: Option<Cow<'static, str>> },

    #[error("Dispatch failed{}: {source}", format_context(.context))]
    Dispatch { source: DispatchError, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyStatus {
    pub index: PolicyIndex,
    pub name: String,
}

/// Point-in-time view of the running framework.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkStatus {
    pub participants: Vec<ParticipantStatus>,
    pub policies: Vec<PolicyStatus>,
    pub pending_work_items: usize,
}

/// Participant and policy registries wired to a running dispatch worker.
#[derive(Debug)]
pub struct Framework {
    participants: Arc<ParticipantRegistry>,
    policies: Arc<PolicyManager>,
    service: DispatchService,
}

impl Framework {
    /// Creates empty registries and starts the dispatch worker.
    ///
    /// # Errors
    /// Fails if the worker thread cannot be spawned.
    pub fn start(config: &DispatchConfig) -> Result<Self, FrameworkError> {
        Self::start_inner(config, None)
    }

    /// Starts the framework with an observer for every dispatch report.
    ///
    /// # Errors
    /// Fails if the worker thread cannot be spawned.
    pub fn start_with_hook(config: &DispatchConfig, hook: ReportHook) -> Result<Self, FrameworkError> {
        Self::start_inner(config, Some(hook))
    }

    fn start_inner(config: &DispatchConfig, hook: Option<ReportHook>) -> Result<Self, FrameworkError> {
        let participants = Arc::new(ParticipantRegistry::new());
        let policies = Arc::new(PolicyManager::new());
        let dispatcher = Dispatcher::new(Arc::clone(&participants), Arc::clone(&policies));
        let service = DispatchService::start_with_hook(dispatcher, config, hook)?;

        info!("Framework started");
        Ok(Self { participants, policies, service })
    }

    #[must_use]
    pub const fn participants(&self) -> &Arc<ParticipantRegistry> {
        &self.participants
    }

    #[must_use]
    pub const fn policies(&self) -> &Arc<PolicyManager> {
        &self.policies
    }

    #[must_use]
    pub const fn queue(&self) -> &WorkQueue {
        self.service.queue()
    }

    /// Registers a participant and queues `ParticipantCreate` followed by one
    /// `DomainCreate` per domain, i.e. `1 + domains().len()` work items.
    ///
    /// # Errors
    /// Fails when the registry is exhausted or the worker has stopped.
    pub fn create_participant(&self, builder: ParticipantBuilder) -> Result<Arc<Participant>, FrameworkError> {
        let participant = self.participants.create(builder)?;
        let index = participant.index();
        self.enqueue(WorkItem::new(FrameworkEvent::ParticipantCreate, index))?;
        for domain in participant.domains() {
            self.enqueue(WorkItem::for_domain(FrameworkEvent::DomainCreate, index, domain.index()))?;
        }
        Ok(participant)
    }

    /// Queues one `DomainDestroy` per domain, then `ParticipantDestroy`; the
    /// participant is removed after every policy has seen the last one.
    ///
    /// # Errors
    /// Fails when `index` does not resolve or the worker has stopped.
    pub fn destroy_participant(&self, index: ParticipantIndex) -> Result<(), FrameworkError> {
        let participant = self.participants.get(index)?;
        for domain in participant.domains() {
            self.enqueue(WorkItem::for_domain(FrameworkEvent::DomainDestroy, index, domain.index()))?;
        }
        self.enqueue(WorkItem::new(FrameworkEvent::ParticipantDestroy, index))
    }

    /// Loads a policy and queues `PolicyCreate` for it.
    ///
    /// # Errors
    /// Fails when the policy registry is exhausted or the worker has stopped.
    pub fn load_policy(&self, policy: impl Policy + 'static) -> Result<PolicyIndex, FrameworkError> {
        self.load_shared_policy(Arc::new(policy))
    }

    /// Like [`Self::load_policy`] for a policy the caller keeps a handle to.
    ///
    /// # Errors
    /// Fails when the policy registry is exhausted or the worker has stopped.
    pub fn load_shared_policy(&self, policy: Arc<dyn Policy>) -> Result<PolicyIndex, FrameworkError> {
        let index = self.policies.load_shared(policy)?;
        self.enqueue(WorkItem::for_policy(FrameworkEvent::PolicyCreate, index))?;
        Ok(index)
    }

    /// Unloads a policy at once and queues `PolicyDestroy` for the policies
    /// that remain.
    ///
    /// # Errors
    /// Fails when `index` does not resolve or the worker has stopped.
    pub fn unload_policy(&self, index: PolicyIndex) -> Result<(), FrameworkError> {
        self.policies.unload(index)?;
        self.enqueue(WorkItem::for_policy(FrameworkEvent::PolicyDestroy, index))
    }

    /// # Errors
    /// Returns [`FrameworkError::Dispatch`] once the worker has stopped.
    pub fn enqueue(&self, item: WorkItem) -> Result<(), FrameworkError> {
        Ok(self.service.queue().enqueue(item)?)
    }

    #[must_use]
    pub fn status(&self) -> FrameworkStatus {
        FrameworkStatus {
            participants: self.participants.participants().iter().map(|p| p.status()).collect(),
            policies: self
                .policies
                .policies()
                .into_iter()
                .map(|(index, policy)| PolicyStatus { index, name: policy.name().to_owned() })
                .collect(),
            pending_work_items: self.service.queue().pending(),
        }
    }

    /// Drains the queue, stops the worker, then unloads every policy and
    /// destroys every participant. Returns the number of executed work items.
    ///
    /// # Errors
    /// Fails if the worker thread panicked; registries are cleared regardless.
    pub fn shutdown(self) -> Result<usize, FrameworkError> {
        let Self { participants, policies, service } = self;
        let executed = service.shutdown();

        let unloaded = policies.unload_all().len();
        let destroyed = participants.destroy_all().len();
        info!(unloaded, destroyed, "Framework stopped");

        executed.map_err(FrameworkError::from)
    }
}
