use crate::error::PolicyError;
use crate::policy::Policy;
use ptf_domain::PolicyIndex;
use ptf_kernel::IndexedRegistry;
use std::sync::Arc;
use tracing::info;

/// Live set of loaded policies, addressed by [`PolicyIndex`].
///
/// Policies may be loaded and unloaded from any thread while events are being
/// delivered; [`PolicyManager::policy_indexes`] is an atomic snapshot and every
/// later lookup may report an invalid index.
#[derive(Debug, Default)]
pub struct PolicyManager {
    policies: IndexedRegistry<PolicyIndex, dyn Policy>,
}

impl PolicyManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, policy: impl Policy + 'static) -> Result<PolicyIndex, PolicyError> {
        self.load_shared(Arc::new(policy))
    }

    pub fn load_shared(&self, policy: Arc<dyn Policy>) -> Result<PolicyIndex, PolicyError> {
        let name = policy.name().to_owned();
        let index = self.policies.insert(policy)?;
        info!(policy = %index, %name, "Policy loaded");
        Ok(index)
    }

    pub fn unload(&self, index: PolicyIndex) -> Result<Arc<dyn Policy>, PolicyError> {
        let policy = self.policies.remove(index)?;
        info!(policy = %index, name = policy.name(), "Policy unloaded");
        Ok(policy)
    }

    /// Ordered snapshot of loaded policy handles.
    pub fn policy_indexes(&self) -> Vec<PolicyIndex> {
        self.policies.indexes()
    }

    pub fn policy(&self, index: PolicyIndex) -> Result<Arc<dyn Policy>, PolicyError> {
        Ok(self.policies.get(index)?)
    }

    /// Ordered snapshot of loaded policies.
    pub fn policies(&self) -> Vec<(PolicyIndex, Arc<dyn Policy>)> {
        self.policies.entries()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn unload_all(&self) -> Vec<(PolicyIndex, Arc<dyn Policy>)> {
        let drained = self.policies.drain();
        if !drained.is_empty() {
            info!(count = drained.len(), "All policies unloaded");
        }
        drained
    }
}
