//! Index-based registry shared by the participant and policy managers.
//!
//! Entries are handed out as `Arc<T>` clones; the registry keeps ownership of
//! the slot while callers hold only the integer handle between uses. A lookup
//! distinguishes a handle that was never issued from one whose entry has since
//! been removed.

use parking_lot::RwLock;
use ptf_domain::RegistryIndex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

#[ptf_derive::ptf_error]
#[derive(Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The handle was never issued by this registry (bad input).
    #[error("{kind} index {index} was never assigned{}", format_context(.context))]
    Unassigned { kind: &'static str, index: u32, context: Option<Cow<'static, str>> },

    /// The handle was issued but its entry has been removed.
    #[error("{kind} index {index} refers to a removed entry{}", format_context(.context))]
    Removed { kind: &'static str, index: u32, context: Option<Cow<'static, str>> },

    /// Every handle value has been used.
    #[error("{kind} index space exhausted{}", format_context(.context))]
    Exhausted { kind: &'static str, context: Option<Cow<'static, str>> },
}

impl RegistryError {
    /// True for both never-assigned and removed handles.
    #[must_use]
    pub const fn is_invalid_index(&self) -> bool {
        matches!(self, Self::Unassigned { .. } | Self::Removed { .. })
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }
}

struct Slots<I, T: ?Sized> {
    entries: BTreeMap<I, Arc<T>>,
    next: u32,
}

/// Thread-safe map from monotonically assigned handles to shared entries.
pub struct IndexedRegistry<I, T: ?Sized> {
    slots: RwLock<Slots<I, T>>,
}

impl<I: RegistryIndex, T: ?Sized> Default for IndexedRegistry<I, T> {
    fn default() -> Self {
        Self { slots: RwLock::new(Slots { entries: BTreeMap::new(), next: 0 }) }
    }
}

impl<I: RegistryIndex, T: ?Sized> fmt::Debug for IndexedRegistry<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read();
        f.debug_struct("IndexedRegistry")
            .field("kind", &I::KIND)
            .field("live", &slots.entries.keys().collect::<Vec<_>>())
            .field("next", &slots.next)
            .finish()
    }
}

impl<I: RegistryIndex, T: ?Sized> IndexedRegistry<I, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry under the next free handle.
    pub fn insert(&self, entry: Arc<T>) -> Result<I, RegistryError> {
        self.insert_with(|_| entry).map(|(index, _)| index)
    }

    /// Stores the entry built by `build`, which receives its own handle.
    ///
    /// The registry stays locked while `build` runs, so it must not call back
    /// into this registry.
    pub fn insert_with(
        &self,
        build: impl FnOnce(I) -> Arc<T>,
    ) -> Result<(I, Arc<T>), RegistryError> {
        let mut slots = self.slots.write();
        let raw = slots.next;
        let next = raw.checked_add(1).ok_or(RegistryError::Exhausted { kind: I::KIND, context: None })?;
        let index = I::from_raw(raw);
        let entry = build(index);
        slots.entries.insert(index, Arc::clone(&entry));
        slots.next = next;
        drop(slots);

        trace!(kind = I::KIND, index = raw, "Registry entry added");
        Ok((index, entry))
    }

    /// Resolves a handle at the moment of use.
    pub fn get(&self, index: I) -> Result<Arc<T>, RegistryError> {
        let slots = self.slots.read();
        slots.entries.get(&index).cloned().ok_or_else(|| invalid(index, slots.next))
    }

    /// Removes an entry; outstanding `Arc` clones stay valid until dropped.
    pub fn remove(&self, index: I) -> Result<Arc<T>, RegistryError> {
        let mut slots = self.slots.write();
        let next = slots.next;
        let removed = slots.entries.remove(&index).ok_or_else(|| invalid(index, next))?;
        drop(slots);

        trace!(kind = I::KIND, index = index.raw(), "Registry entry removed");
        Ok(removed)
    }

    /// Ordered snapshot of live handles, taken atomically.
    pub fn indexes(&self) -> Vec<I> {
        self.slots.read().entries.keys().copied().collect()
    }

    /// Ordered snapshot of live entries, taken atomically.
    pub fn entries(&self) -> Vec<(I, Arc<T>)> {
        self.slots.read().entries.iter().map(|(i, e)| (*i, Arc::clone(e))).collect()
    }

    pub fn contains(&self, index: I) -> bool {
        self.slots.read().entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.slots.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry and returns them in handle order. Handles are not reissued.
    pub fn drain(&self) -> Vec<(I, Arc<T>)> {
        std::mem::take(&mut self.slots.write().entries).into_iter().collect()
    }
}

fn invalid<I: RegistryIndex>(index: I, next: u32) -> RegistryError {
    if index.raw() < next {
        RegistryError::Removed { kind: I::KIND, index: index.raw(), context: None }
    } else {
        RegistryError::Unassigned { kind: I::KIND, index: index.raw(), context: None }
    }
}
