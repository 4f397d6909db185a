//! Lazy query results over relationship entries.
//!
//! A [`RelQuery`] wraps a snapshot of a relationship's entries taken at
//! creation time: mutating the manager afterwards does not affect an
//! already-created result, and lazy materialization writes only into the
//! snapshot's own entries. With `use_cached=false` every snapshot entry is
//! stripped of its cached copy up front, forcing fresh fetches even where
//! embedded copies existed.

use crate::entry::RelEntry;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::oid::ObjectId;
use crate::record::RelRecord;
use crate::store::DocumentStore;

/// A restartable, lazily materializing sequence of related objects.
pub struct RelQuery<M: Model> {
    entries: Vec<RelEntry<M>>,
    use_cached: bool,
}

impl<M: Model> RelQuery<M> {
    /// Snapshot `entries`; with `use_cached=false` every cached copy is
    /// cleared so each access fetches from the store.
    pub(crate) fn new(mut entries: Vec<RelEntry<M>>, use_cached: bool) -> Self {
        if !use_cached {
            for entry in &mut entries {
                entry.clear_cached();
            }
        }
        Self {
            entries,
            use_cached,
        }
    }

    /// Number of entries. Never fetches.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether cached/embedded copies are served.
    pub fn use_cached(&self) -> bool {
        self.use_cached
    }

    /// Identifiers in entry order. Never fetches.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.entries.iter().map(RelEntry::id).collect()
    }

    /// Random access by position.
    ///
    /// Fails with `IndexOutOfRange` outside `[0, count)`; a missing
    /// referent propagates as `NotFound`.
    pub fn get<S: DocumentStore>(&mut self, store: &S, index: usize) -> Result<M> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        entry.materialize(store).cloned()
    }

    /// Linear scan for a matching identifier.
    ///
    /// Absence is `Ok(None)`, not an error.
    pub fn find<S: DocumentStore>(&mut self, store: &S, id: ObjectId) -> Result<Option<M>> {
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => entry.materialize(store).cloned().map(Some),
            None => Ok(None),
        }
    }

    /// Iterate the related objects, fetching unmaterialized entries on
    /// first visit and caching them for the rest of this result's
    /// lifetime. Restartable: call again for a fresh pass.
    pub fn iter<'a, S: DocumentStore>(&'a mut self, store: &'a S) -> Materialize<'a, M, S> {
        Materialize::new(&mut self.entries, store)
    }

    /// Present the result as junction-record pairs for one owner.
    ///
    /// Exists only for collaborators that expect relationship-record-shaped
    /// results; core logic never calls this.
    pub fn records<S: DocumentStore>(
        &mut self,
        store: &S,
        owner_id: ObjectId,
    ) -> Result<Vec<RelRecord<M>>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            let related_id = entry.id();
            let obj = entry.materialize(store)?.clone();
            out.push(RelRecord::new(owner_id, related_id, obj));
        }
        Ok(out)
    }
}

/// Iterator driving lazy materialization over a mutable entry slice.
///
/// Yields one `Result<M>` per entry, in entry order; fetched objects are
/// cached back into the underlying entries.
pub struct Materialize<'a, M: Model, S: DocumentStore> {
    entries: &'a mut [RelEntry<M>],
    store: &'a S,
    pos: usize,
}

impl<'a, M: Model, S: DocumentStore> Materialize<'a, M, S> {
    pub(crate) fn new(entries: &'a mut [RelEntry<M>], store: &'a S) -> Self {
        Self {
            entries,
            store,
            pos: 0,
        }
    }
}

impl<M: Model, S: DocumentStore> Iterator for Materialize<'_, M, S> {
    type Item = Result<M>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get_mut(self.pos)?;
        self.pos += 1;
        Some(entry.materialize(self.store).cloned())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len() - self.pos;
        (remaining, Some(remaining))
    }
}
