//! In-memory document store backend for Docmodel Rust.
//!
//! [`MemoryStore`] keeps every collection as an insertion-ordered map of
//! identifier to document. It implements the full [`DocumentStore`]
//! contract (id lookups, upserting saves, id-generating inserts, and
//! nested-equality queries) and is what the integration tests (and
//! applications that want an embedded store) run against.
//!
//! The store's native identifier lives in each document's `id` slot: both
//! `insert` and `save` mirror the key into the document, so a document read
//! back through a query always knows its own identifier.

use docmodel_core::{Document, DocumentStore, Error, ObjectId, Result, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// The stored field every document's identifier is mirrored into.
pub const ID_FIELD: &str = "id";

type Collections = HashMap<String, IndexMap<ObjectId, Document>>;

/// An in-process, insertion-ordered document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn collection_len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, IndexMap::len)
    }

    /// Check if a collection holds no documents.
    pub fn collection_is_empty(&self, collection: &str) -> bool {
        self.collection_len(collection) == 0
    }

    /// Remove every document from a collection.
    pub fn clear_collection(&self, collection: &str) {
        if let Some(docs) = self.lock().get_mut(collection) {
            docs.clear();
        }
    }

    /// Snapshot a collection's documents in stored order.
    pub fn dump(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Does the value at `path` inside `doc` equal `needle`?
///
/// Path segments descend through nested documents; an array at any segment
/// matches if any element matches. A bare (non-document) array element is
/// compared against the needle directly even when path segments remain,
/// which keeps reverse lookups working over legacy id-list rows.
fn doc_matches(doc: &Document, path: &str, needle: &Value) -> bool {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    doc.get(head)
        .is_some_and(|value| path_matches(value, rest, needle))
}

fn path_matches(value: &Value, path: Option<&str>, needle: &Value) -> bool {
    match (value, path) {
        (Value::Array(items), _) => items
            .iter()
            .any(|item| path_matches(item, path, needle)),
        (Value::Document(doc), Some(p)) => doc_matches(doc, p, needle),
        (other, None) => other == needle,
        (other, Some(_)) => other == needle,
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: ObjectId) -> Result<Option<Document>> {
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    fn find_by_path(&self, collection: &str, path: &str, value: &Value) -> Result<Vec<Document>> {
        if path.is_empty() {
            return Err(Error::store("query path must not be empty"));
        }
        let collections = self.lock();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let hits: Vec<Document> = docs
            .values()
            .filter(|doc| doc_matches(doc, path, value))
            .cloned()
            .collect();
        tracing::trace!(
            collection,
            path,
            hits = hits.len(),
            "nested-equality query"
        );
        Ok(hits)
    }

    fn insert(&self, collection: &str, mut doc: Document) -> Result<ObjectId> {
        let id = ObjectId::new();
        doc.insert(ID_FIELD, Value::ObjectId(id));
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc);
        Ok(id)
    }

    fn save(&self, collection: &str, id: ObjectId, mut doc: Document) -> Result<()> {
        doc.insert(ID_FIELD, Value::ObjectId(id));
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc);
        Ok(())
    }
}
