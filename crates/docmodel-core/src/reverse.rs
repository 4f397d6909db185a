//! Reverse-direction lookups.
//!
//! Given a related object, find every owning document whose relationship
//! field references it. There is no in-memory index: each call issues a
//! live store query against the owning collection, matching the related
//! identifier under `<field>.<target_pk>` inside the stored entry list.

use crate::error::Result;
use crate::model::Model;
use crate::oid::ObjectId;
use crate::store::DocumentStore;
use crate::value::Value;
use std::marker::PhantomData;

/// The reverse accessor attached to the related side of a relationship.
pub struct ReverseManager<O: Model> {
    path: String,
    related_id: ObjectId,
    _owner: PhantomData<fn() -> O>,
}

impl<O: Model> ReverseManager<O> {
    /// Build a reverse lookup from the owning-side field definition.
    pub fn new(field_storage: &str, target_pk: &str, related_id: ObjectId) -> Self {
        Self {
            path: format!("{}.{}", field_storage, target_pk),
            related_id,
            _owner: PhantomData,
        }
    }

    /// The dotted query path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The related object's identifier being looked up.
    pub fn related_id(&self) -> ObjectId {
        self.related_id
    }

    /// Retrieve all owning instances referencing the related object.
    pub fn all<S: DocumentStore>(&self, store: &S) -> Result<Vec<O>> {
        tracing::debug!(
            collection = O::COLLECTION,
            path = %self.path,
            id = %self.related_id,
            "reverse relationship query"
        );
        let docs = store.find_by_path(
            O::COLLECTION,
            &self.path,
            &Value::ObjectId(self.related_id),
        )?;
        docs.iter().map(O::from_document).collect()
    }

    /// Count owning instances without materializing them.
    pub fn count<S: DocumentStore>(&self, store: &S) -> Result<usize> {
        let docs = store.find_by_path(
            O::COLLECTION,
            &self.path,
            &Value::ObjectId(self.related_id),
        )?;
        Ok(docs.len())
    }
}

impl<O: Model> std::fmt::Debug for ReverseManager<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseManager")
            .field("collection", &O::COLLECTION)
            .field("path", &self.path)
            .field("related_id", &self.related_id)
            .finish()
    }
}
