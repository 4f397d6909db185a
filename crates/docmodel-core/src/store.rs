//! Document store traits.
//!
//! The store is an external collaborator: a key/value document fetch-by-id
//! plus a nested-equality collection query. Every call blocks the calling
//! thread until the store responds; there is no cooperative suspension in
//! this layer. Backend crates implement [`DocumentStore`].

use crate::document::Document;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::oid::ObjectId;
use crate::value::Value;

/// A document store capable of id lookups and nested-equality queries.
///
/// # Example
///
/// ```rust,ignore
/// // Fetch one document by id
/// let doc = store.get("categories", id)?;
///
/// // Find owners whose relationship field references an id
/// let owners = store.find_by_path("articles", "categories.id", &Value::ObjectId(id))?;
/// ```
pub trait DocumentStore {
    /// Fetch one document by identifier, or `None` if absent.
    fn get(&self, collection: &str, id: ObjectId) -> Result<Option<Document>>;

    /// Find all documents where the value at a dotted `path` equals `value`.
    ///
    /// When the path crosses a list-of-documents field, a document matches
    /// if any element matches. Results come back in stored order.
    fn find_by_path(&self, collection: &str, path: &str, value: &Value) -> Result<Vec<Document>>;

    /// Store a new document, assigning and returning its identifier.
    fn insert(&self, collection: &str, doc: Document) -> Result<ObjectId>;

    /// Write a document under an existing identifier (upsert).
    fn save(&self, collection: &str, id: ObjectId, doc: Document) -> Result<()>;

    /// Fetch one model instance by identifier.
    ///
    /// The identifier under which the document is stored is authoritative
    /// and is written onto the returned instance.
    fn fetch<M: Model>(&self, id: ObjectId) -> Result<Option<M>>
    where
        Self: Sized,
    {
        match self.get(M::COLLECTION, id)? {
            Some(doc) => {
                let mut obj = M::from_document(&doc)?;
                obj.set_id(id);
                Ok(Some(obj))
            }
            None => Ok(None),
        }
    }

    /// Fetch one model instance by identifier, erroring if absent.
    fn fetch_required<M: Model>(&self, id: ObjectId) -> Result<M>
    where
        Self: Sized,
    {
        self.fetch(id)?
            .ok_or_else(|| Error::not_found(M::COLLECTION, id))
    }

    /// Store a model instance, assigning its identifier if new.
    fn save_model<M: Model>(&self, obj: &mut M) -> Result<()>
    where
        Self: Sized,
    {
        match obj.id() {
            Some(id) => self.save(M::COLLECTION, id, obj.to_document()),
            None => {
                let id = self.insert(M::COLLECTION, obj.to_document())?;
                obj.set_id(id);
                Ok(())
            }
        }
    }
}
