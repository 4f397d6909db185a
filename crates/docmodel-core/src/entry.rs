//! Relationship entries and legacy stored-shape normalization.
//!
//! A stored relationship value has carried three encodings over its life:
//! bare identifiers (reference mode, or an id-list migration), id-only
//! documents, and fully embedded documents. Loading classifies each element
//! exactly once into a [`StoredShape`] and converts it to a [`RelEntry`];
//! the tag is never re-inspected afterwards. Classification does not depend
//! on whether embedding was enabled when the data was written; that is
//! what lets a field consume data written by an older representation.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::oid::ObjectId;
use crate::store::DocumentStore;
use crate::value::Value;

/// The atomic unit of a relationship: an identifier plus an optional
/// lazily-populated copy of the related object.
///
/// When `cached` is present its identifier equals `id`.
#[derive(Debug, Clone)]
pub struct RelEntry<M> {
    id: ObjectId,
    cached: Option<M>,
}

impl<M: Model> RelEntry<M> {
    /// Create an entry that has not been loaded yet.
    pub fn unloaded(id: ObjectId) -> Self {
        Self { id, cached: None }
    }

    /// Create an entry from an already-materialized object.
    ///
    /// Fails with `InvalidId` if the object carries no identifier.
    pub fn materialized(obj: M) -> Result<Self> {
        let id = obj
            .id()
            .ok_or_else(|| Error::invalid_id("object has no identifier", M::COLLECTION))?;
        Ok(Self {
            id,
            cached: Some(obj),
        })
    }

    /// The related object's identifier.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The cached object, if materialized.
    pub fn cached(&self) -> Option<&M> {
        self.cached.as_ref()
    }

    /// Drop the cached object, forcing the next access to fetch.
    pub fn clear_cached(&mut self) {
        self.cached = None;
    }

    /// Cache an object on this entry.
    ///
    /// The caller guarantees the object corresponds to `self.id()`; the
    /// entry's identifier stays authoritative.
    pub fn fill(&mut self, mut obj: M) {
        obj.set_id(self.id);
        self.cached = Some(obj);
    }

    /// Get the related object, fetching and caching it if absent.
    ///
    /// A missing referent propagates as `NotFound`.
    pub fn materialize<S: DocumentStore>(&mut self, store: &S) -> Result<&M> {
        if self.cached.is_none() {
            tracing::trace!(
                collection = M::COLLECTION,
                id = %self.id,
                "materializing relationship entry"
            );
            let obj = store.fetch_required::<M>(self.id)?;
            return Ok(self.cached.insert(obj));
        }
        match self.cached.as_ref() {
            Some(obj) => Ok(obj),
            None => unreachable!(),
        }
    }
}

/// The classified shape of one stored relationship element.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredShape<'a> {
    /// A bare native identifier
    BareId(ObjectId),
    /// A textual identifier
    TextId(&'a str),
    /// A document carrying only the primary-key field
    IdOnlyDoc(&'a Document),
    /// A document with more than the primary-key field populated
    FullDoc(&'a Document),
}

impl<'a> StoredShape<'a> {
    /// Classify one stored element.
    ///
    /// Fails with `InvalidId` for values no historical encoding produced.
    pub fn classify(value: &'a Value, pk_field: &str) -> Result<Self> {
        match value {
            Value::ObjectId(id) => Ok(StoredShape::BareId(*id)),
            Value::Text(s) => Ok(StoredShape::TextId(s)),
            Value::Document(doc) => {
                if !doc.contains_key(pk_field) {
                    return Err(Error::invalid_id(
                        "stored document has no primary-key field",
                        value.type_name(),
                    ));
                }
                if doc.len() == 1 {
                    Ok(StoredShape::IdOnlyDoc(doc))
                } else {
                    Ok(StoredShape::FullDoc(doc))
                }
            }
            other => Err(Error::invalid_id(
                "stored element is not an identifier or document",
                other.type_name(),
            )),
        }
    }
}

/// How many of the document's fields the target schema recognizes.
fn recognized_fields<M: Model>(doc: &Document) -> usize {
    M::fields()
        .iter()
        .filter(|f| doc.contains_key(f.storage_name))
        .count()
}

/// Convert one stored element into a relationship entry.
///
/// `embed` is the field declaration's flag, not the writer's: a fully
/// embedded document loaded into a reference-mode field contributes its
/// identifier only.
pub fn normalize_element<M: Model>(value: &Value, embed: bool) -> Result<RelEntry<M>> {
    match StoredShape::classify(value, M::PRIMARY_KEY)? {
        StoredShape::BareId(id) => Ok(RelEntry::unloaded(id)),
        StoredShape::TextId(s) => Ok(RelEntry::unloaded(ObjectId::parse_str(s)?)),
        StoredShape::IdOnlyDoc(doc) => {
            let id = ObjectId::from_value(&Value::Document(doc.clone()), M::PRIMARY_KEY)?;
            Ok(RelEntry::unloaded(id))
        }
        StoredShape::FullDoc(doc) => {
            let id = ObjectId::from_value(&Value::Document(doc.clone()), M::PRIMARY_KEY)?;
            if !embed {
                return Ok(RelEntry::unloaded(id));
            }
            // An embedded document whose only recognized field is the key
            // would materialize an empty instance; keep it unloaded instead.
            if recognized_fields::<M>(doc) <= 1 {
                tracing::warn!(
                    collection = M::COLLECTION,
                    id = %id,
                    "embedded document has no recognized fields beyond the key"
                );
                return Ok(RelEntry::unloaded(id));
            }
            let obj = M::from_document(doc)?;
            let mut entry = RelEntry::unloaded(id);
            entry.fill(obj);
            Ok(entry)
        }
    }
}
