//! The relationship manager: ordered related-object sets stored either as
//! references or as denormalized embedded copies.
//!
//! A [`RelatedSet`] owns the entry list for one relationship field on one
//! owning instance. Mutations bracket their commit with pre/post
//! notifications; reads materialize lazily through the store; loading and
//! saving go through [`RelatedSet::hydrate`] and [`RelatedSet::to_store`],
//! which speak every historical stored encoding.

use crate::binding::Binding;
use crate::document::Document;
use crate::entry::{RelEntry, normalize_element};
use crate::error::{Error, Result};
use crate::model::Model;
use crate::notify::{ChangeAction, NullSink, RelationChange, SharedSink};
use crate::oid::ObjectId;
use crate::query::{Materialize, RelQuery};
use crate::store::DocumentStore;
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An argument resolving to a related object: a native or textual
/// identifier, or a full object carried along as the materialized copy.
#[derive(Debug, Clone)]
pub enum RelRef<M> {
    /// A native identifier
    Id(ObjectId),
    /// A textual identifier
    Text(String),
    /// A full related object
    Object(M),
    /// A borrowed object that has no identifier yet
    Unsaved,
}

impl<M: Model> RelRef<M> {
    fn resolve(self) -> Result<(ObjectId, Option<M>)> {
        match self {
            RelRef::Id(id) => Ok((id, None)),
            RelRef::Text(s) => Ok((ObjectId::parse_str(&s)?, None)),
            RelRef::Object(obj) => match obj.id() {
                Some(id) => Ok((id, Some(obj))),
                None => Err(Error::invalid_id(
                    "related object has no identifier",
                    M::COLLECTION,
                )),
            },
            RelRef::Unsaved => Err(Error::invalid_id(
                "related object has no identifier",
                M::COLLECTION,
            )),
        }
    }
}

/// Conversion into a [`RelRef`], accepted by every mutation and lookup.
pub trait IntoRelRef<M: Model> {
    /// Perform the conversion.
    fn into_rel_ref(self) -> RelRef<M>;
}

impl<M: Model> IntoRelRef<M> for RelRef<M> {
    fn into_rel_ref(self) -> RelRef<M> {
        self
    }
}

impl<M: Model> IntoRelRef<M> for ObjectId {
    fn into_rel_ref(self) -> RelRef<M> {
        RelRef::Id(self)
    }
}

impl<M: Model> IntoRelRef<M> for &ObjectId {
    fn into_rel_ref(self) -> RelRef<M> {
        RelRef::Id(*self)
    }
}

impl<M: Model> IntoRelRef<M> for &str {
    fn into_rel_ref(self) -> RelRef<M> {
        RelRef::Text(self.to_string())
    }
}

impl<M: Model> IntoRelRef<M> for String {
    fn into_rel_ref(self) -> RelRef<M> {
        RelRef::Text(self)
    }
}

impl<M: Model> IntoRelRef<M> for M {
    fn into_rel_ref(self) -> RelRef<M> {
        RelRef::Object(self)
    }
}

impl<M: Model> IntoRelRef<M> for &M {
    fn into_rel_ref(self) -> RelRef<M> {
        match self.id() {
            Some(id) => RelRef::Id(id),
            None => RelRef::Unsaved,
        }
    }
}

/// The related objects of one relationship field on one owning instance.
///
/// Entries keep insertion order and never hold duplicate identifiers;
/// adding an already-present identifier is a membership no-op. The `embed`
/// flag is fixed at field-declaration time and controls whether
/// [`RelatedSet::to_store`] writes full denormalized copies or references
/// only. Removal never deletes the related object from the store.
pub struct RelatedSet<M: Model> {
    field: &'static str,
    owner_collection: &'static str,
    embed: bool,
    binding: Binding,
    entries: Vec<RelEntry<M>>,
    sink: SharedSink,
}

impl<M: Model> RelatedSet<M> {
    /// Create an unbound, empty set.
    pub fn new(field: &'static str, owner_collection: &'static str, embed: bool) -> Self {
        Self {
            field,
            owner_collection,
            embed,
            binding: Binding::Unbound,
            entries: Vec::new(),
            sink: Arc::new(NullSink),
        }
    }

    /// Replace the notification sink.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Create a bound copy for one owning instance.
    ///
    /// The copy shares the entries as of this moment and mutates
    /// independently afterwards.
    pub fn bind_to(&self, owner_id: Option<ObjectId>) -> Self {
        Self {
            field: self.field,
            owner_collection: self.owner_collection,
            embed: self.embed,
            binding: Binding::Bound { owner_id },
            entries: self.entries.clone(),
            sink: Arc::clone(&self.sink),
        }
    }

    /// The relationship field's name.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The owning model's collection.
    pub fn owner_collection(&self) -> &'static str {
        self.owner_collection
    }

    /// Whether this field stores denormalized copies.
    pub fn embed(&self) -> bool {
        self.embed
    }

    /// The binding state of this set.
    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Whether this set is bound to an owning instance.
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    /// The current entries, in insertion order.
    pub fn entries(&self) -> &[RelEntry<M>] {
        &self.entries
    }

    /// Number of related objects.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if no objects are related.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of all entries, in entry order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.entries.iter().map(RelEntry::id).collect()
    }

    /// Membership test by identifier, accepting an object, an identifier,
    /// or an identifier string.
    pub fn contains<R: IntoRelRef<M>>(&self, item: R) -> Result<bool> {
        let (id, _) = item.into_rel_ref().resolve()?;
        Ok(self.contains_id(id))
    }

    fn contains_id(&self, id: ObjectId) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    fn emit(&self, action: ChangeAction, ids: &[String]) -> Result<()> {
        let change = RelationChange {
            field: self.field,
            owner_collection: self.owner_collection,
            owner_id: self.binding.owner_id(),
            target_collection: M::COLLECTION,
            reverse: false,
            ids,
        };
        self.sink.notify(action, &change)
    }

    /// Relate one object or identifier. See [`RelatedSet::add_all`].
    pub fn add<R: IntoRelRef<M>>(&mut self, item: R) -> Result<&mut Self> {
        self.add_all([item])
    }

    /// Relate a batch of objects or identifiers.
    ///
    /// Arguments whose identifier is already present are skipped. The
    /// pre-add notification carries the identifiers about to be committed
    /// and fires while they are still absent from [`RelatedSet::ids`]; a
    /// sink error prevents the commit.
    pub fn add_all<I, R>(&mut self, items: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoRelRef<M>,
    {
        let mut additions: Vec<RelEntry<M>> = Vec::new();
        for item in items {
            let (id, obj) = item.into_rel_ref().resolve()?;
            if self.contains_id(id) || additions.iter().any(|e| e.id() == id) {
                continue;
            }
            let mut entry = RelEntry::unloaded(id);
            if let Some(obj) = obj {
                entry.fill(obj);
            }
            additions.push(entry);
        }

        let ids: Vec<String> = additions.iter().map(|e| e.id().to_hex()).collect();
        self.emit(ChangeAction::PreAdd, &ids)?;
        self.entries.extend(additions);
        self.emit(ChangeAction::PostAdd, &ids)?;

        tracing::debug!(
            field = self.field,
            target = M::COLLECTION,
            added = ids.len(),
            "committed relationship add"
        );
        Ok(self)
    }

    /// Unlink one object or identifier. See [`RelatedSet::remove_all`].
    pub fn remove<R: IntoRelRef<M>>(&mut self, item: R) -> Result<&mut Self> {
        self.remove_all([item])
    }

    /// Unlink a batch of objects or identifiers.
    ///
    /// Only unlinks: the related objects themselves stay in the store. The
    /// pre-remove notification carries the identifiers about to go; a sink
    /// error prevents the commit.
    pub fn remove_all<I, R>(&mut self, items: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoRelRef<M>,
    {
        let mut targets: HashSet<ObjectId> = HashSet::new();
        for item in items {
            let (id, _) = item.into_rel_ref().resolve()?;
            targets.insert(id);
        }

        let ids: Vec<String> = self
            .entries
            .iter()
            .filter(|e| targets.contains(&e.id()))
            .map(|e| e.id().to_hex())
            .collect();
        self.emit(ChangeAction::PreRemove, &ids)?;
        self.entries.retain(|e| !targets.contains(&e.id()));
        self.emit(ChangeAction::PostRemove, &ids)?;

        tracing::debug!(
            field = self.field,
            target = M::COLLECTION,
            removed = ids.len(),
            "committed relationship remove"
        );
        Ok(self)
    }

    /// Unlink everything.
    pub fn clear(&mut self) -> Result<&mut Self> {
        let ids: Vec<String> = self.entries.iter().map(|e| e.id().to_hex()).collect();
        self.emit(ChangeAction::PreClear, &ids)?;
        self.entries.clear();
        self.emit(ChangeAction::PostClear, &ids)?;

        tracing::debug!(
            field = self.field,
            target = M::COLLECTION,
            cleared = ids.len(),
            "committed relationship clear"
        );
        Ok(self)
    }

    /// Construct a new related object from `fields`, store it, relate it,
    /// and return it.
    pub fn create<S: DocumentStore>(&mut self, store: &S, fields: Document) -> Result<M> {
        let mut obj = M::from_document(&fields)?;
        let id = store.insert(M::COLLECTION, obj.to_document())?;
        obj.set_id(id);
        self.add(obj.clone())?;
        Ok(obj)
    }

    /// Snapshot the current entries into a lazy query result.
    ///
    /// Embedded or previously materialized copies are served from cache.
    pub fn all(&self) -> RelQuery<M> {
        RelQuery::new(self.entries.clone(), true)
    }

    /// Snapshot the current entries, forcing every object to be re-fetched
    /// from the store even when an embedded copy exists.
    pub fn objs(&self) -> RelQuery<M> {
        RelQuery::new(self.entries.clone(), false)
    }

    /// Iterate the related objects, fetching and caching into the live
    /// entries as needed. Restartable: call again for a fresh pass.
    pub fn iter<'a, S: DocumentStore>(&'a mut self, store: &'a S) -> Materialize<'a, M, S> {
        Materialize::new(&mut self.entries, store)
    }

    /// Replace the entries with the normalized form of a stored value.
    ///
    /// Accepts the stored array (elements in any historical encoding: bare
    /// ids, textual ids, id-only documents, embedded documents) or a single
    /// document. `Null` empties the set.
    pub fn hydrate(&mut self, raw: &Value) -> Result<()> {
        let mut entries: Vec<RelEntry<M>> = Vec::new();
        match raw {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    entries.push(normalize_element(item, self.embed)?);
                }
            }
            other => entries.push(normalize_element(other, self.embed)?),
        }
        self.entries = dedup_entries(self.field, entries);
        Ok(())
    }

    /// Replace the entries with already-materialized objects.
    pub fn set_instances(&mut self, objs: Vec<M>) -> Result<()> {
        let mut entries = Vec::with_capacity(objs.len());
        for obj in objs {
            entries.push(RelEntry::materialized(obj)?);
        }
        self.entries = dedup_entries(self.field, entries);
        Ok(())
    }

    /// Serialize the entries into the stored representation.
    ///
    /// Reference mode writes one document per entry holding only the
    /// identifier under the target's primary-key field. Embed mode fetches
    /// any entry without a materialized copy (a dangling reference is a
    /// `Materialize` error; a partial embedded document is never written)
    /// and writes the full converted document, with the key coerced to the
    /// native identifier type. Fetched copies are cached back into the
    /// entries, so saving re-materializes the latest state.
    pub fn to_store<S: DocumentStore>(&mut self, store: &S) -> Result<Value> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            if !self.embed {
                out.push(Value::Document(Document::from([(
                    M::PRIMARY_KEY,
                    Value::ObjectId(entry.id()),
                )])));
                continue;
            }
            if entry.cached().is_none() {
                let obj = store
                    .fetch::<M>(entry.id())?
                    .ok_or_else(|| Error::materialize(M::COLLECTION, entry.id()))?;
                entry.fill(obj);
            }
            let Some(obj) = entry.cached() else {
                unreachable!()
            };
            let mut doc = obj.to_document();
            doc.insert(M::PRIMARY_KEY, Value::ObjectId(entry.id()));
            out.push(Value::Document(doc));
        }

        tracing::trace!(
            field = self.field,
            target = M::COLLECTION,
            embed = self.embed,
            entries = out.len(),
            "serialized relationship field"
        );
        Ok(Value::Array(out))
    }
}

fn dedup_entries<M: Model>(field: &str, entries: Vec<RelEntry<M>>) -> Vec<RelEntry<M>> {
    let mut seen: HashSet<ObjectId> = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.id()) {
            out.push(entry);
        } else {
            tracing::warn!(
                field,
                id = %entry.id(),
                "dropping duplicate identifier in stored relationship value"
            );
        }
    }
    out
}

impl<M: Model> Clone for RelatedSet<M> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            owner_collection: self.owner_collection,
            embed: self.embed,
            binding: self.binding,
            entries: self.entries.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for RelatedSet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedSet")
            .field("field", &self.field)
            .field("owner_collection", &self.owner_collection)
            .field("embed", &self.embed)
            .field("binding", &self.binding)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeAction;
    use crate::testing::{Category, MapStore, RecordingSink};

    fn set(embed: bool) -> RelatedSet<Category> {
        RelatedSet::new("categories", "articles", embed)
    }

    fn saved(store: &MapStore, title: &str) -> Category {
        let mut category = Category::titled(title);
        let id = store.put(&category);
        category.set_id(id);
        category
    }

    #[test]
    fn add_is_idempotent_on_membership() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let id = cat.id.unwrap();

        let mut rel = set(false);
        rel.add(cat.clone()).unwrap();
        rel.add(cat.clone()).unwrap();
        rel.add(id).unwrap();
        rel.add(id.to_hex().as_str()).unwrap();

        assert_eq!(rel.count(), 1);
        assert_eq!(rel.ids(), vec![id]);
    }

    #[test]
    fn add_accepts_ids_objects_and_strings() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");
        let c = saved(&store, "C");

        let mut rel = set(false);
        rel.add(a.clone())
            .unwrap()
            .add(b.id.unwrap())
            .unwrap()
            .add(c.id.unwrap().to_hex())
            .unwrap();

        assert_eq!(
            rel.ids(),
            vec![a.id.unwrap(), b.id.unwrap(), c.id.unwrap()]
        );
        // The object argument became the materialized copy.
        assert!(rel.entries()[0].cached().is_some());
        assert!(rel.entries()[1].cached().is_none());
    }

    #[test]
    fn add_rejects_unsaved_objects() {
        let mut rel = set(false);
        let err = rel.add(Category::titled("no id")).unwrap_err();
        assert!(err.is_invalid_id());
        assert_eq!(rel.count(), 0);
    }

    #[test]
    fn add_rejects_garbage_strings() {
        let mut rel = set(false);
        let err = rel.add("not-an-id").unwrap_err();
        assert!(err.is_invalid_id());
    }

    #[test]
    fn remove_is_set_difference_preserving_order() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");
        let c = saved(&store, "C");

        let mut rel = set(false);
        rel.add_all([a.clone(), b.clone(), c.clone()]).unwrap();
        rel.remove(b.id.unwrap()).unwrap();

        assert_eq!(rel.ids(), vec![a.id.unwrap(), c.id.unwrap()]);
    }

    #[test]
    fn remove_of_absent_id_is_a_no_op() {
        let store = MapStore::new();
        let a = saved(&store, "A");

        let mut rel = set(false);
        rel.add(a.clone()).unwrap();
        rel.remove(ObjectId::new()).unwrap();
        assert_eq!(rel.ids(), vec![a.id.unwrap()]);
    }

    #[test]
    fn clear_is_total() {
        let store = MapStore::new();
        let mut rel = set(false);
        rel.add_all([saved(&store, "A"), saved(&store, "B")]).unwrap();

        rel.clear().unwrap();
        assert_eq!(rel.count(), 0);
        assert!(rel.ids().is_empty());
    }

    #[test]
    fn contains_compares_by_identifier() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let id = cat.id.unwrap();

        let mut rel = set(false);
        rel.add(id).unwrap();

        assert!(rel.contains(&cat).unwrap());
        assert!(rel.contains(id).unwrap());
        assert!(rel.contains(id.to_hex().as_str()).unwrap());
        assert!(!rel.contains(ObjectId::new()).unwrap());
    }

    #[test]
    fn notification_ordering_on_add() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let sink = Arc::new(RecordingSink::new());

        let mut rel = set(false).with_sink(sink.clone());
        rel.add(cat.clone()).unwrap();

        assert_eq!(
            sink.actions(),
            vec![ChangeAction::PreAdd, ChangeAction::PostAdd]
        );
        assert_eq!(
            sink.ids_for(ChangeAction::PreAdd),
            vec![cat.id.unwrap().to_hex()]
        );
    }

    #[test]
    fn failing_pre_add_prevents_the_commit() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let sink = Arc::new(RecordingSink::failing_on(ChangeAction::PreAdd));

        let mut rel = set(false).with_sink(sink.clone());
        assert!(rel.add(cat).is_err());

        // Nothing committed, post_add never fired.
        assert_eq!(rel.count(), 0);
        assert_eq!(sink.actions(), vec![ChangeAction::PreAdd]);
    }

    #[test]
    fn failing_post_add_propagates_after_commit() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let sink = Arc::new(RecordingSink::failing_on(ChangeAction::PostAdd));

        let mut rel = set(false).with_sink(sink.clone());
        assert!(rel.add(cat.clone()).is_err());

        assert_eq!(rel.ids(), vec![cat.id.unwrap()]);
        assert_eq!(
            sink.actions(),
            vec![ChangeAction::PreAdd, ChangeAction::PostAdd]
        );
    }

    #[test]
    fn failing_pre_remove_keeps_entries() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let sink = Arc::new(RecordingSink::failing_on(ChangeAction::PreRemove));

        let mut rel = set(false).with_sink(sink.clone());
        rel.add(cat.clone()).unwrap();
        assert!(rel.remove(cat.id.unwrap()).is_err());
        assert_eq!(rel.ids(), vec![cat.id.unwrap()]);
    }

    #[test]
    fn clear_notifies_with_full_id_set() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");
        let sink = Arc::new(RecordingSink::new());

        let mut rel = set(false).with_sink(sink.clone());
        rel.add_all([a.clone(), b.clone()]).unwrap();
        rel.clear().unwrap();

        assert_eq!(
            sink.ids_for(ChangeAction::PreClear),
            vec![a.id.unwrap().to_hex(), b.id.unwrap().to_hex()]
        );
    }

    #[test]
    fn create_stores_adds_and_returns() {
        let store = MapStore::new();
        let mut rel = set(false);

        let fields = Document::from([("title", Value::from("Fresh"))]);
        let created = rel.create(&store, fields).unwrap();

        let id = created.id.unwrap();
        assert_eq!(created.title, "Fresh");
        assert_eq!(rel.ids(), vec![id]);
        let fetched: Category = store.fetch(id).unwrap().unwrap();
        assert_eq!(fetched.title, "Fresh");
    }

    #[test]
    fn reference_mode_serializes_keys_only() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let id = cat.id.unwrap();

        let mut rel = set(false);
        rel.add(cat).unwrap();
        let stored = rel.to_store(&store).unwrap();

        let expected = Value::Array(vec![Value::Document(Document::from([(
            "id",
            Value::ObjectId(id),
        )]))]);
        assert_eq!(stored, expected);
    }

    #[test]
    fn embed_mode_serializes_full_documents() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let id = cat.id.unwrap();

        let mut rel = set(true);
        rel.add(cat).unwrap();
        let stored = rel.to_store(&store).unwrap();

        let Value::Array(items) = stored else {
            panic!("expected array")
        };
        let Value::Document(doc) = &items[0] else {
            panic!("expected document")
        };
        assert_eq!(doc.get("id"), Some(&Value::ObjectId(id)));
        assert_eq!(doc.get("title"), Some(&Value::Text("Cats".to_string())));
    }

    #[test]
    fn embed_mode_fetches_unmaterialized_entries_and_caches_them() {
        let store = MapStore::new();
        let cat = saved(&store, "Cats");
        let id = cat.id.unwrap();

        let mut rel = set(true);
        rel.add(id).unwrap();
        assert!(rel.entries()[0].cached().is_none());

        let stored = rel.to_store(&store).unwrap();
        let Value::Array(items) = &stored else {
            panic!("expected array")
        };
        let Value::Document(doc) = &items[0] else {
            panic!("expected document")
        };
        assert_eq!(doc.get("title"), Some(&Value::Text("Cats".to_string())));

        // Write-time re-materialization cached the fetched copy.
        assert!(rel.entries()[0].cached().is_some());
    }

    #[test]
    fn embed_mode_dangling_reference_is_a_materialize_error() {
        let store = MapStore::new();
        let mut rel = set(true);
        rel.add(ObjectId::new()).unwrap();

        let err = rel.to_store(&store).unwrap_err();
        assert!(matches!(err, Error::Materialize(_)));
    }

    #[test]
    fn hydrate_replaces_entries_from_mixed_encodings() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");
        let a_id = a.id.unwrap();
        let b_id = b.id.unwrap();

        let mut rel = set(true);
        rel.add(ObjectId::new()).unwrap();

        let mut embedded = b.to_document();
        embedded.insert("id", Value::ObjectId(b_id));
        let raw = Value::Array(vec![
            Value::ObjectId(a_id),
            Value::Document(embedded),
        ]);
        rel.hydrate(&raw).unwrap();

        assert_eq!(rel.ids(), vec![a_id, b_id]);
        assert!(rel.entries()[0].cached().is_none());
        assert_eq!(rel.entries()[1].cached().unwrap().title, "B");
    }

    #[test]
    fn hydrate_accepts_a_single_document() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let a_id = a.id.unwrap();

        let mut doc = a.to_document();
        doc.insert("id", Value::ObjectId(a_id));

        let mut rel = set(true);
        rel.hydrate(&Value::Document(doc)).unwrap();
        assert_eq!(rel.ids(), vec![a_id]);
    }

    #[test]
    fn hydrate_drops_duplicate_ids_keeping_first() {
        let id = ObjectId::new();
        let raw = Value::Array(vec![
            Value::ObjectId(id),
            Value::Text(id.to_hex()),
        ]);

        let mut rel = set(false);
        rel.hydrate(&raw).unwrap();
        assert_eq!(rel.ids(), vec![id]);
    }

    #[test]
    fn hydrate_null_empties() {
        let mut rel = set(false);
        rel.add(ObjectId::new()).unwrap();
        rel.hydrate(&Value::Null).unwrap();
        assert!(rel.is_empty());
    }

    #[test]
    fn set_instances_wraps_directly() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let mut rel = set(true);
        rel.set_instances(vec![a.clone()]).unwrap();
        assert_eq!(rel.ids(), vec![a.id.unwrap()]);
        assert_eq!(rel.entries()[0].cached().unwrap().title, "A");
    }

    #[test]
    fn iteration_materializes_and_caches_into_live_entries() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");

        let mut rel = set(false);
        rel.add_all([a.id.unwrap(), b.id.unwrap()]).unwrap();

        let titles: Vec<String> = rel
            .iter(&store)
            .collect::<Result<Vec<Category>>>()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(rel.entries()[0].cached().is_some());

        // Restartable.
        let second: Vec<Category> = rel.iter(&store).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn bound_copies_mutate_independently() {
        let store = MapStore::new();
        let proto = set(false);
        let mut bound_a = proto.bind_to(Some(ObjectId::new()));
        let mut bound_b = proto.bind_to(Some(ObjectId::new()));

        bound_a.add(saved(&store, "A")).unwrap();
        bound_b.add(saved(&store, "B")).unwrap();

        assert_eq!(proto.count(), 0);
        assert_eq!(bound_a.count(), 1);
        assert_eq!(bound_b.count(), 1);
        assert_ne!(bound_a.ids(), bound_b.ids());
        assert!(bound_a.is_bound());
        assert!(!proto.is_bound());
    }

    #[test]
    fn round_trip_reference_mode_preserves_ids() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");

        let mut rel = set(false);
        rel.add_all([a.clone(), b.clone()]).unwrap();
        let stored = rel.to_store(&store).unwrap();

        let mut reloaded = set(false);
        reloaded.hydrate(&stored).unwrap();
        assert_eq!(reloaded.ids(), rel.ids());
    }

    #[test]
    fn round_trip_embed_mode_preserves_field_values() {
        let store = MapStore::new();
        let a = saved(&store, "A");
        let b = saved(&store, "B");

        let mut rel = set(true);
        rel.add_all([a.clone(), b.clone()]).unwrap();
        let stored = rel.to_store(&store).unwrap();

        let mut reloaded = set(true);
        reloaded.hydrate(&stored).unwrap();
        assert_eq!(reloaded.ids(), rel.ids());
        let titles: Vec<&str> = reloaded
            .entries()
            .iter()
            .map(|e| e.cached().unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
