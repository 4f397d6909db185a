//! Shared fixtures for unit tests: small hand-implemented models, an
//! id-keyed store, and a recording notification sink.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::field::{DocType, FieldInfo};
use crate::model::Model;
use crate::notify::{ChangeAction, ChangeSink, RelationChange};
use crate::oid::ObjectId;
use crate::store::DocumentStore;
use crate::value::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub id: Option<ObjectId>,
    pub title: String,
}

impl Category {
    pub fn titled(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
        }
    }
}

impl Model for Category {
    const COLLECTION: &'static str = "categories";
    const PRIMARY_KEY: &'static str = "id";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", DocType::ObjectId).primary_key(true),
            FieldInfo::new("title", "title", DocType::Text),
        ];
        FIELDS
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", Value::from(self.id));
        doc.insert("title", self.title.as_str());
        doc
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let mut category = Category::default();
        if doc.contains_key("id") {
            category.id = doc.get_as("id")?;
        }
        if doc.contains_key("title") {
            category.title = doc.get_as("title")?;
        }
        Ok(category)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: Option<ObjectId>,
    pub title: String,
}

impl Model for Article {
    const COLLECTION: &'static str = "articles";
    const PRIMARY_KEY: &'static str = "id";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", DocType::ObjectId).primary_key(true),
            FieldInfo::new("title", "title", DocType::Text),
        ];
        FIELDS
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", Value::from(self.id));
        doc.insert("title", self.title.as_str());
        doc
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let mut article = Article::default();
        if doc.contains_key("id") {
            article.id = doc.get_as("id")?;
        }
        if doc.contains_key("title") {
            article.title = doc.get_as("title")?;
        }
        Ok(article)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// A minimal id-keyed store preserving insertion order per collection.
#[derive(Debug, Default)]
pub struct MapStore {
    docs: Mutex<Vec<(String, ObjectId, Document)>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a model instance and hand back its id.
    pub fn put<M: Model>(&self, obj: &M) -> ObjectId {
        let id = obj.id().unwrap_or_else(ObjectId::new);
        let mut doc = obj.to_document();
        doc.insert(M::PRIMARY_KEY, Value::ObjectId(id));
        let mut docs = self.lock();
        docs.retain(|(c, existing, _)| !(c == M::COLLECTION && *existing == id));
        docs.push((M::COLLECTION.to_string(), id, doc));
        id
    }

    /// Store a raw document under a fresh id.
    pub fn put_doc(&self, collection: &str, doc: Document) -> ObjectId {
        let id = ObjectId::new();
        self.lock().push((collection.to_string(), id, doc));
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, ObjectId, Document)>> {
        match self.docs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn path_matches(doc: &Document, path: &str, needle: &Value) -> bool {
    let Some((head, rest)) = path.split_once('.') else {
        return doc.get(path) == Some(needle);
    };
    match doc.get(head) {
        Some(Value::Array(items)) => items.iter().any(|item| match item {
            Value::Document(sub) => sub.get(rest) == Some(needle),
            other => other == needle,
        }),
        Some(Value::Document(sub)) => sub.get(rest) == Some(needle),
        _ => false,
    }
}

impl DocumentStore for MapStore {
    fn get(&self, collection: &str, id: ObjectId) -> Result<Option<Document>> {
        Ok(self
            .lock()
            .iter()
            .find(|(c, stored, _)| c == collection && *stored == id)
            .map(|(_, _, doc)| doc.clone()))
    }

    fn find_by_path(&self, collection: &str, path: &str, value: &Value) -> Result<Vec<Document>> {
        Ok(self
            .lock()
            .iter()
            .filter(|(c, _, doc)| c == collection && path_matches(doc, path, value))
            .map(|(_, _, doc)| doc.clone())
            .collect())
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.lock().push((collection.to_string(), id, doc));
        Ok(id)
    }

    fn save(&self, collection: &str, id: ObjectId, doc: Document) -> Result<()> {
        let mut docs = self.lock();
        docs.retain(|(c, stored, _)| !(c == collection && *stored == id));
        docs.push((collection.to_string(), id, doc));
        Ok(())
    }
}

/// A sink recording every delivered phase, optionally failing on one.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(ChangeAction, Vec<String>)>>,
    pub fail_on: Option<ChangeAction>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(action: ChangeAction) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_on: Some(action),
        }
    }

    pub fn actions(&self) -> Vec<ChangeAction> {
        match self.events.lock() {
            Ok(events) => events.iter().map(|(a, _)| *a).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|(a, _)| *a).collect(),
        }
    }

    pub fn ids_for(&self, wanted: ChangeAction) -> Vec<String> {
        let events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events
            .iter()
            .filter(|(a, _)| *a == wanted)
            .flat_map(|(_, ids)| ids.clone())
            .collect()
    }
}

impl ChangeSink for RecordingSink {
    fn notify(&self, action: ChangeAction, change: &RelationChange<'_>) -> Result<()> {
        match self.events.lock() {
            Ok(mut events) => events.push((action, change.ids.to_vec())),
            Err(poisoned) => poisoned.into_inner().push((action, change.ids.to_vec())),
        }
        if self.fail_on == Some(action) {
            return Err(Error::custom(format!(
                "sink rejected {}",
                action.as_str()
            )));
        }
        Ok(())
    }
}
