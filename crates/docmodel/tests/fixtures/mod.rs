//! Shared fixtures for the integration suite: hand-implemented models and a
//! recording notification sink.
#![allow(dead_code)]

use docmodel::{
    ChangeAction, ChangeSink, DocType, Document, DocumentStore, FieldInfo, MemoryStore, Model,
    ObjectId, RelationChange, Result, Value,
};
use std::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub id: Option<ObjectId>,
    pub title: String,
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
pub struct Tag {
    pub id: Option<ObjectId>,
    pub name: String,
}

impl Model for Tag {
    const COLLECTION: &'static str = "tags";
    const PRIMARY_KEY: &'static str = "id";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", DocType::ObjectId).primary_key(true),
            FieldInfo::new("name", "name", DocType::Text),
        ];
        FIELDS
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", Value::from(self.id));
        doc.insert("name", self.name.as_str());
        doc
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let mut tag = Tag::default();
        if doc.contains_key("id") {
            tag.id = doc.get_as("id")?;
        }
        if doc.contains_key("name") {
            tag.name = doc.get_as("name")?;
        }
        Ok(tag)
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
    pub text: String,
    pub main_category: Option<ObjectId>,
}

impl Model for Article {
    const COLLECTION: &'static str = "articles";
    const PRIMARY_KEY: &'static str = "id";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", DocType::ObjectId).primary_key(true),
            FieldInfo::new("title", "title", DocType::Text),
            FieldInfo::new("text", "text", DocType::Text),
            FieldInfo::new("main_category", "main_category", DocType::ObjectId).nullable(true),
        ];
        FIELDS
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", Value::from(self.id));
        doc.insert("title", self.title.as_str());
        doc.insert("text", self.text.as_str());
        doc.insert("main_category", Value::from(self.main_category));
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
        if doc.contains_key("text") {
            article.text = doc.get_as("text")?;
        }
        if doc.contains_key("main_category") {
            article.main_category = doc.get_as("main_category")?;
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

/// Store a model and hand it back with its assigned identifier.
pub fn save<M: Model>(store: &MemoryStore, mut obj: M) -> M {
    store.save_model(&mut obj).expect("save fixture model");
    obj
}

pub fn category(store: &MemoryStore, title: &str) -> Category {
    save(
        store,
        Category {
            id: None,
            title: title.to_string(),
        },
    )
}

pub fn tag(store: &MemoryStore, name: &str) -> Tag {
    save(
        store,
        Tag {
            id: None,
            name: name.to_string(),
        },
    )
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
        self.events
            .lock()
            .expect("sink events")
            .iter()
            .map(|(action, _)| *action)
            .collect()
    }

    pub fn ids_for(&self, wanted: ChangeAction) -> Vec<String> {
        self.events
            .lock()
            .expect("sink events")
            .iter()
            .filter(|(action, _)| *action == wanted)
            .flat_map(|(_, ids)| ids.clone())
            .collect()
    }
}

impl ChangeSink for RecordingSink {
    fn notify(&self, action: ChangeAction, change: &RelationChange<'_>) -> Result<()> {
        self.events
            .lock()
            .expect("sink events")
            .push((action, change.ids.to_vec()));
        if self.fail_on == Some(action) {
            return Err(docmodel::Error::custom(format!(
                "sink rejected {}",
                action.as_str()
            )));
        }
        Ok(())
    }
}
