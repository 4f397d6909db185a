//! Model trait for document-struct mapping.
//!
//! The `Model` trait defines the contract for structs stored as documents in
//! a collection. Relationship machinery only ever talks to related types
//! through this trait: fetch-by-identifier, an ordered list of field
//! descriptors, and a designated primary-key field.

use crate::document::Document;
use crate::error::Result;
use crate::field::FieldInfo;
use crate::oid::ObjectId;

/// Trait for types stored as documents in a collection.
///
/// # Example
///
/// ```ignore
/// use docmodel_core::{DocType, Document, FieldInfo, Model, ObjectId, Result, Value};
///
/// #[derive(Debug, Clone, Default)]
/// struct Category {
///     id: Option<ObjectId>,
///     title: String,
/// }
///
/// impl Model for Category {
///     const COLLECTION: &'static str = "categories";
///     const PRIMARY_KEY: &'static str = "id";
///
///     fn fields() -> &'static [FieldInfo] {
///         static FIELDS: &[FieldInfo] = &[
///             FieldInfo::new("id", "id", DocType::ObjectId).primary_key(true),
///             FieldInfo::new("title", "title", DocType::Text),
///         ];
///         FIELDS
///     }
///
///     fn to_document(&self) -> Document {
///         let mut doc = Document::new();
///         doc.insert("id", Value::from(self.id));
///         doc.insert("title", self.title.as_str());
///         doc
///     }
///
///     fn from_document(doc: &Document) -> Result<Self> {
///         let mut category = Category::default();
///         if doc.contains_key("id") {
///             category.id = doc.get_as("id")?;
///         }
///         if doc.contains_key("title") {
///             category.title = doc.get_as("title")?;
///         }
///         Ok(category)
///     }
///
///     fn id(&self) -> Option<ObjectId> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Model: Sized + Clone + Send + Sync {
    /// The name of the store collection.
    const COLLECTION: &'static str;

    /// The primary key's storage field name.
    const PRIMARY_KEY: &'static str;

    /// Get field metadata for all stored fields, in schema order.
    fn fields() -> &'static [FieldInfo];

    /// Convert this instance to a stored document.
    ///
    /// Every field is written under its storage name, each value passed
    /// through the field's own pre-store conversion.
    fn to_document(&self) -> Document;

    /// Construct an instance from a stored document.
    ///
    /// Fields absent from the document are left at the model's own
    /// defaults rather than treated as errors; unrecognized fields are
    /// ignored.
    fn from_document(doc: &Document) -> Result<Self>;

    /// Get the identifier, if this instance has been assigned one.
    fn id(&self) -> Option<ObjectId>;

    /// Set the identifier.
    fn set_id(&mut self, id: ObjectId);

    /// Check if this is a new instance (no identifier assigned).
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Get the designated primary-key field descriptor.
    fn primary_key_field() -> Option<&'static FieldInfo> {
        Self::fields().iter().find(|f| f.primary_key)
    }
}
