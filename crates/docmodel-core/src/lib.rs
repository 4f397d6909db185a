//! Core types and traits for Docmodel Rust.
//!
//! This crate provides the foundational abstractions for many-to-many
//! relationships over a document store:
//!
//! - `Model` trait for document-struct mapping
//! - `ObjectId` canonical identifiers and their textual codec
//! - `Value`/`Document` dynamic store values
//! - `RelatedSet` relationship manager with embed and reference modes
//! - `RelQuery` lazy, snapshot-isolated query results
//! - `ReverseManager` live reverse-direction lookups
//! - `DocumentStore` trait for backend crates

pub mod binding;
pub mod document;
pub mod entry;
pub mod error;
pub mod field;
pub mod model;
pub mod notify;
pub mod oid;
pub mod query;
pub mod record;
pub mod related;
pub mod reverse;
pub mod store;
pub mod value;

#[cfg(test)]
mod testing;

pub use binding::{Binding, RelatedDef, RelatedField, RelatedNameRegistry};
pub use document::{Document, FromValue};
pub use entry::{RelEntry, StoredShape, normalize_element};
pub use error::{Error, Result};
pub use field::{DocType, FieldInfo};
pub use model::Model;
pub use notify::{ChangeAction, ChangeSink, NullSink, RelationChange, SharedSink};
pub use oid::ObjectId;
pub use query::{Materialize, RelQuery};
pub use record::{RelRecord, parse_record_key};
pub use related::{IntoRelRef, RelRef, RelatedSet};
pub use reverse::ReverseManager;
pub use store::DocumentStore;
pub use value::Value;
