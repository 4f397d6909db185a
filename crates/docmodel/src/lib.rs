//! Docmodel Rust - document-database relationships, designed to be intuitive
//! and type-safe.
//!
//! Docmodel layers many-to-many relationships over a document store.
//! Application models declare relationship fields whose related objects are
//! stored either as references (ids only) or as denormalized embedded
//! copies, behind one collection-like interface:
//!
//! - Idempotent `add`/`remove`/`clear` mutations with synchronous pre/post
//!   change notifications
//! - Lazy materialization: related objects are fetched on first access and
//!   cached per entry
//! - Transparent migration of legacy stored encodings (bare id lists,
//!   previously embedded object lists)
//! - Live reverse lookups via nested store queries, no in-memory index
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use docmodel_memory::MemoryStore;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Category {
//!     id: Option<ObjectId>,
//!     title: String,
//! }
//!
//! // impl Model for Category { ... } with collection name, field descriptors,
//! // document conversion, identifier accessors.
//!
//! fn example(store: &MemoryStore) -> Result<()> {
//!     // Declare the field once per owning type: reference mode here,
//!     // embed=true to store full denormalized copies instead.
//!     let categories = RelatedDef::<Category>::new("categories", "articles", false);
//!
//!     // Bind per owning instance, then mutate.
//!     let mut set = categories.bind(None);
//!     let cat = set.create(store, Document::from([("title", Value::from("Cats"))]))?;
//!     assert!(set.contains(&cat)?);
//!
//!     // Serialize for the owner's document; load back later with hydrate().
//!     let stored = set.to_store(store)?;
//!     let mut reloaded = categories.bind(None);
//!     reloaded.hydrate(&stored)?;
//!     assert_eq!(reloaded.ids(), set.ids());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Dual-mode storage**: one field declaration flips between reference
//!   and embedded representations
//! - **Snapshot-isolated queries**: results wrap a copy of the entries, so
//!   later mutation never bleeds into an existing result
//! - **Injected notifications**: an explicit sink instead of a process-wide
//!   signal bus; a failing pre-phase listener aborts the mutation
//! - **Synchronous, blocking core**: no async runtime; callers own their
//!   concurrency

// Re-export all public types from sub-crates
pub use docmodel_core::{
    Binding,
    ChangeAction,
    ChangeSink,
    DocType,
    Document,
    DocumentStore,
    Error,
    FieldInfo,
    FromValue,
    IntoRelRef,
    Materialize,
    Model,
    NullSink,
    ObjectId,
    RelEntry,
    RelQuery,
    RelRecord,
    RelRef,
    RelatedDef,
    RelatedField,
    RelatedNameRegistry,
    RelatedSet,
    RelationChange,
    Result,
    ReverseManager,
    SharedSink,
    StoredShape,
    Value,
    normalize_element,
    parse_record_key,
};

pub use docmodel_memory::MemoryStore;

/// Commonly used types, importable in one line:
///
/// ```ignore
/// use docmodel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChangeAction,
        ChangeSink,
        DocType,
        Document,
        DocumentStore,
        Error,
        FieldInfo,
        Model,
        NullSink,
        ObjectId,
        RelQuery,
        RelatedDef,
        RelatedField,
        RelatedNameRegistry,
        RelatedSet,
        RelationChange,
        Result,
        ReverseManager,
        Value,
    };
}
