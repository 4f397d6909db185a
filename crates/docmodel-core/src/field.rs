//! Field and schema-type definitions.

/// The schema type of a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    /// Native store identifier
    ObjectId,
    /// Text string
    Text,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Double,
    /// Boolean
    Bool,
    /// Binary data
    Bytes,
    /// Array of values
    Array,
    /// Nested document
    Document,
}

impl DocType {
    /// Get the name of this schema type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            DocType::ObjectId => "objectid",
            DocType::Text => "text",
            DocType::Int => "int",
            DocType::Double => "double",
            DocType::Bool => "bool",
            DocType::Bytes => "bytes",
            DocType::Array => "array",
            DocType::Document => "document",
        }
    }
}

/// Metadata about a model field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Stored field name (may differ from the Rust name)
    pub storage_name: &'static str,
    /// Schema type for this field
    pub doc_type: DocType,
    /// Whether this is the primary key
    pub primary_key: bool,
    /// Whether this field may hold null
    pub nullable: bool,
}

impl FieldInfo {
    /// Create a new field info with minimal required data.
    pub const fn new(name: &'static str, storage_name: &'static str, doc_type: DocType) -> Self {
        Self {
            name,
            storage_name,
            doc_type,
            primary_key: false,
            nullable: false,
        }
    }

    /// Set the stored field name.
    pub const fn storage(mut self, name: &'static str) -> Self {
        self.storage_name = name;
        self
    }

    /// Set the primary key flag.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set the nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }
}
