//! Error types for Docmodel operations.

use std::fmt;

/// The primary error type for all Docmodel operations.
#[derive(Debug)]
pub enum Error {
    /// A value could not be interpreted as an identifier
    InvalidId(InvalidIdError),
    /// Embed-mode serialization referenced an object missing from the store
    Materialize(MaterializeError),
    /// A lazy read referenced an object missing from the store
    NotFound(NotFoundError),
    /// Positional access outside `[0, count)`
    IndexOutOfRange {
        /// The requested position
        index: usize,
        /// The number of entries available
        len: usize,
    },
    /// Two relationship fields target the same model with the same
    /// reverse-accessor name
    DuplicateRelatedName {
        /// Collection of the related model the accessor would live on
        target: &'static str,
        /// The colliding accessor name
        name: String,
    },
    /// Document shape or type mismatch while building a model instance
    Document(DocumentError),
    /// Store/backend failure
    Store(StoreError),
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

/// A value that could not be read as an identifier.
#[derive(Debug)]
pub struct InvalidIdError {
    /// Why the value was rejected
    pub reason: &'static str,
    /// Display form of the offending value
    pub raw: String,
}

/// A dangling reference hit while embedding.
#[derive(Debug)]
pub struct MaterializeError {
    /// Collection the referent should live in
    pub collection: &'static str,
    /// Hex form of the missing identifier
    pub id: String,
}

/// A referent missing from the store during a read.
#[derive(Debug)]
pub struct NotFoundError {
    /// Collection the referent should live in
    pub collection: &'static str,
    /// Hex form of the missing identifier
    pub id: String,
}

/// A field value that did not match the model's schema.
#[derive(Debug)]
pub struct DocumentError {
    /// Collection of the model being built
    pub collection: &'static str,
    /// Storage name of the offending field, if known
    pub field: Option<String>,
    /// What the schema expected
    pub expected: &'static str,
    /// What the document actually held
    pub actual: String,
}

/// A backend failure, with the driver error attached when available.
#[derive(Debug)]
pub struct StoreError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Build an [`Error::InvalidId`].
    pub fn invalid_id(reason: &'static str, raw: impl fmt::Display) -> Self {
        Error::InvalidId(InvalidIdError {
            reason,
            raw: raw.to_string(),
        })
    }

    /// Build an [`Error::Materialize`].
    pub fn materialize(collection: &'static str, id: impl fmt::Display) -> Self {
        Error::Materialize(MaterializeError {
            collection,
            id: id.to_string(),
        })
    }

    /// Build an [`Error::NotFound`].
    pub fn not_found(collection: &'static str, id: impl fmt::Display) -> Self {
        Error::NotFound(NotFoundError {
            collection,
            id: id.to_string(),
        })
    }

    /// Build an [`Error::Document`] with field context.
    pub fn document(
        collection: &'static str,
        field: impl Into<String>,
        expected: &'static str,
        actual: impl fmt::Display,
    ) -> Self {
        Error::Document(DocumentError {
            collection,
            field: Some(field.into()),
            expected,
            actual: actual.to_string(),
        })
    }

    /// Build an [`Error::Store`] from a message only.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(StoreError {
            message: message.into(),
            source: None,
        })
    }

    /// Build an [`Error::Custom`].
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// Is this a missing-referent error (soft during reads)?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Is this an identifier-ingestion error?
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, Error::InvalidId(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidId(e) => write!(f, "Invalid identifier: {}", e),
            Error::Materialize(e) => write!(f, "Materialization error: {}", e),
            Error::NotFound(e) => write!(f, "Not found: {}", e),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for {} entries", index, len)
            }
            Error::DuplicateRelatedName { target, name } => write!(
                f,
                "Duplicate related name '{}' on target collection '{}'",
                name, target
            ),
            Error::Document(e) => write!(f, "Document error: {}", e),
            Error::Store(e) => write!(f, "Store error: {}", e),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for InvalidIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (got {})", self.reason, self.raw)
    }
}

impl fmt::Display for MaterializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot embed '{}' from collection '{}': no stored object",
            self.id, self.collection
        )
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no '{}' in collection '{}'", self.id, self.collection)
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "field '{}' of '{}': expected {}, found {}",
                field, self.collection, self.expected, self.actual
            ),
            None => write!(
                f,
                "'{}': expected {}, found {}",
                self.collection, self.expected, self.actual
            ),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<InvalidIdError> for Error {
    fn from(err: InvalidIdError) -> Self {
        Error::InvalidId(err)
    }
}

impl From<MaterializeError> for Error {
    fn from(err: MaterializeError) -> Self {
        Error::Materialize(err)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Error::Document(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

/// Result type alias for Docmodel operations.
pub type Result<T> = std::result::Result<T, Error>;
