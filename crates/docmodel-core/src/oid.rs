//! Canonical store identifiers.
//!
//! Every related object is addressed by a 12-byte [`ObjectId`]: a 4-byte
//! big-endian seconds timestamp, 5 bytes of per-process random data, and a
//! 3-byte monotonically increasing counter. The textual form is 24 lowercase
//! hex characters. [`ObjectId::from_value`] is the single ingestion point
//! used by every other component: it accepts a native id, its hex textual
//! form, or a stored document keyed by the target schema's primary-key field.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The canonical identifier type for stored documents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

fn process_random() -> &'static [u8; 5] {
    static PROCESS_RANDOM: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_RANDOM.get_or_init(rand::random)
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>()));
    counter.fetch_add(1, Ordering::SeqCst) & 0x00FF_FFFF
}

impl ObjectId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_random());
        bytes[9..12].copy_from_slice(&next_count().to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Build an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parse the 24-character hex textual form.
    pub fn parse_str(s: &str) -> Result<Self> {
        let decoded = hex::decode(s)
            .map_err(|_| Error::invalid_id("expected a 24-character hex string", s))?;
        let bytes: [u8; 12] = decoded
            .try_into()
            .map_err(|_| Error::invalid_id("expected a 24-character hex string", s))?;
        Ok(Self(bytes))
    }

    /// Produce the 24-character lowercase hex textual form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seconds since the epoch recorded at generation time.
    pub fn timestamp(&self) -> u32 {
        let mut secs = [0u8; 4];
        secs.copy_from_slice(&self.0[0..4]);
        u32::from_be_bytes(secs)
    }

    /// Read an identifier out of a stored value.
    ///
    /// Accepts the native id type, its hex textual form, or a stored
    /// document carrying the id under `pk_field`. Everything else is an
    /// [`Error::InvalidId`].
    pub fn from_value(value: &Value, pk_field: &str) -> Result<Self> {
        match value {
            Value::ObjectId(id) => Ok(*id),
            Value::Text(s) => Self::parse_str(s),
            Value::Document(doc) => {
                let inner = doc.get(pk_field).ok_or_else(|| {
                    Error::invalid_id("document has no primary-key field", value.type_name())
                })?;
                match inner {
                    Value::ObjectId(id) => Ok(*id),
                    Value::Text(s) => Self::parse_str(s),
                    other => Err(Error::invalid_id(
                        "primary-key field is not an identifier",
                        other.type_name(),
                    )),
                }
            }
            other => Err(Error::invalid_id(
                "value is not an identifier",
                other.type_name(),
            )),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct ObjectIdVisitor;

impl Visitor<'_> for ObjectIdVisitor {
    type Value = ObjectId;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a 24-character hex string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ObjectId, E> {
        ObjectId::parse_str(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(ObjectIdVisitor)
    }
}
