//! Junction-record presentation of relationship results.
//!
//! Some collaborators (admin layers, form machinery) expect a relationship
//! to look like rows of an intermediate table pairing the owner with each
//! related object. [`RelRecord`] is that presentation and nothing more: it
//! owns no storage and issues no queries; record-style add/delete calls
//! belong on the relationship manager itself.

use crate::error::{Error, Result};
use crate::oid::ObjectId;

/// One synthetic relationship row: an owner paired with a related object.
///
/// The composite key is `"<owner_hex>$<related_hex>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelRecord<M> {
    /// Composite key identifying this pairing
    pub key: String,
    /// Identifier of the owning instance
    pub owner_id: ObjectId,
    /// The related object
    pub object: M,
}

impl<M> RelRecord<M> {
    /// Pair an owner with a related object.
    pub fn new(owner_id: ObjectId, related_id: ObjectId, object: M) -> Self {
        Self {
            key: format!("{}${}", owner_id.to_hex(), related_id.to_hex()),
            owner_id,
            object,
        }
    }
}

/// Split a composite record key back into (owner, related) identifiers.
pub fn parse_record_key(key: &str) -> Result<(ObjectId, ObjectId)> {
    let (owner, related) = key
        .split_once('$')
        .ok_or_else(|| Error::invalid_id("record key has no '$' separator", key))?;
    Ok((ObjectId::parse_str(owner)?, ObjectId::parse_str(related)?))
}
