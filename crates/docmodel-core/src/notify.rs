//! Relationship change notifications.
//!
//! Mutations on a relationship bracket their commit with pre/post
//! notifications delivered synchronously to an injected [`ChangeSink`];
//! there is no process-wide signal bus. A sink error aborts the rest of the
//! mutation: a failing pre-add means the add never commits.

use crate::error::Result;
use crate::oid::ObjectId;
use std::sync::Arc;

/// The mutation phase being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// About to add the listed identifiers
    PreAdd,
    /// The listed identifiers were added
    PostAdd,
    /// About to remove the listed identifiers
    PreRemove,
    /// The listed identifiers were removed
    PostRemove,
    /// About to remove every entry
    PreClear,
    /// Every entry was removed
    PostClear,
}

impl ChangeAction {
    /// Wire name of this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::PreAdd => "pre_add",
            ChangeAction::PostAdd => "post_add",
            ChangeAction::PreRemove => "pre_remove",
            ChangeAction::PostRemove => "post_remove",
            ChangeAction::PreClear => "pre_clear",
            ChangeAction::PostClear => "post_clear",
        }
    }

    /// Does this action fire before the commit?
    #[must_use]
    pub const fn is_pre(&self) -> bool {
        matches!(
            self,
            ChangeAction::PreAdd | ChangeAction::PreRemove | ChangeAction::PreClear
        )
    }
}

/// Everything a listener learns about one mutation phase.
#[derive(Debug)]
pub struct RelationChange<'a> {
    /// Name of the relationship field being mutated
    pub field: &'a str,
    /// Collection of the owning model
    pub owner_collection: &'a str,
    /// Identifier of the owning instance, when bound to a saved owner
    pub owner_id: Option<ObjectId>,
    /// Collection of the related model
    pub target_collection: &'a str,
    /// Whether the mutation came in through the reverse accessor
    pub reverse: bool,
    /// String-form identifiers affected, in entry order
    pub ids: &'a [String],
}

/// A listener for relationship mutations.
///
/// Delivery is synchronous and in-line with the mutation. Returning an
/// error from a pre-phase prevents the commit; returning an error from a
/// post-phase propagates to the caller after the commit.
pub trait ChangeSink: Send + Sync {
    /// Observe one mutation phase.
    fn notify(&self, action: ChangeAction, change: &RelationChange<'_>) -> Result<()>;
}

/// A sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn notify(&self, _action: ChangeAction, _change: &RelationChange<'_>) -> Result<()> {
        Ok(())
    }
}

/// Shared handle to a sink, cloned into every bound relationship set.
pub type SharedSink = Arc<dyn ChangeSink>;
