//! Field declarations and per-instance binding.
//!
//! A relationship field lives in two states. The field declaration owns an
//! **unbound** prototype set, a stateless template shared by every
//! instance of the owning type. On first access through a concrete owning
//! instance a **bound** copy is created, cached on that instance, and
//! mutated independently from then on. The transition happens exactly once
//! per instance; assignment of a raw stored value re-normalizes and stays
//! bound to the assigning instance.

use crate::error::{Error, Result};
use crate::model::Model;
use crate::notify::SharedSink;
use crate::oid::ObjectId;
use crate::related::RelatedSet;
use crate::reverse::ReverseManager;
use crate::value::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Which owning instance, if any, a relationship set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// The shared prototype, identical across instances until first access
    #[default]
    Unbound,
    /// Owned by one instance (whose id is absent until the owner is saved)
    Bound {
        /// Identifier of the owning instance, when saved
        owner_id: Option<ObjectId>,
    },
}

impl Binding {
    /// The owning instance's identifier, if bound to a saved owner.
    pub fn owner_id(&self) -> Option<ObjectId> {
        match self {
            Binding::Bound { owner_id } => *owner_id,
            Binding::Unbound => None,
        }
    }

    /// Whether this is the bound state.
    pub const fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound { .. })
    }
}

/// One relationship field declaration on an owning model.
///
/// Fixed at declaration time: the field name, the owning collection, the
/// embed flag, the reverse accessor name (defaulting to
/// `<owner_collection>_set`), and the notification sink handed to every
/// bound copy.
pub struct RelatedDef<M: Model> {
    related_name: String,
    prototype: RelatedSet<M>,
}

impl<M: Model> RelatedDef<M> {
    /// Declare a relationship field.
    pub fn new(field: &'static str, owner_collection: &'static str, embed: bool) -> Self {
        Self {
            related_name: format!("{}_set", owner_collection),
            prototype: RelatedSet::new(field, owner_collection, embed),
        }
    }

    /// Override the reverse accessor name.
    pub fn related_name(mut self, name: impl Into<String>) -> Self {
        self.related_name = name.into();
        self
    }

    /// Set the notification sink handed to every bound copy.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.prototype = self.prototype.with_sink(sink);
        self
    }

    /// The relationship field's name.
    pub fn field(&self) -> &'static str {
        self.prototype.field()
    }

    /// The owning model's collection.
    pub fn owner_collection(&self) -> &'static str {
        self.prototype.owner_collection()
    }

    /// Whether this field stores denormalized copies.
    pub fn embed(&self) -> bool {
        self.prototype.embed()
    }

    /// The reverse accessor name.
    pub fn reverse_name(&self) -> &str {
        &self.related_name
    }

    /// The shared unbound prototype.
    pub fn prototype(&self) -> &RelatedSet<M> {
        &self.prototype
    }

    /// Claim this declaration's reverse accessor name.
    ///
    /// Fails with `DuplicateRelatedName` when another field targeting the
    /// same model already claimed it. Run at composition time, before any
    /// instance exists.
    pub fn register(&self, registry: &mut RelatedNameRegistry) -> Result<()> {
        registry.register(M::COLLECTION, &self.related_name, self.field())
    }

    /// Create the bound copy for one owning instance.
    pub fn bind(&self, owner_id: Option<ObjectId>) -> RelatedSet<M> {
        self.prototype.bind_to(owner_id)
    }

    /// Bind and normalize a raw stored value in one step.
    pub fn assign(&self, owner_id: Option<ObjectId>, raw: &Value) -> Result<RelatedSet<M>> {
        let mut set = self.bind(owner_id);
        set.hydrate(raw)?;
        Ok(set)
    }

    /// Build the reverse lookup for a related object's identifier.
    ///
    /// `O` is the owning model; the query runs against its collection.
    pub fn reverse<O: Model>(&self, related_id: ObjectId) -> ReverseManager<O> {
        ReverseManager::new(self.field(), M::PRIMARY_KEY, related_id)
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for RelatedDef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedDef")
            .field("field", &self.field())
            .field("owner_collection", &self.owner_collection())
            .field("embed", &self.embed())
            .field("related_name", &self.related_name)
            .finish()
    }
}

/// The per-instance cell holding a relationship field's bound state.
///
/// Starts unbound; the first access creates and caches the bound copy.
pub struct RelatedField<M: Model> {
    def: Arc<RelatedDef<M>>,
    bound: OnceLock<RelatedSet<M>>,
}

impl<M: Model> RelatedField<M> {
    /// Create an unbound cell for one owning instance.
    pub fn new(def: Arc<RelatedDef<M>>) -> Self {
        Self {
            def,
            bound: OnceLock::new(),
        }
    }

    /// The field declaration.
    pub fn def(&self) -> &RelatedDef<M> {
        &self.def
    }

    /// Whether the bound copy has been created.
    pub fn is_bound(&self) -> bool {
        self.bound.get().is_some()
    }

    /// Read access, binding lazily on first call.
    pub fn get(&self, owner_id: Option<ObjectId>) -> &RelatedSet<M> {
        self.bound.get_or_init(|| self.def.bind(owner_id))
    }

    /// Write access, binding lazily on first call.
    pub fn get_mut(&mut self, owner_id: Option<ObjectId>) -> &mut RelatedSet<M> {
        if self.bound.get().is_none() {
            let set = self.def.bind(owner_id);
            let _ = self.bound.set(set);
        }
        match self.bound.get_mut() {
            Some(set) => set,
            None => unreachable!(),
        }
    }

    /// Assign a raw stored value, re-normalizing and (re)binding.
    pub fn assign(&mut self, owner_id: Option<ObjectId>, raw: &Value) -> Result<()> {
        let set = self.def.assign(owner_id, raw)?;
        let cell = OnceLock::new();
        let _ = cell.set(set);
        self.bound = cell;
        Ok(())
    }
}

impl<M: Model> Clone for RelatedField<M> {
    fn clone(&self) -> Self {
        let cloned = Self {
            def: Arc::clone(&self.def),
            bound: OnceLock::new(),
        };
        if let Some(set) = self.bound.get() {
            let _ = cloned.bound.set(set.clone());
        }
        cloned
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for RelatedField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_bound() { "bound" } else { "unbound" };
        f.debug_struct("RelatedField")
            .field("field", &self.def.field())
            .field("state", &state)
            .finish()
    }
}

/// Composition-time registry of reverse accessor names.
///
/// Two relationship fields targeting the same model with the same
/// unqualified reverse accessor are a fatal error, reported before any
/// instance is created.
#[derive(Debug, Default)]
pub struct RelatedNameRegistry {
    seen: HashMap<(&'static str, String), &'static str>,
}

impl RelatedNameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` on `target`'s reverse side for `field`.
    pub fn register(
        &mut self,
        target: &'static str,
        name: &str,
        field: &'static str,
    ) -> Result<()> {
        match self.seen.entry((target, name.to_string())) {
            Entry::Occupied(_) => Err(Error::DuplicateRelatedName {
                target,
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(field);
                Ok(())
            }
        }
    }
}
