//! Constant registry: the interning cache for identified terms.
//!
//! The [`ConstantRegistry`] gives every GUID exactly one live [`Constant`]
//! instance and provides O(1) lookups by GUID and by name using two
//! `DashMap`s. Indexed [`Nart`]s are kept alongside, keyed by GUID and by
//! structure, so the reader can hand back the canonical indexed form of a
//! functional term it has seen before.
//!
//! Lock order is always GUID map → name map; no method holds a name-map
//! guard while touching a GUID map.

use std::sync::OnceLock;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{InternError, WireResult};
use crate::term::nart::NartKey;
use crate::term::{Constant, Guid, Nart, Term};

static GLOBAL: OnceLock<ConstantRegistry> = OnceLock::new();

/// Bidirectional constant store plus the indexed-NART tables.
pub struct ConstantRegistry {
    /// Forward map: GUID → canonical instance (source of truth).
    by_guid: DashMap<Guid, Constant>,
    /// Reverse map: constant name → GUID.
    by_name: DashMap<String, Guid>,
    /// Indexed NARTs by GUID.
    narts: DashMap<Guid, Nart>,
    /// Structural index: (functor, args) → GUID.
    nart_structure: DashMap<NartKey, Guid>,
}

impl ConstantRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            by_guid: DashMap::new(),
            by_name: DashMap::new(),
            narts: DashMap::new(),
            nart_structure: DashMap::new(),
        }
    }

    /// The process-wide registry shared by every reader that is not given
    /// its own.
    pub fn global() -> &'static ConstantRegistry {
        GLOBAL.get_or_init(ConstantRegistry::new)
    }

    /// Return the canonical constant for `guid`, creating it on first sight.
    ///
    /// The GUID check and the insert happen under one shard lock, so racing
    /// callers always receive the same instance. Registering a new GUID under
    /// a name another GUID already holds fails with
    /// [`InternError::Conflict`]; renames go through
    /// [`ConstantRegistry::rename`].
    pub fn intern(&self, name: &str, guid: Guid) -> WireResult<Constant> {
        match self.by_guid.entry(guid) {
            Entry::Occupied(entry) => {
                let existing = entry.get().clone();
                if existing.name() != name {
                    tracing::debug!(
                        %guid,
                        registered = existing.name(),
                        requested = name,
                        "intern: keeping registered name for known guid"
                    );
                }
                Ok(existing)
            }
            Entry::Vacant(slot) => {
                self.claim_name(name, guid)?;
                let constant = Constant::new(name, guid);
                slot.insert(constant.clone());
                tracing::debug!(%guid, name, "intern: registered constant");
                Ok(constant)
            }
        }
    }

    /// Map `name` to `guid`, failing if another GUID holds it.
    fn claim_name(&self, name: &str, guid: Guid) -> WireResult<()> {
        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(entry) if *entry.get() != guid => {
                let existing = *entry.get();
                tracing::warn!(name, %existing, requested = %guid, "intern: name conflict");
                Err(InternError::Conflict {
                    name: name.to_string(),
                    existing: existing.to_string(),
                    requested: guid.to_string(),
                }
                .into())
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(guid);
                Ok(())
            }
        }
    }

    /// Look up a constant by GUID.
    pub fn lookup_guid(&self, guid: Guid) -> Option<Constant> {
        self.by_guid.get(&guid).map(|r| r.value().clone())
    }

    /// Look up a constant by exact name.
    pub fn lookup_name(&self, name: &str) -> Option<Constant> {
        let guid = self.by_name.get(name).map(|r| *r.value())?;
        self.lookup_guid(guid)
    }

    /// Remove both mappings of `constant`. Returns whether it was registered.
    ///
    /// Both removals happen under the GUID shard lock, so a racing `intern`
    /// of the same GUID either sees the constant still registered or finds
    /// both mappings gone.
    pub fn forget(&self, constant: &Constant) -> bool {
        let guid = constant.guid();
        match self.by_guid.entry(guid) {
            Entry::Occupied(entry) => {
                self.by_name
                    .remove_if(entry.get().name(), |_, held| *held == guid);
                let (_, registered) = entry.remove_entry();
                tracing::debug!(%guid, name = registered.name(), "forget: removed constant");
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Give a registered constant a new name, returning the new canonical
    /// instance. Handles to the old instance keep the old name.
    pub fn rename(&self, constant: &Constant, new_name: &str) -> WireResult<Constant> {
        let guid = constant.guid();
        match self.by_guid.entry(guid) {
            Entry::Vacant(_) => Err(InternError::NotRegistered {
                name: constant.name().to_string(),
                guid: guid.to_string(),
            }
            .into()),
            Entry::Occupied(mut entry) => {
                self.claim_name(new_name, guid)?;
                let old_name = entry.get().name().to_string();
                if old_name != new_name {
                    self.by_name.remove_if(&old_name, |_, held| *held == guid);
                }
                let renamed = Constant::new(new_name, guid);
                entry.insert(renamed.clone());
                tracing::debug!(%guid, from = %old_name, to = new_name, "rename: constant renamed");
                Ok(renamed)
            }
        }
    }

    /// Drop every constant and NART.
    ///
    /// Each constant's name goes with it under its GUID shard lock, the same
    /// order `forget` uses.
    pub fn reset(&self) {
        self.by_guid.retain(|guid, constant| {
            self.by_name.remove_if(constant.name(), |_, held| held == guid);
            false
        });
        self.narts.clear();
        self.nart_structure.clear();
        tracing::debug!("reset: registry cleared");
    }

    // -----------------------------------------------------------------------
    // Indexed NARTs
    // -----------------------------------------------------------------------

    /// Return the canonical indexed NART for `guid`, registering it on first
    /// sight. A structure already indexed under a different GUID is a
    /// conflict.
    pub fn intern_nart(&self, functor: Term, args: Vec<Term>, guid: Guid) -> WireResult<Nart> {
        match self.narts.entry(guid) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(slot) => {
                let nart = Nart::indexed(functor, args, guid);
                match self.nart_structure.entry(nart.key()) {
                    Entry::Occupied(held) if *held.get() != guid => {
                        let label = nart.to_list();
                        return Err(InternError::Conflict {
                            name: Term::List(label).to_string(),
                            existing: held.get().to_string(),
                            requested: guid.to_string(),
                        }
                        .into());
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(held) => {
                        held.insert(guid);
                    }
                }
                slot.insert(nart.clone());
                tracing::debug!(%guid, "intern: registered indexed nart");
                Ok(nart)
            }
        }
    }

    /// Look up an indexed NART by GUID.
    pub fn lookup_nart(&self, guid: Guid) -> Option<Nart> {
        self.narts.get(&guid).map(|r| r.value().clone())
    }

    /// Find the indexed NART with this functor and these arguments.
    pub fn find_nart(&self, functor: &Term, args: &[Term]) -> Option<Nart> {
        let key = NartKey {
            functor: functor.clone(),
            args: args.to_vec(),
        };
        let guid = self.nart_structure.get(&key).map(|r| *r.value())?;
        self.lookup_nart(guid)
    }

    /// Remove an indexed NART. Returns whether it was registered.
    pub fn forget_nart(&self, nart: &Nart) -> bool {
        let Some(guid) = nart.guid() else {
            return false;
        };
        let removed = self.narts.remove(&guid);
        if let Some((_, registered)) = &removed {
            self.nart_structure
                .remove_if(&registered.key(), |_, held| *held == guid);
        }
        removed.is_some()
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Snapshot of all registered constants.
    pub fn constants(&self) -> Vec<Constant> {
        self.by_guid.iter().map(|r| r.value().clone()).collect()
    }

    /// Number of registered constants.
    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    /// Whether no constants are registered.
    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }

    /// Number of indexed NARTs.
    pub fn nart_count(&self) -> usize {
        self.narts.len()
    }
}

impl Default for ConstantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConstantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantRegistry")
            .field("constants", &self.len())
            .field("narts", &self.nart_count())
            .finish()
    }
}
