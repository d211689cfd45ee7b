//! Transition table aggregation.
//!
//! The table is an explicit accumulator value owned by the build step: it
//! maps each packed 2-token context to the set of successor identifiers
//! observed after it, and separately tracks which identifiers may start a
//! sequence. Entries are never removed; a build only grows the table.

use std::collections::{BTreeSet, HashMap};

use crate::types::{ContextKey, TokenId, pack_key};

/// Aggregated order-2 transition table.
///
/// Successor sets use set semantics: re-inserting an observed transition is
/// a no-op, so only presence is recorded. Merging two tables is a set
/// union on shared keys, which is commutative and idempotent; partial
/// tables built on worker threads therefore reduce in any order without
/// double counting.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    /// Context key to ascending successor set. Source of truth for the
    /// compact encoder.
    successors: HashMap<ContextKey, BTreeSet<TokenId>>,
    /// Identifiers observed immediately after the start sentinel.
    start_ids: BTreeSet<TokenId>,
    /// Identifier of the start sentinel in the owning vocabulary.
    start_id: TokenId,
}

impl TransitionTable {
    /// Creates an empty table whose Start-Set tracks successors of the
    /// given start-sentinel identifier.
    pub fn new(start_id: TokenId) -> Self {
        Self {
            successors: HashMap::new(),
            start_ids: BTreeSet::new(),
            start_id,
        }
    }

    /// Records one observed identifier triplet.
    ///
    /// Packs `(id1, id2)` into a context key and adds `id3` to its
    /// successor set. When `id1` is the start sentinel, `id2` also joins
    /// the Start-Set: it is the first real token of its sequence.
    pub fn insert(&mut self, (id1, id2, id3): (TokenId, TokenId, TokenId)) {
        self.successors
            .entry(pack_key(id1, id2))
            .or_default()
            .insert(id3);

        if id1 == self.start_id {
            self.start_ids.insert(id2);
        }
    }

    /// Set-unions `other` into `self` and returns the combined table.
    ///
    /// Both tables must come from the same vocabulary; merging is how
    /// per-worker partial tables reduce into the final one.
    pub fn merge(mut self, other: TransitionTable) -> TransitionTable {
        for (key, ids) in other.successors {
            self.successors.entry(key).or_default().extend(ids);
        }
        self.start_ids.extend(other.start_ids);
        self
    }

    /// Successor set for the context `(id1, id2)`, if observed.
    pub fn successors_of(&self, id1: TokenId, id2: TokenId) -> Option<&BTreeSet<TokenId>> {
        self.successors.get(&pack_key(id1, id2))
    }

    /// Number of distinct context keys.
    pub fn key_count(&self) -> usize {
        self.successors.len()
    }

    /// The identifiers allowed to begin a generated sequence.
    pub fn start_ids(&self) -> &BTreeSet<TokenId> {
        &self.start_ids
    }

    pub(crate) fn successor_map(&self) -> &HashMap<ContextKey, BTreeSet<TokenId>> {
        &self.successors
    }
}
