use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{DiplomaticStatus, Era, GridPos, NeighborId, SettlementId, Storage, Tile};

/// The set of known technology ids.
///
/// The idiomatic rendition of a sparse `id -> bool` map: absent means
/// unknown, present means known. Grants are idempotent and never revoked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechSet(BTreeSet<String>);

impl TechSet {
    pub fn knows(&self, tech: &str) -> bool {
        self.0.contains(tech)
    }

    /// Mark a technology known. Research is irreversible; there is no
    /// corresponding removal.
    pub fn grant(&mut self, tech: impl Into<String>) {
        self.0.insert(tech.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for TechSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A player settlement. Owned exclusively by [`World`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub pos: GridPos,
    pub storage: Storage,
    /// Append-only; no demolition is modeled and duplicates are allowed.
    pub structures: Vec<String>,
    pub pop: u32,
    pub era: Era,
}

/// An autonomous non-player faction. Owned exclusively by [`World`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: NeighborId,
    pub name: String,
    /// Disposition toward the player. Nominally [-100, 100], but nothing
    /// hard-clamps it; the per-tick relaxation pulls it back toward zero.
    pub attitude: i32,
    pub status: DiplomaticStatus,
    pub pop: u32,
    pub storage: Storage,
    /// The faction's own research progress, disjoint from the player's.
    pub tech: TechSet,
}

/// The single authoritative world aggregate.
///
/// Snapshots handed to the step function are never mutated in place; the
/// step clones, transforms, and returns a new value so callers can diff
/// old against new.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub seed: String,
    pub width: u32,
    pub height: u32,
    /// Row-major terrain, `width * height` entries. Immutable after
    /// generation.
    pub biome_map: Vec<Tile>,
    /// Incremented exactly once per simulation step.
    pub tick: u64,
    /// Shared global research progress (not per-settlement).
    pub tech: TechSet,
    pub settlements: Vec<Settlement>,
    pub neighbors: Vec<Neighbor>,
    pub era: Era,
}

impl World {
    /// Resolve a settlement by id, falling back to the first settlement
    /// when the id is missing or unmatched.
    pub fn settlement_or_first(&self, id: Option<SettlementId>) -> Option<&Settlement> {
        match id {
            Some(id) => self
                .settlements
                .iter()
                .find(|s| s.id == id)
                .or_else(|| self.settlements.first()),
            None => self.settlements.first(),
        }
    }

    pub fn settlement_or_first_mut(&mut self, id: Option<SettlementId>) -> Option<&mut Settlement> {
        let index = match id {
            Some(id) => self
                .settlements
                .iter()
                .position(|s| s.id == id)
                .unwrap_or(0),
            None => 0,
        };
        self.settlements.get_mut(index)
    }
}
