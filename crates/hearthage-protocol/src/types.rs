use std::fmt;

use serde::{Deserialize, Serialize};

/// Terrain tile codes. The biome map is row-major and immutable after
/// generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Water,
    Grass,
    Forest,
    Mountain,
}

/// Civilization eras, in rule-table order. The classifier never compares
/// eras by rank; table position is the only ordering that matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    Stone,
    Copper,
    Bronze,
    Iron,
    Medieval,
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Era::Stone => "stone",
            Era::Copper => "copper",
            Era::Bronze => "bronze",
            Era::Iron => "iron",
            Era::Medieval => "medieval",
        };
        f.write_str(name)
    }
}

/// Closed resource vocabulary. Storage lookups default absent entries to
/// zero at the type level instead of at each call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Berries,
    Fish,
    Wood,
    Stone,
    Grain,
    Copper,
    Tin,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Berries,
        Resource::Fish,
        Resource::Wood,
        Resource::Stone,
        Resource::Grain,
        Resource::Copper,
        Resource::Tin,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Berries => "berries",
            Resource::Fish => "fish",
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Grain => "grain",
            Resource::Copper => "copper",
            Resource::Tin => "tin",
        };
        f.write_str(name)
    }
}

/// Per-settlement (or per-neighbor) resource stockpile.
///
/// Fixed shape: one non-negative count per [`Resource`], zero by default.
/// Deductions clamp at zero; counts never go negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub berries: u32,
    #[serde(default)]
    pub fish: u32,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub stone: u32,
    #[serde(default)]
    pub grain: u32,
    #[serde(default)]
    pub copper: u32,
    #[serde(default)]
    pub tin: u32,
}

impl Storage {
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Berries => self.berries,
            Resource::Fish => self.fish,
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Grain => self.grain,
            Resource::Copper => self.copper,
            Resource::Tin => self.tin,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Berries => &mut self.berries,
            Resource::Fish => &mut self.fish,
            Resource::Wood => &mut self.wood,
            Resource::Stone => &mut self.stone,
            Resource::Grain => &mut self.grain,
            Resource::Copper => &mut self.copper,
            Resource::Tin => &mut self.tin,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot(resource);
        *slot = slot.saturating_add(amount);
    }

    /// Deduct `amount`, clamped at zero.
    pub fn deduct_clamped(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot(resource);
        *slot = slot.saturating_sub(amount);
    }

    pub fn has(&self, resource: Resource, amount: u32) -> bool {
        self.get(resource) >= amount
    }
}

impl FromIterator<(Resource, u32)> for Storage {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(iter: I) -> Self {
        let mut storage = Storage::default();
        for (resource, amount) in iter {
            storage.add(resource, amount);
        }
        storage
    }
}

/// Diplomatic standing of a neighbor toward the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomaticStatus {
    Peace,
    Truce,
    War,
}

/// Player-initiated diplomatic action kinds. A proposal that omits the
/// kind means a gift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomacyKind {
    #[default]
    Gift,
    Trade,
    Peace,
    War,
}

/// Integer position within the world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_deduction_clamps_at_zero() {
        let mut storage: Storage = [(Resource::Wood, 5)].into_iter().collect();
        storage.deduct_clamped(Resource::Wood, 8);
        assert_eq!(storage.get(Resource::Wood), 0);
        storage.deduct_clamped(Resource::Stone, 3);
        assert_eq!(storage.get(Resource::Stone), 0);
    }

    #[test]
    fn storage_defaults_missing_entries_to_zero() {
        let storage = Storage::default();
        for resource in Resource::ALL {
            assert_eq!(storage.get(resource), 0);
        }
    }
}
