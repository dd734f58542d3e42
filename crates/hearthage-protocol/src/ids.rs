use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle to a settlement, generated once at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(pub Uuid);

impl SettlementId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Stable handle to an autonomous neighboring faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborId(pub Uuid);

impl NeighborId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}
