use serde::{Deserialize, Serialize};

use crate::{DiplomacyKind, Resource, SettlementId};

/// A player-submitted intended action awaiting validation and application.
///
/// Either `action` is present (structured) or `intent_text` carries free
/// text for the intent resolver to translate before validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub player_id: String,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub intent_text: Option<String>,
}

/// All proposal actions the simulation understands. Fully serializable.
///
/// `Craft` and `Defend` are reserved vocabulary: declared so clients can
/// submit them, rejected explicitly by validation until they gain effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Harvest {
        resource: Resource,
        amount: u32,
        #[serde(default)]
        settlement: Option<SettlementId>,
    },
    Build {
        structure: String,
        #[serde(default)]
        settlement: Option<SettlementId>,
    },
    Research {
        tech: String,
    },
    Migrate,
    Diplomacy {
        #[serde(default)]
        kind: DiplomacyKind,
        /// Neighbor name; empty or unmatched falls back to the first
        /// neighbor.
        #[serde(default)]
        target: String,
        #[serde(default)]
        resource: Option<Resource>,
        #[serde(default)]
        want: Option<Resource>,
        #[serde(default)]
        amount: Option<u32>,
    },
    Craft,
    Defend,
}

impl Action {
    /// Short name for error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Harvest { .. } => "harvest",
            Action::Build { .. } => "build",
            Action::Research { .. } => "research",
            Action::Migrate => "migrate",
            Action::Diplomacy { .. } => "diplomacy",
            Action::Craft => "craft",
            Action::Defend => "defend",
        }
    }
}
