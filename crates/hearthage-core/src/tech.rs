//! Research gating: prerequisite and cost checks against the tech table.

use thiserror::Error;

use hearthage_protocol::{Resource, Storage, TechSet, World};

use crate::rules::Rules;

/// Why a technology cannot be researched right now. Rendered verbatim into
/// the validation message shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResearchBlock {
    #[error("Unknown tech")]
    UnknownTech,
    #[error("Already known")]
    AlreadyKnown,
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),
    #[error("Not enough {0}")]
    InsufficientResource(Resource),
}

/// Check whether `tech` is researchable given a set of known technologies
/// and the stockpile paying for it. Side-effect-free.
///
/// Prerequisites are checked in table-declaration order and costs in
/// cost-line order; the first failure is reported. `storage` is the
/// player's first settlement stockpile, also when the neighbor AI reuses
/// this check for its own research (see `neighbor_ai`).
pub fn can_research(
    rules: &Rules,
    known: &TechSet,
    storage: Option<&Storage>,
    tech: &str,
) -> Result<(), ResearchBlock> {
    let spec = rules.tech(tech).ok_or(ResearchBlock::UnknownTech)?;
    if known.knows(tech) {
        return Err(ResearchBlock::AlreadyKnown);
    }
    for req in &spec.requires {
        if !known.knows(req) {
            return Err(ResearchBlock::MissingPrerequisite(req.clone()));
        }
    }
    if let Some(storage) = storage {
        for line in &spec.cost {
            if !storage.has(line.resource, line.amount) {
                return Err(ResearchBlock::InsufficientResource(line.resource));
            }
        }
    }
    Ok(())
}

/// Deduct the tech's cost from the first settlement's storage, clamped at
/// zero per resource. No-op when the tech has no cost or no settlement
/// exists. Mutates the given world; the caller operates on a copy.
pub fn pay_tech_cost(rules: &Rules, world: &mut World, tech: &str) {
    let Some(spec) = rules.tech(tech) else {
        return;
    };
    let Some(settlement) = world.settlements.first_mut() else {
        return;
    };
    for line in &spec.cost {
        settlement
            .storage
            .deduct_clamped(line.resource, line.amount);
    }
}
