//! Proposal validation and the authoritative step function.
//!
//! `step` never mutates the input world. It clones, applies at most one
//! player action, then runs the passive phases in a fixed order: resource
//! trickle, era recomputation, diplomacy, neighbor AI. All narration comes
//! back as events tagged with the new tick.

use thiserror::Error;

use hearthage_protocol::{Action, GameEvent, Proposal, Resource, World};

use crate::diplomacy::{diplomacy_tick, handle_diplomacy};
use crate::era::compute_era;
use crate::neighbor_ai::neighbor_ai_tick;
use crate::rng::SimRng;
use crate::rules::Rules;
use crate::tech::{can_research, pay_tech_cost, ResearchBlock};

/// Why a proposal was rejected. Rendered verbatim to the player.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No action")]
    NoAction,
    #[error("Cannot research {tech}: {block}")]
    Research { tech: String, block: ResearchBlock },
    #[error("Unknown settlement.")]
    UnknownSettlement,
    #[error("Need {amount} {resource} to build {structure}")]
    InsufficientResource {
        amount: u32,
        resource: Resource,
        structure: String,
    },
    #[error("Harvest amount must be > 0")]
    NonPositiveHarvest,
    #[error("That action is not implemented yet.")]
    ActionNotImplemented,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("That action is not implemented yet.")]
    ActionNotImplemented,
}

/// A stepped world plus the narration it produced.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub world: World,
    pub events: Vec<GameEvent>,
}

/// Check a proposal against the current world without applying it.
///
/// A proposal with no action is rejected here; intent text is resolved
/// into an action before validation, not during it.
pub fn validate_proposal(
    rules: &Rules,
    world: &World,
    proposal: &Proposal,
) -> Result<(), ValidationError> {
    let Some(action) = &proposal.action else {
        return Err(ValidationError::NoAction);
    };
    validate_action(rules, world, action)
}

pub fn validate_action(rules: &Rules, world: &World, action: &Action) -> Result<(), ValidationError> {
    match action {
        Action::Research { tech } => {
            let storage = world.settlements.first().map(|s| &s.storage);
            can_research(rules, &world.tech, storage, tech).map_err(|block| {
                ValidationError::Research {
                    tech: tech.clone(),
                    block,
                }
            })
        }
        Action::Build {
            structure,
            settlement,
        } => {
            let Some(s) = world.settlement_or_first(*settlement) else {
                return Err(ValidationError::UnknownSettlement);
            };
            for line in rules.structures.cost_of(structure) {
                if !s.storage.has(line.resource, line.amount) {
                    return Err(ValidationError::InsufficientResource {
                        amount: line.amount,
                        resource: line.resource,
                        structure: structure.clone(),
                    });
                }
            }
            Ok(())
        }
        Action::Harvest { amount, .. } => {
            if *amount == 0 {
                return Err(ValidationError::NonPositiveHarvest);
            }
            Ok(())
        }
        Action::Diplomacy { .. } | Action::Migrate => Ok(()),
        Action::Craft | Action::Defend => Err(ValidationError::ActionNotImplemented),
    }
}

/// Advance the world by one tick.
///
/// The input world is untouched; on success the returned outcome carries
/// the successor world. Craft and defend are rejected before any phase
/// runs, so a failed step leaves nothing half-applied.
pub fn step(
    rules: &Rules,
    world: &World,
    proposal: Option<&Proposal>,
    rng: &mut SimRng,
) -> Result<StepOutcome, StepError> {
    if let Some(Action::Craft | Action::Defend) = proposal.and_then(|p| p.action.as_ref()) {
        return Err(StepError::ActionNotImplemented);
    }

    let mut world = world.clone();
    world.tick += 1;
    let tick = world.tick;
    let mut events = Vec::new();

    if let Some(action) = proposal.and_then(|p| p.action.as_ref()) {
        match action {
            Action::Harvest {
                resource,
                amount,
                settlement,
            } => {
                if let Some(s) = world.settlement_or_first_mut(*settlement) {
                    s.storage.add(*resource, *amount);
                    events.push(GameEvent::new(
                        tick,
                        format!("Gathered {amount} {resource} at {}.", s.name),
                    ));
                }
            }
            Action::Build {
                structure,
                settlement,
            } => {
                let cost = rules.structures.cost_of(structure).to_vec();
                if let Some(s) = world.settlement_or_first_mut(*settlement) {
                    for line in &cost {
                        s.storage.deduct_clamped(line.resource, line.amount);
                    }
                    s.structures.push(structure.clone());
                    events.push(GameEvent::new(
                        tick,
                        format!("Built a {structure} at {}.", s.name),
                    ));
                }
            }
            Action::Research { tech } => {
                // Gating happened at validation time; the step grants
                // unconditionally and pays whatever is affordable.
                world.tech.grant(tech);
                pay_tech_cost(rules, &mut world, tech);
                events.push(GameEvent::new(tick, format!("Discovered {tech}.")));
            }
            Action::Diplomacy {
                kind,
                target,
                resource,
                want,
                amount,
            } => {
                events.extend(handle_diplomacy(
                    rules, &mut world, *kind, target, *resource, *want, *amount,
                ));
            }
            Action::Migrate => {
                let width = world.width as i32;
                let height = world.height as i32;
                if let Some(s) = world.settlements.first_mut() {
                    let dx = if rng.chance(0.5) { -2 } else { 2 };
                    let dy = if rng.chance(0.5) { -2 } else { 2 };
                    s.pos.x = (s.pos.x + dx).clamp(2, width - 3);
                    s.pos.y = (s.pos.y + dy).clamp(2, height - 3);
                    events.push(GameEvent::new(tick, "The camp has moved to a new area."));
                }
            }
            Action::Craft | Action::Defend => unreachable!("rejected above"),
        }
    }

    // Passive trickle.
    for s in &mut world.settlements {
        s.storage.add(Resource::Berries, 1);
        if rng.chance(0.2) {
            s.pop += 1;
        }
    }

    let now_era = compute_era(rules, &world.tech);
    if now_era != world.era {
        world.era = now_era;
        for s in &mut world.settlements {
            s.era = now_era;
        }
        events.push(GameEvent::new(tick, format!("Era advanced to {now_era}.")));
    }

    events.extend(diplomacy_tick(rules, &mut world, rng));
    events.extend(neighbor_ai_tick(rules, &mut world, rng));

    Ok(StepOutcome { world, events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{load_rules, RulesSource};
    use crate::worldgen::generate_world;
    use hearthage_protocol::{DiplomacyKind, SettlementId};

    fn setup() -> (Rules, World) {
        let rules = load_rules(RulesSource::Embedded).unwrap();
        let world = generate_world(&rules, 1);
        (rules, world)
    }

    fn proposal(action: Action) -> Proposal {
        Proposal {
            player_id: "p1".to_string(),
            action: Some(action),
            intent_text: None,
        }
    }

    #[test]
    fn proposal_without_action_is_rejected() {
        let (rules, world) = setup();
        let p = Proposal {
            player_id: "p1".to_string(),
            action: None,
            intent_text: None,
        };
        assert_eq!(
            validate_proposal(&rules, &world, &p),
            Err(ValidationError::NoAction)
        );
    }

    #[test]
    fn research_rejection_names_tech_and_reason() {
        let (rules, world) = setup();
        let p = proposal(Action::Research {
            tech: "bronze".to_string(),
        });
        let err = validate_proposal(&rules, &world, &p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot research bronze: Missing prerequisite: smelting"
        );
    }

    #[test]
    fn build_shortfall_names_first_missing_cost_line() {
        let (rules, world) = setup();
        // Starting wood is 20; a charcoal_kiln needs 40 wood.
        let p = proposal(Action::Build {
            structure: "charcoal_kiln".to_string(),
            settlement: None,
        });
        let err = validate_proposal(&rules, &world, &p).unwrap_err();
        assert_eq!(err.to_string(), "Need 40 wood to build charcoal_kiln");
    }

    #[test]
    fn build_with_unmatched_settlement_id_falls_back_to_first() {
        let (rules, world) = setup();
        let p = proposal(Action::Build {
            structure: "hut".to_string(),
            settlement: Some(SettlementId::generate()),
        });
        assert_eq!(validate_proposal(&rules, &world, &p), Ok(()));
    }

    #[test]
    fn zero_harvest_is_rejected() {
        let (rules, world) = setup();
        let p = proposal(Action::Harvest {
            resource: Resource::Berries,
            amount: 0,
            settlement: None,
        });
        assert_eq!(
            validate_proposal(&rules, &world, &p),
            Err(ValidationError::NonPositiveHarvest)
        );
    }

    #[test]
    fn craft_and_defend_are_rejected_at_validation() {
        let (rules, world) = setup();
        for action in [Action::Craft, Action::Defend] {
            assert_eq!(
                validate_proposal(&rules, &world, &proposal(action)),
                Err(ValidationError::ActionNotImplemented)
            );
        }
    }

    #[test]
    fn step_does_not_mutate_the_input_world() {
        let (rules, world) = setup();
        let snapshot = world.clone();
        let mut rng = SimRng::seed_from_u64(1);
        let _ = step(&rules, &world, None, &mut rng).unwrap();
        assert_eq!(world.tick, snapshot.tick);
        assert_eq!(world.settlements[0].storage, snapshot.settlements[0].storage);
    }

    #[test]
    fn harvest_credits_storage_and_narrates() {
        let (rules, world) = setup();
        let mut rng = SimRng::seed_from_u64(1);
        let p = proposal(Action::Harvest {
            resource: Resource::Wood,
            amount: 7,
            settlement: None,
        });
        let out = step(&rules, &world, Some(&p), &mut rng).unwrap();
        assert_eq!(out.world.tick, 1);
        assert_eq!(out.world.settlements[0].storage.get(Resource::Wood), 27);
        assert_eq!(out.events[0].text, "Gathered 7 wood at Hearth-1.");
        assert_eq!(out.events[0].tick, 1);
    }

    #[test]
    fn build_deducts_cost_and_appends_structure() {
        let (rules, world) = setup();
        let mut rng = SimRng::seed_from_u64(1);
        let p = proposal(Action::Build {
            structure: "hut".to_string(),
            settlement: None,
        });
        let out = step(&rules, &world, Some(&p), &mut rng).unwrap();
        let s = &out.world.settlements[0];
        assert_eq!(s.storage.get(Resource::Wood), 5);
        assert_eq!(s.structures, vec!["campfire".to_string(), "hut".to_string()]);
        assert_eq!(out.events[0].text, "Built a hut at Hearth-1.");
    }

    #[test]
    fn research_grants_pays_and_can_advance_the_era() {
        let (rules, mut world) = setup();
        for id in ["pottery", "kiln"] {
            world.tech.grant(id);
        }
        world.settlements[0].storage.add(Resource::Wood, 100);
        world.settlements[0].storage.add(Resource::Stone, 100);

        let mut rng = SimRng::seed_from_u64(1);
        let p = proposal(Action::Research {
            tech: "smelting".to_string(),
        });
        let out = step(&rules, &world, Some(&p), &mut rng).unwrap();

        assert!(out.world.tech.knows("smelting"));
        // smelting costs 50 wood and 20 stone.
        assert_eq!(out.world.settlements[0].storage.get(Resource::Wood), 70);
        assert_eq!(out.world.settlements[0].storage.get(Resource::Stone), 90);
        assert_eq!(out.world.era, hearthage_protocol::Era::Copper);
        assert_eq!(out.world.settlements[0].era, hearthage_protocol::Era::Copper);

        let texts: Vec<&str> = out.events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts[0], "Discovered smelting.");
        assert!(texts.contains(&"Era advanced to copper."));
    }

    #[test]
    fn migrate_stays_within_the_inner_margin() {
        let (rules, mut world) = setup();
        world.settlements[0].pos.x = 2;
        world.settlements[0].pos.y = 29;
        let mut rng = SimRng::seed_from_u64(1);

        for _ in 0..50 {
            let p = proposal(Action::Migrate);
            let out = step(&rules, &world, Some(&p), &mut rng).unwrap();
            world = out.world;
            let pos = world.settlements[0].pos;
            assert!((2..=45).contains(&pos.x));
            assert!((2..=29).contains(&pos.y));
        }
    }

    #[test]
    fn diplomacy_action_routes_through_the_relations_engine() {
        let (rules, world) = setup();
        let mut rng = SimRng::seed_from_u64(1);
        let p = proposal(Action::Diplomacy {
            kind: DiplomacyKind::Gift,
            target: "River Clan".to_string(),
            resource: Some(Resource::Wood),
            want: None,
            amount: Some(5),
        });
        let out = step(&rules, &world, Some(&p), &mut rng).unwrap();
        assert_eq!(out.world.settlements[0].storage.get(Resource::Wood), 15);
        assert!(out.events[0].text.starts_with("Gave 5 wood to River Clan"));
    }

    #[test]
    fn craft_fails_the_whole_step_without_mutation() {
        let (rules, world) = setup();
        let mut rng = SimRng::seed_from_u64(1);
        let err = step(&rules, &world, Some(&proposal(Action::Craft)), &mut rng).unwrap_err();
        assert_eq!(err, StepError::ActionNotImplemented);
        assert_eq!(world.tick, 0);
    }

    #[test]
    fn berries_trickle_every_tick() {
        let (rules, world) = setup();
        let mut rng = SimRng::seed_from_u64(1);
        let out = step(&rules, &world, None, &mut rng).unwrap();
        assert_eq!(out.world.settlements[0].storage.get(Resource::Berries), 41);
    }

    #[test]
    fn identical_seed_and_proposals_give_identical_histories() {
        let (rules, world) = setup();
        let run = |seed| {
            let mut rng = SimRng::seed_from_u64(seed);
            let mut w = world.clone();
            let mut texts = Vec::new();
            for _ in 0..30 {
                let out = step(&rules, &w, None, &mut rng).unwrap();
                w = out.world;
                texts.extend(out.events.into_iter().map(|e| e.text));
            }
            (w.tick, texts)
        };
        assert_eq!(run(42), run(42));
    }
}
