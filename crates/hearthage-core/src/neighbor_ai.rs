//! Autonomous behavior for neighboring factions, run once per tick.

use hearthage_protocol::{GameEvent, World};

use crate::rng::SimRng;
use crate::rules::Rules;
use crate::tech::can_research;

/// Advance every neighbor by one tick.
///
/// Each neighbor independently rolls three times:
/// - research, with probability `min(0.05, pop / 2000)`: the tech table is
///   scanned in declaration order and the first researchable entry is
///   granted. The affordability check reads the player's first settlement
///   stockpile, and nothing is deducted; neighbors advance on prerequisites
///   in practice, scaled by the player's economy.
/// - a cosmetic construction flourish at 3%. It emits an event only; the
///   neighbor's state does not change.
/// - population growth of one at 20%.
pub fn neighbor_ai_tick(rules: &Rules, world: &mut World, rng: &mut SimRng) -> Vec<GameEvent> {
    let World {
        settlements,
        neighbors,
        tick,
        ..
    } = world;
    let tick = *tick;
    let player_storage = settlements.first().map(|s| &s.storage);

    let mut events = Vec::new();
    for neighbor in neighbors.iter_mut() {
        let research_chance = (neighbor.pop as f32 / 2000.0).min(0.05);
        if rng.chance(research_chance) {
            for spec in &rules.techs {
                if can_research(rules, &neighbor.tech, player_storage, &spec.id).is_ok() {
                    neighbor.tech.grant(&spec.id);
                    events.push(GameEvent::new(
                        tick,
                        format!("{} advanced: {}.", neighbor.name, spec.id),
                    ));
                    break;
                }
            }
        }

        if rng.chance(0.03) {
            let structure = if rng.chance(0.5) { "hut" } else { "palissade" };
            events.push(GameEvent::new(
                tick,
                format!("{} built a {structure}.", neighbor.name),
            ));
        }

        if rng.chance(0.2) {
            neighbor.pop += 1;
        }
    }
    events
}
