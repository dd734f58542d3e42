//! Keyword fallback planner: turns free-form intent text into a concrete
//! action when no external planner is available or it fails.

use std::sync::LazyLock;

use regex::Regex;

use hearthage_protocol::{Action, Proposal, Resource, World};

enum Plan {
    Build(&'static str),
    Research(&'static str),
    Harvest(Resource, u32),
    Migrate,
}

/// Pattern table, first match wins. Construction and research outrank
/// gathering so "build a hut by the river" builds rather than fishes.
static PATTERNS: LazyLock<Vec<(Regex, Plan)>> = LazyLock::new(|| {
    let rx = |pattern: &str| Regex::new(pattern).expect("intent pattern compiles");
    vec![
        (rx(r"\b(fence|wall|palis+ade)\b"), Plan::Build("palissade")),
        (rx(r"\b(hut|house|home|shelter)\b"), Plan::Build("hut")),
        (rx(r"\b(pottery|pots|clay)\b"), Plan::Research("pottery")),
        (rx(r"\bkiln\b"), Plan::Research("kiln")),
        (rx(r"\b(smelt|smelting|furnace)\b"), Plan::Research("smelting")),
        (rx(r"\bbronze\b"), Plan::Research("bronze")),
        (
            rx(r"\b(farm|agriculture|fields|grain|wheat|barley)\b"),
            Plan::Research("agriculture"),
        ),
        (
            rx(r"\b(fish|fishing|river|lake)\b"),
            Plan::Harvest(Resource::Fish, 5),
        ),
        (
            rx(r"\b(wood|logs|lumber|chop)\b"),
            Plan::Harvest(Resource::Wood, 8),
        ),
        (
            rx(r"\b(stone|rocks|quarry)\b"),
            Plan::Harvest(Resource::Stone, 6),
        ),
        (
            rx(r"\b(berry|berries|forage)\b"),
            Plan::Harvest(Resource::Berries, 6),
        ),
        (rx(r"\b(settle|migrate|new camp|found)\b"), Plan::Migrate),
    ]
});

/// Plan a concrete proposal from intent text. Total: anything that matches
/// no pattern becomes a small berry harvest at the first settlement.
pub fn plan_from_intent(world: &World, player_id: &str, intent_text: &str) -> Proposal {
    let intent = intent_text.to_lowercase();
    let settlement = world.settlements.first().map(|s| s.id);

    let action = PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&intent))
        .map(|(_, plan)| match plan {
            Plan::Build(structure) => Action::Build {
                structure: structure.to_string(),
                settlement,
            },
            Plan::Research(tech) => Action::Research {
                tech: tech.to_string(),
            },
            Plan::Harvest(resource, amount) => Action::Harvest {
                resource: *resource,
                amount: *amount,
                settlement,
            },
            Plan::Migrate => Action::Migrate,
        })
        .unwrap_or(Action::Harvest {
            resource: Resource::Berries,
            amount: 5,
            settlement,
        });

    Proposal {
        player_id: player_id.to_string(),
        action: Some(action),
        intent_text: Some(intent_text.to_string()),
    }
}
