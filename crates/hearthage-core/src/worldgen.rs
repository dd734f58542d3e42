//! Procedural generation of the initial world.
//!
//! Terrain is a smooth seed-offset sin/cos field thresholded into four
//! tile bands; the same seed always produces the same map.

use hearthage_protocol::{Era, GridPos, Resource, Settlement, SettlementId, TechSet, Tile, World};

use crate::diplomacy::ensure_neighbors;
use crate::rules::Rules;

pub const WORLD_WIDTH: u32 = 48;
pub const WORLD_HEIGHT: u32 = 32;

/// Build the starting world: terrain, one settlement at the grid center,
/// and the two starting neighbors.
pub fn generate_world(rules: &Rules, seed: u64) -> World {
    let width = WORLD_WIDTH;
    let height = WORLD_HEIGHT;

    let mut biome_map = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            biome_map.push(tile_at(seed, x, y));
        }
    }

    let start = Settlement {
        id: SettlementId::generate(),
        name: "Hearth-1".to_string(),
        pos: GridPos {
            x: (width / 2) as i32,
            y: (height / 2) as i32,
        },
        storage: [
            (Resource::Berries, 40),
            (Resource::Fish, 10),
            (Resource::Wood, 20),
            (Resource::Stone, 10),
        ]
        .into_iter()
        .collect(),
        structures: vec!["campfire".to_string()],
        pop: 15,
        era: Era::Stone,
    };

    let mut world = World {
        seed: seed.to_string(),
        width,
        height,
        biome_map,
        tick: 0,
        tech: ["fire".to_string(), "knapping".to_string()]
            .into_iter()
            .collect::<TechSet>(),
        settlements: vec![start],
        neighbors: Vec::new(),
        era: Era::Stone,
    };
    ensure_neighbors(rules, &mut world);
    world
}

fn tile_at(seed: u64, x: u32, y: u32) -> Tile {
    let n = ((x as f64 + seed as f64) * 0.07).sin() + ((y as f64 + seed as f64) * 0.05).cos();
    if n < -0.6 {
        Tile::Water
    } else if n > 1.0 {
        Tile::Mountain
    } else if n > 0.3 {
        Tile::Forest
    } else {
        Tile::Grass
    }
}
