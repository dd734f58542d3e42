mod diplomacy;
mod era;
mod neighbor_ai;
mod planner;
mod rng;
mod rules;
mod sim;
mod tech;
mod worldgen;

pub use crate::diplomacy::*;
pub use crate::era::*;
pub use crate::neighbor_ai::*;
pub use crate::planner::*;
pub use crate::rng::*;
pub use crate::rules::*;
pub use crate::sim::*;
pub use crate::tech::*;
pub use crate::worldgen::{generate_world, WORLD_HEIGHT, WORLD_WIDTH};
