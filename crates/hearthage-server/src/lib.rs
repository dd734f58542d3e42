//! Hearthage server: session orchestration, intent resolution, and the
//! WebSocket transport over the core simulation.

pub mod config;
pub mod intent;
pub mod session;
pub mod ws;

pub use config::{PlannerConfig, PlannerProvider, ServerConfig};
pub use intent::{resolve_intent, ExternalPlanner, PlanError};
pub use session::{spawn_session, SessionHandle};
pub use ws::{build_router, AppState};
