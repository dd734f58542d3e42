use serde::{Deserialize, Serialize};

/// A narrative log entry produced by the simulation.
///
/// `text` is log-style natural language for display; consumers must not
/// parse it for semantics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub tick: u64,
    pub text: String,
}

impl GameEvent {
    pub fn new(tick: u64, text: impl Into<String>) -> Self {
        Self {
            tick,
            text: text.into(),
        }
    }
}
