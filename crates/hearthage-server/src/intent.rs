//! Intent resolution: free-form player text becomes a concrete action.
//!
//! Resolution is two-stage. An OpenAI-compatible chat completions backend
//! is asked first (forced tool call, so the reply is structured), with a
//! small LRU cache in front of it keyed by a hash of the prompt. Any
//! failure there falls through to the deterministic keyword planner, which
//! is total, so resolution as a whole never fails.

use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use hearthage_core::plan_from_intent;
use hearthage_protocol::{Action, Proposal, World};

use crate::config::{PlannerConfig, PlannerProvider};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("planner returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("planner response malformed: {0}")]
    Malformed(String),
}

/// Reqwest-backed planner against an OpenAI-compatible endpoint.
pub struct ExternalPlanner {
    client: reqwest::Client,
    config: PlannerConfig,
    cache: Mutex<LruCache>,
}

impl ExternalPlanner {
    /// Build a planner from config, or `None` when no backend is selected.
    pub fn from_config(config: &PlannerConfig) -> Option<Self> {
        match config.provider {
            PlannerProvider::OpenAiCompatible => Some(Self {
                client: reqwest::Client::new(),
                config: config.clone(),
                cache: Mutex::new(LruCache::new(128)),
            }),
            PlannerProvider::None => None,
        }
    }

    /// Ask the backend to plan one action for the given intent.
    pub async fn plan(
        &self,
        world: &World,
        player_id: &str,
        intent_text: &str,
    ) -> Result<Proposal, PlanError> {
        let user = format!(
            "Intent: {intent_text}\nWorld: {}",
            serde_json::to_string(&summarize_world(world))
                .map_err(|e| PlanError::Malformed(e.to_string()))?
        );
        let key = hash_bytes_fnv1a64(user.as_bytes());

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(action) = cache.get(key) {
                return Ok(proposal_for(player_id, intent_text, action));
            }
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a strict game planner for a historical civ-sim. \
                                Return one valid action using the function. Obey plausible \
                                tech constraints."
                },
                { "role": "user", "content": user }
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": "plan_action",
                    "description": "Return a single game action based on player intent and summarized world state.",
                    "parameters": action_schema()
                }
            }],
            "tool_choice": { "type": "function", "function": { "name": "plan_action" } },
            "temperature": 0.2
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(PlanError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        let action = extract_planned_action(&json)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, action.clone());
        }
        Ok(proposal_for(player_id, intent_text, action))
    }
}

/// Resolve a proposal into one that carries a concrete action.
///
/// Proposals that already carry an action pass through untouched, as do
/// proposals with neither action nor intent (validation rejects those
/// downstream). Otherwise the external planner is tried and the keyword
/// planner covers every failure.
pub async fn resolve_intent(
    planner: Option<&ExternalPlanner>,
    world: &World,
    proposal: Proposal,
) -> Proposal {
    if proposal.action.is_some() {
        return proposal;
    }
    let Some(intent_text) = proposal.intent_text.clone() else {
        return proposal;
    };

    if let Some(planner) = planner {
        match planner.plan(world, &proposal.player_id, &intent_text).await {
            Ok(planned) => return planned,
            Err(e) => warn!(error = %e, "external planner failed, using keyword planner"),
        }
    }
    plan_from_intent(world, &proposal.player_id, &intent_text)
}

fn proposal_for(player_id: &str, intent_text: &str, action: Action) -> Proposal {
    Proposal {
        player_id: player_id.to_string(),
        action: Some(action),
        intent_text: Some(intent_text.to_string()),
    }
}

/// Compact world digest sent to the backend instead of the full state.
fn summarize_world(world: &World) -> serde_json::Value {
    let first = world.settlements.first();
    let neighbors: Vec<_> = world
        .neighbors
        .iter()
        .map(|n| {
            serde_json::json!({
                "name": n.name,
                "attitude": n.attitude,
                "status": n.status,
                "pop": n.pop,
            })
        })
        .collect();
    serde_json::json!({
        "tick": world.tick,
        "resources": first.map(|s| &s.storage),
        "pop": first.map_or(0, |s| s.pop),
        "tech": world.tech,
        "neighbors": neighbors,
    })
}

/// JSON schema for the `plan_action` tool; mirrors the wire shape of
/// [`Action`] so the arguments deserialize directly.
fn action_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["harvest", "build", "research", "migrate", "diplomacy", "craft", "defend"]
            },
            "resource": { "type": "string" },
            "amount": { "type": "integer", "minimum": 0 },
            "structure": { "type": "string" },
            "tech": { "type": "string" },
            "kind": { "type": "string", "enum": ["gift", "trade", "peace", "war"] },
            "target": { "type": "string" },
            "want": { "type": "string" }
        },
        "required": ["type"]
    })
}

/// Pull the forced tool call's arguments out of a chat completions
/// response and deserialize them as an [`Action`].
fn extract_planned_action(json: &serde_json::Value) -> Result<Action, PlanError> {
    let arguments = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("tool_calls"))
        .and_then(|t| t.get(0))
        .and_then(|t| t.get("function"))
        .and_then(|f| f.get("arguments"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            PlanError::Malformed("missing choices[0].message.tool_calls[0].function.arguments".to_owned())
        })?;
    serde_json::from_str(arguments).map_err(|e| PlanError::Malformed(e.to_string()))
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Fixed-capacity LRU over recently planned prompts.
struct LruCache {
    max: usize,
    entries: Vec<(u64, Action)>,
}

impl LruCache {
    fn new(max: usize) -> Self {
        Self {
            max,
            entries: Vec::new(),
        }
    }

    fn get(&mut self, key: u64) -> Option<Action> {
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        let entry = self.entries.remove(index);
        let action = entry.1.clone();
        self.entries.push(entry);
        Some(action)
    }

    fn put(&mut self, key: u64, action: Action) {
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(index);
        }
        self.entries.push((key, action));
        if self.entries.len() > self.max {
            self.entries.remove(0);
        }
    }
}
