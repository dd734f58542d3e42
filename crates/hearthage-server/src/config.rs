//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the server
    pub bind_address: SocketAddr,
    /// World seed; `None` derives one from the wall clock at startup
    pub world_seed: Option<u64>,
    /// Passive tick cadence
    pub tick_interval: Duration,
    /// External intent planner settings
    pub planner: PlannerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".parse().expect("static socket address"),
            world_seed: None,
            tick_interval: Duration::from_millis(2000),
            planner: PlannerConfig::default(),
        }
    }
}

/// Which backend plans free-form intent text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlannerProvider {
    /// OpenAI-compatible chat completions endpoint with tool calling.
    OpenAiCompatible,
    /// No external backend; the keyword planner handles everything.
    #[default]
    None,
}

#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub provider: PlannerProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            provider: PlannerProvider::None,
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from the environment, starting from the
    /// defaults. Malformed values fall back to their default rather than
    /// aborting startup.
    ///
    /// Recognized variables: `HEARTHAGE_ADDR`, `PORT`, `WORLD_SEED`,
    /// `TICK_MS`, `LLM_PROVIDER`, `LLM_BASE_URL`, `LLM_MODEL`,
    /// `OPENAI_API_KEY`. Setting an API key without `LLM_PROVIDER` selects
    /// the OpenAI-compatible backend.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HEARTHAGE_ADDR") {
            if let Ok(addr) = addr.parse() {
                config.bind_address = addr;
            }
        } else if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.bind_address = SocketAddr::from(([0, 0, 0, 0], port));
            }
        }
        if let Ok(seed) = std::env::var("WORLD_SEED") {
            if let Ok(seed) = seed.parse() {
                config.world_seed = Some(seed);
            }
        }
        if let Ok(ms) = std::env::var("TICK_MS") {
            if let Ok(ms) = ms.parse() {
                config.tick_interval = Duration::from_millis(ms);
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.planner.api_key = key;
                config.planner.provider = PlannerProvider::OpenAiCompatible;
            }
        }
        match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("openai-compatible") => config.planner.provider = PlannerProvider::OpenAiCompatible,
            Ok("none") => config.planner.provider = PlannerProvider::None,
            _ => {}
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.planner.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.planner.model = model;
        }

        config
    }
}
