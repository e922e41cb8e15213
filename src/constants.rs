// Runtime settings, loaded from the environment (or a .env file) on first use.

use std::env;
use std::time::Duration;

lazy_static::lazy_static! {
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
    pub static ref GARDEN_CHAT_MODEL: String = env::var("GARDEN_CHAT_MODEL").unwrap_or_else(|_| "gemma3:12b".to_string());
    pub static ref TEMPLATE_DIR: String = env::var("GARDEN_TEMPLATE_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("GARDEN_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
    pub static ref SESSION_IDLE_SECS: u64 = env::var("GARDEN_SESSION_IDLE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(60 * 60);
    pub static ref OLLAMA_TIMEOUT_SECS: u64 = env::var("OLLAMA_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(120);
}

/// Default port for `garden-quiz start`.
pub const DEFAULT_PORT: u16 = 9900;

/// How often the web server looks for idle page sessions.
pub const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Heading shown above both the quiz and the chat view.
pub const PAGE_TITLE: &str = "Let's build your ideal garden!";

/// First message of every chat conversation, ahead of the quiz answers.
pub const GARDEN_ASSISTANT_INSTRUCTIONS: &str = "You are a friendly garden planning assistant. \
The user has answered a short quiz about their garden. Using their answers, suggest plants that \
suit their location, space, sun exposure, time budget and goals, and explain how to get started. \
Keep answers practical and ask a follow-up question when something important is missing.";
