//! Loading console configuration (backend URL, tutor texts, context window, topics) from TOML.
//!
//! See `ConsoleConfig` and `Messages` for expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::conversation::{ContextWindow, FullHistory, LastTurns, TutorNotices};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, Deserialize)]
pub struct ConsoleConfig {
  #[serde(default)]
  pub backend: BackendCfg,
  #[serde(default)]
  pub messages: Messages,
  #[serde(default)]
  pub context: ContextCfg,
  #[serde(default = "default_topics")]
  pub topics: Vec<String>,
}

impl Default for ConsoleConfig {
  fn default() -> Self {
    Self {
      backend: BackendCfg::default(),
      messages: Messages::default(),
      context: ContextCfg::default(),
      topics: default_topics(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendCfg {
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for BackendCfg {
  fn default() -> Self {
    Self { base_url: default_base_url() }
  }
}

/// Fixed texts shown by the tutor side of the conversation.
/// `{title}` and `{topic}` are filled in when a session starts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  pub problem_greeting: String,
  pub topic_greeting: String,
  pub tutor_fallback: String,
  pub empty_reply: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      problem_greeting: "Hi! I'm ready to help you with **{title}**. Let me know if you get stuck or want to discuss the approach!".into(),
      topic_greeting: "Hello! I'm your AI DSA Tutor. Today we'll be working on **{topic}**.\n\nPlease paste your code below and I'll guide you through a Socratic viva. I'll ask questions to help you discover any issues yourself, rather than just giving you the answer. Ready? Go ahead and share your code!".into(),
      tutor_fallback: "Connection error. Using offline mode.".into(),
      empty_reply: "I couldn't generate a response. Please try again.".into(),
    }
  }
}

impl Messages {
  pub fn notices(&self) -> TutorNotices {
    TutorNotices { unavailable: self.tutor_fallback.clone(), empty_reply: self.empty_reply.clone() }
  }
}

/// How much transcript each tutor request carries. Unset means everything.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContextCfg {
  #[serde(default)]
  pub max_turns: Option<usize>,
}

impl ContextCfg {
  pub fn window(&self) -> Box<dyn ContextWindow> {
    match self.max_turns {
      Some(k) => Box::new(LastTurns(k)),
      None => Box::new(FullHistory),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BACKEND_URL.into()
}

fn default_topics() -> Vec<String> {
  [
    "Binary Search",
    "Recursion",
    "Two Pointers",
    "Linked List",
    "Hash Maps",
    "Bubble Sort",
    "Dynamic Programming",
    "Graph Traversal",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

/// Load from CONSOLE_CONFIG_PATH (falling back to defaults on any IO/parse error),
/// then let BACKEND_BASE_URL override the backend URL.
pub fn load_console_config_from_env() -> ConsoleConfig {
  let mut cfg = std::env::var("CONSOLE_CONFIG_PATH")
    .ok()
    .and_then(|path| read_config(&path))
    .unwrap_or_default();

  if let Ok(url) = std::env::var("BACKEND_BASE_URL") {
    if !url.trim().is_empty() {
      cfg.backend.base_url = url;
    }
  }
  info!(target: "console_host", base_url = %cfg.backend.base_url, max_turns = ?cfg.context.max_turns, "Console config ready");
  cfg
}

fn read_config(path: &str) -> Option<ConsoleConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<ConsoleConfig>(&s) {
      Ok(cfg) => {
        info!(target: "console_host", %path, "Loaded console config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "console_host", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "console_host", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_gives_defaults() {
    let cfg: ConsoleConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.backend.base_url, DEFAULT_BACKEND_URL);
    assert_eq!(cfg.topics.len(), 8);
    assert!(cfg.context.max_turns.is_none());
    assert_eq!(cfg.messages.tutor_fallback, Messages::default().tutor_fallback);
  }

  #[test]
  fn partial_sections_override() {
    let cfg: ConsoleConfig = toml::from_str(
      r#"
        topics = ["Heaps"]

        [backend]
        base_url = "http://judge.internal:9000"

        [messages]
        tutor_fallback = "Tutor is offline."

        [context]
        max_turns = 6
      "#,
    )
    .unwrap();
    assert_eq!(cfg.backend.base_url, "http://judge.internal:9000");
    assert_eq!(cfg.topics, vec!["Heaps".to_string()]);
    assert_eq!(cfg.messages.tutor_fallback, "Tutor is offline.");
    assert_eq!(cfg.messages.empty_reply, Messages::default().empty_reply);
    assert_eq!(cfg.context.max_turns, Some(6));
  }
}
