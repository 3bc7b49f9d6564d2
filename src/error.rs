//! Error taxonomy shared by the loader, the submission pipeline and the tutor.
//!
//! None of these are fatal: the loader turns them into a blocked workspace,
//! the pipeline settles them into its `Failed` state and the conversation
//! answers them with a fallback turn.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
  /// The problem backend has no problem for this slug.
  #[error("Problem not found: {0}")]
  NotFound(String),

  /// Network, HTTP status or decode failure on any backend call.
  #[error("Backend request failed: {0}")]
  TransientFetch(String),

  /// The judge answered `success: false`; carries the judge's error text verbatim.
  #[error("{0}")]
  JudgeFailure(String),

  #[error("Tutor unavailable: {0}")]
  TutorUnavailable(String),

  #[error("Unsupported language id: {0}")]
  UnsupportedLanguage(u32),
}

impl ConsoleError {
  /// Short machine-readable tag used on the browser protocol.
  pub fn kind(&self) -> &'static str {
    match self {
      ConsoleError::NotFound(_) => "not_found",
      ConsoleError::TransientFetch(_) => "transient_fetch",
      ConsoleError::JudgeFailure(_) => "judge_failure",
      ConsoleError::TutorUnavailable(_) => "tutor_unavailable",
      ConsoleError::UnsupportedLanguage(_) => "unsupported_language",
    }
  }
}

impl From<reqwest::Error> for ConsoleError {
  fn from(e: reqwest::Error) -> Self {
    ConsoleError::TransientFetch(e.to_string())
  }
}
