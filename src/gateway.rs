//! Seams between the session and the remote backends.
//!
//! `backend::BackendClient` implements all three over HTTP; tests plug in fakes.

use async_trait::async_trait;

use crate::domain::{ProblemDescriptor, ProblemSummary, SubmissionRequest};
use crate::error::ConsoleError;
use crate::wire::{JudgeReply, VivaBody};

#[async_trait]
pub trait ProblemSource: Send + Sync {
  /// `NotFound` when the backend has no such problem.
  async fn fetch_problem(&self, slug: &str) -> Result<ProblemDescriptor, ConsoleError>;

  async fn list_problems(&self) -> Result<Vec<ProblemSummary>, ConsoleError>;
}

#[async_trait]
pub trait Judge: Send + Sync {
  /// A decoded reply, successful or not. `Err` only for transport/decode failures.
  async fn execute(&self, request: &SubmissionRequest) -> Result<JudgeReply, ConsoleError>;
}

#[async_trait]
pub trait Tutor: Send + Sync {
  /// The tutor's next guiding question.
  async fn ask(&self, body: &VivaBody) -> Result<String, ConsoleError>;
}
