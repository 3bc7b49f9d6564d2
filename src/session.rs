//! The workspace session: one problem, one buffer, one submission pipeline,
//! one report slot and one tutoring conversation.
//!
//! All mutation is synchronous. Backend calls happen outside, between a
//! `begin_*`/`submit_*` call that hands out a ticket and the matching
//! `finish_*` call that consumes it.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::buffer::CodeBuffer;
use crate::config::Messages;
use crate::conversation::{ContextWindow, Conversation, PendingTurn};
use crate::domain::{LanguageOption, ProblemDescriptor, SubmissionMode, TurnFormat, DEFAULT_LANGUAGE};
use crate::error::ConsoleError;
use crate::gateway::ProblemSource;
use crate::pipeline::{PendingSubmission, SubmissionOutcome, SubmissionPipeline};
use crate::report::{Report, ReportPresenter};
use crate::util::fill_template;
use crate::wire::JudgeReply;

#[derive(Debug)]
pub struct Session {
  id: Uuid,
  problem: ProblemDescriptor,
  buffer: CodeBuffer,
  pipeline: SubmissionPipeline,
  report: ReportPresenter,
  conversation: Conversation,
  hints_revealed: usize,
}

/// Fetch the problem and open a session on it. No session exists on failure.
#[instrument(level = "info", skip(source, messages, window), fields(%slug))]
pub async fn load_session(
  source: &dyn ProblemSource,
  slug: &str,
  messages: &Messages,
  window: Box<dyn ContextWindow>,
) -> Result<Session, ConsoleError> {
  match source.fetch_problem(slug).await {
    Ok(problem) => Ok(Session::open(problem, messages, window)),
    Err(e) => {
      warn!(target: "session", %slug, kind = e.kind(), error = %e, "Problem load failed; workspace blocked");
      Err(e)
    }
  }
}

impl Session {
  pub fn open(problem: ProblemDescriptor, messages: &Messages, window: Box<dyn ContextWindow>) -> Self {
    let id = Uuid::new_v4();
    let greeting = fill_template(&messages.problem_greeting, &[("title", &problem.title)]);
    let conversation = Conversation::new(id, problem.title.clone(), greeting, window, messages.notices());
    info!(target: "session", session_id = %id, slug = %problem.slug, "Session opened");
    Self {
      id,
      buffer: CodeBuffer::seeded(DEFAULT_LANGUAGE, &problem.slug),
      pipeline: SubmissionPipeline::new(id),
      report: ReportPresenter::default(),
      conversation,
      hints_revealed: 0,
      problem,
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn problem(&self) -> &ProblemDescriptor {
    &self.problem
  }

  pub fn buffer(&self) -> &CodeBuffer {
    &self.buffer
  }

  #[allow(dead_code)]
  pub fn pipeline(&self) -> &SubmissionPipeline {
    &self.pipeline
  }

  #[allow(dead_code)]
  pub fn report(&self) -> Option<&Report> {
    self.report.current()
  }

  pub fn conversation(&self) -> &Conversation {
    &self.conversation
  }

  pub fn edit_code(&mut self, text: impl Into<String>) -> bool {
    self.buffer.edit(text)
  }

  /// Returns whether the buffer text was replaced by the new boilerplate.
  pub fn select_language(&mut self, language_id: u32) -> Result<bool, ConsoleError> {
    let language = LanguageOption::by_id(language_id).ok_or(ConsoleError::UnsupportedLanguage(language_id))?;
    Ok(self.buffer.select_language(language, &self.problem.slug))
  }

  pub fn begin_submission(&mut self, mode: SubmissionMode) -> Option<PendingSubmission> {
    self.pipeline.begin(mode, self.buffer.text(), self.buffer.language().id, &self.problem.slug)
  }

  /// Settle a submission; a scored `submit` also opens the report.
  pub fn finish_submission(
    &mut self,
    pending: PendingSubmission,
    reply: Result<JudgeReply, ConsoleError>,
  ) -> &SubmissionOutcome {
    let outcome = self.pipeline.complete(pending, reply);
    if let SubmissionOutcome::Judged(_, report) = outcome {
      self.report.present(report.clone());
    }
    outcome
  }

  pub fn dismiss_report(&mut self) -> bool {
    self.report.dismiss()
  }

  pub fn submit_turn(&mut self, text: &str, format: TurnFormat) -> Option<PendingTurn> {
    self.conversation.submit_turn(text, format)
  }

  pub fn finish_turn(&mut self, pending: PendingTurn, reply: Result<String, ConsoleError>) -> &crate::domain::ChatTurn {
    self.conversation.receive(pending, reply)
  }

  /// Reveal the next hint, if any remain. Returns its index and text.
  pub fn reveal_hint(&mut self) -> Option<(usize, &str)> {
    let idx = self.hints_revealed;
    let hint = self.problem.hints.get(idx)?;
    self.hints_revealed += 1;
    Some((idx, hint.as_str()))
  }

  #[allow(dead_code)]
  pub fn hints_revealed(&self) -> usize {
    self.hints_revealed
  }
}

/// A tutoring session bound to a concept topic rather than a problem.
#[derive(Debug)]
pub struct TopicSession {
  id: Uuid,
  conversation: Conversation,
}

impl TopicSession {
  pub fn start(topic: &str, messages: &Messages, window: Box<dyn ContextWindow>) -> Self {
    let id = Uuid::new_v4();
    let greeting = fill_template(&messages.topic_greeting, &[("topic", topic)]);
    info!(target: "session", session_id = %id, %topic, "Topic session started");
    Self { id, conversation: Conversation::new(id, topic, greeting, window, messages.notices()) }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn conversation(&self) -> &Conversation {
    &self.conversation
  }

  pub fn conversation_mut(&mut self) -> &mut Conversation {
    &mut self.conversation
  }
}
