//! Socratic tutoring transcript and its single-outstanding-turn protocol.
//!
//! A turn is a two-phase mutation: [`Conversation::submit_turn`] appends the
//! student turn right away and returns a [`PendingTurn`]; [`Conversation::receive`]
//! consumes it and appends the tutor's answer, or a fallback notice when the
//! tutor could not be reached. Every accepted student turn gets exactly one
//! tutor turn back.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ChatTurn, TurnFormat};
use crate::error::ConsoleError;
use crate::wire::VivaBody;

/// Picks which prior turns go into the outbound context string.
/// The stored transcript is never touched.
pub trait ContextWindow: Send + Sync + std::fmt::Debug {
  fn select<'a>(&self, turns: &'a [ChatTurn]) -> &'a [ChatTurn];
}

/// Resend everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullHistory;

impl ContextWindow for FullHistory {
  fn select<'a>(&self, turns: &'a [ChatTurn]) -> &'a [ChatTurn] {
    turns
  }
}

/// Only the most recent `k` turns.
#[derive(Debug, Clone, Copy)]
pub struct LastTurns(pub usize);

impl ContextWindow for LastTurns {
  fn select<'a>(&self, turns: &'a [ChatTurn]) -> &'a [ChatTurn] {
    &turns[turns.len().saturating_sub(self.0)..]
  }
}

/// `"<Speaker>: <text>"` lines in order, joined by newlines.
pub fn flatten(turns: &[ChatTurn]) -> String {
  turns.iter().map(ChatTurn::context_line).collect::<Vec<_>>().join("\n")
}

/// Fixed texts the conversation answers with when the tutor gives nothing usable.
#[derive(Clone, Debug)]
pub struct TutorNotices {
  pub unavailable: String,
  pub empty_reply: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
  Idle,
  AwaitingReply,
}

/// Proof of an outstanding tutor request.
#[derive(Debug)]
pub struct PendingTurn {
  session_id: Uuid,
  body: VivaBody,
}

impl PendingTurn {
  pub fn session_id(&self) -> Uuid {
    self.session_id
  }

  pub fn body(&self) -> &VivaBody {
    &self.body
  }
}

#[derive(Debug)]
pub struct Conversation {
  session_id: Uuid,
  topic: String,
  /// `turns[0]` is the synthetic greeting; it is displayed but never sent.
  turns: Vec<ChatTurn>,
  state: TurnState,
  window: Box<dyn ContextWindow>,
  notices: TutorNotices,
}

impl Conversation {
  pub fn new(
    session_id: Uuid,
    topic: impl Into<String>,
    greeting: impl Into<String>,
    window: Box<dyn ContextWindow>,
    notices: TutorNotices,
  ) -> Self {
    Self {
      session_id,
      topic: topic.into(),
      turns: vec![ChatTurn::tutor(greeting)],
      state: TurnState::Idle,
      window,
      notices,
    }
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn turns(&self) -> &[ChatTurn] {
    &self.turns
  }

  #[allow(dead_code)]
  pub fn state(&self) -> TurnState {
    self.state
  }

  /// The context string the next request would carry.
  pub fn context(&self) -> String {
    flatten(self.window.select(&self.turns[1..]))
  }

  /// Phase one. `None` for blank input or while a reply is outstanding.
  pub fn submit_turn(&mut self, text: &str, format: TurnFormat) -> Option<PendingTurn> {
    let text = text.trim();
    if text.is_empty() {
      debug!(target: "session", "Empty chat turn rejected");
      return None;
    }
    if self.state == TurnState::AwaitingReply {
      debug!(target: "session", "Chat turn ignored: tutor reply outstanding");
      return None;
    }

    let conversation_history = self.context();
    self.turns.push(ChatTurn::student(text, format));
    self.state = TurnState::AwaitingReply;

    info!(target: "session", topic = %self.topic, text_len = text.len(), history_len = conversation_history.len(), "Tutor turn dispatched");
    Some(PendingTurn {
      session_id: self.session_id,
      body: VivaBody { student_code: text.to_string(), topic: self.topic.clone(), conversation_history },
    })
  }

  /// Phase two. Always appends exactly one tutor turn.
  pub fn receive(&mut self, _pending: PendingTurn, reply: Result<String, ConsoleError>) -> &ChatTurn {
    let text = match reply {
      Ok(q) if q.trim().is_empty() => self.notices.empty_reply.clone(),
      Ok(q) => q,
      Err(e) => {
        warn!(target: "session", error = %e, "Tutor unavailable; answering with fallback notice");
        self.notices.unavailable.clone()
      }
    };
    self.state = TurnState::Idle;
    self.turns.push(ChatTurn::tutor(text));
    &self.turns[self.turns.len() - 1]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Speaker;

  fn notices() -> TutorNotices {
    TutorNotices { unavailable: "Connection error. Using offline mode.".into(), empty_reply: "Try again.".into() }
  }

  fn conversation(window: Box<dyn ContextWindow>) -> Conversation {
    Conversation::new(Uuid::new_v4(), "Two Sum", "Hi! Let's work on Two Sum.", window, notices())
  }

  fn exchange(c: &mut Conversation, student: &str, tutor: &str) -> VivaBody {
    let p = c.submit_turn(student, TurnFormat::Prose).unwrap();
    let body = p.body().clone();
    c.receive(p, Ok(tutor.to_string()));
    body
  }

  #[test]
  fn starts_with_one_greeting() {
    let c = conversation(Box::new(FullHistory));
    assert_eq!(c.turns().len(), 1);
    assert_eq!(c.turns()[0].speaker, Speaker::Tutor);
    assert_eq!(c.context(), "");
  }

  #[test]
  fn blank_input_is_rejected() {
    let mut c = conversation(Box::new(FullHistory));
    assert!(c.submit_turn("   \n\t", TurnFormat::Prose).is_none());
    assert_eq!(c.turns().len(), 1);
    assert_eq!(c.state(), TurnState::Idle);
  }

  #[test]
  fn student_turn_is_appended_before_the_reply() {
    let mut c = conversation(Box::new(FullHistory));
    let p = c.submit_turn("  what about duplicates? ", TurnFormat::Prose).unwrap();
    assert_eq!(c.turns().len(), 2);
    assert_eq!(c.turns()[1].text, "what about duplicates?");
    assert_eq!(c.state(), TurnState::AwaitingReply);
    assert_eq!(p.body().student_code, "what about duplicates?");
    assert_eq!(p.body().topic, "Two Sum");
  }

  #[test]
  fn second_turn_while_awaiting_is_ignored() {
    let mut c = conversation(Box::new(FullHistory));
    let _p = c.submit_turn("first", TurnFormat::Prose).unwrap();
    assert!(c.submit_turn("second", TurnFormat::Prose).is_none());
    assert_eq!(c.turns().len(), 2);
  }

  #[test]
  fn history_holds_prior_turns_in_order_without_greeting_or_newest() {
    let mut c = conversation(Box::new(FullHistory));
    let b1 = exchange(&mut c, "s1", "t1");
    assert_eq!(b1.conversation_history, "");
    let b2 = exchange(&mut c, "s2", "t2");
    assert_eq!(b2.conversation_history, "Student: s1\nTutor: t1");
    let b3 = exchange(&mut c, "s3", "t3");
    assert_eq!(b3.conversation_history, "Student: s1\nTutor: t1\nStudent: s2\nTutor: t2");
    assert_eq!(b3.student_code, "s3");
    assert_eq!(c.turns().len(), 7);
  }

  #[test]
  fn tutor_failure_still_adds_two_turns() {
    let mut c = conversation(Box::new(FullHistory));
    let before = c.turns().len();
    let p = c.submit_turn("is my loop right?", TurnFormat::Prose).unwrap();
    let turn = c.receive(p, Err(ConsoleError::TransientFetch("connection refused".into())));
    assert_eq!(turn.text, "Connection error. Using offline mode.");
    assert_eq!(c.turns().len(), before + 2);
    assert_eq!(c.turns()[before].text, "is my loop right?");
    assert_eq!(c.state(), TurnState::Idle);
  }

  #[test]
  fn empty_reply_becomes_notice() {
    let mut c = conversation(Box::new(FullHistory));
    let p = c.submit_turn("hello", TurnFormat::Prose).unwrap();
    assert_eq!(c.receive(p, Ok("  ".into())).text, "Try again.");
  }

  #[test]
  fn code_turns_flatten_like_prose() {
    let mut c = conversation(Box::new(FullHistory));
    let p = c.submit_turn("for i in range(n):", TurnFormat::Code).unwrap();
    c.receive(p, Ok("What is n here?".into()));
    assert_eq!(c.turns()[1].format, TurnFormat::Code);
    assert_eq!(c.context(), "Student: for i in range(n):\nTutor: What is n here?");
  }

  #[test]
  fn window_limits_context_but_not_transcript() {
    let mut c = conversation(Box::new(LastTurns(2)));
    exchange(&mut c, "s1", "t1");
    exchange(&mut c, "s2", "t2");
    assert_eq!(c.context(), "Student: s2\nTutor: t2");
    assert_eq!(c.turns().len(), 5);
  }

  #[test]
  fn window_larger_than_transcript() {
    let turns = vec![ChatTurn::tutor("a")];
    assert_eq!(LastTurns(10).select(&turns).len(), 1);
    assert_eq!(LastTurns(0).select(&turns).len(), 0);
  }
}
