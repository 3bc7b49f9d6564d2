//! Per-connection workspace driver.
//!
//! A `Workspace` is owned by exactly one WebSocket loop and is the only thing
//! that mutates its session. Client commands are applied synchronously;
//! backend calls run as spawned tasks that send a `Completion` back over the
//! channel, and the loop feeds it to `Workspace::apply`. Completions that
//! belong to a session that has since been replaced are dropped.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::conversation::PendingTurn;
use crate::domain::{SubmissionMode, TurnFormat};
use crate::error::ConsoleError;
use crate::pipeline::{PendingSubmission, SubmissionOutcome};
use crate::protocol::{topic_started, workspace_out, ClientWsMessage, ConsoleOut, ReportOut, ServerWsMessage, TurnOut};
use crate::session::{load_session, Session, TopicSession};
use crate::state::AppState;
use crate::wire::JudgeReply;

/// Result of a backend call, delivered back to the owning loop.
#[derive(Debug)]
pub enum Completion {
  Loaded { generation: u64, slug: String, result: Result<Session, ConsoleError> },
  Submission { pending: PendingSubmission, reply: Result<JudgeReply, ConsoleError> },
  Turn { pending: PendingTurn, reply: Result<String, ConsoleError> },
}

#[derive(Debug)]
enum View {
  Empty,
  Loading { slug: String, generation: u64 },
  /// Load failed; nothing of the problem is shown.
  Blocked { slug: String },
  Problem(Session),
  Topic(TopicSession),
}

pub struct Workspace {
  state: AppState,
  view: View,
  generation: u64,
  tx: UnboundedSender<Completion>,
}

const NO_WORKSPACE: &str = "No problem workspace is open.";

impl Workspace {
  pub fn new(state: AppState, tx: UnboundedSender<Completion>) -> Self {
    Self { state, view: View::Empty, generation: 0, tx }
  }

  fn session_mut(&mut self) -> Option<&mut Session> {
    match &mut self.view {
      View::Problem(s) => Some(s),
      _ => None,
    }
  }

  fn no_workspace() -> Vec<ServerWsMessage> {
    vec![ServerWsMessage::Error { message: NO_WORKSPACE.into() }]
  }

  /// Apply one client command. Ignored commands (a second run while one is
  /// pending, a blank chat line) produce no messages at all.
  #[instrument(level = "debug", skip_all)]
  pub fn handle(&mut self, msg: ClientWsMessage) -> Vec<ServerWsMessage> {
    match msg {
      ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

      ClientWsMessage::OpenProblem { slug } => self.open_problem(slug),

      ClientWsMessage::SelectLanguage { language_id } => {
        let Some(s) = self.session_mut() else { return Self::no_workspace() };
        match s.select_language(language_id) {
          Ok(replaced) => {
            debug!(target: "session", %language_id, replaced, edited = s.buffer().is_edited(), "Language selected");
            vec![ServerWsMessage::Buffer { language_id, code: s.buffer().text().to_string() }]
          }
          Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
        }
      }

      ClientWsMessage::EditCode { code } => {
        let Some(s) = self.session_mut() else { return Self::no_workspace() };
        s.edit_code(code);
        vec![]
      }

      ClientWsMessage::Run => self.submit(SubmissionMode::Run),
      ClientWsMessage::Submit => self.submit(SubmissionMode::Submit),

      ClientWsMessage::RevealHint => {
        let Some(s) = self.session_mut() else { return Self::no_workspace() };
        let total = s.problem().hints.len();
        match s.reveal_hint() {
          Some((index, text)) => {
            vec![ServerWsMessage::Hint { index, text: text.to_string(), remaining: total - index - 1 }]
          }
          None => vec![],
        }
      }

      ClientWsMessage::Chat { text, is_code } => {
        let format = if is_code { TurnFormat::Code } else { TurnFormat::Prose };
        self.chat(&text, format)
      }

      ClientWsMessage::DismissReport => {
        let Some(s) = self.session_mut() else { return Self::no_workspace() };
        if s.dismiss_report() {
          vec![ServerWsMessage::ReportDismissed]
        } else {
          vec![]
        }
      }

      ClientWsMessage::NextProblem => match &self.view {
        View::Problem(s) => {
          info!(target: "session", session_id = %s.id(), "Session closed: next problem");
          self.view = View::Empty;
          vec![ServerWsMessage::Closed]
        }
        _ => Self::no_workspace(),
      },

      ClientWsMessage::StartTopic { topic } => {
        let topic = topic.trim();
        if topic.is_empty() {
          return vec![ServerWsMessage::Error { message: "Topic must not be empty.".into() }];
        }
        let t = TopicSession::start(topic, &self.state.config.messages, self.state.config.context.window());
        let out = topic_started(&t);
        self.view = View::Topic(t);
        vec![out]
      }

      ClientWsMessage::ResetTopic => match &self.view {
        View::Topic(t) => {
          info!(target: "session", session_id = %t.id(), "Topic session reset");
          self.view = View::Empty;
          vec![ServerWsMessage::Closed]
        }
        _ => vec![ServerWsMessage::Error { message: "No topic session is active.".into() }],
      },
    }
  }

  fn open_problem(&mut self, slug: String) -> Vec<ServerWsMessage> {
    let slug = slug.trim().to_string();
    if slug.is_empty() {
      return vec![ServerWsMessage::Error { message: "Problem slug must not be empty.".into() }];
    }
    self.generation += 1;
    let generation = self.generation;
    self.view = View::Loading { slug: slug.clone(), generation };

    let problems = self.state.problems.clone();
    let messages = self.state.config.messages.clone();
    let window = self.state.config.context.window();
    let tx = self.tx.clone();
    let task_slug = slug.clone();
    tokio::spawn(async move {
      let result = load_session(problems.as_ref(), &task_slug, &messages, window).await;
      let _ = tx.send(Completion::Loaded { generation, slug: task_slug, result });
    });

    vec![ServerWsMessage::Loading { slug }]
  }

  fn submit(&mut self, mode: SubmissionMode) -> Vec<ServerWsMessage> {
    let judge = self.state.judge.clone();
    let tx = self.tx.clone();
    let Some(s) = self.session_mut() else { return Self::no_workspace() };
    let Some(pending) = s.begin_submission(mode) else { return vec![] };

    tokio::spawn(async move {
      let reply = judge.execute(pending.request()).await;
      let _ = tx.send(Completion::Submission { pending, reply });
    });
    vec![ServerWsMessage::SubmissionPending { mode }]
  }

  fn chat(&mut self, text: &str, format: TurnFormat) -> Vec<ServerWsMessage> {
    let (pending, student) = match &mut self.view {
      View::Problem(s) => match s.submit_turn(text, format) {
        Some(p) => (p, s.conversation().turns().last().map(TurnOut::from)),
        None => return vec![],
      },
      View::Topic(t) => match t.conversation_mut().submit_turn(text, format) {
        Some(p) => (p, t.conversation().turns().last().map(TurnOut::from)),
        None => return vec![],
      },
      _ => return Self::no_workspace(),
    };

    let tutor = self.state.tutor.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let reply = tutor.ask(pending.body()).await;
      let _ = tx.send(Completion::Turn { pending, reply });
    });

    let mut out: Vec<ServerWsMessage> = student.map(|turn| ServerWsMessage::Turn { turn }).into_iter().collect();
    out.push(ServerWsMessage::TutorTyping { typing: true });
    out
  }

  fn active_session_id(&self) -> Option<Uuid> {
    match &self.view {
      View::Problem(s) => Some(s.id()),
      View::Topic(t) => Some(t.id()),
      _ => None,
    }
  }

  /// Feed a finished backend call back into the workspace.
  #[instrument(level = "debug", skip_all)]
  pub fn apply(&mut self, completion: Completion) -> Vec<ServerWsMessage> {
    match completion {
      Completion::Loaded { generation, slug, result } => {
        let current = matches!(&self.view, View::Loading { generation: g, .. } if *g == generation);
        if !current {
          debug!(target: "session", %slug, generation, "Stale problem load dropped");
          return vec![];
        }
        match result {
          Ok(session) => {
            let out = ServerWsMessage::Workspace { workspace: workspace_out(&session) };
            self.view = View::Problem(session);
            vec![out]
          }
          Err(e) => {
            warn!(target: "session", %slug, kind = e.kind(), "Workspace blocked");
            self.view = View::Blocked { slug: slug.clone() };
            vec![ServerWsMessage::LoadFailed { slug, reason: e.kind(), message: e.to_string() }]
          }
        }
      }

      Completion::Submission { pending, reply } => {
        let Some(s) = self.session_mut().filter(|s| s.id() == pending.session_id()) else {
          debug!(target: "session", "Stale submission result dropped");
          return vec![];
        };
        let outcome = s.finish_submission(pending, reply);
        let mut out = vec![ServerWsMessage::Console { console: ConsoleOut::from(outcome) }];
        if let SubmissionOutcome::Judged(_, report) = outcome {
          out.push(ServerWsMessage::Report { report: ReportOut::from(report) });
        }
        out
      }

      Completion::Turn { pending, reply } => {
        if self.active_session_id() != Some(pending.session_id()) {
          debug!(target: "session", "Stale tutor reply dropped");
          return vec![];
        }
        let turn = match &mut self.view {
          View::Problem(s) => TurnOut::from(s.finish_turn(pending, reply)),
          View::Topic(t) => TurnOut::from(t.conversation_mut().receive(pending, reply)),
          _ => return vec![],
        };
        vec![ServerWsMessage::Turn { turn }, ServerWsMessage::TutorTyping { typing: false }]
      }
    }
  }

  /// Slug of the problem being loaded, shown, or blocked, if any.
  pub fn slug(&self) -> Option<&str> {
    match &self.view {
      View::Loading { slug, .. } | View::Blocked { slug } => Some(slug),
      View::Problem(s) => Some(&s.problem().slug),
      _ => None,
    }
  }
}
