//! Submission pipeline: `Idle -> Pending(mode) -> Succeeded | Failed`.
//!
//! `begin` hands out a [`PendingSubmission`] ticket and `complete` consumes it,
//! so a completion without a dispatch cannot be written. A trigger while a
//! ticket is outstanding returns `None` and leaves the state untouched.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{SubmissionMode, SubmissionRequest};
use crate::error::ConsoleError;
use crate::report::Report;
use crate::wire::JudgeReply;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
  Idle,
  Pending(SubmissionMode),
  /// At rest; a new dispatch is allowed.
  Succeeded(SubmissionMode),
  /// At rest; a new dispatch is allowed.
  Failed(SubmissionMode),
}

/// What a successful execution shows in the console.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Execution {
  pub message: String,
  pub runtime: Option<String>,
  pub memory: Option<String>,
  pub stdout: Option<String>,
}

/// Compile/runtime output the judge attached to a failure.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Diagnostics {
  pub compile_output: Option<String>,
  pub stderr: Option<String>,
  pub stdout: Option<String>,
}

/// A classified judge reply. Scoring only exists on `Judged`.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionOutcome {
  Ran(Execution),
  Judged(Execution, Report),
  /// `kind` is the `ConsoleError::kind` of the cause: a judge verdict or a transport failure.
  Failed { kind: &'static str, error_text: String, diagnostics: Diagnostics },
}

/// Proof of an in-flight dispatch. Not `Clone`; only `SubmissionPipeline::begin` makes one.
#[derive(Debug)]
pub struct PendingSubmission {
  session_id: Uuid,
  request: SubmissionRequest,
}

impl PendingSubmission {
  pub fn session_id(&self) -> Uuid {
    self.session_id
  }

  pub fn request(&self) -> &SubmissionRequest {
    &self.request
  }

  pub fn mode(&self) -> SubmissionMode {
    self.request.mode
  }
}

#[derive(Debug)]
pub struct SubmissionPipeline {
  session_id: Uuid,
  state: PipelineState,
  console: Option<SubmissionOutcome>,
}

impl SubmissionPipeline {
  pub fn new(session_id: Uuid) -> Self {
    Self { session_id, state: PipelineState::Idle, console: None }
  }

  #[allow(dead_code)]
  pub fn state(&self) -> PipelineState {
    self.state
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.state, PipelineState::Pending(_))
  }

  /// Latest settled outcome, as shown in the console area.
  #[allow(dead_code)]
  pub fn console(&self) -> Option<&SubmissionOutcome> {
    self.console.as_ref()
  }

  /// Move to `Pending` and hand out the request to dispatch. `None` while already pending.
  pub fn begin(
    &mut self,
    mode: SubmissionMode,
    source_code: &str,
    language_id: u32,
    problem_slug: &str,
  ) -> Option<PendingSubmission> {
    if self.is_pending() {
      debug!(target: "session", mode = mode.as_str(), "Submission ignored: one already in flight");
      return None;
    }
    self.state = PipelineState::Pending(mode);
    let request = SubmissionRequest {
      source_code: source_code.to_string(),
      language_id,
      problem_slug: problem_slug.to_string(),
      mode,
    };
    info!(target: "session", mode = mode.as_str(), %language_id, code_len = source_code.len(), "Submission dispatched");
    Some(PendingSubmission { session_id: self.session_id, request })
  }

  /// Settle the in-flight dispatch. Never fails: errors become `Failed`.
  pub fn complete(
    &mut self,
    pending: PendingSubmission,
    reply: Result<JudgeReply, ConsoleError>,
  ) -> &SubmissionOutcome {
    let mode = pending.mode();
    let outcome = classify(mode, reply);
    self.state = match outcome {
      SubmissionOutcome::Failed { ref error_text, .. } => {
        warn!(target: "session", mode = mode.as_str(), error = %error_text, "Submission failed");
        PipelineState::Failed(mode)
      }
      _ => {
        info!(target: "session", mode = mode.as_str(), has_report = matches!(outcome, SubmissionOutcome::Judged(..)), "Submission succeeded");
        PipelineState::Succeeded(mode)
      }
    };
    self.console.insert(outcome)
  }
}

/// Decide what a judge reply means for the given mode.
pub fn classify(mode: SubmissionMode, reply: Result<JudgeReply, ConsoleError>) -> SubmissionOutcome {
  let reply = match reply {
    Ok(r) => r,
    Err(e) => {
      let kind = e.kind();
      let detail = match e {
        ConsoleError::TransientFetch(d) => d,
        other => other.to_string(),
      };
      return SubmissionOutcome::Failed {
        kind,
        error_text: format!("Execution failed: {detail}"),
        diagnostics: Diagnostics::default(),
      };
    }
  };

  if !reply.success {
    let verdict = ConsoleError::JudgeFailure(
      reply.error.or(reply.message).unwrap_or_else(|| "Execution failed.".to_string()),
    );
    return SubmissionOutcome::Failed {
      kind: verdict.kind(),
      error_text: verdict.to_string(),
      diagnostics: Diagnostics { compile_output: reply.compile_output, stderr: reply.stderr, stdout: reply.stdout },
    };
  }

  let execution = Execution {
    message: reply.message.unwrap_or_default(),
    runtime: reply.runtime,
    memory: reply.memory,
    stdout: reply.stdout,
  };

  match (mode, reply.score) {
    (SubmissionMode::Submit, Some(score)) => {
      let report = Report {
        score,
        complexity: reply.complexity_label.or(reply.complexity_analysis),
        runtime: execution.runtime.clone(),
        editorial_snippet: reply.editorial_snippet,
      };
      SubmissionOutcome::Judged(execution, report)
    }
    _ => SubmissionOutcome::Ran(execution),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pipeline() -> SubmissionPipeline {
    SubmissionPipeline::new(Uuid::new_v4())
  }

  fn ok_run() -> JudgeReply {
    JudgeReply {
      success: true,
      message: Some("3/3 passed".into()),
      runtime: Some("0.01".into()),
      memory: Some("1400".into()),
      ..Default::default()
    }
  }

  fn scored() -> JudgeReply {
    JudgeReply {
      success: true,
      score: Some(92.0),
      complexity_label: Some("O(n)".into()),
      editorial_snippet: Some("Use a hash map.".into()),
      ..Default::default()
    }
  }

  #[test]
  fn second_trigger_while_pending_is_ignored() {
    let mut p = pipeline();
    let first = p.begin(SubmissionMode::Run, "a", 71, "two-sum");
    assert!(first.is_some());
    assert_eq!(p.state(), PipelineState::Pending(SubmissionMode::Run));

    assert!(p.begin(SubmissionMode::Submit, "b", 71, "two-sum").is_none());
    assert!(p.begin(SubmissionMode::Run, "a", 71, "two-sum").is_none());
    assert_eq!(p.state(), PipelineState::Pending(SubmissionMode::Run));
    assert!(p.console().is_none());
  }

  #[test]
  fn settled_states_accept_a_new_dispatch() {
    let mut p = pipeline();
    let t = p.begin(SubmissionMode::Run, "a", 71, "two-sum").unwrap();
    p.complete(t, Ok(ok_run()));
    assert_eq!(p.state(), PipelineState::Succeeded(SubmissionMode::Run));

    let t = p.begin(SubmissionMode::Run, "a", 71, "two-sum").unwrap();
    p.complete(t, Err(ConsoleError::TransientFetch("connection refused".into())));
    assert_eq!(p.state(), PipelineState::Failed(SubmissionMode::Run));

    assert!(p.begin(SubmissionMode::Submit, "a", 71, "two-sum").is_some());
  }

  #[test]
  fn identical_submissions_build_independent_requests() {
    let mut p = pipeline();
    let a = p.begin(SubmissionMode::Run, "x", 71, "two-sum").unwrap();
    let req_a = a.request().clone();
    p.complete(a, Ok(ok_run()));
    let b = p.begin(SubmissionMode::Run, "x", 71, "two-sum").unwrap();
    assert_eq!(&req_a, b.request());
  }

  #[test]
  fn judge_failure_keeps_error_verbatim() {
    let reply = JudgeReply {
      success: false,
      error: Some("Compilation Error\n  line 3: expected ':'".into()),
      compile_output: Some("SyntaxError".into()),
      ..Default::default()
    };
    match classify(SubmissionMode::Run, Ok(reply)) {
      SubmissionOutcome::Failed { kind, error_text, diagnostics } => {
        assert_eq!(kind, "judge_failure");
        assert_eq!(error_text, "Compilation Error\n  line 3: expected ':'");
        assert_eq!(diagnostics.compile_output.as_deref(), Some("SyntaxError"));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn failure_without_error_field_falls_back() {
    let reply = JudgeReply { success: false, ..Default::default() };
    assert!(matches!(
      classify(SubmissionMode::Submit, Ok(reply)),
      SubmissionOutcome::Failed { ref error_text, .. } if error_text == "Execution failed."
    ));
  }

  #[test]
  fn transport_failure_is_captured() {
    let out = classify(SubmissionMode::Submit, Err(ConsoleError::TransientFetch("timed out".into())));
    assert!(matches!(out, SubmissionOutcome::Failed { kind: "transient_fetch", ref error_text, .. } if error_text == "Execution failed: timed out"));
  }

  #[test]
  fn run_never_produces_a_report() {
    assert!(matches!(classify(SubmissionMode::Run, Ok(scored())), SubmissionOutcome::Ran(_)));
    assert!(matches!(classify(SubmissionMode::Run, Ok(ok_run())), SubmissionOutcome::Ran(_)));
  }

  #[test]
  fn scored_submit_produces_a_report() {
    match classify(SubmissionMode::Submit, Ok(scored())) {
      SubmissionOutcome::Judged(_, report) => {
        assert_eq!(report.score_line(), "92/100");
        assert_eq!(report.complexity.as_deref(), Some("O(n)"));
        assert_eq!(report.editorial_snippet.as_deref(), Some("Use a hash map."));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn complexity_falls_back_to_analysis() {
    let reply = JudgeReply {
      complexity_label: None,
      complexity_analysis: Some("Linear time".into()),
      ..scored()
    };
    match classify(SubmissionMode::Submit, Ok(reply)) {
      SubmissionOutcome::Judged(_, report) => assert_eq!(report.complexity.as_deref(), Some("Linear time")),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn unscored_submit_stays_in_console() {
    assert!(matches!(classify(SubmissionMode::Submit, Ok(ok_run())), SubmissionOutcome::Ran(_)));
  }
}
