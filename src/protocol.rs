//! Public protocol structs for the browser console (WebSocket + HTTP), serde ready.
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatTurn, Difficulty, LanguageOption, ProblemDescriptor, SampleCase, SubmissionMode, TurnFormat};
use crate::pipeline::{Diagnostics, SubmissionOutcome};
use crate::report::Report;
use crate::session::{Session, TopicSession};

/// Messages the browser can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    OpenProblem {
        slug: String,
    },
    SelectLanguage {
        #[serde(rename = "languageId")]
        language_id: u32,
    },
    EditCode {
        code: String,
    },
    Run,
    Submit,
    RevealHint,
    Chat {
        text: String,
        #[serde(rename = "isCode", default)]
        is_code: bool,
    },
    DismissReport,
    NextProblem,
    StartTopic {
        topic: String,
    },
    ResetTopic,
}

/// Messages the console sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Loading {
        slug: String,
    },
    Workspace {
        workspace: WorkspaceOut,
    },
    LoadFailed {
        slug: String,
        reason: &'static str,
        message: String,
    },
    Buffer {
        #[serde(rename = "languageId")]
        language_id: u32,
        code: String,
    },
    SubmissionPending {
        mode: SubmissionMode,
    },
    Console {
        console: ConsoleOut,
    },
    Report {
        report: ReportOut,
    },
    ReportDismissed,
    Turn {
        turn: TurnOut,
    },
    TutorTyping {
        typing: bool,
    },
    Hint {
        index: usize,
        text: String,
        remaining: usize,
    },
    TopicStarted {
        topic: String,
        transcript: Vec<TurnOut>,
    },
    /// The workspace was torn down (next problem / topic reset).
    Closed,
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct WorkspaceOut {
    pub slug: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub test_cases: Vec<SampleCaseOut>,
    #[serde(rename = "hintCount")]
    pub hint_count: usize,
    #[serde(rename = "languageId")]
    pub language_id: u32,
    pub code: String,
    pub transcript: Vec<TurnOut>,
}

#[derive(Debug, Serialize)]
pub struct SampleCaseOut {
    pub input: String,
    pub output: String,
}

impl From<&SampleCase> for SampleCaseOut {
    fn from(tc: &SampleCase) -> Self {
        SampleCaseOut { input: tc.input.clone(), output: tc.expected_output.clone() }
    }
}

/// What the console area shows for the latest settled submission.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsoleOut {
    Success {
        message: String,
        runtime: Option<String>,
        memory: Option<String>,
        stdout: Option<String>,
    },
    Error {
        kind: &'static str,
        error: String,
        diagnostics: Diagnostics,
    },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReportOut {
    pub score: f64,
    #[serde(rename = "scoreLine")]
    pub score_line: String,
    pub complexity: Option<String>,
    pub runtime: Option<String>,
    #[serde(rename = "editorialSnippet")]
    pub editorial_snippet: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TurnOut {
    pub speaker: crate::domain::Speaker,
    pub text: String,
    #[serde(rename = "isCode")]
    pub is_code: bool,
    pub time: String,
}

impl From<&ChatTurn> for TurnOut {
    fn from(t: &ChatTurn) -> Self {
        TurnOut {
            speaker: t.speaker,
            text: t.text.clone(),
            is_code: t.format == TurnFormat::Code,
            time: t.timestamp.format("%H:%M").to_string(),
        }
    }
}

impl From<&SubmissionOutcome> for ConsoleOut {
    fn from(o: &SubmissionOutcome) -> Self {
        match o {
            SubmissionOutcome::Ran(e) | SubmissionOutcome::Judged(e, _) => ConsoleOut::Success {
                message: e.message.clone(),
                runtime: e.runtime.clone(),
                memory: e.memory.clone(),
                stdout: e.stdout.clone(),
            },
            SubmissionOutcome::Failed { kind, error_text, diagnostics } => ConsoleOut::Error {
                kind: *kind,
                error: error_text.clone(),
                diagnostics: diagnostics.clone(),
            },
        }
    }
}

impl From<&Report> for ReportOut {
    fn from(r: &Report) -> Self {
        ReportOut {
            score: r.score,
            score_line: r.score_line(),
            complexity: r.complexity.clone(),
            runtime: r.runtime.clone(),
            editorial_snippet: r.editorial_snippet.clone(),
        }
    }
}

/// Full workspace snapshot sent once the problem has loaded.
pub fn workspace_out(s: &Session) -> WorkspaceOut {
    let p: &ProblemDescriptor = s.problem();
    WorkspaceOut {
        slug: p.slug.clone(),
        title: p.title.clone(),
        difficulty: p.difficulty,
        description: p.description.clone(),
        test_cases: p.test_cases.iter().map(SampleCaseOut::from).collect(),
        hint_count: p.hints.len(),
        language_id: s.buffer().language().id,
        code: s.buffer().text().to_string(),
        transcript: s.conversation().turns().iter().map(TurnOut::from).collect(),
    }
}

pub fn topic_started(t: &TopicSession) -> ServerWsMessage {
    ServerWsMessage::TopicStarted {
        topic: t.conversation().topic().to_string(),
        transcript: t.conversation().turns().iter().map(TurnOut::from).collect(),
    }
}

//
// HTTP response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct LanguageOut {
    pub id: u32,
    pub name: &'static str,
    pub slug: &'static str,
}

impl From<&LanguageOption> for LanguageOut {
    fn from(l: &LanguageOption) -> Self {
        LanguageOut { id: l.id, name: l.display_name, slug: l.slug }
    }
}

#[derive(Serialize)]
pub struct TopicsOut {
    pub topics: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Execution;
    use serde_json::json;

    #[test]
    fn parses_client_messages() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"chat","text":"hi","isCode":true}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Chat { is_code: true, .. }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Chat { is_code: false, .. }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"select_language","languageId":54}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::SelectLanguage { language_id: 54 }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"submit"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Submit));
    }

    #[test]
    fn console_error_carries_diagnostics() {
        let out = ConsoleOut::from(&SubmissionOutcome::Failed {
            kind: "judge_failure",
            error_text: "Runtime Error".into(),
            diagnostics: Diagnostics { stderr: Some("IndexError".into()), ..Default::default() },
        });
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "status": "error",
                "kind": "judge_failure",
                "error": "Runtime Error",
                "diagnostics": {"compile_output": null, "stderr": "IndexError", "stdout": null}
            })
        );
    }

    #[test]
    fn console_success_shape() {
        let out = ConsoleOut::from(&SubmissionOutcome::Ran(Execution {
            message: "3/3 passed".into(),
            runtime: Some("0.01".into()),
            memory: Some("1400".into()),
            stdout: None,
        }));
        let msg = serde_json::to_value(ServerWsMessage::Console { console: out }).unwrap();
        assert_eq!(msg["type"], "console");
        assert_eq!(msg["console"]["status"], "success");
        assert_eq!(msg["console"]["message"], "3/3 passed");
    }
}
