//! Request/response bodies of the remote problem, judge and tutor backends.
//!
//! These mirror the backends' JSON exactly; `domain` types are built from them
//! after decoding so a shape change stays contained here.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Difficulty, ProblemDescriptor, ProblemSummary, SampleCase, SubmissionMode, SubmissionRequest};

#[derive(Debug, Deserialize)]
pub struct ProblemWire {
  pub slug: String,
  pub title: String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub hints: Vec<String>,
  #[serde(default)]
  pub test_cases: Vec<SampleCaseWire>,
}

#[derive(Debug, Deserialize)]
pub struct SampleCaseWire {
  pub input: String,
  pub output: String,
}

impl From<ProblemWire> for ProblemDescriptor {
  fn from(w: ProblemWire) -> Self {
    ProblemDescriptor {
      slug: w.slug,
      title: w.title,
      difficulty: w.difficulty,
      description: w.description,
      hints: w.hints,
      test_cases: w
        .test_cases
        .into_iter()
        .map(|tc| SampleCase { input: tc.input, expected_output: tc.output })
        .collect(),
    }
  }
}

/// Catalog rows carry more than we need; unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ProblemSummaryWire {
  pub slug: String,
  pub title: String,
  pub difficulty: Difficulty,
}

impl From<ProblemSummaryWire> for ProblemSummary {
  fn from(w: ProblemSummaryWire) -> Self {
    ProblemSummary { slug: w.slug, title: w.title, difficulty: w.difficulty }
  }
}

#[derive(Debug, Serialize)]
pub struct SubmitBody<'a> {
  pub source_code: &'a str,
  pub language_id: u32,
  pub problem_slug: &'a str,
  pub mode: SubmissionMode,
}

impl<'a> From<&'a SubmissionRequest> for SubmitBody<'a> {
  fn from(r: &'a SubmissionRequest) -> Self {
    SubmitBody {
      source_code: &r.source_code,
      language_id: r.language_id,
      problem_slug: &r.problem_slug,
      mode: r.mode,
    }
  }
}

/// Raw judge reply. Scoring fields are only meaningful on `submit` successes;
/// `pipeline::classify` decides what survives.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct JudgeReply {
  pub success: bool,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub runtime: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub memory: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub stdout: Option<String>,
  #[serde(default)]
  pub stderr: Option<String>,
  #[serde(default)]
  pub compile_output: Option<String>,
  #[serde(default)]
  pub score: Option<f64>,
  #[serde(default)]
  pub complexity_label: Option<String>,
  #[serde(default)]
  pub complexity_analysis: Option<String>,
  #[serde(default)]
  pub editorial_snippet: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct VivaBody {
  /// Newest turn's raw text; may be prose despite the name.
  pub student_code: String,
  pub topic: String,
  pub conversation_history: String,
}

#[derive(Debug, Deserialize)]
pub struct VivaReply {
  #[serde(default)]
  pub question: Option<String>,
}

/// Judges report `runtime`/`memory` as strings ("0.01") or bare numbers (1024).
fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum StrOrNum {
    Str(String),
    Int(i64),
    Float(f64),
  }

  Ok(Option::<StrOrNum>::deserialize(d)?.map(|v| match v {
    StrOrNum::Str(s) => s,
    StrOrNum::Int(n) => n.to_string(),
    StrOrNum::Float(f) => f.to_string(),
  }))
}
