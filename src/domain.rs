//! Domain models used by the console: problems, languages, submissions and chat turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How hard is the problem?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

/// A display-only sample case. The judge runs its own hidden cases.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleCase {
  pub input: String,
  pub expected_output: String,
}

/// Immutable problem definition; replaced wholesale when the slug changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDescriptor {
  pub slug: String,
  pub title: String,
  pub difficulty: Difficulty,
  pub description: String,
  /// Loaded eagerly, revealed one at a time.
  pub hints: Vec<String>,
  pub test_cases: Vec<SampleCase>,
}

/// Catalog entry, as listed by `GET /problems`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemSummary {
  pub slug: String,
  pub title: String,
  pub difficulty: Difficulty,
}

/// One entry of the fixed language table. `id` is the judge's numeric language id.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageOption {
  pub id: u32,
  pub display_name: &'static str,
  pub slug: &'static str,
}

pub const PYTHON: LanguageOption = LanguageOption { id: 71, display_name: "Python (3.8)", slug: "python" };
pub const CPP: LanguageOption = LanguageOption { id: 54, display_name: "C++ (GCC 9.2)", slug: "cpp" };
pub const JAVA: LanguageOption = LanguageOption { id: 62, display_name: "Java (OpenJDK 13)", slug: "java" };
pub const JAVASCRIPT: LanguageOption = LanguageOption { id: 63, display_name: "JavaScript (Node.js)", slug: "javascript" };

pub static LANGUAGES: [&LanguageOption; 4] = [&PYTHON, &CPP, &JAVA, &JAVASCRIPT];

pub const DEFAULT_LANGUAGE: &LanguageOption = &PYTHON;

impl LanguageOption {
  pub fn by_id(id: u32) -> Option<&'static LanguageOption> {
    LANGUAGES.iter().copied().find(|l| l.id == id)
  }

  /// Deterministic starter stub for a problem. Dashes in the slug become underscores
  /// so the slug doubles as a function name.
  pub fn boilerplate(&self, problem_slug: &str) -> String {
    let name = problem_slug.replace('-', "_");
    match self.slug {
      "python" => format!("def {name}(nums, target):\n    # Write your solution here\n    pass"),
      "cpp" => format!(
        "#include <iostream>\n#include <vector>\nusing namespace std;\n\n// Function signature might vary based on problem\n// void {name}(...) {{\n// }}"
      ),
      "java" => "public class Main {\n    public static void solve() {\n        // Write solution\n    }\n}".to_string(),
      "javascript" => format!("function {name}(nums, target) {{\n    // Write solution\n}}"),
      _ => String::new(),
    }
  }
}

/// `run` executes against sample cases; `submit` is a full judged execution.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
  Run,
  Submit,
}

impl SubmissionMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      SubmissionMode::Run => "run",
      SubmissionMode::Submit => "submit",
    }
  }
}

/// Built fresh for each attempt and never mutated after dispatch.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SubmissionRequest {
  pub source_code: String,
  pub language_id: u32,
  pub problem_slug: String,
  pub mode: SubmissionMode,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
  Tutor,
  Student,
}

impl Speaker {
  pub fn label(&self) -> &'static str {
    match self {
      Speaker::Tutor => "Tutor",
      Speaker::Student => "Student",
    }
  }
}

/// Code turns render as a monospace block but flatten like prose.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnFormat {
  #[default]
  Prose,
  Code,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ChatTurn {
  pub speaker: Speaker,
  pub text: String,
  pub format: TurnFormat,
  pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
  pub fn tutor(text: impl Into<String>) -> Self {
    Self { speaker: Speaker::Tutor, text: text.into(), format: TurnFormat::Prose, timestamp: Utc::now() }
  }

  pub fn student(text: impl Into<String>, format: TurnFormat) -> Self {
    Self { speaker: Speaker::Student, text: text.into(), format, timestamp: Utc::now() }
  }

  /// `"<Speaker>: <text>"`, the line format of the flattened transcript.
  pub fn context_line(&self) -> String {
    format!("{}: {}", self.speaker.label(), self.text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn boilerplate_uses_underscored_slug() {
    assert_eq!(
      PYTHON.boilerplate("two-sum"),
      "def two_sum(nums, target):\n    # Write your solution here\n    pass"
    );
    assert!(JAVASCRIPT.boilerplate("two-sum").starts_with("function two_sum(nums, target) {"));
    assert!(CPP.boilerplate("two-sum").contains("// void two_sum(...) {"));
  }

  #[test]
  fn boilerplates_differ_per_language() {
    for a in LANGUAGES.iter() {
      for b in LANGUAGES.iter() {
        if a.id != b.id {
          assert_ne!(a.boilerplate("two-sum"), b.boilerplate("two-sum"));
        }
      }
    }
  }

  #[test]
  fn lookup_by_id() {
    assert_eq!(LanguageOption::by_id(62), Some(&JAVA));
    assert_eq!(LanguageOption::by_id(1), None);
  }

  #[test]
  fn context_line_format() {
    assert_eq!(ChatTurn::tutor("why?").context_line(), "Tutor: why?");
    assert_eq!(ChatTurn::student("x = 1", TurnFormat::Code).context_line(), "Student: x = 1");
  }
}
