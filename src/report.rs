//! Scored report produced by a successful `submit`, and the slot that presents it.

use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Report {
  pub score: f64,
  pub complexity: Option<String>,
  pub runtime: Option<String>,
  pub editorial_snippet: Option<String>,
}

impl Report {
  /// `92/100`
  pub fn score_line(&self) -> String {
    format!("{}/100", self.score)
  }
}

/// At most one report at a time. While present it is the primary surface for
/// the submission's outcome; the console keeps its own copy underneath.
#[derive(Debug, Default)]
pub struct ReportPresenter {
  current: Option<Report>,
}

impl ReportPresenter {
  pub fn present(&mut self, report: Report) {
    self.current = Some(report);
  }

  /// Returns false if there was nothing to dismiss.
  pub fn dismiss(&mut self) -> bool {
    self.current.take().is_some()
  }

  pub fn current(&self) -> Option<&Report> {
    self.current.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report() -> Report {
    Report {
      score: 92.0,
      complexity: Some("O(n)".into()),
      runtime: None,
      editorial_snippet: Some("Use a hash map.".into()),
    }
  }

  #[test]
  fn score_line_has_no_trailing_fraction() {
    assert_eq!(report().score_line(), "92/100");
    assert_eq!(Report { score: 87.5, ..report() }.score_line(), "87.5/100");
  }

  #[test]
  fn present_then_dismiss() {
    let mut p = ReportPresenter::default();
    assert!(!p.dismiss());
    p.present(report());
    assert_eq!(p.current().map(|r| r.score), Some(92.0));
    assert!(p.dismiss());
    assert!(p.current().is_none());
  }
}
