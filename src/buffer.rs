//! Source buffer and language selection for one workspace.

use crate::domain::LanguageOption;

/// Current source text plus the selected language.
///
/// Until the user types, the text tracks the boilerplate of the selected
/// language. Once edited, nothing but the user writes to it.
#[derive(Debug)]
pub struct CodeBuffer {
  language: &'static LanguageOption,
  text: String,
  edited: bool,
}

impl CodeBuffer {
  pub fn seeded(language: &'static LanguageOption, problem_slug: &str) -> Self {
    Self { language, text: language.boilerplate(problem_slug), edited: false }
  }

  pub fn language(&self) -> &'static LanguageOption {
    self.language
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn is_edited(&self) -> bool {
    self.edited
  }

  /// Replace the text with user input. Returns false when nothing changed.
  pub fn edit(&mut self, text: impl Into<String>) -> bool {
    let text = text.into();
    if text == self.text {
      return false;
    }
    self.text = text;
    self.edited = true;
    true
  }

  /// Switch language; the text is reset to the new boilerplate only while unedited.
  /// Returns true when the text was replaced.
  pub fn select_language(&mut self, language: &'static LanguageOption, problem_slug: &str) -> bool {
    self.language = language;
    if self.edited {
      return false;
    }
    self.text = language.boilerplate(problem_slug);
    true
  }
}
