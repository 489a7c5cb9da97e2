use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must offer at least one choice")]
    NoChoices,

    #[error("choice at position {index} is empty")]
    EmptyChoice { index: usize },

    #[error("duplicate choice: {choice}")]
    DuplicateChoice { choice: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question shape, as written in catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    #[serde(default = "default_choices")]
    pub choices: Vec<String>,
    #[serde(default)]
    pub allow_text: bool,
}

fn default_choices() -> Vec<String> {
    vec!["Yes".to_owned(), "No".to_owned()]
}

impl QuestionDraft {
    /// Yes/No question without free text.
    #[must_use]
    pub fn yes_no(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: default_choices(),
            allow_text: false,
        }
    }

    #[must_use]
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_allow_text(mut self, allow_text: bool) -> Self {
        self.allow_text = allow_text;
        self
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are no choices, or
    /// a choice is blank or repeated.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.choices.is_empty() {
            return Err(QuestionError::NoChoices);
        }
        for (index, choice) in self.choices.iter().enumerate() {
            if choice.trim().is_empty() {
                return Err(QuestionError::EmptyChoice { index });
            }
            if self.choices[..index].contains(choice) {
                return Err(QuestionError::DuplicateChoice {
                    choice: choice.clone(),
                });
            }
        }

        Ok(Question {
            text: self.text,
            choices: self.choices,
            allow_text: self.allow_text,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A prompt with a fixed choice set and optional free-text augmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    choices: Vec<String>,
    allow_text: bool,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn allow_text(&self) -> bool {
        self.allow_text
    }

    /// Returns true if `choice` is one of the declared choices.
    #[must_use]
    pub fn accepts(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }
}
