use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurveyError {
    #[error("survey title cannot be empty")]
    EmptyTitle,

    #[error("survey must contain at least one question")]
    NoQuestions,

    #[error("question {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// Unvalidated survey shape, as written in catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDraft {
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    pub questions: Vec<QuestionDraft>,
}

impl SurveyDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            instructions: instructions.into(),
            questions: Vec::new(),
        }
    }

    #[must_use]
    pub fn question(mut self, question: QuestionDraft) -> Self {
        self.questions.push(question);
        self
    }

    /// Validate the draft and all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError` if the title is blank, the survey has no
    /// questions, or any question fails validation.
    pub fn validate(self) -> Result<Survey, SurveyError> {
        if self.title.trim().is_empty() {
            return Err(SurveyError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| SurveyError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Survey {
            title: self.title,
            instructions: self.instructions,
            questions,
        })
    }
}

/// An ordered list of questions plus title and instructions.
///
/// The index of a question in `questions()` is its `QuestionId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Survey {
    title: String,
    instructions: String,
    questions: Vec<Question>,
}

impl Survey {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions; never zero for a validated survey.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Bounds-checked question lookup.
    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id.value())
    }
}
