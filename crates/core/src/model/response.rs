use serde::{Deserialize, Serialize};

use crate::model::question::Question;

/// One answer record, tied to its question by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub choice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Response {
    #[must_use]
    pub fn new(choice: impl Into<String>) -> Self {
        Self {
            choice: choice.into(),
            text: None,
        }
    }

    /// Build a response for `question`, keeping free text only when the
    /// question allows it and it is not blank.
    #[must_use]
    pub fn for_question(question: &Question, choice: impl Into<String>, text: Option<String>) -> Self {
        let text = text
            .filter(|_| question.allow_text())
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        Self {
            choice: choice.into(),
            text,
        }
    }
}
