use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, SurveyKey};
use crate::model::response::Response;

/// Ephemeral per-client progress record.
///
/// `responses` is `None` until an attempt has been started. Within one attempt
/// it is append-only, so its length is always the id of the next unanswered
/// question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    current_survey: Option<SurveyKey>,
    responses: Option<Vec<Response>>,
    #[serde(default)]
    completed: bool,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate session state from stored parts.
    #[must_use]
    pub fn from_parts(
        current_survey: Option<SurveyKey>,
        responses: Option<Vec<Response>>,
        completed: bool,
    ) -> Self {
        Self {
            current_survey,
            responses,
            completed,
        }
    }

    #[must_use]
    pub fn current_survey(&self) -> Option<&SurveyKey> {
        self.current_survey.as_ref()
    }

    #[must_use]
    pub fn responses(&self) -> Option<&[Response]> {
        self.responses.as_deref()
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.responses.is_some()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of answers recorded in the current attempt (0 if not started).
    #[must_use]
    pub fn answered(&self) -> usize {
        self.responses.as_ref().map_or(0, Vec::len)
    }

    /// Id of the next unanswered question.
    #[must_use]
    pub fn next_question(&self) -> QuestionId {
        QuestionId::new(self.answered())
    }

    /// Point the session at a survey and drop any previous attempt.
    pub fn select(&mut self, key: SurveyKey) {
        self.current_survey = Some(key);
        self.responses = None;
        self.completed = false;
    }

    /// Start a fresh attempt for the current survey.
    pub fn restart(&mut self) {
        self.responses = Some(Vec::new());
        self.completed = false;
    }

    /// Append a response. Starts an attempt if none is open.
    pub fn push(&mut self, response: Response) {
        self.responses.get_or_insert_with(Vec::new).push(response);
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}
