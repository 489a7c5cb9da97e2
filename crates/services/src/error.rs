use storage::repository::StorageError;
use survey_core::model::{QuestionId, SurveyKey};
use thiserror::Error;

/// Errors emitted by the survey flow.
///
/// Out-of-order question requests are not errors; they come back as a
/// redirect carrying a `MismatchWarning`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("unknown survey: {0}")]
    UnknownSurvey(SurveyKey),

    #[error("survey {survey} has no question {id}")]
    UnknownQuestion { survey: SurveyKey, id: QuestionId },

    #[error("no survey selected")]
    NoSurveySelected,

    #[error("survey has not been started")]
    NotStarted,

    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("{choice:?} is not a valid choice for question {id}")]
    InvalidChoice { id: QuestionId, choice: String },

    #[error("all questions have already been answered")]
    SurveyFinished,

    #[error("survey already completed")]
    AlreadyCompleted,

    #[error("corrupt session value for {key}: {message}")]
    CorruptSession { key: &'static str, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FlowError {
    /// Unknown survey key or question id.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownSurvey(_) | Self::UnknownQuestion { .. })
    }

    /// An operation was invoked before the steps it depends on.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::NoSurveySelected | Self::NotStarted | Self::Incomplete { .. }
        )
    }
}
