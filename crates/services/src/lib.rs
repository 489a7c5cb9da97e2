#![forbid(unsafe_code)]

pub mod error;
pub mod flow;

pub use survey_core::Clock;

pub use error::FlowError;
pub use flow::{
    AnsweredQuestion, ChoicePolicy, CompletionSummary, DEFAULT_COMPLETION_TTL_SECS,
    DEFAULT_SESSION_TTL_SECS, FlowState, MismatchWarning, QuestionOutcome, QuestionView,
    SelectOutcome, SurveyFlow, SurveyOverview, SurveyProgress, SurveyService,
};
