mod machine;
mod progress;
mod session;
mod view;
mod workflow;

// Public API of the survey flow subsystem.
pub use machine::{
    ChoicePolicy, Completion, FlowState, MismatchWarning, QuestionStep, Selection, SurveyFlow,
};
pub use progress::SurveyProgress;
pub use session::{COMPLETED_KEY, CURRENT_SURVEY_KEY, FLASHES_KEY, RESPONSES_KEY, SessionAdapter};
pub use view::{
    AnsweredQuestion, CompletionSummary, QuestionOutcome, QuestionView, SelectOutcome,
    SurveyOverview,
};
pub use workflow::{DEFAULT_COMPLETION_TTL_SECS, DEFAULT_SESSION_TTL_SECS, SurveyService};
