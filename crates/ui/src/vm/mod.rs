mod markdown_vm;
mod survey_vm;

pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use survey_vm::{
    AnswerVm, CompletionVm, QuestionVm, SurveyCardVm, SurveyStartVm, map_completion,
    map_question, map_survey_cards, map_survey_start,
};
