//! Server-rendered survey pages.
//!
//! View models in [`vm`] flatten service results into display strings;
//! [`views`] renders them to complete HTML documents with `dioxus-ssr`.

pub mod views;
pub mod vm;

pub use views::{
    AlreadyCompletedPageProps, CompletionPageProps, QuestionPageProps, SurveyPickerPageProps,
    SurveyStartPageProps, render_already_completed, render_completion, render_error,
    render_question, render_survey_picker, render_survey_start,
};
