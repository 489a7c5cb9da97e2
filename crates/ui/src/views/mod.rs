mod completion;
mod layout;
mod notice;
mod picker;
mod question;
mod render;
mod start;

#[cfg(test)]
mod page_smoke;

pub use completion::{CompletionPage, CompletionPageProps};
pub use layout::Layout;
pub use notice::{AlreadyCompletedPage, AlreadyCompletedPageProps, ErrorPage, ErrorPageProps};
pub use picker::{SurveyPickerPage, SurveyPickerPageProps};
pub use question::{QuestionPage, QuestionPageProps};
pub use render::{
    render_already_completed, render_completion, render_error, render_question,
    render_survey_picker, render_survey_start,
};
pub use start::{SurveyStartPage, SurveyStartPageProps};
