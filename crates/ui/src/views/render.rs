use dioxus::prelude::*;

use crate::views::{
    AlreadyCompletedPage, AlreadyCompletedPageProps, CompletionPage, CompletionPageProps,
    ErrorPage, ErrorPageProps, QuestionPage, QuestionPageProps, SurveyPickerPage,
    SurveyPickerPageProps, SurveyStartPage, SurveyStartPageProps,
};

const DOCTYPE: &str = "<!DOCTYPE html>";

fn finish(mut dom: VirtualDom) -> String {
    dom.rebuild_in_place();
    format!("{DOCTYPE}{}", dioxus_ssr::render(&dom))
}

#[must_use]
pub fn render_survey_picker(props: SurveyPickerPageProps) -> String {
    finish(VirtualDom::new_with_props(SurveyPickerPage, props))
}

#[must_use]
pub fn render_survey_start(props: SurveyStartPageProps) -> String {
    finish(VirtualDom::new_with_props(SurveyStartPage, props))
}

#[must_use]
pub fn render_question(props: QuestionPageProps) -> String {
    finish(VirtualDom::new_with_props(QuestionPage, props))
}

#[must_use]
pub fn render_completion(props: CompletionPageProps) -> String {
    finish(VirtualDom::new_with_props(CompletionPage, props))
}

#[must_use]
pub fn render_already_completed(props: AlreadyCompletedPageProps) -> String {
    finish(VirtualDom::new_with_props(AlreadyCompletedPage, props))
}

#[must_use]
pub fn render_error(status: u16, message: impl Into<String>) -> String {
    finish(VirtualDom::new_with_props(
        ErrorPage,
        ErrorPageProps {
            status,
            message: message.into(),
        },
    ))
}
