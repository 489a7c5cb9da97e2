use std::sync::Arc;

use services::{Clock, QuestionOutcome, SelectOutcome, SurveyService};
use storage::repository::Storage;
use survey_core::model::{Catalog, ClientId, QuestionId, SurveyKey};
use survey_core::time::fixed_now;

use super::{
    AlreadyCompletedPageProps, CompletionPageProps, QuestionPageProps, SurveyPickerPageProps,
    SurveyStartPageProps, render_already_completed, render_completion, render_error,
    render_question, render_survey_picker, render_survey_start,
};
use crate::vm::{map_completion, map_question, map_survey_cards, map_survey_start};

fn service() -> SurveyService {
    SurveyService::from_storage(
        Clock::fixed(fixed_now()),
        Arc::new(Catalog::builtin()),
        &Storage::in_memory(),
    )
}

async fn question_html(svc: &SurveyService, client: ClientId, id: usize) -> String {
    let QuestionOutcome::Show(view) = svc.question(client, QuestionId::new(id)).await.unwrap()
    else {
        panic!("expected question {id} to be shown");
    };
    render_question(QuestionPageProps {
        vm: map_question(&view),
        flashes: svc.take_flashes(client).await.unwrap(),
    })
}

#[test]
fn picker_lists_every_survey_as_a_radio() {
    let html = render_survey_picker(SurveyPickerPageProps {
        surveys: map_survey_cards(&service().surveys()),
        flashes: Vec::new(),
    });
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("name=\"survey_code\""), "missing radio in {html}");
    assert!(html.contains("value=\"satisfaction\""));
    assert!(html.contains("value=\"personality\""));
    assert!(html.contains("Customer Satisfaction Survey"));
    assert!(html.contains("action=\"/\""));
    assert!(!html.contains("class=\"flashes\""));
}

#[test]
fn start_page_posts_to_begin_and_renders_instructions() {
    let overview = service()
        .overview(&SurveyKey::new("personality"))
        .unwrap();
    let html = render_survey_start(SurveyStartPageProps {
        vm: map_survey_start(&overview),
        flashes: Vec::new(),
    });
    assert!(html.contains("Rithm Personality Test"));
    assert!(html.contains("<p>Learn more about yourself with our personality quiz!</p>"));
    assert!(html.contains("action=\"/begin\""));
    assert!(html.contains("4 questions"));
}

#[tokio::test(flavor = "current_thread")]
async fn question_page_offers_text_only_where_allowed() {
    let svc = service();
    let client = ClientId::generate();
    let SelectOutcome::Ready(_) = svc
        .select_survey(client, &SurveyKey::new("personality"))
        .await
        .unwrap()
    else {
        panic!("expected survey to be selectable");
    };
    svc.begin(client).await.unwrap();

    let first = question_html(&svc, client, 0).await;
    assert!(first.contains("Do you ever dream about code?"));
    assert!(first.contains("Question 1 of 4"));
    assert!(first.contains("value=\"Yes\""));
    assert!(first.contains("value=\"No\""));
    assert!(!first.contains("<textarea"));

    for answer in ["Yes", "No", "Hedgehogs"] {
        svc.answer(client, answer, None).await.unwrap();
    }
    let last = question_html(&svc, client, 3).await;
    assert!(last.contains("value=\"wtf()\""));
    assert!(last.contains("<textarea"));
    assert!(last.contains("name=\"text\""));
}

#[tokio::test(flavor = "current_thread")]
async fn mismatch_warning_is_rendered_as_flash() {
    let svc = service();
    let client = ClientId::generate();
    svc.select_survey(client, &SurveyKey::new("satisfaction"))
        .await
        .unwrap();
    svc.begin(client).await.unwrap();

    let outcome = svc.question(client, QuestionId::new(3)).await.unwrap();
    assert!(matches!(outcome, QuestionOutcome::Redirect { .. }));

    let html = question_html(&svc, client, 0).await;
    assert!(html.contains("class=\"flashes\""));
    assert!(html.contains("Invalid question id: 3."), "missing flash in {html}");

    let reloaded = question_html(&svc, client, 0).await;
    assert!(!reloaded.contains("Invalid question id"));
}

#[tokio::test(flavor = "current_thread")]
async fn completion_page_lists_answers_with_comments() {
    let svc = service();
    let client = ClientId::generate();
    svc.select_survey(client, &SurveyKey::new("personality"))
        .await
        .unwrap();
    svc.begin(client).await.unwrap();
    for answer in ["Yes", "No", "Porcupines"] {
        svc.answer(client, answer, None).await.unwrap();
    }
    svc.answer(client, "do_stuff()", Some("too vague".into()))
        .await
        .unwrap();

    let summary = svc.complete(client).await.unwrap();
    let html = render_completion(CompletionPageProps {
        vm: map_completion(&summary),
        flashes: Vec::new(),
    });
    assert!(html.contains("Thank you!"));
    assert!(html.contains("Porcupines"));
    assert!(html.contains("do_stuff()"));
    assert!(html.contains("too vague"));
    assert_eq!(html.matches("class=\"comment\"").count(), 1);
}

#[test]
fn already_completed_and_error_pages_render() {
    let html = render_already_completed(AlreadyCompletedPageProps {
        survey_title: "Rithm Personality Test".into(),
        flashes: Vec::new(),
    });
    assert!(html.contains("You have already completed Rithm Personality Test."));

    let html = render_error(404, "No such survey: bogus");
    assert!(html.contains("Error 404"));
    assert!(html.contains("No such survey: bogus"));
}
