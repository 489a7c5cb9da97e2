use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router, middleware};
use serde::Deserialize;
use services::{FlowError, FlowState, QuestionOutcome, SelectOutcome, SurveyService};
use survey_core::model::{ClientId, QuestionId, SurveyKey};
use tower_http::trace::TraceLayer;
use ui::vm::{map_completion, map_question, map_survey_cards, map_survey_start};
use ui::{
    AlreadyCompletedPageProps, CompletionPageProps, QuestionPageProps, SurveyPickerPageProps,
    SurveyStartPageProps,
};

use crate::client::client_identity;
use crate::error::AppError;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub surveys: SurveyService,
}

pub fn router(surveys: SurveyService) -> Router {
    Router::new()
        .route("/", get(show_index).post(pick_survey))
        .route("/begin", post(begin_survey))
        .route("/answer", post(submit_answer))
        .route("/questions/{qid}", get(show_question))
        .route("/complete", get(show_completion))
        .fallback(page_not_found)
        .layer(middleware::from_fn(client_identity))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { surveys })
}

/// URL of the page that shows `state`.
#[must_use]
pub fn path_for(state: FlowState) -> String {
    match state {
        FlowState::NoSurveySelected => "/".to_owned(),
        FlowState::InProgress(id) => format!("/questions/{id}"),
        FlowState::AllAnswered | FlowState::Completed => "/complete".to_owned(),
    }
}

async fn redirect_with_flash(
    surveys: &SurveyService,
    client: ClientId,
    message: impl Into<String>,
) -> Result<Redirect, AppError> {
    surveys.flash(client, message).await?;
    let (position, _) = surveys.status(client).await?;
    Ok(Redirect::to(&path_for(position)))
}

async fn show_index(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Result<Html<String>, AppError> {
    let surveys = &state.surveys;
    let flashes = surveys.take_flashes(client).await?;
    let page = match surveys.fixed_survey() {
        Some(key) => ui::render_survey_start(SurveyStartPageProps {
            vm: map_survey_start(&surveys.overview(key)?),
            flashes,
        }),
        None => ui::render_survey_picker(SurveyPickerPageProps {
            surveys: map_survey_cards(&surveys.surveys()),
            flashes,
        }),
    };
    Ok(Html(page))
}

#[derive(Debug, Deserialize)]
struct PickForm {
    survey_code: Option<String>,
}

async fn pick_survey(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Form(form): Form<PickForm>,
) -> Result<Response, AppError> {
    let Some(code) = form.survey_code.filter(|code| !code.trim().is_empty()) else {
        state.surveys.flash(client, "Please pick a survey.").await?;
        return Ok(Redirect::to("/").into_response());
    };

    let page = match state.surveys.select_survey(client, &SurveyKey::new(code)).await? {
        SelectOutcome::Ready(overview) => ui::render_survey_start(SurveyStartPageProps {
            vm: map_survey_start(&overview),
            flashes: Vec::new(),
        }),
        SelectOutcome::AlreadyCompleted(overview) => {
            ui::render_already_completed(AlreadyCompletedPageProps {
                survey_title: overview.title,
                flashes: Vec::new(),
            })
        }
    };
    Ok(Html(page).into_response())
}

async fn begin_survey(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Result<Redirect, AppError> {
    let next = state.surveys.begin(client).await?;
    Ok(Redirect::to(&path_for(next)))
}

#[derive(Debug, Deserialize)]
struct AnswerForm {
    answer: Option<String>,
    text: Option<String>,
}

async fn submit_answer(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Form(form): Form<AnswerForm>,
) -> Result<Redirect, AppError> {
    let surveys = &state.surveys;
    let Some(choice) = form.answer.filter(|choice| !choice.trim().is_empty()) else {
        return redirect_with_flash(surveys, client, "Please choose an answer.").await;
    };

    match surveys.answer(client, &choice, form.text).await {
        Ok(next) => Ok(Redirect::to(&path_for(next))),
        Err(err @ FlowError::InvalidChoice { .. }) => {
            redirect_with_flash(surveys, client, err.to_string()).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn show_question(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Path(qid): Path<String>,
) -> Result<Response, AppError> {
    let id: QuestionId = qid
        .parse()
        .map_err(|_| AppError::NotFound(format!("No such question: {qid}")))?;

    match state.surveys.question(client, id).await? {
        QuestionOutcome::Show(view) => {
            let flashes = state.surveys.take_flashes(client).await?;
            let page = ui::render_question(QuestionPageProps {
                vm: map_question(&view),
                flashes,
            });
            Ok(Html(page).into_response())
        }
        QuestionOutcome::Redirect { to, .. } => Ok(Redirect::to(&path_for(to)).into_response()),
    }
}

async fn show_completion(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Result<Response, AppError> {
    let surveys = &state.surveys;
    match surveys.complete(client).await {
        Ok(summary) => {
            let flashes = surveys.take_flashes(client).await?;
            let page = ui::render_completion(CompletionPageProps {
                vm: map_completion(&summary),
                flashes,
            });
            Ok(Html(page).into_response())
        }
        Err(FlowError::Incomplete { .. }) => {
            let (position, _) = surveys.status(client).await?;
            Ok(Redirect::to(&path_for(position)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn page_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(ui::render_error(404, "Page not found.")),
    )
}
