use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use services::FlowError;
use tracing::{debug, error};

/// Failure of a request handler, mapped onto a page or a redirect.
#[derive(Debug)]
pub enum AppError {
    Flow(FlowError),
    NotFound(String),
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        Self::Flow(err)
    }
}

fn error_page(status: StatusCode, message: String) -> Response {
    (status, Html(ui::render_error(status.as_u16(), message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => error_page(StatusCode::NOT_FOUND, message),
            Self::Flow(err) if err.is_not_found() => {
                error_page(StatusCode::NOT_FOUND, err.to_string())
            }
            Self::Flow(err) if err.is_invalid_state() => {
                debug!(error = %err, "no open attempt; back to the start");
                Redirect::to("/").into_response()
            }
            Self::Flow(FlowError::SurveyFinished | FlowError::AlreadyCompleted) => {
                Redirect::to("/complete").into_response()
            }
            Self::Flow(err @ FlowError::InvalidChoice { .. }) => {
                error_page(StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Flow(err) => {
                error!(error = %err, "request failed");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_owned(),
                )
            }
        }
    }
}
