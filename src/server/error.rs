use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("A flow with this name already exists")]
    DuplicateName,

    #[error("Flow not found")]
    NotFound,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    Storage(#[from] anyhow::Error),
}

impl From<JsonRejection> for FlowError {
    fn from(rejection: JsonRejection) -> Self {
        FlowError::InvalidBody(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = match &self {
            FlowError::MissingField(_) | FlowError::DuplicateName | FlowError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            FlowError::NotFound => StatusCode::NOT_FOUND,
            FlowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(%status, error = %self, "Flow service error");

        (
            status,
            axum::Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
