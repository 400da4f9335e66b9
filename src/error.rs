use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::execution::ExecutionError;

/// Failure reported to HTTP clients. Internal details are logged, never sent.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized(&'static str),
    Internal {
        detail: String,
        message: &'static str,
    },
}

impl AppError {
    pub fn internal(message: &'static str, detail: impl ToString) -> Self {
        AppError::Internal {
            detail: detail.to_string(),
            message,
        }
    }

    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::Internal { detail, message } => {
                tracing::error!("{}: {}", message, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        if err.is_client_error() {
            AppError::Validation(err.to_string())
        } else {
            AppError::internal("Failed to execute code", err)
        }
    }
}

/// `Json<T>` whose rejections come back as `AppError::Validation`.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(AppJson(value))
    }
}
