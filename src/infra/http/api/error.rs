use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookstore_api_types::ResponseMessage;

use crate::application::books::BookServiceError;
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

pub const INVALID_PARAMETER: &str = "Некорректное значение параметра";
pub const INTERNAL_ERROR: &str = "Внутренняя ошибка сервера";
pub const SERVICE_UNAVAILABLE: &str = "Сервис временно недоступен";

/// Error response rendered as `{"message": ...}`.
///
/// `detail` never reaches the client; it is attached as an [`ErrorReport`] for
/// the response logger.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }

    pub fn invalid_parameter(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            INVALID_PARAMETER,
            Some(detail.into()),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.detail.unwrap_or_else(|| self.message.clone());
        let mut response = (self.status, Json(ResponseMessage::new(self.message))).into_response();
        ErrorReport::from_message("infra::http::api", self.status, detail).attach(&mut response);
        response
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_parameter(rejection.body_text())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::BadRequest { message } => Self::bad_request(message),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        let detail = Some(err.to_string());
        match err {
            RepoError::Timeout => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, SERVICE_UNAVAILABLE, detail)
            }
            RepoError::InvalidInput { .. } => {
                Self::new(StatusCode::BAD_REQUEST, INVALID_PARAMETER, detail)
            }
            RepoError::NotFound | RepoError::Duplicate { .. } | RepoError::Persistence(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, detail)
            }
        }
    }
}

impl From<BookServiceError> for ApiError {
    fn from(err: BookServiceError) -> Self {
        match err {
            BookServiceError::Domain(err) => err.into(),
            BookServiceError::Repo(err) => err.into(),
        }
    }
}
