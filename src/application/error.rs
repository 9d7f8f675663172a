use std::error::Error as StdError;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        auth::AuthError, pagination::PaginationError, repos::RepoError, weather::WeatherError,
    },
    domain::error::DomainError,
    hypermedia::{ERROR_PROFILE, HypermediaError, MASON_CONTENT_TYPE, MasonDocument},
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Hypermedia(#[from] HypermediaError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Repo(RepoError::NotFound)
            | AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Domain(_)
            | AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Pagination(_)
            | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Repo(RepoError::Duplicate { .. })
            | AppError::Repo(RepoError::Integrity { .. })
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(AuthError::Unauthenticated | AuthError::Forbidden) => {
                StatusCode::FORBIDDEN
            }
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Infra(InfraError::Database { .. })
            | AppError::Repo(RepoError::Timeout)
            | AppError::Weather(_)
            | AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Auth(AuthError::Repo(_) | AuthError::Hashing(_))
            | AppError::Repo(RepoError::Persistence(_))
            | AppError::Infra(_)
            | AppError::Hypermedia(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::NOT_FOUND => "Resource not found",
            StatusCode::BAD_REQUEST => "Request could not be processed",
            StatusCode::CONFLICT => "Resource already exists",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
            _ => "Unexpected error occurred",
        }
    }

    /// Client errors explain themselves; server errors stay opaque.
    fn public_detail(&self) -> Option<String> {
        if self.status_code().is_client_error() {
            Some(self.to_string())
        } else {
            None
        }
    }
}

/// Mason error document with a link to the error profile.
pub fn error_document(title: &str, detail: Option<&str>) -> MasonDocument {
    let mut document = MasonDocument::new();
    document.add_error(title, detail);
    document.add_control_profile(ERROR_PROFILE);
    document
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.public_detail();
        let document = error_document(self.presentation_message(), detail.as_deref());
        let report = ErrorReport::from_error("application::error::AppError", status, &self);

        let mut response = match document.to_bytes() {
            Ok(body) => (status, [(header::CONTENT_TYPE, MASON_CONTENT_TYPE)], body).into_response(),
            Err(_) => (status, self.presentation_message()).into_response(),
        };
        report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn render(error: AppError) -> (StatusCode, Value, Option<ErrorReport>) {
        let mut response = error.into_response();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = serde_json::from_slice(&body).expect("json body");
        (status, value, report)
    }

    #[tokio::test]
    async fn auth_failures_render_as_forbidden_mason_errors() {
        for error in [AuthError::Unauthenticated, AuthError::Forbidden] {
            let (status, body, report) = render(AppError::from(error)).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["@error"]["@message"], json!("Forbidden"));
            assert_eq!(
                body["@controls"]["profile"]["href"],
                json!("/bikinghub/profiles/error/")
            );
            assert_eq!(report.expect("report attached").status, StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body, report) =
            render(AppError::Repo(RepoError::from_persistence("connection reset"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["@error"]["@messages"], json!([]));
        let report = report.expect("report attached");
        assert!(report.messages[0].contains("connection reset"));
    }

    #[tokio::test]
    async fn client_errors_carry_detail() {
        let (status, body, _) = render(AppError::not_found("favourite")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["@error"]["@messages"], json!(["favourite not found"]));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (
                AppError::Pagination(PaginationError::InvalidPage("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Domain(DomainError::Latitude(91.0)),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Repo(RepoError::Duplicate {
                    constraint: "users_name_key".into(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::UnsupportedMediaType("text/plain".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::Weather(WeatherError::Request("timeout".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Hypermedia(HypermediaError::NotAnObject),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error}");
        }
    }
}
