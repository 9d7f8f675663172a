//! Route-level API-key guards.
//!
//! Layered onto individual method handlers; the inner handler runs only when
//! the key is accepted, and sees the verified principal as an extension.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::auth::{API_KEY_HEADER, AuthGuard, AuthLevel};
use crate::application::error::AppError;

pub async fn require_user(
    State(guard): State<AuthGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    run_guarded(&guard, AuthLevel::User, request, next).await
}

pub async fn require_admin(
    State(guard): State<AuthGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    run_guarded(&guard, AuthLevel::Admin, request, next).await
}

async fn run_guarded(
    guard: &AuthGuard,
    level: AuthLevel,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credential = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let outcome = guard
        .guarded(credential.as_deref(), level, |principal| async move {
            request.extensions_mut().insert(principal.clone());
            let mut response = next.run(request).await;
            response.extensions_mut().insert(principal);
            response
        })
        .await;

    match outcome {
        Ok(response) => response,
        Err(err) => AppError::from(err).into_response(),
    }
}
