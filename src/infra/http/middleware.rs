//! Request stamping and failure logging wrapped around the whole router.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::auth::AuthPrincipal;
use crate::application::error::ErrorReport;

const LOG_TARGET: &str = "bikinghub::http::access";

/// Per-request identity shared by every log line about that request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let context = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(context);
    response
}

/// What gets logged about a 4xx or 5xx response.
struct FailedExchange {
    method: Method,
    uri: Uri,
    status: StatusCode,
    elapsed: Duration,
    request_id: String,
    caller: Option<AuthPrincipal>,
    report: Option<ErrorReport>,
}

impl FailedExchange {
    fn log(self) {
        let user_id = self.caller.as_ref().map(|caller| caller.user_id);
        let admin = self.caller.as_ref().is_some_and(|caller| caller.admin);
        let (source, chain) = self
            .report
            .map(|report| (report.source, report.messages))
            .unwrap_or(("unreported", Vec::new()));
        let detail = chain.first().map(String::as_str).unwrap_or("none");
        let elapsed_ms = self.elapsed.as_millis() as u64;

        if self.status.is_server_error() {
            error!(
                target: LOG_TARGET,
                request_id = %self.request_id,
                method = %self.method,
                uri = %self.uri,
                status = self.status.as_u16(),
                elapsed_ms,
                user_id,
                admin,
                source,
                detail,
                chain = ?chain,
                "server failure"
            );
        } else {
            warn!(
                target: LOG_TARGET,
                request_id = %self.request_id,
                method = %self.method,
                uri = %self.uri,
                status = self.status.as_u16(),
                elapsed_ms,
                user_id,
                admin,
                source,
                detail,
                "request refused"
            );
        }
    }
}

/// Guards sit on individual routes inside this layer, so the caller is read
/// back from the response rather than the request.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|context| context.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        FailedExchange {
            method,
            uri,
            status,
            elapsed: started.elapsed(),
            request_id,
            caller: response.extensions().get::<AuthPrincipal>().cloned(),
            report: response.extensions_mut().remove::<ErrorReport>(),
        }
        .log();
    }
    response
}
