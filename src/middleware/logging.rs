use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};

use super::request_id::RequestId;

/// What a patient page request ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Redirected { location: String },
    NotFound,
    Rejected,
    Failed,
}

impl Outcome {
    pub fn of(response: &Response<Body>) -> Self {
        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Outcome::Redirected { location }
        } else if status == StatusCode::NOT_FOUND {
            Outcome::NotFound
        } else if status.is_client_error() {
            Outcome::Rejected
        } else if status.is_server_error() {
            Outcome::Failed
        } else {
            Outcome::Rendered
        }
    }
}

/// Logs the outcome of every request, tagged with its request id.
#[derive(Clone)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService { inner }
    }
}

#[derive(Clone)]
pub struct LoggingService<S> {
    inner: S,
}

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

impl<S> Service<Request<Body>> for LoggingService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let action = format!("{} {}", req.method(), req.uri().path());
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match Outcome::of(&response) {
                Outcome::Rendered => {
                    tracing::info!(%request_id, %action, elapsed_ms, "Rendered")
                }
                Outcome::Redirected { location } => {
                    tracing::info!(%request_id, %action, %location, elapsed_ms, "Redirected")
                }
                Outcome::NotFound => {
                    tracing::info!(%request_id, %action, elapsed_ms, "Patient not found")
                }
                Outcome::Rejected => tracing::warn!(
                    %request_id,
                    %action,
                    status = %response.status(),
                    elapsed_ms,
                    "Request rejected"
                ),
                Outcome::Failed => tracing::error!(
                    %request_id,
                    %action,
                    status = %response.status(),
                    elapsed_ms,
                    "Request failed"
                ),
            }

            Ok(response)
        })
    }
}
