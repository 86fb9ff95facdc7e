use axum::{
    body::Body,
    http::Request,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::patient::{
    create_form, create_patient, delete_patient, list_patients, read_patient, update_patient,
    SharedPatientController,
};
use crate::controller::PatientController;
use crate::middleware::{LoggingLayer, RequestId, RequestIdLayer};
use crate::repository::SharedPatientStore;

pub fn patient_routes(controller: SharedPatientController) -> Router {
    Router::new()
        .route("/patients", get(list_patients))
        .route("/patients/detail", get(read_patient))
        .route("/patients/detail/:id", get(read_patient))
        .route("/patients/create", get(create_form).post(create_patient))
        .route("/patients/update", post(update_patient))
        .route("/patients/remove", get(delete_patient).post(delete_patient))
        .route("/patients/remove/:id", get(delete_patient).post(delete_patient))
        .with_state(controller)
}

/// Full application router over the given store
pub fn app(store: SharedPatientStore) -> Router {
    let controller = Arc::new(PatientController::new(store));

    Router::new()
        .route("/", get(|| async { Redirect::to("/patients") }))
        .merge(patient_routes(controller))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(()),
        )
        .layer(LoggingLayer)
        .layer(RequestIdLayer)
}

/// Span around each request; per-request events come from `LoggingLayer`.
fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
    )
}
