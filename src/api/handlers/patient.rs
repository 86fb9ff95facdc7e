use askama::Template;
use axum::{
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::api::content_negotiation::*;
use crate::controller::{ActionResult, PatientController};
use crate::error::{ClinicError, Result};
use crate::extractors::Submitted;
use crate::models::PatientForm;
use crate::search::ListQuery;

pub type SharedPatientController = Arc<PatientController>;

/// List patients with search, sort and pagination
pub async fn list_patients(
    State(controller): State<SharedPatientController>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    let query = ListQuery::from_query_string(query.as_deref());
    let result = controller.index(&query).await?;
    render(result, preferred_format(&headers))
}

/// Show one patient; a missing or non-numeric id is treated as not found
pub async fn read_patient(
    State(controller): State<SharedPatientController>,
    id: Option<Path<i32>>,
    headers: HeaderMap,
) -> Result<Response> {
    let result = controller.detail(id.map(|Path(id)| id)).await?;
    render(result, preferred_format(&headers))
}

pub async fn create_form(State(controller): State<SharedPatientController>) -> Result<Response> {
    render(controller.create_form(), ResponseFormat::Html)
}

pub async fn create_patient(
    State(controller): State<SharedPatientController>,
    submission: Submitted<PatientForm>,
) -> Result<Response> {
    let result = controller.create(submission).await?;
    render(result, ResponseFormat::Html)
}

pub async fn update_patient(
    State(controller): State<SharedPatientController>,
    submission: Submitted<PatientForm>,
) -> Result<Response> {
    let result = controller.update(submission).await?;
    render(result, ResponseFormat::Html)
}

pub async fn delete_patient(
    State(controller): State<SharedPatientController>,
    id: Option<Path<i32>>,
) -> Result<Response> {
    let result = controller.remove(id.map(|Path(id)| id)).await?;
    render(result, ResponseFormat::Html)
}

fn render(result: ActionResult, format: ResponseFormat) -> Result<Response> {
    match result {
        ActionResult::List(page) => match format {
            ResponseFormat::Html => {
                let template = PatientListTemplate::from_page(&page);
                Ok(Html(template.render()?).into_response())
            }
            ResponseFormat::Json => Ok(Json(page).into_response()),
        },
        ActionResult::Detail(patient) => match format {
            ResponseFormat::Html => {
                let template = PatientDetailTemplate::from(&patient);
                Ok(Html(template.render()?).into_response())
            }
            ResponseFormat::Json => Ok(Json(patient).into_response()),
        },
        ActionResult::CreateForm => {
            let template = PatientCreateTemplate::default();
            Ok(Html(template.render()?).into_response())
        }
        ActionResult::Redirect(target) => Ok(Redirect::to(&target.location()).into_response()),
        ActionResult::NotFound => Err(ClinicError::NotFound),
    }
}
