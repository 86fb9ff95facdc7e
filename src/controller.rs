//! Request orchestration for the patient pages.
//!
//! Each action is a single transition from request parameters to an
//! [`ActionResult`]; the HTTP layer decides how to render it.

use crate::error::Result;
use crate::extractors::Submitted;
use crate::models::{Patient, PatientForm};
use crate::repository::SharedPatientStore;
use crate::search::{self, ListQuery, PatientPage};
use crate::services::validate_patient;

#[derive(Debug)]
pub enum ActionResult {
    List(PatientPage),
    Detail(Patient),
    CreateForm,
    Redirect(RedirectTarget),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    List,
    Create,
    Detail { id: i32 },
}

impl RedirectTarget {
    pub fn location(&self) -> String {
        match self {
            RedirectTarget::List => "/patients".to_string(),
            RedirectTarget::Create => "/patients/create".to_string(),
            RedirectTarget::Detail { id } => format!("/patients/detail/{}", id),
        }
    }
}

pub struct PatientController {
    store: SharedPatientStore,
}

impl PatientController {
    pub fn new(store: SharedPatientStore) -> Self {
        Self { store }
    }

    /// List, search, sort and paginate patients.
    pub async fn index(&self, query: &ListQuery) -> Result<ActionResult> {
        let patients = self.store.get_all().await?;
        let page = search::run(patients, query);

        tracing::debug!(
            page = page.page_index,
            total_pages = page.total_pages,
            sort_order = page.sort_order.as_str(),
            "Listed patients"
        );

        Ok(ActionResult::List(page))
    }

    pub async fn detail(&self, id: Option<i32>) -> Result<ActionResult> {
        let Some(id) = id else {
            return Ok(ActionResult::NotFound);
        };

        match self.store.get_by_id(id).await? {
            Some(patient) => Ok(ActionResult::Detail(patient)),
            None => Ok(ActionResult::NotFound),
        }
    }

    pub fn create_form(&self) -> ActionResult {
        ActionResult::CreateForm
    }

    /// Persist a new patient.
    ///
    /// An invalid submission redirects back to an empty create form and the
    /// entered values are not carried over.
    pub async fn create(&self, submission: Submitted<PatientForm>) -> Result<ActionResult> {
        let (mut patient, errors) = Self::bind(submission);

        if !errors.is_empty() {
            tracing::warn!(errors = ?errors, "Rejected patient creation; submitted values discarded");
            return Ok(ActionResult::Redirect(RedirectTarget::Create));
        }

        if !self.store.add(&mut patient).await? {
            tracing::warn!("Patient insert affected no rows");
        }

        Ok(ActionResult::Redirect(RedirectTarget::List))
    }

    /// Replace an existing patient; invalid input goes back to its detail page.
    pub async fn update(&self, submission: Submitted<PatientForm>) -> Result<ActionResult> {
        let (patient, errors) = Self::bind(submission);

        if !errors.is_empty() {
            tracing::warn!(patient_id = %patient.id, errors = ?errors, "Rejected patient update");
            return Ok(ActionResult::Redirect(RedirectTarget::Detail { id: patient.id }));
        }

        if !self.store.update(&patient).await? {
            tracing::warn!(patient_id = %patient.id, "Patient update affected no rows");
        }

        Ok(ActionResult::Redirect(RedirectTarget::List))
    }

    pub async fn remove(&self, id: Option<i32>) -> Result<ActionResult> {
        let Some(id) = id else {
            return Ok(ActionResult::NotFound);
        };

        let Some(patient) = self.store.get_by_id(id).await? else {
            return Ok(ActionResult::NotFound);
        };

        if !self.store.delete(&patient).await? {
            tracing::warn!(patient_id = %id, "Patient delete affected no rows");
        }

        Ok(ActionResult::Redirect(RedirectTarget::List))
    }

    /// Binding errors and rule violations together decide validity.
    fn bind(submission: Submitted<PatientForm>) -> (Patient, Vec<String>) {
        let Submitted {
            model,
            binding_errors,
        } = submission;
        let patient = model.into_patient();

        let mut errors = binding_errors;
        errors.extend(
            validate_patient(&patient)
                .into_iter()
                .map(|e| format!("{}: {}", e.field, e.message)),
        );

        (patient, errors)
    }
}
