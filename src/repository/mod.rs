pub mod patient;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Patient;

pub use patient::PatientRepository;

/// Persistence operations the controller relies on.
///
/// Implementations surface storage failures unchanged; an unknown id is not
/// an error for `get_by_id`, it yields `None`.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Patient>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Patient>>;

    /// Insert a new patient and write the assigned id back into it.
    async fn add(&self, patient: &mut Patient) -> Result<bool>;

    /// Replace every field of the patient identified by `patient.id`.
    async fn update(&self, patient: &Patient) -> Result<bool>;

    async fn delete(&self, patient: &Patient) -> Result<bool>;
}

pub type SharedPatientStore = Arc<dyn PatientStore>;
