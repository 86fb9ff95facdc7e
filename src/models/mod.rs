pub mod patient;

pub use patient::{Address, Patient, PatientForm, PatientRow};
