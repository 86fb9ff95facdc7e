pub mod validation;

pub use validation::{validate_patient, FieldError};
