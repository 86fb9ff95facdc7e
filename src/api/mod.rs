pub mod content_negotiation;
pub mod handlers;
pub mod routes;

pub use routes::{app, patient_routes};
