use axum::{
    async_trait,
    extract::{rejection::FormRejection, Form, FromRequest, Request},
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// Form extractor that never rejects.
///
/// A body that cannot be bound yields `T::default()` plus the binding error,
/// so the controller can treat it like any other invalid submission.
#[derive(Debug, Default)]
pub struct Submitted<T> {
    pub model: T,
    pub binding_errors: Vec<String>,
}

impl<T> Submitted<T> {
    pub fn valid(model: T) -> Self {
        Self {
            model,
            binding_errors: Vec::new(),
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for Submitted<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(model)) => Ok(Submitted::valid(model)),
            Err(rejection) => {
                let reason = describe(&rejection);
                tracing::debug!(reason = %reason, "Form binding failed");
                Ok(Submitted {
                    model: T::default(),
                    binding_errors: vec![reason],
                })
            }
        }
    }
}

fn describe(rejection: &FormRejection) -> String {
    match rejection {
        FormRejection::InvalidFormContentType(_) => {
            "Expected application/x-www-form-urlencoded body".to_string()
        }
        FormRejection::FailedToDeserializeForm(err) => format!("Invalid form data: {}", err),
        FormRejection::FailedToDeserializeFormBody(err) => {
            format!("Invalid form data: {}", err)
        }
        _ => rejection.body_text(),
    }
}
