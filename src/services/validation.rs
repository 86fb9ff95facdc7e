use serde::Serialize;

use crate::models::Patient;

/// A single rule violation, keyed by the form field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validates a patient before it is accepted by create or update.
///
/// Returns every violation found; an empty vector means the record is valid.
pub fn validate_patient(patient: &Patient) -> Vec<FieldError> {
    let mut errors = Vec::new();

    require(&mut errors, "firstname", "Firstname", &patient.firstname);
    require(&mut errors, "lastname", "Lastname", &patient.lastname);
    require(
        &mut errors,
        "personal_number",
        "Personal number",
        &patient.personal_number,
    );

    if let Some(phone) = &patient.phone {
        if !is_valid_phone(phone) {
            errors.push(FieldError::new(
                "phone",
                format!("'{}' is not a valid phone number", phone),
            ));
        }
    }

    if let Some(email) = &patient.email {
        if !is_valid_email(email) {
            errors.push(FieldError::new(
                "email",
                format!("'{}' is not a valid e-mail address", email),
            ));
        }
    }

    if let Some(address) = &patient.address {
        require(&mut errors, "street", "Street", &address.street);
        require(&mut errors, "city", "City", &address.city);
        require(&mut errors, "postal_code", "Postal code", &address.postal_code);
    }

    errors
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, label: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", label)));
    }
}

/// Phone shape: optional leading `+`, optional trailing extension
/// (`x123`, `ext123`, `ext.123`), otherwise digits, whitespace and `-.()`,
/// with at least one digit.
pub fn is_valid_phone(value: &str) -> bool {
    let mut number = value.trim();
    if let Some(stripped) = number.strip_prefix('+') {
        number = stripped;
    }
    let number = strip_extension(number);

    let mut has_digit = false;
    for ch in number.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
        } else if !(ch.is_whitespace() || "-.()".contains(ch)) {
            return false;
        }
    }

    has_digit
}

fn strip_extension(number: &str) -> &str {
    let lower = number.to_ascii_lowercase();
    for marker in ["ext.", "ext", "x"] {
        if let Some(pos) = lower.rfind(marker) {
            let digits = number[pos + marker.len()..].trim();
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return number[..pos].trim_end();
            }
        }
    }
    number
}

/// E-mail shape: exactly one `@`, neither first nor last, no line breaks.
pub fn is_valid_email(value: &str) -> bool {
    if value.contains('\r') || value.contains('\n') {
        return false;
    }

    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}
