use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A patient record as stored in the `patients` table.
///
/// `id` is assigned by the store on insert; a value of `0` marks a record
/// that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub personal_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
}

/// Postal address owned by exactly one patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i32,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Flat row produced by `patients LEFT JOIN addresses`.
#[derive(Debug, FromRow)]
pub struct PatientRow {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub personal_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address_id: Option<i32>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        let address = row.address_id.map(|id| Address {
            id,
            street: row.street.unwrap_or_default(),
            city: row.city.unwrap_or_default(),
            postal_code: row.postal_code.unwrap_or_default(),
        });

        Patient {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            personal_number: row.personal_number,
            phone: row.phone,
            email: row.email,
            address,
        }
    }
}

/// Browser form submission for create and update.
///
/// Every field is optional at the binding stage so that a half-filled form
/// still reaches validation instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub id: Option<i32>,
    pub firstname: String,
    pub lastname: String,
    pub personal_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl PatientForm {
    /// Convert the submitted fields into an entity.
    ///
    /// Blank optional fields become `None`, and the address is dropped when
    /// all of its fields are blank.
    pub fn into_patient(self) -> Patient {
        let street = non_blank(self.street);
        let city = non_blank(self.city);
        let postal_code = non_blank(self.postal_code);

        let address = if street.is_none() && city.is_none() && postal_code.is_none() {
            None
        } else {
            Some(Address {
                id: 0,
                street: street.unwrap_or_default(),
                city: city.unwrap_or_default(),
                postal_code: postal_code.unwrap_or_default(),
            })
        };

        Patient {
            id: self.id.unwrap_or_default(),
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            personal_number: self.personal_number.trim().to_string(),
            phone: non_blank(self.phone),
            email: non_blank(self.email),
            address,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
