use askama::Template;
use axum::http::HeaderMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::Patient;
use crate::search::{PatientPage, SortColumn, SortOrder};

/// Determine the preferred response format based on Accept header
pub fn preferred_format(headers: &HeaderMap) -> ResponseFormat {
    if let Some(accept) = headers.get("accept") {
        if let Ok(accept_str) = accept.to_str() {
            // Browsers ask for text/html first
            if accept_str.contains("text/html") || accept_str.contains("text/*") {
                return ResponseFormat::Html;
            }
        }
    }

    ResponseFormat::Json
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseFormat {
    Html,
    Json,
}

#[derive(Template)]
#[template(path = "patient_list.html")]
pub struct PatientListTemplate {
    pub patients: Vec<PatientRow>,
    pub search: String,
    pub sort_order: &'static str,
    pub page_index: usize,
    pub total_pages: usize,
    /// Empty when there is no previous page.
    pub previous_url: String,
    /// Empty when there is no next page.
    pub next_url: String,
    pub firstname_sort_url: String,
    pub lastname_sort_url: String,
    pub personalnumber_sort_url: String,
}

#[derive(Clone)]
pub struct PatientRow {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub personal_number: String,
    pub phone: String,
    pub email: String,
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            firstname: patient.firstname.clone(),
            lastname: patient.lastname.clone(),
            personal_number: patient.personal_number.clone(),
            phone: patient.phone.clone().unwrap_or_default(),
            email: patient.email.clone().unwrap_or_default(),
        }
    }
}

impl PatientListTemplate {
    pub fn from_page(page: &PatientPage) -> Self {
        let search = page.search_query.clone().unwrap_or_default();
        let sort = page.sort_order;

        let previous_url = page
            .has_previous_page
            .then(|| list_url(sort, &search, page.page_index - 1))
            .unwrap_or_default();
        let next_url = page
            .has_next_page
            .then(|| list_url(sort, &search, page.page_index + 1))
            .unwrap_or_default();
        let firstname_sort_url = list_url(sort.toggled(SortColumn::Firstname), &search, 1);
        let lastname_sort_url = list_url(sort.toggled(SortColumn::Lastname), &search, 1);
        let personalnumber_sort_url =
            list_url(sort.toggled(SortColumn::PersonalNumber), &search, 1);

        Self {
            patients: page.patients.iter().map(PatientRow::from).collect(),
            search,
            sort_order: sort.as_str(),
            page_index: page.page_index,
            total_pages: page.total_pages,
            previous_url,
            next_url,
            firstname_sort_url,
            lastname_sort_url,
            personalnumber_sort_url,
        }
    }
}

/// Characters escaped in a query value: everything except RFC 3986
/// unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build a `/patients` link preserving sort and search.
pub fn list_url(sort: SortOrder, search: &str, page: usize) -> String {
    let mut url = format!("/patients?sortOrder={}&page={}", sort.as_str(), page);
    if !search.is_empty() {
        url.push_str("&search=");
        url.extend(utf8_percent_encode(search, QUERY_VALUE));
    }
    url
}

#[derive(Template)]
#[template(path = "patient_detail.html")]
pub struct PatientDetailTemplate {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub personal_number: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

impl From<&Patient> for PatientDetailTemplate {
    fn from(patient: &Patient) -> Self {
        let address = patient.address.clone().unwrap_or_default();
        Self {
            id: patient.id,
            firstname: patient.firstname.clone(),
            lastname: patient.lastname.clone(),
            personal_number: patient.personal_number.clone(),
            phone: patient.phone.clone().unwrap_or_default(),
            email: patient.email.clone().unwrap_or_default(),
            street: address.street,
            city: address.city,
            postal_code: address.postal_code,
        }
    }
}

#[derive(Template)]
#[template(path = "patient_create.html")]
pub struct PatientCreateTemplate {
    pub action: &'static str,
}

impl Default for PatientCreateTemplate {
    fn default() -> Self {
        Self {
            action: "/patients/create",
        }
    }
}
