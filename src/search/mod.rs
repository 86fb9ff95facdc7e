//! List-query pipeline: filter, sort and paginate an already fetched
//! collection of patients.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::cmp::Ordering;

use crate::models::Patient;

/// Number of patients shown per page.
pub const PAGE_SIZE: usize = 2;

/// Query string of the list action: `?sortOrder=..&search=..&page=..`.
///
/// Every field is kept as text so that a malformed value falls back to its
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Parse a raw query string without ever rejecting it. The first value
    /// of a repeated key wins and unknown keys are ignored.
    pub fn from_query_string(query: Option<&str>) -> Self {
        let mut parsed = ListQuery::default();

        for pair in query.unwrap_or_default().split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let with_spaces = value.replace('+', " ");
            let decoded = percent_decode_str(&with_spaces)
                .decode_utf8_lossy()
                .into_owned();

            let slot = match key {
                "sortOrder" => &mut parsed.sort_order,
                "search" => &mut parsed.search,
                "page" => &mut parsed.page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decoded);
            }
        }

        parsed
    }

    /// Requested page, defaulting to 1. Values below 1 are clamped to 1.
    pub fn page_number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.max(1))
            .and_then(|p| usize::try_from(p).ok())
            .unwrap_or(1)
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    FirstnameAsc,
    FirstnameDesc,
    LastnameAsc,
    LastnameDesc,
    PersonalnumberAsc,
    PersonalnumberDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Firstname,
    Lastname,
    PersonalNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse a sort key; anything unrecognized sorts by first name ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("firstname_asc") => SortOrder::FirstnameAsc,
            Some("firstname_desc") => SortOrder::FirstnameDesc,
            Some("lastname_asc") => SortOrder::LastnameAsc,
            Some("lastname_desc") => SortOrder::LastnameDesc,
            Some("personalnumber_asc") => SortOrder::PersonalnumberAsc,
            Some("personalnumber_desc") => SortOrder::PersonalnumberDesc,
            _ => SortOrder::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::FirstnameAsc => "firstname_asc",
            SortOrder::FirstnameDesc => "firstname_desc",
            SortOrder::LastnameAsc => "lastname_asc",
            SortOrder::LastnameDesc => "lastname_desc",
            SortOrder::PersonalnumberAsc => "personalnumber_asc",
            SortOrder::PersonalnumberDesc => "personalnumber_desc",
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            SortOrder::FirstnameAsc | SortOrder::LastnameAsc | SortOrder::PersonalnumberAsc => {
                SortDirection::Ascending
            }
            _ => SortDirection::Descending,
        }
    }

    pub fn column(&self) -> SortColumn {
        match self {
            SortOrder::FirstnameAsc | SortOrder::FirstnameDesc => SortColumn::Firstname,
            SortOrder::LastnameAsc | SortOrder::LastnameDesc => SortColumn::Lastname,
            SortOrder::PersonalnumberAsc | SortOrder::PersonalnumberDesc => {
                SortColumn::PersonalNumber
            }
        }
    }

    pub fn by(column: SortColumn, direction: SortDirection) -> SortOrder {
        match (column, direction) {
            (SortColumn::Firstname, SortDirection::Ascending) => SortOrder::FirstnameAsc,
            (SortColumn::Firstname, SortDirection::Descending) => SortOrder::FirstnameDesc,
            (SortColumn::Lastname, SortDirection::Ascending) => SortOrder::LastnameAsc,
            (SortColumn::Lastname, SortDirection::Descending) => SortOrder::LastnameDesc,
            (SortColumn::PersonalNumber, SortDirection::Ascending) => SortOrder::PersonalnumberAsc,
            (SortColumn::PersonalNumber, SortDirection::Descending) => {
                SortOrder::PersonalnumberDesc
            }
        }
    }

    /// The key a column header links to: clicking the active column flips
    /// its direction, any other column starts ascending.
    pub fn toggled(&self, column: SortColumn) -> SortOrder {
        match (self.column() == column, self.direction()) {
            (true, SortDirection::Ascending) => SortOrder::by(column, SortDirection::Descending),
            _ => SortOrder::by(column, SortDirection::Ascending),
        }
    }

    fn key<'a>(&self, patient: &'a Patient) -> &'a str {
        match self.column() {
            SortColumn::Firstname => &patient.firstname,
            SortColumn::Lastname => &patient.lastname,
            SortColumn::PersonalNumber => &patient.personal_number,
        }
    }

    /// Case-insensitive; keys equal up to case fall back to ordinal order.
    fn compare(&self, a: &Patient, b: &Patient) -> Ordering {
        let (a, b) = (self.key(a), self.key(b));
        let ordering = a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b));
        match self.direction() {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// One page of the patient list plus the metadata needed to render
/// pagination and sort controls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPage {
    pub patients: Vec<Patient>,
    pub total_pages: usize,
    pub page_index: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub search_query: Option<String>,
    pub sort_order: SortOrder,
}

/// Keep patients whose first name, last name or personal number contains
/// `search` (case-insensitive). No filtering when `search` is empty.
pub fn filter(patients: Vec<Patient>, search: Option<&str>) -> Vec<Patient> {
    let needle = match search {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return patients,
    };

    patients
        .into_iter()
        .filter(|p| {
            p.firstname.to_lowercase().contains(&needle)
                || p.lastname.to_lowercase().contains(&needle)
                || p.personal_number.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort by the given key.
pub fn sort(patients: &mut [Patient], order: SortOrder) {
    patients.sort_by(|a, b| order.compare(a, b));
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Run filter, sort and paginate over the full collection.
pub fn run(patients: Vec<Patient>, query: &ListQuery) -> PatientPage {
    let page_index = query.page_number();
    let sort_order = SortOrder::parse(query.sort_order.as_deref());

    let mut matched = filter(patients, query.search_text());
    sort(&mut matched, sort_order);

    let total_pages = total_pages(matched.len());
    let offset = (page_index - 1).saturating_mul(PAGE_SIZE);
    let patients: Vec<Patient> = matched.into_iter().skip(offset).take(PAGE_SIZE).collect();

    PatientPage {
        patients,
        total_pages,
        page_index,
        has_previous_page: page_index > 1,
        has_next_page: page_index < total_pages,
        search_query: query.search_text().map(str::to_string),
        sort_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: i32, firstname: &str, lastname: &str, personal_number: &str) -> Patient {
        Patient {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            personal_number: personal_number.to_string(),
            ..Default::default()
        }
    }

    fn john_and_jane() -> Vec<Patient> {
        vec![
            patient(1, "John", "Doe", "12345"),
            patient(2, "Jane", "Smith", "67890"),
        ]
    }

    fn query(sort_order: Option<&str>, search: Option<&str>, page: Option<&str>) -> ListQuery {
        ListQuery {
            sort_order: sort_order.map(str::to_string),
            search: search.map(str::to_string),
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        assert_eq!(filter(john_and_jane(), Some("JOHN")).len(), 1);
        assert_eq!(filter(john_and_jane(), Some("smi"))[0].id, 2);
        assert_eq!(filter(john_and_jane(), Some("234"))[0].id, 1);
        assert!(filter(john_and_jane(), Some("nobody")).is_empty());
    }

    #[test]
    fn test_empty_search_keeps_everything() {
        assert_eq!(filter(john_and_jane(), None).len(), 2);
        assert_eq!(filter(john_and_jane(), Some("")).len(), 2);
    }

    #[test]
    fn test_sort_orders() {
        let cases = [
            ("firstname_asc", vec![2, 1]),
            ("firstname_desc", vec![1, 2]),
            ("lastname_asc", vec![1, 2]),
            ("lastname_desc", vec![2, 1]),
            ("personalnumber_asc", vec![1, 2]),
            ("personalnumber_desc", vec![2, 1]),
        ];

        for (key, expected) in cases {
            let page = run(john_and_jane(), &query(Some(key), None, None));
            let ids: Vec<i32> = page.patients.iter().map(|p| p.id).collect();
            assert_eq!(ids, expected, "sort key {}", key);
            assert_eq!(page.sort_order.as_str(), key);
        }
    }

    #[test]
    fn test_unknown_sort_key_falls_back_to_firstname_asc() {
        let fallback = run(john_and_jane(), &query(Some("shoe_size"), None, None));
        let default = run(john_and_jane(), &query(Some("firstname_asc"), None, None));
        assert_eq!(fallback.patients, default.patients);
        assert_eq!(fallback.sort_order, SortOrder::FirstnameAsc);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut patients = vec![
            patient(1, "Anna", "B", "1"),
            patient(2, "Anna", "A", "2"),
            patient(3, "Anna", "C", "3"),
        ];
        sort(&mut patients, SortOrder::FirstnameDesc);
        let ids: Vec<i32> = patients.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_second_page_of_ten() {
        let patients: Vec<Patient> = (1..=10)
            .map(|i| patient(i, &format!("Patient {}", i), &format!("Lastname {}", i), &format!("1234{}", i)))
            .collect();

        let page = run(patients, &query(None, None, Some("2")));

        // Text order, not numeric: "Patient 1", "Patient 10", "Patient 2", ...
        let ids: Vec<i32> = page.patients.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.page_index, 2);
        assert!(page.has_previous_page);
        assert!(page.has_next_page);
    }

    #[test]
    fn test_single_full_page() {
        let page = run(john_and_jane(), &query(None, None, None));
        assert_eq!(page.patients.len(), 2);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(2), 1);
        assert_eq!(total_pages(3), 2);
    }

    #[test]
    fn test_page_beyond_range_is_empty() {
        let page = run(john_and_jane(), &query(None, None, Some("9")));
        assert!(page.patients.is_empty());
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(query(None, None, None).page_number(), 1);
        assert_eq!(query(None, None, Some("abc")).page_number(), 1);
        assert_eq!(query(None, None, Some("0")).page_number(), 1);
        assert_eq!(query(None, None, Some("-3")).page_number(), 1);
        assert_eq!(query(None, None, Some("4")).page_number(), 4);
    }

    #[test]
    fn test_search_metadata_is_preserved() {
        let page = run(john_and_jane(), &query(None, Some("John"), None));
        assert_eq!(page.search_query.as_deref(), Some("John"));
        assert_eq!(page.patients.len(), 1);
        assert_eq!(page.patients[0].firstname, "John");
    }

    #[test]
    fn test_sort_ignores_case() {
        let patients = vec![
            patient(1, "Bob", "smith", "2"),
            patient(2, "adam", "Jones", "1"),
            patient(3, "Adam", "jones", "3"),
        ];

        let page = run(patients.clone(), &query(None, None, None));
        let names: Vec<&str> = page.patients.iter().map(|p| p.firstname.as_str()).collect();
        assert_eq!(names, vec!["Adam", "adam"]);

        let mut by_lastname = patients;
        sort(&mut by_lastname, SortOrder::LastnameDesc);
        let ids: Vec<i32> = by_lastname.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_query_string_parsing() {
        let parsed = ListQuery::from_query_string(Some(
            "sortOrder=lastname_desc&search=jo+%26+co&page=2&page=5&extra=1",
        ));
        assert_eq!(parsed.sort_order.as_deref(), Some("lastname_desc"));
        assert_eq!(parsed.search.as_deref(), Some("jo & co"));
        assert_eq!(parsed.page_number(), 2);

        let empty = ListQuery::from_query_string(None);
        assert!(empty.sort_order.is_none());
        assert!(empty.search_text().is_none());
        assert_eq!(empty.page_number(), 1);

        let bare = ListQuery::from_query_string(Some("search&page="));
        assert!(bare.search_text().is_none());
        assert_eq!(bare.page_number(), 1);
    }

    #[test]
    fn test_toggled_sort_links() {
        assert_eq!(SortOrder::FirstnameAsc.toggled(SortColumn::Firstname), SortOrder::FirstnameDesc);
        assert_eq!(SortOrder::FirstnameDesc.toggled(SortColumn::Firstname), SortOrder::FirstnameAsc);
        assert_eq!(SortOrder::FirstnameAsc.toggled(SortColumn::Lastname), SortOrder::LastnameAsc);
        assert_eq!(
            SortOrder::LastnameDesc.toggled(SortColumn::PersonalNumber),
            SortOrder::PersonalnumberAsc
        );
    }
}
