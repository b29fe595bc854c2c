use garde::Validate;
use serde_derive::{Deserialize, Serialize};

use crate::CONFIG;

/// A stored employee row. `profile_photo` is always JPEG-encoded when present.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub department_id: i64,
    pub phone_number: Option<String>,
    pub profile_photo: Option<Vec<u8>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// The bound fields of a create/edit submission. The uploaded photo travels
/// separately from these: it is only applied when the upload has nonzero
/// length, so an edit without a new file preserves the stored blob.
///
/// Patronymic may be empty; `full_name` trims the trailing space away.
#[derive(Debug, Clone, Default, Validate)]
pub struct EmployeeForm {
    #[garde(length(min = 1))]
    pub last_name: String,
    #[garde(length(min = 1))]
    pub first_name: String,
    #[garde(skip)]
    pub patronymic: String,
    #[garde(range(min = 1))]
    pub department_id: i64,
    #[garde(skip)]
    pub phone_number: Option<String>,
}

pub fn full_name(last_name: &str, first_name: &str, patronymic: &str) -> String {
    format!("{} {} {}", last_name, first_name, patronymic)
        .trim()
        .to_string()
}

/// Where the consuming layer should fetch the photo from: the stored JPEG
/// when one exists, otherwise the fixed placeholder image.
pub fn photo_src(id: i64, has_photo: bool) -> String {
    if has_photo {
        format!("/employee/{}/photo", id)
    } else {
        CONFIG.defaults.photo.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_all_three_parts() {
        assert_eq!(
            full_name("Ivanova", "Anna", "Petrovna"),
            "Ivanova Anna Petrovna"
        );
    }

    #[test]
    fn full_name_trims_empty_patronymic() {
        assert_eq!(full_name("Smith", "Jane", ""), "Smith Jane");
    }

    #[test]
    fn photo_src_falls_back_to_placeholder() {
        assert_eq!(photo_src(7, true), "/employee/7/photo");
        assert_eq!(photo_src(7, false), "/images/defaultUser.png");
    }

    #[test]
    fn form_requires_last_name_first_name_and_department() {
        let form = EmployeeForm {
            last_name: String::new(),
            first_name: "Jane".to_string(),
            patronymic: String::new(),
            department_id: 0,
            phone_number: None,
        };
        let report = form.validate().unwrap_err();
        let paths: Vec<String> = report.iter().map(|(path, _)| path.to_string()).collect();
        assert!(paths.iter().any(|p| p.contains("last_name")));
        assert!(paths.iter().any(|p| p.contains("department_id")));
    }

    #[test]
    fn form_accepts_empty_patronymic() {
        let form = EmployeeForm {
            last_name: "Smith".to_string(),
            first_name: "Jane".to_string(),
            patronymic: String::new(),
            department_id: 1,
            phone_number: None,
        };
        assert!(form.validate().is_ok());
    }
}
