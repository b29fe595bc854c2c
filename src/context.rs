use crate::data::{self, Department, Employee};
use crate::query::EmployeeRow;

/// Employee flattened for the templates: derived strings only, no object
/// graph and no back-reference to the department.
#[derive(Debug)]
pub struct EmployeeView {
    pub id: i64,
    pub full_name: String,
    pub department_name: String,
    pub phone_number: String,
    pub photo_src: String,
}

impl EmployeeView {
    pub fn from_row(row: &EmployeeRow) -> Self {
        EmployeeView {
            id: row.id,
            full_name: data::full_name(&row.last_name, &row.first_name, &row.patronymic),
            department_name: row.department_name.clone(),
            phone_number: row.phone_number.clone().unwrap_or_default(),
            photo_src: data::photo_src(row.id, row.has_photo),
        }
    }

    pub fn from_employee(employee: &Employee, department_name: String) -> Self {
        EmployeeView {
            id: employee.id,
            full_name: data::full_name(
                &employee.last_name,
                &employee.first_name,
                &employee.patronymic,
            ),
            department_name,
            phone_number: employee.phone_number.clone().unwrap_or_default(),
            photo_src: data::photo_src(employee.id, employee.profile_photo.is_some()),
        }
    }
}

/// One entry of the department dropdown on the employee form.
#[derive(Debug)]
pub struct DepartmentOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

pub fn department_options(departments: Vec<Department>, selected: i64) -> Vec<DepartmentOption> {
    departments
        .into_iter()
        .map(|d| DepartmentOption {
            selected: d.id == selected,
            id: d.id,
            name: d.name,
        })
        .collect()
}
