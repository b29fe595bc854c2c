use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_derive::Deserialize;

use crate::CONFIG;
use crate::serve::{AppError, AppState};
use crate::store::{EmployeeStore, StoreError};

#[derive(Debug)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub employee_count: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "departments.html")]
pub struct DepartmentsTemplate {
    pub site_name: &'static str,
    pub departments: Vec<DepartmentRow>,
    pub error: Option<String>,
}

fn departments_template(
    store: &EmployeeStore,
    error: Option<String>,
) -> Result<DepartmentsTemplate, AppError> {
    let departments = store
        .list_departments_with_counts()?
        .into_iter()
        .map(|(department, employee_count)| DepartmentRow {
            id: department.id,
            name: department.name,
            employee_count,
        })
        .collect();

    Ok(DepartmentsTemplate {
        site_name: CONFIG.site_name,
        departments,
        error,
    })
}

#[axum::debug_handler]
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<DepartmentsTemplate, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    departments_template(&store, None)
}

#[derive(Deserialize)]
pub struct DepartmentForm {
    pub name: String,
}

#[axum::debug_handler]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DepartmentForm>,
) -> Result<Response, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let name = form.name.trim();
    if name.is_empty() {
        let template = departments_template(&store, Some("name is required".to_string()))?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    store.insert_department(name)?;

    Ok(Redirect::to("/departments").into_response())
}

#[axum::debug_handler]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    match store.delete_department(id) {
        Ok(()) => Ok(Redirect::to("/departments").into_response()),
        Err(StoreError::DepartmentInUse) => {
            let template = departments_template(
                &store,
                Some("department still has employees assigned".to_string()),
            )?;
            Ok((StatusCode::CONFLICT, template).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
