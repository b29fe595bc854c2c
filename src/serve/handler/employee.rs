use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use garde::Validate;

use crate::CONFIG;
use crate::context::{self, DepartmentOption, EmployeeView};
use crate::data::{self, EmployeeForm};
use crate::photo;
use crate::serve::{AppError, AppState};
use crate::store::EmployeeStore;

#[derive(Template, WebTemplate)]
#[template(path = "employee_detail.html")]
pub struct EmployeeDetailTemplate {
    pub site_name: &'static str,
    pub employee: EmployeeView,
}

#[axum::debug_handler]
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<EmployeeDetailTemplate, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let employee = store.get_employee(id)?;
    let department = store.get_department(employee.department_id)?;

    Ok(EmployeeDetailTemplate {
        site_name: CONFIG.site_name,
        employee: EmployeeView::from_employee(&employee, department.name),
    })
}

#[derive(Template, WebTemplate)]
#[template(path = "employee_form.html")]
pub struct EmployeeFormTemplate {
    pub site_name: &'static str,
    pub heading: &'static str,
    pub action: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub phone_number: String,
    pub departments: Vec<DepartmentOption>,
    pub errors: Vec<String>,
    pub photo_src: String,
}

fn form_template(
    store: &EmployeeStore,
    heading: &'static str,
    action: String,
    form: &EmployeeForm,
    errors: Vec<String>,
    photo_src: String,
) -> Result<EmployeeFormTemplate, AppError> {
    // the department dropdown is re-supplied on every render, including
    // failed submissions
    let departments = context::department_options(store.list_departments()?, form.department_id);

    Ok(EmployeeFormTemplate {
        site_name: CONFIG.site_name,
        heading,
        action,
        last_name: form.last_name.clone(),
        first_name: form.first_name.clone(),
        patronymic: form.patronymic.clone(),
        phone_number: form.phone_number.clone().unwrap_or_default(),
        departments,
        errors,
        photo_src,
    })
}

#[axum::debug_handler]
pub async fn new_form(
    State(state): State<Arc<AppState>>,
) -> Result<EmployeeFormTemplate, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    form_template(
        &store,
        "New employee",
        "/employee/new".to_string(),
        &EmployeeForm::default(),
        Vec::new(),
        CONFIG.defaults.photo.to_string(),
    )
}

#[axum::debug_handler]
pub async fn create(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, upload) = read_form(multipart).await?;
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let mut errors = validation_messages(&form);
    let new_photo = normalize_upload(upload, &mut errors);

    if !errors.is_empty() {
        // reject the whole create: nothing is persisted on any failure,
        // including an undecodable photo
        let template = form_template(
            &store,
            "New employee",
            "/employee/new".to_string(),
            &form,
            errors,
            CONFIG.defaults.photo.to_string(),
        )?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    let id = store.insert_employee(&form, new_photo.as_deref())?;
    tracing::debug!(id, "created employee");

    Ok(Redirect::to("/").into_response())
}

#[axum::debug_handler]
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<EmployeeFormTemplate, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let employee = store.get_employee(id)?;
    let form = EmployeeForm {
        last_name: employee.last_name.clone(),
        first_name: employee.first_name.clone(),
        patronymic: employee.patronymic.clone(),
        department_id: employee.department_id,
        phone_number: employee.phone_number.clone(),
    };

    form_template(
        &store,
        "Edit employee",
        format!("/employee/{}/edit", id),
        &form,
        Vec::new(),
        data::photo_src(id, employee.profile_photo.is_some()),
    )
}

#[axum::debug_handler]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    // re-fetch first: an id that no longer resolves is a plain 404
    let existing = {
        let conn = state.get_conn()?;
        let store = EmployeeStore::new(&conn);
        store.get_employee(id)?
    };
    let (form, upload) = read_form(multipart).await?;
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let mut errors = validation_messages(&form);
    let new_photo = normalize_upload(upload, &mut errors);

    if !errors.is_empty() {
        let template = form_template(
            &store,
            "Edit employee",
            format!("/employee/{}/edit", id),
            &form,
            errors,
            data::photo_src(id, existing.profile_photo.is_some()),
        )?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    // a row deleted between the fetch above and this write collapses to 404
    store.update_employee(id, &form, new_photo.as_deref())?;
    tracing::debug!(id, "updated employee");

    Ok(Redirect::to("/").into_response())
}

#[derive(Template, WebTemplate)]
#[template(path = "employee_delete.html")]
pub struct EmployeeDeleteTemplate {
    pub site_name: &'static str,
    pub employee: EmployeeView,
}

#[axum::debug_handler]
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<EmployeeDeleteTemplate, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    let employee = store.get_employee(id)?;
    let department = store.get_department(employee.department_id)?;

    Ok(EmployeeDeleteTemplate {
        site_name: CONFIG.site_name,
        employee: EmployeeView::from_employee(&employee, department.name),
    })
}

#[axum::debug_handler]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    store.delete_employee(id)?;
    tracing::debug!(id, "deleted employee");

    Ok(Redirect::to("/").into_response())
}

/// The stored JPEG, straight from the blob column. Employees without a
/// photo 404 here; the templates point them at the placeholder instead.
#[axum::debug_handler]
pub async fn photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let conn = state.get_conn()?;
    let store = EmployeeStore::new(&conn);

    match store.get_photo(id)? {
        Some(bytes) => {
            Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
        }
        None => Err(AppError::NotFound),
    }
}

/// Collects the multipart submission into the bound field set plus the raw
/// upload. A zero-length file part (an empty `<input type="file">` still
/// submits one) counts as "no new photo".
async fn read_form(
    mut multipart: Multipart,
) -> Result<(EmployeeForm, Option<Vec<u8>>), AppError> {
    let mut form = EmployeeForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "last_name" => form.last_name = field.text().await?.trim().to_string(),
            "first_name" => form.first_name = field.text().await?.trim().to_string(),
            "patronymic" => form.patronymic = field.text().await?.trim().to_string(),
            "department_id" => {
                // anything unparseable stays 0 and fails validation
                form.department_id = field.text().await?.trim().parse().unwrap_or(0);
            }
            "phone_number" => {
                let value = field.text().await?.trim().to_string();
                form.phone_number = (!value.is_empty()).then_some(value);
            }
            "profile_photo" => {
                let raw = field.bytes().await?;
                if !raw.is_empty() {
                    upload = Some(raw.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok((form, upload))
}

fn validation_messages(form: &EmployeeForm) -> Vec<String> {
    match form.validate() {
        Ok(()) => Vec::new(),
        Err(report) => report
            .iter()
            .map(|(path, error)| format!("{}: {}", path, error))
            .collect(),
    }
}

/// Runs the normalizer when an upload is present; a decode failure becomes
/// a validation message on the photo field instead of a hard error.
fn normalize_upload(upload: Option<Vec<u8>>, errors: &mut Vec<String>) -> Option<Vec<u8>> {
    let raw = upload?;
    match photo::normalize(&raw) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            errors.push(format!("profile_photo: {}", err));
            None
        }
    }
}
