pub mod department;
pub mod employee;

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_derive::Deserialize;

use crate::CONFIG;
use crate::context::EmployeeView;
use crate::query;
use crate::serve::{AppError, AppState};

#[derive(Deserialize, Default)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<u32>,
}

/// Just the listing table plus its pager, refreshed in place by htmx.
#[derive(Template, WebTemplate)]
#[template(path = "employees_table_partial.html")]
pub struct EmployeesTablePartial {
    pub employees: Vec<EmployeeView>,
    pub page_number: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub q: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site_name: &'static str,
    pub q: String,
    pub table: String,
}

/// The employee listing. `q` filters by full name or phone, `page` starts
/// at 1. An htmx refresh (`HX-Request` header) gets only the table
/// fragment; everything else gets the full page.
#[axum::debug_handler]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let conn = state.get_conn()?;
    let q = params.q.unwrap_or_default();
    let page_number = params.page.unwrap_or(1).max(1);

    let listing = query::list(&conn, Some(&q), page_number)?;
    let partial = EmployeesTablePartial {
        employees: listing.items.iter().map(EmployeeView::from_row).collect(),
        page_number: listing.page_number,
        total_pages: listing.total_pages,
        has_previous: listing.has_previous_page(),
        has_next: listing.has_next_page(),
        q: q.clone(),
    };

    let as_fragment = headers.contains_key("HX-Request");
    if as_fragment {
        return Ok(partial.into_response());
    }

    Ok(IndexTemplate {
        site_name: CONFIG.site_name,
        q,
        table: partial.render()?,
    }
    .into_response())
}
