pub mod handler;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_embed::ServeEmbed;
use r2d2::{Error as R2D2Error, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rust_embed::Embed;
use thiserror::Error;
use tower_livereload::LiveReloadLayer;

use crate::CONFIG;
use crate::store::StoreError;

#[derive(Embed, Clone)]
#[folder = "static/images/"]
pub struct ImagesDir;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Askama(#[from] askama::Error),
    #[error(transparent)]
    R2D2(#[from] R2D2Error),
    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::DepartmentInUse => AppError::Conflict(err.to_string()),
            StoreError::Sqlite(e) => AppError::Rusqlite(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            err => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

pub fn run(db: PathBuf, port: Option<&str>) -> Result<()> {
    let state = Arc::new(AppState::new(db)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port.unwrap_or(CONFIG.defaults.port));
    let runtime = tokio::runtime::Runtime::new().context("could not start runtime")?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .context("could not listen")?;

        tracing::info!("serving at http://{}/", addr);
        axum::serve(listener, app)
            .await
            .context("could not start server")
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/employee/new", get(handler::employee::new_form))
        .route("/employee/new", post(handler::employee::create))
        .route("/employee/{id}", get(handler::employee::details))
        .route("/employee/{id}/edit", get(handler::employee::edit_form))
        .route("/employee/{id}/edit", post(handler::employee::update))
        .route("/employee/{id}/delete", get(handler::employee::delete_form))
        .route("/employee/{id}/delete", post(handler::employee::delete))
        .route("/employee/{id}/photo", get(handler::employee::photo))
        .route("/departments", get(handler::department::index))
        .route("/departments/new", post(handler::department::create))
        .route(
            "/departments/{id}/delete",
            post(handler::department::delete),
        )
        .layer(LiveReloadLayer::new())
        .with_state(state)
        .nest_service("/images", ServeEmbed::<ImagesDir>::new())
}

pub struct AppState {
    pub db_pool: Pool<SqliteConnectionManager>,
}

impl AppState {
    pub fn new(db: PathBuf) -> Result<Self> {
        let manager = SqliteConnectionManager::file(&db)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON"));
        let db_pool = r2d2::Pool::builder().max_size(15).build(manager)?;

        Ok(AppState { db_pool })
    }

    pub fn get_conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, R2D2Error> {
        self.db_pool.get()
    }
}
