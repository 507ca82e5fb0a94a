use crate::{App, FilterQuery, TableQuery};
use alerts::TableRow;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use conversion::ConversionRequest;
use std::sync::Arc;

mod error;

pub use error::ApiError;

/// Build the dashboard's API router.
pub fn build_router(app: Arc<App>) -> axum::Router<()> {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/alerts", get(list_alerts))
        .route("/summary", get(get_summary))
        .route("/export", post(export_alerts))
        .route("/tasks", post(create_tasks))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app)
}

async fn list_alerts(
    State(app): State<Arc<App>>,
    Query(query): Query<TableQuery>,
) -> Result<Response, ApiError> {
    let rows: Vec<_> = app.table(&query)?.into_iter().map(TableRow::from).collect();
    Ok(Json(rows).into_response())
}

async fn get_summary(
    State(app): State<Arc<App>>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let summary = app.summary(&query).await?;
    Ok(Json(summary).into_response())
}

#[derive(Debug, serde::Serialize)]
struct Exported {
    path: std::path::PathBuf,
}

async fn export_alerts(
    State(app): State<Arc<App>>,
    Json(query): Json<TableQuery>,
) -> Result<Response, ApiError> {
    let path = app.export(&query, None)?;
    tracing::info!(path = %path.display(), "exported alerts table");

    Ok(Json(Exported { path }).into_response())
}

#[tracing::instrument(skip(app))]
async fn create_tasks(
    State(app): State<Arc<App>>,
    Json(request): Json<ConversionRequest>,
) -> Result<Response, ApiError> {
    let result = app.convert(&request).await?;
    Ok(Json(result).into_response())
}
