use crate::codec::{decode_columns, json_to_values, TableView};
use crate::config::Config;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use dyntab_core::{Catalog, DyntabError, ErrorKind, TypeTag, Value};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

pub async fn run(config: Config, catalog: Arc<Catalog>) -> anyhow::Result<()> {
    if config.metrics.enabled {
        let metrics_handle = PrometheusBuilder::new().install_recorder()?;
        let metrics_listener = TcpListener::bind(&config.metrics.listen_addr).await?;
        info!("metrics listening on {}", config.metrics.listen_addr);
        tokio::spawn(async move {
            let app = Router::new().route(
                "/metrics",
                get(|| async move { metrics_handle.render() }),
            );
            if let Err(err) = axum::serve(metrics_listener, app).await {
                error!("metrics server error: {err}");
            }
        });
    }

    let listener = TcpListener::bind(&config.server.listen_addr).await?;
    info!("dyntab listening on {}", config.server.listen_addr);
    axum::serve(listener, router(AppState::new(catalog)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("dyntab stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ready", get(|| async { "ok" }))
        .route("/tables", get(list_tables).post(add_table))
        .route("/tables/:table", get(get_table).delete(remove_table))
        .route("/tables/:table/rows", post(add_row))
        .route("/tables/:table/rows/:index", put(update_row).delete(delete_row))
        .route("/tables/:table/columns", post(add_column))
        .route("/tables/:table/columns/:column", delete(delete_column))
        .route("/tables/:table/remove_duplicates", post(remove_duplicates))
        .route("/tables/:table/render", get(render_table))
        .with_state(state)
}

/// Request failure mapped to a status and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DyntabError> for ApiError {
    fn from(err: DyntabError) -> Self {
        let status = match err.kind() {
            ErrorKind::UnknownTable | ErrorKind::IndexOutOfBounds => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn observe<T>(op: &'static str, result: ApiResult<T>) -> ApiResult<T> {
    counter!("dyntab_request_total", "op" => op).increment(1);
    if let Err(err) = &result {
        counter!("dyntab_request_error_total", "op" => op).increment(1);
        warn!(op, status = err.status.as_u16(), "{}", err.message);
    }
    result
}

fn message(text: String) -> Json<JsonValue> {
    Json(json!({ "message": text }))
}

#[derive(Debug, Deserialize)]
pub struct AddTableRequest {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub column_info: Option<Vec<(String, String)>>,
}

#[derive(Debug, Deserialize)]
pub struct RowRequest {
    #[serde(default)]
    pub values: Option<Vec<JsonValue>>,
}

#[derive(Debug, Deserialize)]
pub struct AddColumnRequest {
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub column_type: Option<String>,
}

async fn list_tables(State(state): State<AppState>) -> ApiResult<Json<JsonValue>> {
    let tables: Vec<TableView> = state
        .catalog
        .list_tables()
        .map(|(name, handle)| handle.read(|table| TableView::new(&name, table)))
        .collect();
    observe("list_tables", Ok(Json(json!({ "tables": tables }))))
}

async fn get_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    let result = state
        .catalog
        .get_table(&name)
        .map(|handle| handle.read(|table| Json(json!({ "table": TableView::new(&name, table) }))))
        .map_err(ApiError::from);
    observe("get_table", result)
}

async fn add_table(
    State(state): State<AppState>,
    body: Result<Json<AddTableRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(body)| apply_add_table(&state.catalog, body));
    observe("add_table", result)
}

fn apply_add_table(
    catalog: &Catalog,
    body: AddTableRequest,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let (name, pairs) = match (body.table_name, body.column_info) {
        (Some(name), Some(pairs)) if !name.is_empty() && !pairs.is_empty() => (name, pairs),
        _ => {
            return Err(ApiError::bad_request(
                "Table name and column information are required",
            ))
        }
    };
    let columns = decode_columns(&pairs).map_err(ApiError::bad_request)?;
    catalog.add_table(&name, columns)?;
    info!(table = %name, "table added");
    Ok((
        StatusCode::CREATED,
        message(format!("Table '{name}' added successfully")),
    ))
}

async fn remove_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    let result = state
        .catalog
        .remove_table(&name)
        .map(|_| {
            info!(table = %name, "table removed");
            message(format!("Table '{name}' removed successfully"))
        })
        .map_err(ApiError::from);
    observe("remove_table", result)
}

fn row_values(body: RowRequest) -> ApiResult<Vec<Value>> {
    let values = body
        .values
        .ok_or_else(|| ApiError::bad_request("Row values are required"))?;
    json_to_values(&values).map_err(ApiError::bad_request)
}

async fn add_row(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<RowRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(body)| apply_add_row(&state.catalog, &name, body));
    observe("add_row", result)
}

fn apply_add_row(
    catalog: &Catalog,
    name: &str,
    body: RowRequest,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let table = catalog.get_table(name)?;
    table.add_row(row_values(body)?)?;
    Ok((
        StatusCode::CREATED,
        message(format!("Row added to '{name}' successfully")),
    ))
}

async fn update_row(
    State(state): State<AppState>,
    Path((name, index)): Path<(String, usize)>,
    body: Result<Json<RowRequest>, JsonRejection>,
) -> ApiResult<Json<JsonValue>> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(body)| apply_update_row(&state.catalog, &name, index, body));
    observe("update_row", result)
}

fn apply_update_row(
    catalog: &Catalog,
    name: &str,
    index: usize,
    body: RowRequest,
) -> ApiResult<Json<JsonValue>> {
    let table = catalog.get_table(name)?;
    table.update_row(index, row_values(body)?)?;
    Ok(message(format!("Row in '{name}' updated successfully")))
}

async fn delete_row(
    State(state): State<AppState>,
    Path((name, index)): Path<(String, usize)>,
) -> ApiResult<Json<JsonValue>> {
    let result = state
        .catalog
        .get_table(&name)
        .and_then(|table| table.delete_row(index))
        .map(|_| message(format!("Row in '{name}' deleted successfully")))
        .map_err(ApiError::from);
    observe("delete_row", result)
}

async fn add_column(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<AddColumnRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(body)| apply_add_column(&state.catalog, &name, body));
    observe("add_column", result)
}

fn apply_add_column(
    catalog: &Catalog,
    name: &str,
    body: AddColumnRequest,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let table = catalog.get_table(name)?;
    let (column, type_name) = match (body.column_name, body.column_type) {
        (Some(column), Some(type_name)) if !column.is_empty() => (column, type_name),
        _ => {
            return Err(ApiError::bad_request(
                "Column name and column type are required",
            ))
        }
    };
    let data_type: TypeTag = type_name.parse()?;
    table.add_column(&column, data_type)?;
    Ok((
        StatusCode::CREATED,
        message(format!("Column added to '{name}' successfully")),
    ))
}

async fn delete_column(
    State(state): State<AppState>,
    Path((name, column)): Path<(String, String)>,
) -> ApiResult<Json<JsonValue>> {
    let result = state
        .catalog
        .get_table(&name)
        .and_then(|table| table.delete_column(&column))
        .map(|_| {
            message(format!(
                "Column '{column}' deleted from '{name}' successfully"
            ))
        })
        .map_err(ApiError::from);
    observe("delete_column", result)
}

async fn remove_duplicates(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    let result = state
        .catalog
        .get_table(&name)
        .map(|table| {
            let removed = table.remove_duplicates();
            Json(json!({
                "message": format!("Duplicates removed from '{name}' successfully"),
                "removed": removed,
            }))
        })
        .map_err(ApiError::from);
    observe("remove_duplicates", result)
}

async fn render_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<String> {
    let result = state
        .catalog
        .get_table(&name)
        .map(|table| table.render().collect::<Vec<_>>().join("\n"))
        .map_err(ApiError::from);
    observe("render_table", result)
}
