//! HTTP surface: dashboard pages and the JSON/xlsx API.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::dataset::{Dataset, FilterOptions};
use crate::error::{ApiError, DatasetError};
use crate::export::{export_file_name, export_xlsx, XLSX_CONTENT_TYPE};
use crate::display::page_config;
use crate::kpi::{month_wise_cc, CcTrend, KpiSummary};
use crate::record::Record;
use crate::registry::{DatasetKind, DatasetRegistry};

const DASHBOARD_HTML: &str = include_str!("static/dashboard.html");

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DatasetRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(personal_page))
        .route("/personal", get(personal_page))
        .route("/meal", get(meal_page))
        .route("/bodyshop", get(bodyshop_page))
        .route("/commercial", get(commercial_page))
        .route("/health", get(health))
        .route("/api/filters", get(api_filters))
        .route("/api/data", get(api_data))
        .route("/api/summary", get(api_summary))
        .route("/api/export", get(api_export))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Pages
// ============================================================================

fn render_page(kind: DatasetKind) -> Html<String> {
    Html(
        DASHBOARD_HTML
            .replace("{{page_title}}", &kind.page_title())
            .replace("{{page_config}}", &page_config(kind).to_string()),
    )
}

async fn personal_page() -> Html<String> {
    render_page(DatasetKind::Personal)
}

async fn meal_page() -> Html<String> {
    render_page(DatasetKind::Meal)
}

async fn bodyshop_page() -> Html<String> {
    render_page(DatasetKind::BodyShop)
}

async fn commercial_page() -> Html<String> {
    render_page(DatasetKind::Commercial)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

// ============================================================================
// API
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ApiQuery {
    dataset: Option<String>,
    month: Option<String>,
    division: Option<String>,
    sa_name: Option<String>,
}

#[derive(Serialize)]
struct FiltersResponse {
    ok: bool,
    filters: FilterOptions,
}

#[derive(Serialize)]
struct DataResponse<'a> {
    ok: bool,
    rows: Vec<&'a Record>,
    summary: KpiSummary,
    trend: CcTrend,
}

#[derive(Serialize)]
struct SummaryResponse {
    ok: bool,
    summary: KpiSummary,
}

/// Resolve the requested dataset and refuse to serve one that failed to load.
fn loaded_dataset<'a>(
    state: &'a AppState,
    query: &ApiQuery,
) -> Result<(DatasetKind, &'a Dataset), ApiError> {
    let key = query.dataset.as_deref().unwrap_or("personal");
    let (kind, dataset) = state.registry.resolve(key);
    let dataset = dataset.ok_or_else(|| DatasetError::LoadFailed {
        dataset: kind.display_name().to_string(),
        message: "dataset is not configured".to_string(),
    })?;
    dataset.ensure_loaded()?;
    Ok((kind, dataset))
}

fn filtered<'a>(dataset: &'a Dataset, query: &ApiQuery) -> Vec<&'a Record> {
    dataset.apply_filters(
        query.month.as_deref(),
        query.division.as_deref(),
        query.sa_name.as_deref(),
    )
}

async fn api_filters(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Json<FiltersResponse>, ApiError> {
    let (_, dataset) = loaded_dataset(&state, &query)?;
    let filters = dataset.filter_options(query.month.as_deref(), query.division.as_deref())?;
    Ok(Json(FiltersResponse { ok: true, filters }))
}

async fn api_data(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response, ApiError> {
    let (kind, dataset) = loaded_dataset(&state, &query)?;
    let rows = filtered(dataset, &query);
    let summary = dataset.compute_kpis(&rows, kind.show_osat());
    let trend = month_wise_cc(&rows);
    Ok(Json(DataResponse {
        ok: true,
        rows,
        summary,
        trend,
    })
    .into_response())
}

async fn api_summary(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let (kind, dataset) = loaded_dataset(&state, &query)?;
    let rows = filtered(dataset, &query);
    let summary = dataset.compute_kpis(&rows, kind.show_osat());
    Ok(Json(SummaryResponse { ok: true, summary }))
}

async fn api_export(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response, ApiError> {
    let (kind, dataset) = loaded_dataset(&state, &query)?;
    let rows = filtered(dataset, &query);

    let bytes = export_xlsx(kind.export_columns(), &rows).map_err(|e| {
        error!("Export of '{}' failed: {}", dataset.name(), e);
        ApiError::Export(e.to_string())
    })?;

    let file_name = export_file_name(dataset.name(), chrono::Local::now());
    info!("Exported {} rows from '{}' as {}", rows.len(), dataset.name(), file_name);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{n, t, write_workbook, HEADER};
    use crate::sheet_parser::Cell;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(dir: &tempfile::TempDir) -> Router {
        let path = dir.path().join("personal.xlsx");
        write_workbook(
            &path,
            &[(
                "Apr",
                &HEADER[..],
                vec![
                    vec![
                        t("M-1"),
                        t("Ravi"),
                        t("Pune"),
                        n(200.0),
                        n(50.0),
                        n(70.0),
                        n(2.0),
                        n(10.0),
                        n(0.8),
                    ],
                    vec![
                        Cell::Empty,
                        t("Asha"),
                        t("Nashik"),
                        n(100.0),
                        n(30.0),
                    ],
                ],
            )],
        );
        let registry = DatasetRegistry::load(&[
            (DatasetKind::Personal, path.clone()),
            (DatasetKind::BodyShop, path),
            (DatasetKind::Meal, dir.path().join("missing.xlsx")),
        ]);
        router(AppState {
            registry: Arc::new(registry),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_filters_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = get_json(app(&dir), "/api/filters?dataset=personal").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["filters"]["months"], serde_json::json!(["Apr"]));
        assert_eq!(json["filters"]["divisions"], serde_json::json!(["Nashik", "Pune"]));
        assert_eq!(json["filters"]["sa_names"], serde_json::json!(["Asha", "Ravi"]));
    }

    #[tokio::test]
    async fn test_data_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) =
            get_json(app(&dir), "/api/data?dataset=personal&month=Apr&division=Pune").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["SA Name"], "Ravi");
        assert_eq!(json["rows"][0]["OSAT"], 80.0);
        assert_eq!(json["summary"]["total_links_triggered"], 200);
        assert_eq!(json["summary"]["avg_osat"], 80.0);
        // 2 concerns over 200 links
        assert_eq!(json["trend"]["points"][0]["month"], "Apr");
        assert_eq!(json["trend"]["points"][0]["cc_per_1000"], 10.0);
        assert_eq!(json["trend"]["average"], 10.0);
    }

    #[tokio::test]
    async fn test_summary_omits_osat_for_body_shop() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) =
            get_json(app(&dir), "/api/summary?dataset=bodyshop&sa_name=__NONE__").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["record_count"], 0);
        assert!(json["summary"].get("avg_osat").is_none());
    }

    #[tokio::test]
    async fn test_broken_dataset_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = get_json(app(&dir), "/api/filters?dataset=meal").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().starts_with("MEAL: "));
    }

    #[tokio::test]
    async fn test_export_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .uri("/api/export?dataset=bodyshop")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("Service_Intello_Body Shop_Export_"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let sheets = crate::sheet_parser::parse_file("export.xlsx", &body).unwrap();
        assert_eq!(sheets[0].rows.len(), 3);
        assert_eq!(sheets[0].rows[0].len(), DatasetKind::BodyShop.export_columns().len());
    }

    #[tokio::test]
    async fn test_page_renders_title() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(&dir)
            .oneshot(Request::builder().uri("/commercial").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("UNNATI MOTORS - SERVICE INTELLO (COMMERCIAL)"));
        assert!(html.contains(r#""NAGPUR_KAMPTHEE ROAD":"HO""#));
        assert!(html.contains(r#""osat_good_min":70.0"#));
        assert!(!html.contains("{{"));
    }
}
