use crate::api::AppState;
use crate::error::EstimateError;
use crate::io::load_workbook;
use crate::models::{
    CatalogEntry, EstimateRequestItem, ParsedEstimate, PriceObservation, Sheet, WorkItem,
};
use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// 请求体: 单元格表格
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub items: Vec<WorkItem>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub items: Vec<EstimateRequestItem>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RebuildRequest {
    pub observations: Vec<PriceObservation>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub region: Option<String>,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn error_response(e: EstimateError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::warn!("request failed ({}): {}", status, e);
    let response = ErrorResponse {
        success: false,
        message: format!("Error: {}", e),
    };
    (status, Json(response)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 从JSON表格提取工程项
pub async fn extract(State(state): State<AppState>, Json(req): Json<ExtractRequest>) -> Json<ParsedEstimate> {
    Json(state.parser.parse_sheets(&req.sheets))
}

/// 从上传的xlsx提取工程项
pub async fn extract_xlsx(State(state): State<AppState>, body: Bytes) -> Response {
    match load_workbook(&body) {
        Ok(sheets) => (StatusCode::OK, Json(state.parser.parse_sheets(&sheets))).into_response(),
        Err(e) => error_response(e),
    }
}

/// 按地区价格目录核验报价
pub async fn verify(State(state): State<AppState>, Json(req): Json<VerifyRequest>) -> Response {
    let region = state.region_or_default(req.region.as_deref());
    let catalog = state.catalog.entries_for_region(region).await;

    match state.verifier.verify(&req.items, &catalog) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 按目录计算估价
pub async fn estimate(State(state): State<AppState>, Json(req): Json<EstimateRequest>) -> Response {
    let region = state.region_or_default(req.region.as_deref());
    let catalog = state.catalog.entries_for_region(region).await;

    match state.pricer.price(&req.items, &catalog) {
        Ok(priced) => (StatusCode::OK, Json(priced)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 用原始报价重建地区价格目录
pub async fn rebuild_catalog(State(state): State<AppState>, Json(req): Json<RebuildRequest>) -> Response {
    let region = state.region_or_default(req.region.as_deref()).to_string();

    match state.catalog.rebuild(&req.observations, &region).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// 查询地区价格目录
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<Vec<CatalogEntry>> {
    let region = state.region_or_default(query.region.as_deref());
    Json(state.catalog.entries_for_region(region).await)
}
