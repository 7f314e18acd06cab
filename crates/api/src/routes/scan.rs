use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use common::{Error, Result};
use strategy::{BreakoutScanner, ScanFileConfig, ScanReport};

use crate::error::ApiError;
use crate::export::{report_file_name, signals_csv};
use crate::query::{ScanQuery, ScanRequest};
use crate::AppState;

pub fn scan_router() -> Router<AppState> {
    Router::new()
        .route("/api/defaults", get(get_defaults))
        .route("/api/scan", get(get_scan))
        .route("/api/scan.csv", get(get_scan_csv))
}

#[derive(Serialize)]
struct ScanResponse {
    ticker: String,
    start: NaiveDate,
    end: NaiveDate,
    report: ScanReport,
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

async fn get_defaults(State(state): State<AppState>) -> Json<ScanFileConfig> {
    Json(state.scan_config.as_ref().clone())
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

async fn get_scan(
    State(state): State<AppState>,
    query: std::result::Result<Query<ScanQuery>, QueryRejection>,
) -> std::result::Result<Json<ScanResponse>, ApiError> {
    let request = validate(&state, query)?;
    let report = run_scan(&state, &request).await?;

    Ok(Json(ScanResponse {
        ticker: request.ticker,
        start: request.start,
        end: request.end,
        report,
    }))
}

// ─── CSV export ───────────────────────────────────────────────────────────────

async fn get_scan_csv(
    State(state): State<AppState>,
    query: std::result::Result<Query<ScanQuery>, QueryRejection>,
) -> std::result::Result<Response, ApiError> {
    let request = validate(&state, query)?;
    let report = run_scan(&state, &request).await?;
    let body = signals_csv(&report.signals)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(&request.ticker)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ─── Shared ───────────────────────────────────────────────────────────────────

fn validate(
    state: &AppState,
    query: std::result::Result<Query<ScanQuery>, QueryRejection>,
) -> Result<ScanRequest> {
    let Query(query) = query.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    query.into_request(&state.scan_config, Utc::now().date_naive())
}

/// Fetch bars far enough past `end` for the holding period, then scan.
async fn run_scan(state: &AppState, request: &ScanRequest) -> Result<ScanReport> {
    let scanner = BreakoutScanner::new(request.params)?;
    let fetch_end = market_data::fetch_end(request.end, scanner.params().holding_period_days);

    let bars = state
        .cache
        .get_or_fetch(state.provider.as_ref(), &request.ticker, request.start, fetch_end)
        .await?;
    let report = scanner.scan(&bars)?;

    info!(
        ticker = %request.ticker,
        bars = bars.len(),
        flagged = report.flagged.len(),
        signals = report.signals.len(),
        empty = report.summary.is_empty(),
        "Scan complete"
    );
    Ok(report)
}
