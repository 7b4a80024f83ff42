use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::error;

use crate::{
    database::PostgresConnection,
    http_err::{ApiError, ApiResponse},
    server::AppState,
};

use super::{
    domain::{DashboardSummary, ReportingPeriod},
    queries::postgres::PostgresQueries,
    services::{DashboardError, DashboardService},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(summarize))
}

impl From<DashboardError> for ApiError {
    fn from(error: DashboardError) -> Self {
        let DashboardError::Aggregation(error) = error;
        error!(?error, "Failed to build dashboard summary.");

        Self::InternalServerError
    }
}

#[derive(Deserialize)]
struct SummaryParams {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// The period to report over when the caller does not provide one: the start
/// of the current month through today.
fn default_period() -> ReportingPeriod {
    let today = Utc::now().date_naive();

    ReportingPeriod::new(today.with_day(1).unwrap_or(today), today)
}

async fn summarize(
    State(db): State<PostgresConnection>,
    Query(params): Query<SummaryParams>,
) -> ApiResponse<Json<DashboardSummary>> {
    let default = default_period();
    let period = ReportingPeriod::new(
        params.start_date.unwrap_or(default.start),
        params.end_date.unwrap_or(default.end),
    );

    let service = DashboardService::new(Arc::new(PostgresQueries(db)));
    let summary = service.summarize(period).await?;

    Ok(Json(summary))
}
