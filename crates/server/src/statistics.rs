//! Statistics API endpoints.

use api_types::stats::{CategoryTotal, DashboardSummary};
use axum::{Extension, Json, extract::Query, extract::State};
use engine::{dashboard, profiles};
use serde::Deserialize;

use crate::{ServerError, cashflow::kind_view, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Handle requests for dashboard statistics.
///
/// With `year` and `month` query parameters the summary covers that
/// calendar month only; otherwise it covers everything the caller can see.
pub async fn get_stats(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardSummary>, ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let mut store = store.lock().await;
    store.fetch().await?;

    let records = match (query.year, query.month) {
        (Some(year), Some(month)) => dashboard::filter_month(store.records(), year, month),
        _ => store.records().to_vec(),
    };

    let totals = dashboard::totals(&records);
    let by_category = dashboard::totals_by_category(&records)
        .into_iter()
        .map(|group| CategoryTotal {
            kind: kind_view(group.kind),
            name: group.name,
            total_minor: group.total,
            record_count: group.record_count,
        })
        .collect();

    Ok(Json(DashboardSummary {
        total_income_minor: totals.total_income,
        total_expense_minor: totals.total_expense,
        net_cashflow_minor: totals.net_cashflow,
        record_count: totals.record_count,
        by_category,
    }))
}
