//! Audit log endpoints: read-only pass-through to the transaction mirror.

use api_types::audit::{AuditEntryView, AuditHealth, AuditSummary};
use api_types::cashflow::Kind;
use axum::{Extension, Json, extract::State};
use engine::{profiles, resolve_profile};
use mirror::{LedgerMirror, MirrorEntry, MirrorEntryKind};

use crate::{ServerError, server::ServerState};

fn entry_view(entry: MirrorEntry) -> AuditEntryView {
    AuditEntryView {
        id: entry.id,
        sme_id: entry.sme_id,
        kind: match entry.kind {
            MirrorEntryKind::Income => Kind::Income,
            MirrorEntryKind::Expense => Kind::Expense,
        },
        amount_minor: entry.amount,
        category: entry.category,
        description: entry.description,
        date: entry.date,
        blockchain_status: entry.blockchain_status,
    }
}

/// Lists the mirror entries visible to the caller.
///
/// Users see their branch's synthetic tenant key; admins see every key of
/// their organization (prefix match over the full list, since the mirror
/// has no org schema).
pub async fn list(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AuditEntryView>>, ServerError> {
    let scope = resolve_profile(&state.db, Some(&profile.id)).await?;

    let entries = if scope.is_admin() {
        match &scope.org_id {
            Some(org_id) => {
                let prefix = format!("{org_id}-");
                state
                    .mirror
                    .list()
                    .await?
                    .into_iter()
                    .filter(|entry| entry.sme_id.starts_with(&prefix))
                    .collect()
            }
            None => Vec::new(),
        }
    } else {
        match scope.sme_key() {
            Some(sme_id) => state.mirror.list_for_sme(&sme_id).await?,
            None => Vec::new(),
        }
    };

    Ok(Json(entries.into_iter().map(entry_view).collect()))
}

/// Mirror summary for the caller's synthetic tenant key.
pub async fn summary(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AuditSummary>, ServerError> {
    let scope = resolve_profile(&state.db, Some(&profile.id)).await?;
    let Some(sme_id) = scope.sme_key() else {
        return Err(ServerError::Generic(
            "summary requires a branch assignment".to_string(),
        ));
    };

    let summary = state.mirror.summary(&sme_id).await?;
    Ok(Json(AuditSummary {
        sme_id: summary.sme_id,
        total_income_minor: summary.total_income,
        total_expense_minor: summary.total_expense,
        net_cashflow_minor: summary.net_cashflow,
        transaction_count: summary.transaction_count,
    }))
}

/// Probes the mirror service.
pub async fn health(
    Extension(_profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AuditHealth>, ServerError> {
    let health = state.mirror.health().await?;
    Ok(Json(AuditHealth {
        status: health.status,
    }))
}
