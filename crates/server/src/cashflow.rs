//! Cashflow record endpoints.

use api_types::cashflow::{
    CashflowListResponse, CashflowNew, CashflowUpdate, CashflowView, CashflowWritten, Kind,
    MirrorStatus,
};
use api_types::profile::Role as RoleView;
use axum::{Extension, Json, extract::Path, extract::State, http::StatusCode};
use engine::{
    CashflowRecord, EntryKind, MirrorOutcome, NewCashflowCmd, RecordId, Role, UpdateCashflowCmd,
    profiles,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn kind_of(kind: Kind) -> EntryKind {
    match kind {
        Kind::Income => EntryKind::Income,
        Kind::Expense => EntryKind::Expense,
    }
}

pub(crate) fn kind_view(kind: EntryKind) -> Kind {
    match kind {
        EntryKind::Income => Kind::Income,
        EntryKind::Expense => Kind::Expense,
    }
}

pub(crate) fn role_view(role: Role) -> RoleView {
    match role {
        Role::Admin => RoleView::Admin,
        Role::User => RoleView::User,
    }
}

pub(crate) fn record_view(record: &CashflowRecord) -> CashflowView {
    CashflowView {
        id: record.id.to_string(),
        kind: kind_view(record.kind()),
        name: record.name.clone(),
        amount_minor: record.amount,
        date: record.date,
        description: record.description.clone(),
        branch_id: record.branch_id,
        org_id: record.org_id.clone(),
    }
}

fn mirror_view(outcome: MirrorOutcome) -> MirrorStatus {
    match outcome {
        MirrorOutcome::Mirrored { entry_id } => MirrorStatus::Mirrored { entry_id },
        MirrorOutcome::Skipped { reason } => MirrorStatus::Skipped { reason },
        MirrorOutcome::Failed { error } => MirrorStatus::Failed { error },
    }
}

fn parse_record_id(id: &str) -> Result<RecordId, ServerError> {
    id.parse::<RecordId>().map_err(ServerError::Engine)
}

pub async fn list(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CashflowListResponse>, ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let mut store = store.lock().await;
    store.fetch().await?;

    let records = store.records().iter().map(record_view).collect();
    let role = store.role().unwrap_or(Role::User);
    Ok(Json(CashflowListResponse {
        records,
        role: role_view(role),
    }))
}

pub async fn create(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashflowNew>,
) -> Result<(StatusCode, Json<CashflowWritten>), ServerError> {
    let mut cmd = NewCashflowCmd::new(payload.name, kind_of(payload.kind), payload.amount_minor);
    cmd.date = payload.date;
    cmd.description = payload.description;

    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let mut store = store.lock().await;
    let outcome = store.add(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(CashflowWritten {
            record: record_view(&outcome.record),
            mirror: mirror_view(outcome.mirror),
        }),
    ))
}

pub async fn update(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CashflowUpdate>,
) -> Result<Json<CashflowWritten>, ServerError> {
    let id = parse_record_id(&id)?;
    let cmd = UpdateCashflowCmd {
        name: payload.name,
        amount: payload.amount_minor,
        date: payload.date,
        description: payload.description,
    };

    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let mut store = store.lock().await;
    let outcome = store.update(id, cmd).await?;

    Ok(Json(CashflowWritten {
        record: record_view(&outcome.record),
        mirror: mirror_view(outcome.mirror),
    }))
}

pub async fn remove(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<CashflowWritten>, ServerError> {
    let id = parse_record_id(&id)?;

    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let mut store = store.lock().await;
    let outcome = store.delete(id).await?;

    Ok(Json(CashflowWritten {
        record: record_view(&outcome.record),
        mirror: mirror_view(outcome.mirror),
    }))
}
