//! Organization, branch and profile administration endpoints.

use api_types::branch::{BranchNew, BranchView};
use api_types::org::{OrganizationNew, OrganizationView};
use api_types::profile::{ProfileUpdate, ProfileView, Role as RoleView};
use axum::{Extension, Json, extract::Path, extract::State, http::StatusCode};
use engine::{Role, UpdateProfileCmd, branches, organizations, profiles};

use crate::{ServerError, cashflow::role_view, server::ServerState};

fn branch_view(branch: branches::Model) -> BranchView {
    BranchView {
        id: branch.id,
        name: branch.name,
        address: branch.address,
        org_id: branch.org_id,
    }
}

fn profile_view(profile: profiles::Model) -> Result<ProfileView, ServerError> {
    let role = Role::try_from(profile.role.as_str()).map_err(ServerError::Engine)?;
    Ok(ProfileView {
        id: profile.id,
        full_name: profile.full_name,
        email: profile.email,
        role: role_view(role),
        org_id: profile.org_id,
        branch_id: profile.branch_id,
    })
}

fn role_of(role: RoleView) -> Role {
    match role {
        RoleView::Admin => Role::Admin,
        RoleView::User => Role::User,
    }
}

fn org_view(org: organizations::Model) -> OrganizationView {
    OrganizationView {
        id: org.id,
        name: org.name,
        created_by: org.created_by,
    }
}

pub async fn create_organization(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<OrganizationNew>,
) -> Result<(StatusCode, Json<OrganizationView>), ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let store = store.lock().await;
    let org = store.create_organization(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(org_view(org))))
}

pub async fn create_branch(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BranchNew>,
) -> Result<(StatusCode, Json<BranchView>), ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let store = store.lock().await;
    let branch = store
        .create_branch(&payload.name, payload.address.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(branch_view(branch))))
}

pub async fn list_branches(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BranchView>>, ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let store = store.lock().await;
    let branches = store.list_branches().await?;

    Ok(Json(branches.into_iter().map(branch_view).collect()))
}

pub async fn list_profiles(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProfileView>>, ServerError> {
    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let store = store.lock().await;
    let profiles = store.list_profiles().await?;

    profiles
        .into_iter()
        .map(profile_view)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

pub async fn update_profile(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
    Path(profile_id): Path<String>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let cmd = UpdateProfileCmd {
        full_name: payload.full_name,
        role: payload.role.map(role_of),
        branch_id: payload.branch_id,
    };

    let store = state
        .sessions
        .store_for(&state.db, &state.mirror, &profile.id)
        .await;
    let store = store.lock().await;
    let updated = store.update_profile(&profile_id, cmd).await?;

    profile_view(updated).map(Json)
}

/// Tears down the caller's session store.
pub async fn logout(
    Extension(profile): Extension<profiles::Model>,
    State(state): State<ServerState>,
) -> StatusCode {
    if state.sessions.remove(&profile.id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::OK
    }
}
