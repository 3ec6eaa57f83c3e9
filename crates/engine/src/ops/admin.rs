//! Admin operations: organization bootstrap, branch and user management.
//!
//! These run against the primary store only; the mirror is not involved.

use mirror::LedgerMirror;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, entity::prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ProfileScope, ResultEngine, Role, UpdateProfileCmd, branches, organizations,
    profiles,
};

use super::CashflowStore;

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

impl<M: LedgerMirror> CashflowStore<M> {
    async fn require_admin(&self) -> ResultEngine<ProfileScope> {
        let scope = self.scope().await?;
        if !scope.is_admin() {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(scope)
    }

    fn admin_org(scope: &ProfileScope) -> ResultEngine<String> {
        scope.org_id.clone().ok_or_else(|| {
            EngineError::InvalidInput("admin profile has no organization".to_string())
        })
    }

    /// Creates an organization and promotes the calling profile to its
    /// admin.
    ///
    /// This is the tail end of registration, so it deliberately bypasses
    /// the branch-assignment check of the resolver: a fresh profile has no
    /// branch yet.
    pub async fn create_organization(&self, name: &str) -> ResultEngine<organizations::Model> {
        let Some(identity) = self.identity.as_deref() else {
            return Err(EngineError::NotAuthenticated);
        };
        let name = normalize_required_name(name, "organization")?;

        let profile = profiles::Entity::find_by_id(identity.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::ProfileNotFound(identity.to_string()))?;
        if profile.org_id.is_some() {
            return Err(EngineError::InvalidInput(
                "profile already belongs to an organization".to_string(),
            ));
        }

        let org = organizations::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            name: ActiveValue::Set(name),
            created_by: ActiveValue::Set(identity.to_string()),
        }
        .insert(&self.database)
        .await?;

        let mut profile: profiles::ActiveModel = profile.into();
        profile.org_id = ActiveValue::Set(Some(org.id.clone()));
        profile.role = ActiveValue::Set(Role::Admin.as_str().to_string());
        profile.update(&self.database).await?;

        Ok(org)
    }

    /// Creates a branch in the caller's organization.
    pub async fn create_branch(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> ResultEngine<branches::Model> {
        let scope = self.require_admin().await?;
        let org_id = Self::admin_org(&scope)?;
        let name = normalize_required_name(name, "branch")?;

        let branch = branches::ActiveModel {
            name: ActiveValue::Set(name),
            address: ActiveValue::Set(address.map(str::to_string)),
            org_id: ActiveValue::Set(org_id),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;
        Ok(branch)
    }

    /// Lists the branches of the caller's organization.
    pub async fn list_branches(&self) -> ResultEngine<Vec<branches::Model>> {
        let scope = self.require_admin().await?;
        let org_id = Self::admin_org(&scope)?;

        branches::Entity::find()
            .filter(branches::Column::OrgId.eq(org_id))
            .order_by_asc(branches::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Lists the profiles of the caller's organization.
    pub async fn list_profiles(&self) -> ResultEngine<Vec<profiles::Model>> {
        let scope = self.require_admin().await?;
        let org_id = Self::admin_org(&scope)?;

        profiles::Entity::find()
            .filter(profiles::Column::OrgId.eq(org_id))
            .order_by_asc(profiles::Column::Id)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Updates a profile in the caller's organization.
    ///
    /// The resulting profile may not have role `user` without a branch;
    /// such an update is rejected with `MissingBranchAssignment`.
    pub async fn update_profile(
        &self,
        profile_id: &str,
        cmd: UpdateProfileCmd,
    ) -> ResultEngine<profiles::Model> {
        let scope = self.require_admin().await?;
        let org_id = Self::admin_org(&scope)?;

        let target = profiles::Entity::find_by_id(profile_id.to_string())
            .filter(profiles::Column::OrgId.eq(org_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::ProfileNotFound(profile_id.to_string()))?;

        let new_role = match &cmd.role {
            Some(role) => *role,
            None => Role::try_from(target.role.as_str())?,
        };
        let new_branch = match cmd.branch_id {
            Some(branch_id) => branch_id,
            None => target.branch_id,
        };
        if new_role == Role::User && new_branch.is_none() {
            return Err(EngineError::MissingBranchAssignment(profile_id.to_string()));
        }

        let mut active: profiles::ActiveModel = target.into();
        if let Some(full_name) = cmd.full_name {
            active.full_name = ActiveValue::Set(full_name);
        }
        if let Some(role) = cmd.role {
            active.role = ActiveValue::Set(role.as_str().to_string());
        }
        if let Some(branch_id) = cmd.branch_id {
            active.branch_id = ActiveValue::Set(branch_id);
        }
        active.update(&self.database).await.map_err(Into::into)
    }
}
