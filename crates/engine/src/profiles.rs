//! Profiles table and the profile resolver.
//!
//! Profiles are created by the external signup flow; this crate reads them
//! to scope every operation and mutates them only through the admin
//! operations. A `user`-role profile must always carry a branch assignment;
//! an `admin` profile need not.

use sea_orm::{ConnectionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub branch_id: Option<i32>,
    pub org_id: Option<String>,
    pub role: String,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Branches,
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrgId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Organizations,
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Role of a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(EngineError::InvalidInput(format!("invalid role: {other}"))),
        }
    }
}

/// The scope every store operation runs under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileScope {
    pub user_id: String,
    pub role: Role,
    pub org_id: Option<String>,
    pub branch_id: Option<i32>,
}

impl ProfileScope {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Synthetic tenant key scoping mirror entries (`"{org_id}-{branch_id}"`).
    ///
    /// The mirror has no native org/branch schema, so both parts must be
    /// present for a key to exist.
    pub fn sme_key(&self) -> Option<String> {
        match (&self.org_id, self.branch_id) {
            (Some(org_id), Some(branch_id)) => Some(format!("{org_id}-{branch_id}")),
            _ => None,
        }
    }
}

/// Resolves an authenticated identity to its operating scope.
pub async fn resolve_profile<C: ConnectionTrait>(
    db: &C,
    identity: Option<&str>,
) -> ResultEngine<ProfileScope> {
    let Some(identity) = identity else {
        return Err(EngineError::NotAuthenticated);
    };

    let model = Entity::find_by_id(identity.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::ProfileNotFound(identity.to_string()))?;

    let role = Role::try_from(model.role.as_str())?;
    if role != Role::Admin && model.branch_id.is_none() {
        return Err(EngineError::MissingBranchAssignment(identity.to_string()));
    }

    Ok(ProfileScope {
        user_id: model.id,
        role,
        org_id: model.org_id,
        branch_id: model.branch_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::try_from("admin").unwrap(), Role::Admin);
        assert_eq!(Role::try_from("user").unwrap(), Role::User);
        assert_eq!(Role::Admin.as_str(), "admin");
        assert!(Role::try_from("owner").is_err());
    }

    #[test]
    fn sme_key_requires_both_parts() {
        let mut scope = ProfileScope {
            user_id: "p-1".to_string(),
            role: Role::User,
            org_id: Some("org-1".to_string()),
            branch_id: Some(4),
        };
        assert_eq!(scope.sme_key().as_deref(), Some("org-1-4"));

        scope.branch_id = None;
        assert_eq!(scope.sme_key(), None);

        scope.branch_id = Some(4);
        scope.org_id = None;
        assert_eq!(scope.sme_key(), None);
    }
}
