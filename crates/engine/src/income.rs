//! Income transactions table.
//!
//! One of the two disjoint physical tables behind the unified record view.
//! `created_at` is nullable: rows written by older clients may carry no
//! timestamp, and the mapper substitutes the current instant.
//! `cashflow_link_id` holds the mirror entry id once a mirror write for the
//! row has succeeded.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "income_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub branch_id: Option<i32>,
    pub user_id: String,
    pub org_id: Option<String>,
    pub created_at: Option<DateTimeUtc>,
    pub amount: i64,
    pub income_type: String,
    pub cashflow_link_id: Option<String>,
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
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
