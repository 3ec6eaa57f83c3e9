//! Expense transactions table.
//!
//! The expense side of the unified record view. Unlike income rows, expense
//! rows carry a free-form `description`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub branch_id: Option<i32>,
    pub user_id: String,
    pub org_id: Option<String>,
    pub created_at: Option<DateTimeUtc>,
    pub amount: i64,
    pub expense_category: String,
    pub description: Option<String>,
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
