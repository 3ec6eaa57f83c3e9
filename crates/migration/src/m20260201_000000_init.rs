//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for flowledger:
//!
//! - `organizations`: tenants created at registration
//! - `branches`: locations of an organization
//! - `profiles`: identities resolved from the external auth provider
//! - `income_transactions`: income side of the cashflow ledger
//! - `expense_transactions`: expense side of the cashflow ledger
//!
//! `created_at` on the two transaction tables is nullable on purpose: rows
//! written by older clients may carry no timestamp and the mapper fills in
//! the current instant. `cashflow_link_id` stores the mirror entry id once
//! a mirror write has succeeded.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Organizations {
    Table,
    Id,
    Name,
    CreatedBy,
}

#[derive(Iden)]
enum Branches {
    Table,
    Id,
    Name,
    Address,
    OrgId,
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    BranchId,
    OrgId,
    Role,
    FullName,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum IncomeTransactions {
    Table,
    Id,
    BranchId,
    UserId,
    OrgId,
    CreatedAt,
    Amount,
    IncomeType,
    CashflowLinkId,
}

#[derive(Iden)]
enum ExpenseTransactions {
    Table,
    Id,
    BranchId,
    UserId,
    OrgId,
    CreatedAt,
    Amount,
    ExpenseCategory,
    Description,
    CashflowLinkId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Organizations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(ColumnDef::new(Organizations::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Branches
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Branches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Branches::Name).string().not_null())
                    .col(ColumnDef::new(Branches::Address).string())
                    .col(ColumnDef::new(Branches::OrgId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-branches-org_id")
                            .from(Branches::Table, Branches::OrgId)
                            .to(Organizations::Table, Organizations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::BranchId).integer())
                    .col(ColumnDef::new(Profiles::OrgId).string())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Profiles::FullName).string().not_null())
                    .col(ColumnDef::new(Profiles::Email).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-profiles-branch_id")
                            .from(Profiles::Table, Profiles::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-profiles-org_id")
                            .from(Profiles::Table, Profiles::OrgId)
                            .to(Organizations::Table, Organizations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profiles-email-unique")
                    .table(Profiles::Table)
                    .col(Profiles::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Income transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(IncomeTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncomeTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IncomeTransactions::BranchId).integer())
                    .col(ColumnDef::new(IncomeTransactions::UserId).string().not_null())
                    .col(ColumnDef::new(IncomeTransactions::OrgId).string())
                    .col(ColumnDef::new(IncomeTransactions::CreatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(IncomeTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeTransactions::IncomeType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncomeTransactions::CashflowLinkId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_transactions-branch_id")
                            .from(IncomeTransactions::Table, IncomeTransactions::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-income_transactions-branch_id")
                    .table(IncomeTransactions::Table)
                    .col(IncomeTransactions::BranchId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseTransactions::BranchId).integer())
                    .col(
                        ColumnDef::new(ExpenseTransactions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseTransactions::OrgId).string())
                    .col(ColumnDef::new(ExpenseTransactions::CreatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ExpenseTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseTransactions::ExpenseCategory)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseTransactions::Description).string())
                    .col(ColumnDef::new(ExpenseTransactions::CashflowLinkId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_transactions-branch_id")
                            .from(ExpenseTransactions::Table, ExpenseTransactions::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_transactions-branch_id")
                    .table(ExpenseTransactions::Table)
                    .col(ExpenseTransactions::BranchId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncomeTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}
