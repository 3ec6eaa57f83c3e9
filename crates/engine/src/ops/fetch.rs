use mirror::LedgerMirror;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

use crate::{CashflowRecord, ProfileScope, ResultEngine, Role, expense, income};

use super::CashflowStore;

/// Applies the role scope filter to a table query.
///
/// Admins see their whole organization; users see their branch. Equality is
/// value-faithful: an admin with no organization matches records with none.
fn scoped<E: EntityTrait>(
    query: Select<E>,
    scope: &ProfileScope,
    org_col: impl ColumnTrait,
    branch_col: impl ColumnTrait,
) -> Select<E> {
    if scope.is_admin() {
        match &scope.org_id {
            Some(org_id) => query.filter(org_col.eq(org_id.clone())),
            None => query.filter(org_col.is_null()),
        }
    } else {
        match scope.branch_id {
            Some(branch_id) => query.filter(branch_col.eq(branch_id)),
            // Unreachable for resolved profiles; kept as an empty scope.
            None => query.filter(branch_col.is_null()),
        }
    }
}

impl<M: LedgerMirror> CashflowStore<M> {
    /// Fetches the session's role-scoped records from both tables.
    ///
    /// The two table queries run concurrently and both must succeed; a
    /// failure of either empties the record list, keeps the error message
    /// observable, and propagates. The merged list is sorted by date
    /// descending with the record id as deterministic tiebreaker.
    pub async fn fetch(&mut self) -> ResultEngine<&[CashflowRecord]> {
        match self.fetch_inner().await {
            Ok((records, role)) => {
                self.state.records = records;
                self.state.role = Some(role);
                self.state.last_error = None;
                Ok(&self.state.records)
            }
            Err(err) => {
                self.state.records.clear();
                self.state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_inner(&self) -> ResultEngine<(Vec<CashflowRecord>, Role)> {
        let scope = self.scope().await?;

        let income_query = scoped(
            income::Entity::find(),
            &scope,
            income::Column::OrgId,
            income::Column::BranchId,
        );
        let expense_query = scoped(
            expense::Entity::find(),
            &scope,
            expense::Column::OrgId,
            expense::Column::BranchId,
        );

        // Fire both, wait for both; no partial results are kept.
        let (income_rows, expense_rows) = tokio::try_join!(
            income_query.all(&self.database),
            expense_query.all(&self.database),
        )?;

        let mut records: Vec<CashflowRecord> = income_rows
            .iter()
            .map(CashflowRecord::from_income_row)
            .chain(expense_rows.iter().map(CashflowRecord::from_expense_row))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        Ok((records, scope.role))
    }
}
