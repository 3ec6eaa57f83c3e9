use mirror::LedgerMirror;
use sea_orm::{ActiveValue, EntityTrait, entity::prelude::*};

use crate::{
    CashflowRecord, EngineError, EntryKind, NewCashflowCmd, RecordId, ResultEngine,
    UpdateCashflowCmd, expense, income, records::normalize_date,
};

use super::{AddOutcome, CashflowStore, DeleteOutcome, UpdateOutcome};

impl<M: LedgerMirror> CashflowStore<M> {
    /// Creates a record in the category-appropriate table, then mirrors it
    /// best-effort.
    ///
    /// The new record is prepended to the session's list; no re-fetch
    /// happens. A mirror failure is reported in the outcome but never fails
    /// the operation or rolls back the insert.
    pub async fn add(&mut self, cmd: NewCashflowCmd) -> ResultEngine<AddOutcome> {
        let result = self.add_inner(cmd).await;
        self.observe(result)
    }

    async fn add_inner(&mut self, cmd: NewCashflowCmd) -> ResultEngine<AddOutcome> {
        let scope = self.scope().await?;
        let created_at = normalize_date(cmd.date.as_deref());

        let record = match cmd.kind {
            EntryKind::Income => {
                // The income table has no description column; any provided
                // description is dropped here.
                let row = income::ActiveModel {
                    branch_id: ActiveValue::Set(scope.branch_id),
                    user_id: ActiveValue::Set(scope.user_id.clone()),
                    org_id: ActiveValue::Set(scope.org_id.clone()),
                    created_at: ActiveValue::Set(Some(created_at)),
                    amount: ActiveValue::Set(cmd.amount),
                    income_type: ActiveValue::Set(cmd.name.clone()),
                    cashflow_link_id: ActiveValue::Set(None),
                    ..Default::default()
                }
                .insert(&self.database)
                .await?;
                CashflowRecord::from_income_row(&row)
            }
            EntryKind::Expense => {
                let row = expense::ActiveModel {
                    branch_id: ActiveValue::Set(scope.branch_id),
                    user_id: ActiveValue::Set(scope.user_id.clone()),
                    org_id: ActiveValue::Set(scope.org_id.clone()),
                    created_at: ActiveValue::Set(Some(created_at)),
                    amount: ActiveValue::Set(cmd.amount),
                    expense_category: ActiveValue::Set(cmd.name.clone()),
                    description: ActiveValue::Set(cmd.description.clone()),
                    cashflow_link_id: ActiveValue::Set(None),
                    ..Default::default()
                }
                .insert(&self.database)
                .await?;
                CashflowRecord::from_expense_row(&row)
            }
        };

        let (record, mirror) = self.mirror_add(&scope, record).await;
        self.state.records.insert(0, record.clone());
        Ok(AddOutcome { record, mirror })
    }

    /// Updates a record looked up in the session's in-memory list.
    ///
    /// A mutation from another session is invisible until the next fetch;
    /// an id absent from the list fails with `RecordNotFound` without
    /// touching the backing store. `description` only applies to expense
    /// rows, and `name` maps to the table-specific category column.
    pub async fn update(
        &mut self,
        id: RecordId,
        cmd: UpdateCashflowCmd,
    ) -> ResultEngine<UpdateOutcome> {
        let result = self.update_inner(id, cmd).await;
        self.observe(result)
    }

    async fn update_inner(
        &mut self,
        id: RecordId,
        cmd: UpdateCashflowCmd,
    ) -> ResultEngine<UpdateOutcome> {
        let scope = self.scope().await?;
        let previous = self
            .state
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| EngineError::RecordNotFound(id.to_string()))?;

        // A payload touching no column of the underlying table issues no
        // UPDATE at all.
        let updated = match id.kind {
            EntryKind::Income => {
                let mut row = income::ActiveModel {
                    id: ActiveValue::Set(id.source_id),
                    ..Default::default()
                };
                let mut dirty = false;
                if let Some(amount) = cmd.amount {
                    row.amount = ActiveValue::Set(amount);
                    dirty = true;
                }
                if let Some(date) = cmd.date.as_deref() {
                    row.created_at = ActiveValue::Set(Some(normalize_date(Some(date))));
                    dirty = true;
                }
                if let Some(name) = cmd.name.clone() {
                    row.income_type = ActiveValue::Set(name);
                    dirty = true;
                }
                // No description column on this table; the field is
                // stripped from the payload.
                if dirty {
                    let row = row.update(&self.database).await?;
                    CashflowRecord::from_income_row(&row)
                } else {
                    previous.clone()
                }
            }
            EntryKind::Expense => {
                let mut row = expense::ActiveModel {
                    id: ActiveValue::Set(id.source_id),
                    ..Default::default()
                };
                let mut dirty = false;
                if let Some(amount) = cmd.amount {
                    row.amount = ActiveValue::Set(amount);
                    dirty = true;
                }
                if let Some(date) = cmd.date.as_deref() {
                    row.created_at = ActiveValue::Set(Some(normalize_date(Some(date))));
                    dirty = true;
                }
                if let Some(name) = cmd.name.clone() {
                    row.expense_category = ActiveValue::Set(name);
                    dirty = true;
                }
                if let Some(description) = cmd.description.clone() {
                    row.description = ActiveValue::Set(Some(description));
                    dirty = true;
                }
                if dirty {
                    let row = row.update(&self.database).await?;
                    CashflowRecord::from_expense_row(&row)
                } else {
                    previous.clone()
                }
            }
        };

        let (updated, mirror) = self.mirror_update(&scope, &previous, updated).await;
        if let Some(slot) = self.state.records.iter_mut().find(|record| record.id == id) {
            *slot = updated.clone();
        }
        Ok(UpdateOutcome {
            record: updated,
            mirror,
        })
    }

    /// Deletes a record looked up in the session's in-memory list.
    ///
    /// Same staleness contract as `update`. The mirror entry, when one can
    /// be located, is removed best-effort.
    pub async fn delete(&mut self, id: RecordId) -> ResultEngine<DeleteOutcome> {
        let result = self.delete_inner(id).await;
        self.observe(result)
    }

    async fn delete_inner(&mut self, id: RecordId) -> ResultEngine<DeleteOutcome> {
        self.scope().await?;
        let existing = self
            .state
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| EngineError::RecordNotFound(id.to_string()))?;

        match id.kind {
            EntryKind::Income => {
                income::Entity::delete_by_id(id.source_id)
                    .exec(&self.database)
                    .await?;
            }
            EntryKind::Expense => {
                expense::Entity::delete_by_id(id.source_id)
                    .exec(&self.database)
                    .await?;
            }
        }

        let mirror = self.mirror_remove(&existing).await;
        self.state.records.retain(|record| record.id != id);
        Ok(DeleteOutcome {
            record: existing,
            mirror,
        })
    }
}
