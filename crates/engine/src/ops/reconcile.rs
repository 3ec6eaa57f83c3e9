//! Mirror reconciliation.
//!
//! The primary store and the mirror share no key. Records created here
//! store the mirror entry id in `cashflow_link_id` (a weak back-reference);
//! rows predating that column fall back to value matching on
//! `{amount, name, kind}` against the full mirror list, first match in list
//! order. Everything in this module is best-effort: failures are logged and
//! folded into a [`MirrorOutcome`], never propagated.

use mirror::{LedgerMirror, MirrorEntryKind, MirrorError, NewMirrorEntry};
use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;

use crate::{CashflowRecord, EntryKind, ProfileScope, RecordId, ResultEngine, expense, income};

use super::{CashflowStore, MirrorOutcome};

const NO_BRANCH_SCOPE: &str = "no branch scope";
const NO_MATCHING_ENTRY: &str = "no matching mirror entry";

fn mirror_kind(kind: EntryKind) -> MirrorEntryKind {
    match kind {
        EntryKind::Income => MirrorEntryKind::Income,
        EntryKind::Expense => MirrorEntryKind::Expense,
    }
}

fn mirror_payload(sme_id: String, record: &CashflowRecord) -> NewMirrorEntry {
    NewMirrorEntry {
        sme_id,
        kind: mirror_kind(record.kind()),
        amount: record.amount,
        category: record.name.clone(),
        description: record.description.clone(),
        date: record.date,
    }
}

impl<M: LedgerMirror> CashflowStore<M> {
    /// Mirrors a freshly inserted record and stores the entry id back on
    /// the row.
    pub(super) async fn mirror_add(
        &self,
        scope: &ProfileScope,
        mut record: CashflowRecord,
    ) -> (CashflowRecord, MirrorOutcome) {
        let Some(sme_id) = scope.sme_key() else {
            tracing::warn!(record = %record.id, "skipping mirror write: {NO_BRANCH_SCOPE}");
            return (
                record,
                MirrorOutcome::Skipped {
                    reason: NO_BRANCH_SCOPE.to_string(),
                },
            );
        };

        match self.mirror.create(&mirror_payload(sme_id, &record)).await {
            Ok(created) => {
                record.mirror_link = Some(created.id.clone());
                if let Err(err) = self.store_mirror_link(record.id, Some(&created.id)).await {
                    tracing::warn!(record = %record.id, "failed to persist mirror link: {err}");
                }
                (
                    record,
                    MirrorOutcome::Mirrored {
                        entry_id: created.id,
                    },
                )
            }
            Err(err) => {
                tracing::warn!(record = %record.id, "mirror write failed: {err}");
                (
                    record,
                    MirrorOutcome::Failed {
                        error: err.to_string(),
                    },
                )
            }
        }
    }

    /// Replaces the mirror entry of an updated record: delete the entry
    /// matching the pre-update values, then create one with the post-update
    /// values.
    pub(super) async fn mirror_update(
        &self,
        scope: &ProfileScope,
        previous: &CashflowRecord,
        mut updated: CashflowRecord,
    ) -> (CashflowRecord, MirrorOutcome) {
        let Some(sme_id) = scope.sme_key() else {
            tracing::warn!(record = %updated.id, "skipping mirror update: {NO_BRANCH_SCOPE}");
            return (
                updated,
                MirrorOutcome::Skipped {
                    reason: NO_BRANCH_SCOPE.to_string(),
                },
            );
        };

        let target = match self.locate_mirror_entry(previous).await {
            Ok(Some(entry_id)) => entry_id,
            Ok(None) => {
                tracing::warn!(record = %updated.id, "skipping mirror update: {NO_MATCHING_ENTRY}");
                return (
                    updated,
                    MirrorOutcome::Skipped {
                        reason: NO_MATCHING_ENTRY.to_string(),
                    },
                );
            }
            Err(err) => {
                tracing::warn!(record = %updated.id, "mirror lookup failed: {err}");
                return (
                    updated,
                    MirrorOutcome::Failed {
                        error: err.to_string(),
                    },
                );
            }
        };

        if let Err(err) = self.mirror.delete(&target).await {
            tracing::warn!(record = %updated.id, entry = %target, "mirror delete failed: {err}");
            return (
                updated,
                MirrorOutcome::Failed {
                    error: err.to_string(),
                },
            );
        }

        match self.mirror.create(&mirror_payload(sme_id, &updated)).await {
            Ok(created) => {
                updated.mirror_link = Some(created.id.clone());
                if let Err(err) = self.store_mirror_link(updated.id, Some(&created.id)).await {
                    tracing::warn!(record = %updated.id, "failed to persist mirror link: {err}");
                }
                (
                    updated,
                    MirrorOutcome::Mirrored {
                        entry_id: created.id,
                    },
                )
            }
            Err(err) => {
                // The old entry is already gone; the mirror now misses this
                // record until a later write recreates it.
                tracing::warn!(record = %updated.id, "mirror re-create failed: {err}");
                updated.mirror_link = None;
                if let Err(err) = self.store_mirror_link(updated.id, None).await {
                    tracing::warn!(record = %updated.id, "failed to clear mirror link: {err}");
                }
                (
                    updated,
                    MirrorOutcome::Failed {
                        error: err.to_string(),
                    },
                )
            }
        }
    }

    /// Removes the mirror entry of a deleted record, when one can be
    /// located.
    pub(super) async fn mirror_remove(&self, record: &CashflowRecord) -> MirrorOutcome {
        match self.locate_mirror_entry(record).await {
            Ok(Some(entry_id)) => match self.mirror.delete(&entry_id).await {
                Ok(()) => MirrorOutcome::Mirrored { entry_id },
                Err(err) => {
                    tracing::warn!(record = %record.id, entry = %entry_id, "mirror delete failed: {err}");
                    MirrorOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            },
            Ok(None) => {
                tracing::warn!(record = %record.id, "skipping mirror delete: {NO_MATCHING_ENTRY}");
                MirrorOutcome::Skipped {
                    reason: NO_MATCHING_ENTRY.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(record = %record.id, "mirror lookup failed: {err}");
                MirrorOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Finds the mirror entry belonging to a record.
    ///
    /// The stored link wins. Without one, the full mirror list is searched
    /// for the first entry whose `{amount, category, type}` equals the
    /// record's `{amount, name, kind}`; under duplicates exactly the first
    /// match in list order is chosen, and the ambiguity is logged.
    async fn locate_mirror_entry(
        &self,
        record: &CashflowRecord,
    ) -> Result<Option<String>, MirrorError> {
        if let Some(link) = &record.mirror_link {
            return Ok(Some(link.clone()));
        }

        let entries = self.mirror.list().await?;
        let kind = mirror_kind(record.kind());
        let mut matches = entries
            .iter()
            .filter(|entry| {
                entry.amount == record.amount && entry.category == record.name && entry.kind == kind
            })
            .map(|entry| entry.id.as_str());

        let Some(first) = matches.next() else {
            return Ok(None);
        };
        let ambiguous = matches.count();
        if ambiguous > 0 {
            tracing::warn!(
                record = %record.id,
                chosen = %first,
                also_matching = ambiguous,
                "ambiguous mirror match; taking first in list order"
            );
        }
        Ok(Some(first.to_string()))
    }

    /// Persists (or clears) the weak back-reference on the primary row.
    async fn store_mirror_link(&self, id: RecordId, link: Option<&str>) -> ResultEngine<()> {
        let link = link.map(str::to_string);
        match id.kind {
            EntryKind::Income => {
                income::ActiveModel {
                    id: ActiveValue::Set(id.source_id),
                    cashflow_link_id: ActiveValue::Set(link),
                    ..Default::default()
                }
                .update(&self.database)
                .await?;
            }
            EntryKind::Expense => {
                expense::ActiveModel {
                    id: ActiveValue::Set(id.source_id),
                    cashflow_link_id: ActiveValue::Set(link),
                    ..Default::default()
                }
                .update(&self.database)
                .await?;
            }
        }
        Ok(())
    }
}
