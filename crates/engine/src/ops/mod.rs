//! The cashflow store: session-scoped orchestration over the primary store
//! and the ledger mirror.
//!
//! One store exists per logged-in session. It owns the session's view of
//! the record list plus the last observed error; nothing here is process
//! global. Every operation resolves the profile first, mutates the primary
//! store, then attempts the mirror write. Mirror failures are contained:
//! they are logged, reported in the operation's [`MirrorOutcome`], and never
//! fail or roll back the primary operation.

use mirror::LedgerMirror;
use sea_orm::DatabaseConnection;

use crate::{CashflowRecord, ProfileScope, ResultEngine, Role, profiles};

mod admin;
mod fetch;
mod reconcile;
mod write;

/// What happened on the mirror side of a write operation.
///
/// The mirror and the primary store are allowed to diverge; this makes the
/// divergence observable instead of silent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The mirror reflects the primary change; `entry_id` is the entry
    /// created (add/update) or removed (delete).
    Mirrored { entry_id: String },
    /// The mirror step did not run; the reason says why.
    Skipped { reason: String },
    /// The mirror call failed; the primary operation still succeeded.
    Failed { error: String },
}

/// Result of [`CashflowStore::add`].
#[derive(Clone, Debug, PartialEq)]
pub struct AddOutcome {
    pub record: CashflowRecord,
    pub mirror: MirrorOutcome,
}

/// Result of [`CashflowStore::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOutcome {
    pub record: CashflowRecord,
    pub mirror: MirrorOutcome,
}

/// Result of [`CashflowStore::delete`]; `record` is the removed record.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteOutcome {
    pub record: CashflowRecord,
    pub mirror: MirrorOutcome,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) records: Vec<CashflowRecord>,
    pub(crate) role: Option<Role>,
    pub(crate) last_error: Option<String>,
}

/// Session-scoped cashflow store.
///
/// Generic over the mirror so tests can substitute an in-memory ledger.
#[derive(Debug)]
pub struct CashflowStore<M> {
    pub(crate) database: DatabaseConnection,
    pub(crate) mirror: M,
    pub(crate) identity: Option<String>,
    pub(crate) state: SessionState,
}

impl<M> CashflowStore<M> {
    /// Return a builder for `CashflowStore`.
    pub fn builder(database: DatabaseConnection, mirror: M) -> CashflowStoreBuilder<M> {
        CashflowStoreBuilder {
            database,
            mirror,
            identity: None,
        }
    }

    /// The session's current view of the record list (most recent first).
    pub fn records(&self) -> &[CashflowRecord] {
        &self.state.records
    }

    /// Role resolved by the last successful fetch.
    pub fn role(&self) -> Option<Role> {
        self.state.role
    }

    /// Last observed error, kept for passive UI consumption. Cleared by the
    /// next successful fetch.
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    /// Records a failed result into `last_error` on its way out.
    pub(crate) fn observe<T>(&mut self, result: ResultEngine<T>) -> ResultEngine<T> {
        if let Err(err) = &result {
            self.state.last_error = Some(err.to_string());
        }
        result
    }
}

impl<M: LedgerMirror> CashflowStore<M> {
    pub(crate) async fn scope(&self) -> ResultEngine<ProfileScope> {
        profiles::resolve_profile(&self.database, self.identity.as_deref()).await
    }
}

/// The builder for `CashflowStore`.
pub struct CashflowStoreBuilder<M> {
    database: DatabaseConnection,
    mirror: M,
    identity: Option<String>,
}

impl<M> CashflowStoreBuilder<M> {
    /// The authenticated identity this session runs as. Leaving it unset
    /// makes every operation fail with `NotAuthenticated`.
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Construct the store.
    pub fn build(self) -> CashflowStore<M> {
        CashflowStore {
            database: self.database,
            mirror: self.mirror,
            identity: self.identity,
            state: SessionState::default(),
        }
    }
}
