//! Client for the external transaction-mirror service.
//!
//! The mirror is an append-only ledger reached over HTTP. It has no schema
//! relationship with the primary store: entries are scoped by a synthetic
//! tenant key (`"{org_id}-{branch_id}"`) and carry their own ids. The store
//! treats every call here as best-effort.

use async_trait::async_trait;

pub use client::MirrorClient;
pub use error::MirrorError;
pub use types::{MirrorEntry, MirrorEntryKind, MirrorHealth, MirrorSummary, NewMirrorEntry};

mod client;
mod error;
mod types;

pub type ResultMirror<T> = Result<T, MirrorError>;

/// Operations the mirror service exposes.
///
/// The cashflow store is generic over this trait so tests can substitute an
/// in-memory ledger for the HTTP client.
#[async_trait]
pub trait LedgerMirror: Send + Sync {
    /// Probe the service.
    async fn health(&self) -> ResultMirror<MirrorHealth>;

    /// List every entry the service holds.
    async fn list(&self) -> ResultMirror<Vec<MirrorEntry>>;

    /// List entries for one synthetic tenant key.
    async fn list_for_sme(&self, sme_id: &str) -> ResultMirror<Vec<MirrorEntry>>;

    /// Append an entry, returning it with the id the service assigned.
    async fn create(&self, entry: &NewMirrorEntry) -> ResultMirror<MirrorEntry>;

    /// Delete an entry by its mirror-side id.
    async fn delete(&self, id: &str) -> ResultMirror<()>;

    /// Aggregate totals for one synthetic tenant key.
    async fn summary(&self, sme_id: &str) -> ResultMirror<MirrorSummary>;
}
