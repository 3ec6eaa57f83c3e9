pub use commands::{NewCashflowCmd, UpdateCashflowCmd, UpdateProfileCmd};
pub use error::EngineError;
pub use ops::{
    AddOutcome, CashflowStore, CashflowStoreBuilder, DeleteOutcome, MirrorOutcome, UpdateOutcome,
};
pub use profiles::{ProfileScope, Role, resolve_profile};
pub use records::{CashflowRecord, EntryKind, RecordId, normalize_date};

pub mod branches;
mod commands;
pub mod dashboard;
mod error;
pub mod expense;
pub mod income;
mod ops;
pub mod organizations;
pub mod profiles;
mod records;

type ResultEngine<T> = Result<T, EngineError>;
