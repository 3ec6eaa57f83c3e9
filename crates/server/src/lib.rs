use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use mirror::MirrorError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};
pub use sessions::SessionRegistry;

mod admin;
mod audit;
mod cashflow;
mod server;
mod sessions;
mod statistics;

pub mod types {
    pub mod cashflow {
        pub use api_types::cashflow::{
            CashflowListResponse, CashflowNew, CashflowUpdate, CashflowView, CashflowWritten,
            Kind, MirrorStatus,
        };
    }

    pub mod profile {
        pub use api_types::profile::{ProfileUpdate, ProfileView, Role};
    }

    pub mod org {
        pub use api_types::org::{OrganizationNew, OrganizationView};
    }

    pub mod branch {
        pub use api_types::branch::{BranchNew, BranchView};
    }

    pub mod stats {
        pub use api_types::stats::{CategoryTotal, DashboardSummary};
    }

    pub mod audit {
        pub use api_types::audit::{AuditEntryView, AuditHealth, AuditSummary};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Mirror(MirrorError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::ProfileNotFound(_) | EngineError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::MissingBranchAssignment(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_mirror_error(err: &MirrorError) -> StatusCode {
    match err {
        MirrorError::NotFound => StatusCode::NOT_FOUND,
        MirrorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MirrorError::Server(_) | MirrorError::Transport(_) | MirrorError::InvalidBaseUrl(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Mirror(err) => (status_for_mirror_error(&err), err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<MirrorError> for ServerError {
    fn from(value: MirrorError) -> Self {
        Self::Mirror(value)
    }
}
