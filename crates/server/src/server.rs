use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use mirror::MirrorClient;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{SessionRegistry, admin, audit, cashflow, statistics};
use engine::profiles;

static PROFILE_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("profile-id");

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub mirror: MirrorClient,
    pub sessions: SessionRegistry,
}

/// `TypedHeader` carrying the externally-authenticated subject id.
///
/// Authentication itself is delegated to the upstream provider; requests
/// reaching this server present the authenticated profile id in the
/// "profile-id" header and the middleware resolves it to a profile row.
#[derive(Debug)]
struct ProfileHeader(String);

impl Header for ProfileHeader {
    fn name() -> &'static axum::http::HeaderName {
        &PROFILE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(ProfileHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode profile-id header"),
        }
    }
}

async fn auth(
    profile_header: Option<TypedHeader<ProfileHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(ProfileHeader(profile_id))) = profile_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let profile: Option<profiles::Model> = profiles::Entity::find_by_id(profile_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(profile) = profile else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(profile);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/cashflows", get(cashflow::list).post(cashflow::create))
        .route(
            "/cashflows/{id}",
            patch(cashflow::update).delete(cashflow::remove),
        )
        .route("/stats", get(statistics::get_stats))
        .route("/audit", get(audit::list))
        .route("/audit/summary", get(audit::summary))
        .route("/audit/health", get(audit::health))
        .route("/organizations", post(admin::create_organization))
        .route(
            "/branches",
            get(admin::list_branches).post(admin::create_branch),
        )
        .route("/profiles", get(admin::list_profiles))
        .route("/profiles/{id}", patch(admin::update_profile))
        .route("/session", delete(admin::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(db: DatabaseConnection, mirror: MirrorClient) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(db, mirror, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    mirror: MirrorClient,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        db,
        mirror,
        sessions: SessionRegistry::new(),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    db: DatabaseConnection,
    mirror: MirrorClient,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(db, mirror, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
