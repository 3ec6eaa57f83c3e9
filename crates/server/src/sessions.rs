//! Per-profile session registry.
//!
//! Each logged-in profile gets one [`CashflowStore`], created lazily at
//! first use and removed at logout. The store owns the session's in-memory
//! record list, so it must be shared across that profile's requests and
//! torn down when the session ends.

use std::collections::HashMap;
use std::sync::Arc;

use engine::CashflowStore;
use mirror::MirrorClient;
use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, RwLock};

pub type SharedStore = Arc<Mutex<CashflowStore<MirrorClient>>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, SharedStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the profile's store, creating it on first use.
    pub async fn store_for(
        &self,
        db: &DatabaseConnection,
        mirror: &MirrorClient,
        profile_id: &str,
    ) -> SharedStore {
        {
            let sessions = self.inner.read().await;
            if let Some(store) = sessions.get(profile_id) {
                return store.clone();
            }
        }

        let mut sessions = self.inner.write().await;
        sessions
            .entry(profile_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(
                    CashflowStore::builder(db.clone(), mirror.clone())
                        .identity(profile_id)
                        .build(),
                ))
            })
            .clone()
    }

    /// Tears down the profile's session. Returns whether one existed.
    pub async fn remove(&self, profile_id: &str) -> bool {
        self.inner.write().await.remove(profile_id).is_some()
    }
}
