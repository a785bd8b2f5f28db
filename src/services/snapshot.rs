use crate::models::{MenuEntry, UserProfile};
use crate::services::{BackendClient, BackendError, CacheError, CacheManager, Snapshot};
use std::sync::Arc;

/// Read side of the service: backend reads behind the snapshot cache
///
/// The catalog and the profile roster are served from cache when possible.
/// A caller's own profile is always read fresh, since it carries the saved
/// ids and restrictions the filters depend on.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<BackendClient>,
    cache: Arc<CacheManager>,
}

impl SnapshotStore {
    pub fn new(backend: Arc<BackendClient>, cache: Arc<CacheManager>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Menu catalog with stalls embedded
    pub async fn catalog(&self) -> Result<Arc<Vec<MenuEntry>>, BackendError> {
        match self.cache.get_catalog().await {
            Ok(Some(rows)) => return Ok(rows),
            Ok(None) => {}
            Err(e) => tracing::warn!("Catalog cache read failed, falling back to backend: {}", e),
        }

        let rows = Arc::new(self.backend.fetch_catalog().await?);

        if let Err(e) = self.cache.set_catalog(Arc::clone(&rows)).await {
            tracing::warn!("Failed to cache catalog: {}", e);
        }

        Ok(rows)
    }

    /// Every user profile, used as the peer roster
    pub async fn roster(&self) -> Result<Arc<Vec<UserProfile>>, BackendError> {
        match self.cache.get_roster().await {
            Ok(Some(rows)) => return Ok(rows),
            Ok(None) => {}
            Err(e) => tracing::warn!("Roster cache read failed, falling back to backend: {}", e),
        }

        let rows = Arc::new(self.backend.list_profiles().await?);

        if let Err(e) = self.cache.set_roster(Arc::clone(&rows)).await {
            tracing::warn!("Failed to cache roster: {}", e);
        }

        Ok(rows)
    }

    /// A single profile, uncached
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        self.backend.get_profile(user_id).await
    }

    /// Drop the given snapshots so the next read goes to the backend
    pub async fn refresh(&self, snapshots: &[Snapshot]) -> Result<(), CacheError> {
        self.cache.invalidate(snapshots).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BackendTables;
    use mockito::Matcher;

    fn store_for(url: String) -> SnapshotStore {
        let tables = BackendTables {
            menus: "menus".to_string(),
            stalls: "stalls".to_string(),
            profiles: "profiles".to_string(),
        };
        let backend = BackendClient::new(url, "test_key".to_string(), 5, tables).unwrap();
        SnapshotStore::new(Arc::new(backend), Arc::new(CacheManager::local(60)))
    }

    #[tokio::test]
    async fn test_roster_cached_until_refresh() {
        let mut server = mockito::Server::new_async().await;
        let roster = server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"id": 1, "saved_menu_ids": [4]}, {"id": 2}]"#)
            .expect(2)
            .create_async()
            .await;

        let store = store_for(server.url());

        let first = store.roster().await.unwrap();
        let second = store.roster().await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));

        // Refreshing the catalog leaves the roster alone
        store.refresh(&[Snapshot::Catalog]).await.unwrap();
        store.roster().await.unwrap();

        store.refresh(&Snapshot::ALL).await.unwrap();
        let reloaded = store.roster().await.unwrap();
        assert_eq!(reloaded[0].id, "1");

        roster.assert_async().await;
    }

    #[tokio::test]
    async fn test_profile_is_never_cached() {
        let mut server = mockito::Server::new_async().await;
        let profile = server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.u1".into()))
            .with_status(200)
            .with_body(r#"[{"id": "u1"}]"#)
            .expect(2)
            .create_async()
            .await;

        let store = store_for(server.url());
        store.profile("u1").await.unwrap();
        store.profile("u1").await.unwrap();

        profile.assert_async().await;
    }
}
