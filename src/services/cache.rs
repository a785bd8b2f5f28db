use crate::models::{MenuEntry, UserProfile};
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with snapshot cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to encode {snapshot} snapshot: {source}")]
    Encode {
        snapshot: Snapshot,
        source: serde_json::Error,
    },

    #[error("Stored {snapshot} snapshot is unreadable: {source}")]
    Decode {
        snapshot: Snapshot,
        source: serde_json::Error,
    },
}

/// Backend datasets kept in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Snapshot {
    Catalog,
    Roster,
}

impl Snapshot {
    pub const ALL: [Snapshot; 2] = [Snapshot::Catalog, Snapshot::Roster];

    /// Redis key, kept under the `stall:snapshot:` namespace
    pub fn key(self) -> &'static str {
        match self {
            Snapshot::Catalog => "stall:snapshot:catalog",
            Snapshot::Roster => "stall:snapshot:roster",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Snapshot::Catalog => "catalog",
            Snapshot::Roster => "roster",
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
enum Rows {
    Catalog(Arc<Vec<MenuEntry>>),
    Roster(Arc<Vec<UserProfile>>),
}

#[derive(Clone)]
struct L1Entry {
    stored_at: DateTime<Utc>,
    rows: Rows,
}

/// Row types that make up a snapshot
trait SnapshotRows: Serialize + DeserializeOwned + Send + Sync + 'static {
    const SNAPSHOT: Snapshot;

    fn wrap(rows: Arc<Vec<Self>>) -> Rows;

    fn take(rows: Rows) -> Option<Arc<Vec<Self>>>;
}

impl SnapshotRows for MenuEntry {
    const SNAPSHOT: Snapshot = Snapshot::Catalog;

    fn wrap(rows: Arc<Vec<Self>>) -> Rows {
        Rows::Catalog(rows)
    }

    fn take(rows: Rows) -> Option<Arc<Vec<Self>>> {
        match rows {
            Rows::Catalog(rows) => Some(rows),
            Rows::Roster(_) => None,
        }
    }
}

impl SnapshotRows for UserProfile {
    const SNAPSHOT: Snapshot = Snapshot::Roster;

    fn wrap(rows: Arc<Vec<Self>>) -> Rows {
        Rows::Roster(rows)
    }

    fn take(rows: Rows) -> Option<Arc<Vec<Self>>> {
        match rows {
            Rows::Roster(rows) => Some(rows),
            Rows::Catalog(_) => None,
        }
    }
}

/// Redis payload: the rows plus when they were taken from the backend
#[derive(Serialize)]
struct StoredRef<'a, T> {
    stored_at: DateTime<Utc>,
    rows: &'a [T],
}

#[derive(Deserialize)]
struct Stored<T> {
    stored_at: DateTime<Utc>,
    rows: Vec<T>,
}

/// Whether a snapshot stored at `stored_at` is still inside the TTL at `now`
fn within_ttl(stored_at: DateTime<Utc>, now: DateTime<Utc>, ttl_secs: u64) -> bool {
    match u64::try_from(now.signed_duration_since(stored_at).num_milliseconds()) {
        Ok(age_ms) => age_ms < ttl_secs.saturating_mul(1000),
        // Written by an instance whose clock runs ahead of ours
        Err(_) => true,
    }
}

/// Two-tier snapshot cache
///
/// L1 holds decoded rows in process, L2 is Redis and shared across
/// instances. Every snapshot carries the time it was stored, and a copy
/// promoted from L2 into L1 keeps that time, so a backend edit shows up
/// at most one TTL later on every instance.
pub struct CacheManager {
    redis: Option<ConnectionManager>,
    l1: moka::future::Cache<Snapshot, L1Entry>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Connect to Redis and build both tiers
    pub async fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let shared = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(shared),
            ..Self::local(ttl_secs)
        })
    }

    /// In-process tier only, for single instance deployments
    pub fn local(ttl_secs: u64) -> Self {
        let l1 = moka::future::CacheBuilder::new(Snapshot::ALL.len() as u64)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1,
            ttl_secs,
        }
    }

    pub async fn get_catalog(&self) -> Result<Option<Arc<Vec<MenuEntry>>>, CacheError> {
        self.load().await
    }

    pub async fn set_catalog(&self, rows: Arc<Vec<MenuEntry>>) -> Result<(), CacheError> {
        self.store(rows).await
    }

    pub async fn get_roster(&self) -> Result<Option<Arc<Vec<UserProfile>>>, CacheError> {
        self.load().await
    }

    pub async fn set_roster(&self, rows: Arc<Vec<UserProfile>>) -> Result<(), CacheError> {
        self.store(rows).await
    }

    /// Drop the given snapshots from both tiers
    pub async fn invalidate(&self, snapshots: &[Snapshot]) -> Result<(), CacheError> {
        for snapshot in snapshots {
            self.l1.invalidate(snapshot).await;
        }

        if let Some(shared) = &self.redis {
            let keys: Vec<&str> = snapshots.iter().map(|s| s.key()).collect();
            if !keys.is_empty() {
                let mut conn = shared.clone();
                let _: () = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
            }
        }

        tracing::debug!("Invalidated {} snapshot(s)", snapshots.len());
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_entries: self.l1.entry_count(),
            shared: self.redis.is_some(),
            ttl_secs: self.ttl_secs,
        }
    }

    async fn load<T: SnapshotRows>(&self) -> Result<Option<Arc<Vec<T>>>, CacheError> {
        let snapshot = T::SNAPSHOT;
        let now = Utc::now();

        if let Some(entry) = self.l1.get(&snapshot).await {
            if within_ttl(entry.stored_at, now, self.ttl_secs) {
                if let Some(rows) = T::take(entry.rows) {
                    tracing::trace!("L1 hit for {} snapshot", snapshot);
                    return Ok(Some(rows));
                }
            }
            self.l1.invalidate(&snapshot).await;
        }

        let Some(shared) = &self.redis else {
            return Ok(None);
        };

        let mut conn = shared.clone();
        let json: Option<String> = redis::cmd("GET")
            .arg(snapshot.key())
            .query_async(&mut conn)
            .await?;

        let Some(json) = json else {
            tracing::trace!("Cache miss for {} snapshot", snapshot);
            return Ok(None);
        };

        let stored: Stored<T> = serde_json::from_str(&json)
            .map_err(|source| CacheError::Decode { snapshot, source })?;

        tracing::debug!(
            "L2 hit for {} snapshot ({} rows, stored {}s ago)",
            snapshot,
            stored.rows.len(),
            now.signed_duration_since(stored.stored_at).num_seconds()
        );

        let rows = Arc::new(stored.rows);
        self.l1
            .insert(
                snapshot,
                L1Entry {
                    stored_at: stored.stored_at,
                    rows: T::wrap(Arc::clone(&rows)),
                },
            )
            .await;

        Ok(Some(rows))
    }

    async fn store<T: SnapshotRows>(&self, rows: Arc<Vec<T>>) -> Result<(), CacheError> {
        let snapshot = T::SNAPSHOT;
        let stored_at = Utc::now();

        let json = serde_json::to_string(&StoredRef {
            stored_at,
            rows: rows.as_slice(),
        })
        .map_err(|source| CacheError::Encode { snapshot, source })?;

        let count = rows.len();
        self.l1
            .insert(
                snapshot,
                L1Entry {
                    stored_at,
                    rows: T::wrap(rows),
                },
            )
            .await;

        if let Some(shared) = &self.redis {
            let mut conn = shared.clone();
            let _: () = redis::cmd("SETEX")
                .arg(snapshot.key())
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut conn)
                .await?;
        }

        tracing::trace!("Stored {} snapshot ({} rows)", snapshot, count);
        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_entries: u64,
    pub shared: bool,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StallSummary;

    fn entry(id: &str) -> MenuEntry {
        MenuEntry {
            id: id.to_string(),
            name: None,
            price: 4.0,
            rating: Some(4.0),
            dietary_tags: None,
            image_url: None,
            stall: StallSummary {
                id: "s1".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_snapshot_keys_are_namespaced() {
        assert_eq!(Snapshot::Catalog.key(), "stall:snapshot:catalog");
        assert_eq!(Snapshot::Roster.key(), "stall:snapshot:roster");
        assert!(Snapshot::ALL.iter().all(|s| s.key().starts_with("stall:snapshot:")));
        assert_eq!(Snapshot::Roster.to_string(), "roster");
    }

    #[test]
    fn test_within_ttl() {
        let stored_at = Utc::now();

        assert!(within_ttl(stored_at, stored_at, 60));
        assert!(within_ttl(stored_at, stored_at + chrono::Duration::seconds(59), 60));
        assert!(!within_ttl(stored_at, stored_at + chrono::Duration::seconds(60), 60));
        assert!(within_ttl(stored_at, stored_at - chrono::Duration::seconds(5), 60));
        assert!(!within_ttl(stored_at, stored_at, 0));
    }

    #[test]
    fn test_rows_keep_their_snapshot() {
        let catalog = MenuEntry::wrap(Arc::new(vec![entry("m1")]));

        assert!(UserProfile::take(catalog.clone()).is_none());
        assert_eq!(MenuEntry::take(catalog).map(|rows| rows.len()), Some(1));
    }

    #[tokio::test]
    async fn test_local_catalog_set_get_invalidate() {
        let cache = CacheManager::local(60);
        assert!(cache.get_catalog().await.unwrap().is_none());

        cache
            .set_catalog(Arc::new(vec![entry("m1"), entry("m2")]))
            .await
            .unwrap();

        let cached = cache.get_catalog().await.unwrap().unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cache.get_roster().await.unwrap().is_none());
        assert!(!cache.stats().shared);

        cache.invalidate(&[Snapshot::Catalog]).await.unwrap();
        assert!(cache.get_catalog().await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_shared_tier_round_trip() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 60)
            .await
            .expect("Failed to create cache");

        cache.set_catalog(Arc::new(vec![entry("m1")])).await.unwrap();

        // A second instance sees the catalog through Redis
        let other = CacheManager::new("redis://127.0.0.1:6379", 60)
            .await
            .expect("Failed to create cache");
        let cached = other.get_catalog().await.unwrap().unwrap();
        assert_eq!(cached[0].id, "m1");

        other.invalidate(&Snapshot::ALL).await.unwrap();
        cache.invalidate(&Snapshot::ALL).await.unwrap();
        assert!(other.get_catalog().await.unwrap().is_none());
    }
}
