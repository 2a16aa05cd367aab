//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Job records live in an in-memory [`Store`] that keeps insertion order,
//! which is the natural order the list endpoint returns when no sort key is
//! given. When a database pool is configured every write goes to Postgres
//! first and the store is hydrated from it on startup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use jobify_core::Job;
use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store that remembers the order
/// in which keys were first inserted.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points. `parking_lot::RwLock`
/// is non-poisonable, so a panicking writer does not permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<Entries<T>>>,
}

#[derive(Debug)]
struct Entries<T> {
    values: HashMap<Uuid, T>,
    order: Vec<Uuid>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Entries {
                values: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        let mut guard = self.data.write();
        let previous = guard.values.insert(id, value);
        if previous.is_none() {
            guard.order.push(id);
        }
        previous
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().values.get(id).cloned()
    }

    /// List all records in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.list_where(|_| true)
    }

    /// List the records accepted by `keep`, in insertion order.
    ///
    /// Only matching records are cloned.
    pub fn list_where(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let guard = self.data.read();
        guard
            .order
            .iter()
            .filter_map(|id| guard.values.get(id))
            .filter(|value| keep(value))
            .cloned()
            .collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.values.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Replace a record with the value `f` derives from it, under one write
    /// lock. Returns `None` if not found; an `Err` from `f` leaves the record
    /// unchanged.
    pub fn try_update<E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&T) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut guard = self.data.write();
        let entry = guard.values.get_mut(id)?;
        let next = match f(entry) {
            Ok(next) => next,
            Err(e) => return Some(Err(e)),
        };
        *entry = next.clone();
        Some(Ok(next))
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        let mut guard = self.data.write();
        let removed = guard.values.remove(id);
        if removed.is_some() {
            guard.order.retain(|key| key != id);
        }
        removed
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().values.contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().values.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Application State --------------------------------------------------------

/// Port used when `PORT` is unset or unparsable.
pub const DEFAULT_PORT: u16 = 5000;
/// Pool size used when `DATABASE_MAX_CONNECTIONS` is unset or unparsable.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` and `database_url` to prevent
/// credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Postgres connection string. If `None`, the API runs in-memory only.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: u32,
    /// Directory holding the built front end, served for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Unparsable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: var("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            auth_token: var("AUTH_TOKEN"),
            database_url: var("DATABASE_URL"),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            static_dir: var("STATIC_DIR").map(PathBuf::from),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("database_max_connections", &self.database_max_connections)
            .field("static_dir", &self.static_dir)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            static_dir: None,
            log_json: false,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in the `Store` and the pool.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Job records keyed by their UUID, in creation order.
    pub jobs: Store<Job>,

    /// PostgreSQL connection pool for durable state persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no database.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and optional pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            jobs: Store::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate the in-memory store from the database.
    ///
    /// Called once on startup when a database pool is available. Rows are
    /// loaded in creation order so the store's natural order survives restarts.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let jobs = crate::db::jobs::load_all(pool).await?;
        let job_count = jobs.len();
        for job in jobs {
            self.jobs.insert(*job.id.as_uuid(), job);
        }

        tracing::info!(jobs = job_count, "Hydrated in-memory store from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobify_core::{NewJob, UserId};

    fn sample_job(position: &str) -> Job {
        NewJob {
            position: Some(position.to_string()),
            company: Some("Acme".to_string()),
            ..NewJob::default()
        }
        .into_job(UserId::new(), Utc::now())
        .unwrap()
    }

    fn insert(store: &Store<Job>, job: Job) -> Uuid {
        let id = *job.id.as_uuid();
        store.insert(id, job);
        id
    }

    // -- Store tests ----------------------------------------------------------

    #[test]
    fn store_new_creates_empty_store() {
        let store: Store<Job> = Store::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.list().is_empty());
    }

    #[test]
    fn store_insert_and_get_roundtrip() {
        let store = Store::new();
        let id = insert(&store, sample_job("Dev"));

        let retrieved = store.get(&id).unwrap();
        assert_eq!(*retrieved.id.as_uuid(), id);
        assert_eq!(retrieved.position, "Dev");
    }

    #[test]
    fn store_insert_returns_previous_value() {
        let store = Store::new();
        let job = sample_job("Dev");
        let id = *job.id.as_uuid();

        assert!(store.insert(id, job.clone()).is_none());
        assert!(store.insert(id, job).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_list_keeps_insertion_order() {
        let store = Store::new();
        for position in ["first", "second", "third", "fourth"] {
            insert(&store, sample_job(position));
        }

        let positions: Vec<String> = store.list().into_iter().map(|j| j.position).collect();
        assert_eq!(positions, ["first", "second", "third", "fourth"]);
    }

    #[test]
    fn store_replace_keeps_position() {
        let store = Store::new();
        let first = sample_job("first");
        let first_id = insert(&store, first.clone());
        insert(&store, sample_job("second"));

        let mut renamed = first;
        renamed.position = "renamed".to_string();
        store.insert(first_id, renamed);

        let positions: Vec<String> = store.list().into_iter().map(|j| j.position).collect();
        assert_eq!(positions, ["renamed", "second"]);
    }

    #[test]
    fn store_list_where_filters_in_order() {
        let store = Store::new();
        for position in ["a1", "b1", "a2"] {
            insert(&store, sample_job(position));
        }
        let kept: Vec<String> = store
            .list_where(|j| j.position.starts_with('a'))
            .into_iter()
            .map(|j| j.position)
            .collect();
        assert_eq!(kept, ["a1", "a2"]);
    }

    #[test]
    fn store_update_modifies_existing() {
        let store = Store::new();
        let id = insert(&store, sample_job("Dev"));

        let updated = store.update(&id, |j| j.position = "Lead".to_string());
        assert_eq!(updated.unwrap().position, "Lead");
        assert_eq!(store.get(&id).unwrap().position, "Lead");
    }

    #[test]
    fn store_update_returns_none_for_missing_key() {
        let store: Store<Job> = Store::new();
        let result = store.update(&Uuid::new_v4(), |j| j.position.clear());
        assert!(result.is_none());
    }

    #[test]
    fn store_try_update_replaces_on_ok_and_keeps_on_err() {
        let store = Store::new();
        let id = insert(&store, sample_job("Dev"));

        let result: Option<Result<Job, String>> = store.try_update(&id, |j| {
            let mut next = j.clone();
            next.position = "Lead".to_string();
            Ok(next)
        });
        assert_eq!(result.unwrap().unwrap().position, "Lead");

        let failed: Option<Result<Job, String>> =
            store.try_update(&id, |_| Err("rejected".to_string()));
        assert_eq!(failed.unwrap().unwrap_err(), "rejected");
        assert_eq!(store.get(&id).unwrap().position, "Lead");

        let missing: Option<Result<Job, String>> =
            store.try_update(&Uuid::new_v4(), |j| Ok(j.clone()));
        assert!(missing.is_none());
    }

    #[test]
    fn store_try_update_keeps_concurrent_disjoint_changes() {
        let store = Store::new();
        let id = insert(&store, sample_job("Dev"));

        std::thread::scope(|scope| {
            for round in 0..50 {
                let store = store.clone();
                scope.spawn(move || {
                    let _: Option<Result<Job, ()>> = store.try_update(&id, |j| {
                        let mut next = j.clone();
                        if round % 2 == 0 {
                            next.position.push('p');
                        } else {
                            next.company.push('c');
                        }
                        Ok(next)
                    });
                });
            }
        });

        let job = store.get(&id).unwrap();
        assert_eq!(job.position, format!("Dev{}", "p".repeat(25)));
        assert_eq!(job.company, format!("Acme{}", "c".repeat(25)));
    }

    #[test]
    fn store_remove_deletes_item_and_order_slot() {
        let store = Store::new();
        let a = insert(&store, sample_job("a"));
        insert(&store, sample_job("b"));

        let removed = store.remove(&a).unwrap();
        assert_eq!(removed.position, "a");
        assert!(!store.contains(&a));
        assert_eq!(store.len(), 1);

        // Re-inserting goes to the end.
        store.insert(a, removed);
        let positions: Vec<String> = store.list().into_iter().map(|j| j.position).collect();
        assert_eq!(positions, ["b", "a"]);
    }

    #[test]
    fn store_remove_returns_none_for_missing_key() {
        let store: Store<Job> = Store::new();
        assert!(store.remove(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn store_clone_shares_underlying_data() {
        let store = Store::new();
        insert(&store, sample_job("a"));

        let clone = store.clone();
        insert(&clone, sample_job("b"));
        assert_eq!(store.len(), 2);
    }

    // -- AppConfig tests ------------------------------------------------------

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn config_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 5000);
        assert!(config.auth_token.is_none());
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 10);
        assert!(config.static_dir.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn config_reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("AUTH_TOKEN", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/jobify"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("STATIC_DIR", "client/build"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.port, 8081);
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/jobify"));
        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.static_dir, Some(PathBuf::from("client/build")));
        assert!(config.log_json);
    }

    #[test]
    fn config_ignores_unusable_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "http"),
            ("AUTH_TOKEN", "  "),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert_eq!(config.port, 5000);
        assert!(config.auth_token.is_none());
        assert_eq!(config.database_max_connections, 10);
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let config = AppConfig {
            auth_token: Some("super-secret".to_string()),
            database_url: Some("postgres://user:pw@db/jobify".to_string()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("pw@db"));
        assert!(debug.contains("[REDACTED]"));
    }

    // -- AppState tests -------------------------------------------------------

    #[test]
    fn app_state_new_is_in_memory_and_empty() {
        let state = AppState::new();
        assert!(state.jobs.is_empty());
        assert!(state.db_pool.is_none());
        assert_eq!(state.config.port, 5000);
    }

    #[tokio::test]
    async fn hydrate_without_pool_is_noop() {
        let state = AppState::new();
        state.hydrate_from_db().await.unwrap();
        assert!(state.jobs.is_empty());
    }
}
