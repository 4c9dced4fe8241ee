use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

struct CacheEntry {
    user: User,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_stale(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= ttl
    }
}

struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Short-lived in-process cache of resolved users, keyed by id.
///
/// Entries older than the TTL are dropped lazily on `get` and eagerly by the
/// periodic sweep started with [`UserCache::start`]. Reads may see a user up
/// to one TTL out of date.
pub struct UserCache {
    entries: RwLock<HashMap<UserId, CacheEntry>>,
    ttl: Duration,
    sweep_interval: Duration,
    sweeper: Mutex<Option<Sweeper>>,
}

impl UserCache {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            sweep_interval,
            sweeper: Mutex::new(None),
        }
    }

    /// Store a snapshot of `user`, replacing any previous one.
    pub async fn set(&self, id: UserId, user: User) {
        let entry = CacheEntry {
            user,
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(id, entry);
    }

    /// Fetch a snapshot younger than the TTL.
    ///
    /// A stale entry is removed and reported as a miss.
    pub async fn get(&self, id: &UserId) -> Option<User> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                Some(entry) if !entry.is_stale(self.ttl, now) => return Some(entry.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        // Another writer may have refreshed the entry between the two locks
        if let Some(entry) = entries.get(id) {
            if !entry.is_stale(self.ttl, now) {
                return Some(entry.user.clone());
            }
            entries.remove(id);
        }
        None
    }

    pub async fn invalidate(&self, id: &UserId) {
        self.entries.write().await.remove(id);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(self.ttl, now));
        before - entries.len()
    }

    /// Spawn the periodic sweep task. Calling it again while running is a no-op.
    ///
    /// The task holds only a weak reference, so dropping the last `Arc`
    /// also ends it.
    pub fn start(self: &Arc<Self>) {
        let mut sweeper = match self.sweeper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sweeper.is_some() {
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let cache: Weak<Self> = Arc::downgrade(self);
        let period = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        let removed = cache.sweep().await;
                        if removed > 0 {
                            tracing::debug!(removed, "Swept stale user cache entries");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            tracing::debug!("User cache sweeper stopped");
        });

        tracing::info!(
            ttl_seconds = self.ttl.as_secs(),
            sweep_interval_seconds = period.as_secs(),
            "User cache sweeper started"
        );
        *sweeper = Some(Sweeper { shutdown, handle });
    }

    /// Stop the sweep task and wait for it to exit.
    pub async fn stop(&self) {
        let sweeper = match self.sweeper.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(Sweeper { shutdown, handle }) = sweeper {
            let _ = shutdown.send(true);
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "User cache sweeper panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        match self.sweeper.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}
