use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use auth::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::domain::auth::errors::TokenStoreError;
use crate::domain::auth::ports::RefreshTokenRepository;

struct PurgeTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Periodically deletes refresh token records whose expiry has passed.
///
/// Tokens that are rotated or revoked remove their own record; this covers
/// the ones that are simply never used again.
pub struct RefreshTokenPurger<RR>
where
    RR: RefreshTokenRepository,
{
    tokens: Arc<RR>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    task: Mutex<Option<PurgeTask>>,
}

impl<RR> RefreshTokenPurger<RR>
where
    RR: RefreshTokenRepository,
{
    pub fn new(tokens: Arc<RR>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            tokens,
            clock,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Delete every record expired as of the clock's current time.
    pub async fn purge_now(&self) -> Result<u64, TokenStoreError> {
        purge(self.tokens.as_ref(), self.clock.as_ref()).await
    }

    /// Spawn the purge task. Calling it again while running is a no-op.
    pub fn start(&self) {
        let mut task = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if task.is_some() {
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let tokens = Arc::clone(&self.tokens);
        let clock = Arc::clone(&self.clock);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // A failed pass is retried on the next tick
                        if let Err(e) = purge(tokens.as_ref(), clock.as_ref()).await {
                            tracing::warn!(error = %e, "Refresh token purge failed");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            tracing::debug!("Refresh token purger stopped");
        });

        tracing::info!(
            purge_interval_seconds = period.as_secs(),
            "Refresh token purger started"
        );
        *task = Some(PurgeTask { shutdown, handle });
    }

    /// Stop the purge task and wait for it to exit.
    pub async fn stop(&self) {
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(PurgeTask { shutdown, handle }) = task {
            let _ = shutdown.send(true);
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Refresh token purger panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        match self.task.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

async fn purge<RR>(tokens: &RR, clock: &dyn Clock) -> Result<u64, TokenStoreError>
where
    RR: RefreshTokenRepository,
{
    let removed = tokens.purge_expired(clock.now()).await?;
    if removed > 0 {
        tracing::debug!(removed, "Purged expired refresh tokens");
    }
    Ok(removed)
}
