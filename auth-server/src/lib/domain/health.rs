use async_trait::async_trait;

/// Liveness probe for the backing database.
#[async_trait]
pub trait DatabaseHealth: Send + Sync + 'static {
    /// Run a trivial round trip.
    ///
    /// # Errors
    /// Human-readable reason the database could not be reached
    async fn ping(&self) -> Result<(), String>;
}
