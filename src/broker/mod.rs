//! Broker client: a thin reliability wrapper over a list/pub-sub broker.
//!
//! Grounded on the reconnect-on-error bridge-task pattern in
//! `data/topics/redis.rs` and the connection-pool + health-check pattern in
//! `data/cache/redis.rs`, generalized to list semantics (`BLPOP`/`RPUSH`/
//! `EXPIRE`/`DEL`) rather than streams or a cache's key/value surface.

pub mod error;
pub mod memory;
pub mod redis;

pub use error::BrokerError;
pub use memory::MemoryBrokerClient;
pub use redis::RedisBrokerClient;

use async_trait::async_trait;

use crate::core::constants::SUBMIT_JOB_TTL_MULTIPLIER;

/// Low-level broker operations plus the `submit_job` convenience that
/// correlates a request push with a response pop under a timeout.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Blocking pop from `queue`, waiting up to `timeout_secs`.
    async fn fetch_message(&self, queue: &str, timeout_secs: u64) -> Result<Vec<u8>, BrokerError>;

    /// Append `payload` to the tail of `queue`.
    async fn submit_message(&self, queue: &str, payload: Vec<u8>) -> Result<(), BrokerError>;

    /// Set `key`'s expiry to `ttl_seconds`.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), BrokerError>;

    /// Delete `key` unconditionally (idempotent if absent).
    async fn delete(&self, key: &str) -> Result<(), BrokerError>;

    /// Lazily construct and ping a low-level handle, reconnecting on a
    /// failed ping.
    async fn health_check(&self) -> Result<(), BrokerError>;

    fn backend_name(&self) -> &'static str;

    /// Atomic sequence: push `payload` onto `task_queue`, set
    /// `response_channel`'s expiry to `ttl_seconds`, then blocking-pop
    /// `response_channel` with a timeout of `9 * ttl_seconds` (the
    /// multiplier accommodates queue-wait vs. processing-wait imbalance;
    /// see DESIGN.md). The response channel is deleted on every terminal
    /// path: success, timeout, or error.
    async fn submit_job(
        &self,
        task_queue: &str,
        payload: Vec<u8>,
        response_channel: &str,
        ttl_seconds: u64,
    ) -> Result<Vec<u8>, BrokerError> {
        let result = async {
            self.submit_message(task_queue, payload).await?;
            self.expire(response_channel, ttl_seconds).await?;
            let pop_timeout = ttl_seconds.saturating_mul(SUBMIT_JOB_TTL_MULTIPLIER);
            self.fetch_message(response_channel, pop_timeout).await
        }
        .await;

        match result {
            Ok(bytes) => {
                self.delete(response_channel).await.ok();
                Ok(bytes)
            }
            Err(BrokerError::Timeout) => {
                self.delete(response_channel).await.ok();
                Err(BrokerError::Timeout)
            }
            Err(e) => {
                self.delete(response_channel).await.ok();
                Err(e)
            }
        }
    }
}
