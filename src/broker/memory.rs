//! In-memory fake broker, mirroring the teacher's dual Redis/Memory backend
//! pattern (`TopicBackend`/`CacheBackend`) so the orchestrator, task
//! validation, and trace aggregator are testable without a live Redis.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout as tokio_timeout;

use super::{BrokerClient, BrokerError};

struct Queue {
    items: VecDeque<Vec<u8>>,
    expires_at: Option<Instant>,
}

impl Default for Queue {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            expires_at: None,
        }
    }
}

/// An in-process broker backed by `VecDeque`s behind a mutex, for use in
/// tests that exercise the orchestrator and submission API without Redis.
pub struct MemoryBrokerClient {
    queues: Arc<Mutex<HashMap<String, Queue>>>,
    notify: Arc<Notify>,
    fail_next_n_fetches: Arc<Mutex<u32>>,
}

impl Default for MemoryBrokerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBrokerClient {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
            fail_next_n_fetches: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` `fetch_message` calls return a transient error,
    /// for exercising the retry/backoff path deterministically in tests.
    #[cfg(test)]
    pub async fn inject_fetch_failures(&self, n: u32) {
        *self.fail_next_n_fetches.lock().await = n;
    }

    async fn evict_if_expired(queues: &mut HashMap<String, Queue>, key: &str) {
        if let Some(queue) = queues.get(key)
            && let Some(deadline) = queue.expires_at
            && Instant::now() >= deadline
        {
            queues.remove(key);
        }
    }
}

#[async_trait]
impl BrokerClient for MemoryBrokerClient {
    async fn fetch_message(&self, queue: &str, timeout_secs: u64) -> Result<Vec<u8>, BrokerError> {
        {
            let mut guard = self.fail_next_n_fetches.lock().await;
            if *guard > 0 {
                *guard -= 1;
                return Err(BrokerError::Transient("injected fetch failure".into()));
            }
        }

        let deadline = Duration::from_secs(timeout_secs.max(1));
        let poll = async {
            loop {
                {
                    let mut queues = self.queues.lock().await;
                    Self::evict_if_expired(&mut queues, queue).await;
                    if let Some(q) = queues.get_mut(queue)
                        && let Some(item) = q.items.pop_front()
                    {
                        return item;
                    }
                }
                self.notify.notified().await;
            }
        };

        match tokio_timeout(deadline, poll).await {
            Ok(item) => Ok(item),
            Err(_) => Err(BrokerError::Timeout),
        }
    }

    async fn submit_message(&self, queue: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut queues = self.queues.lock().await;
        queues.entry(queue.to_string()).or_default().items.push_back(payload);
        drop(queues);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), BrokerError> {
        let mut queues = self.queues.lock().await;
        let entry = queues.entry(key.to_string()).or_default();
        entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_seconds));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BrokerError> {
        self.queues.lock().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), BrokerError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
