//! 查询层：重试 + 按 key 缓存
//!
//! 页面的每个读取都走 [`QueryClient::fetch`]。只有网络/后端错误会重试（默认 2 次，共 3 次尝试），
//! 间隔按 retry_delay_ms 指数增长、上限 30 秒；成功结果在 stale_secs 内直接命中缓存。

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::QuerySection;
use crate::core::KioskError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub retry: u32,
    pub retry_delay: Duration,
    pub stale: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from(&QuerySection::default())
    }
}

impl From<&QuerySection> for QueryOptions {
    fn from(section: &QuerySection) -> Self {
        Self {
            retry: section.retry,
            retry_delay: Duration::from_millis(section.retry_delay_ms),
            stale: Duration::from_secs(section.stale_secs),
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

pub struct QueryClient {
    options: QueryOptions,
    cache: Mutex<HashMap<String, CacheEntry>>,
    /// clear 时加一；读取开始后发生过 clear 的结果不写入缓存
    epoch: AtomicU64,
}

impl QueryClient {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            cache: Mutex::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 第 attempt 次失败后的等待时间（attempt 从 0 开始）
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.options
            .retry_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }

    /// 缓存未过期则直接返回，否则带重试地执行 fetcher 并写入缓存
    pub async fn fetch<T, F, Fut>(&self, key: &str, fetcher: F) -> Result<T, KioskError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, KioskError>>,
    {
        if let Some(hit) = self.cached::<T>(key) {
            tracing::debug!(key, "Query cache hit");
            return Ok(hit);
        }
        let epoch = self.epoch.load(Ordering::SeqCst);
        let value = self.run_with_retry(key, fetcher).await?;
        let mut cache = self.cache();
        if self.epoch.load(Ordering::SeqCst) == epoch {
            cache.insert(
                key.to_string(),
                CacheEntry {
                    value: Arc::new(value.clone()),
                    fetched_at: Instant::now(),
                },
            );
        } else {
            tracing::debug!(key, "Cache cleared during fetch, result not cached");
        }
        Ok(value)
    }

    /// 只重试，不读写缓存（用于提交类操作以外的即时查询）
    pub async fn run_with_retry<T, F, Fut>(&self, key: &str, mut fetcher: F) -> Result<T, KioskError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, KioskError>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.options.retry => {
                    let delay = self.retry_delay(attempt);
                    tracing::warn!(key, attempt = attempt + 1, ?delay, "Query failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(key, "Query failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    fn cached<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let mut cache = self.cache();
        let fresh = cache
            .get(key)
            .map(|entry| entry.fetched_at.elapsed() < self.options.stale)?;
        if !fresh {
            cache.remove(key);
            return None;
        }
        cache.get(key)?.value.downcast_ref::<T>().cloned()
    }

    /// 删除 key 以 prefix 开头的缓存
    pub fn invalidate(&self, prefix: &str) {
        self.cache().retain(|key, _| !key.starts_with(prefix));
    }

    /// 登出时清空
    pub fn clear(&self) {
        let mut cache = self.cache();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    use tokio::sync::Notify;

    fn fast_client() -> QueryClient {
        QueryClient::new(QueryOptions {
            retry: 2,
            retry_delay: Duration::from_millis(1),
            stale: Duration::from_secs(300),
        })
    }

    #[test]
    fn test_retry_delay_exponential_with_cap() {
        let client = QueryClient::new(QueryOptions::default());
        assert_eq!(client.retry_delay(0), Duration::from_secs(1));
        assert_eq!(client.retry_delay(1), Duration::from_secs(2));
        assert_eq!(client.retry_delay(2), Duration::from_secs(4));
        assert_eq!(client.retry_delay(10), MAX_RETRY_DELAY);
        assert_eq!(client.retry_delay(40), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_network_errors_get_three_attempts() {
        let client = fast_client();
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = client
            .fetch("dashboard:1", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(KioskError::Network("connection refused".into())) }
            })
            .await;
        assert!(matches!(result, Err(KioskError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_recovers_on_second_attempt() {
        let client = fast_client();
        let calls = AtomicU32::new(0);
        let result = client
            .fetch("products", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(KioskError::Api { status: 503, message: String::new() })
                    } else {
                        Ok(vec!["1".to_string()])
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(result, vec!["1".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let client = fast_client();
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = client
            .fetch("product:42", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(KioskError::NotFound("42".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_and_invalidate() {
        let client = fast_client();
        let calls = AtomicU32::new(0);
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, KioskError>(7u32) }
        };
        assert_eq!(client.fetch("product:7", fetch).await.unwrap(), 7);
        assert_eq!(client.fetch("product:7", fetch).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        client.invalidate("product:");
        client.fetch("product:7", fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        client.clear();
        client.fetch("product:7", fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_clear_during_fetch_does_not_refill_cache() {
        let client = Arc::new(fast_client());
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let task = {
            let (client, started, release) = (client.clone(), started.clone(), release.clone());
            tokio::spawn(async move {
                client
                    .fetch("dashboard:1", || {
                        let (started, release) = (started.clone(), release.clone());
                        async move {
                            started.notify_one();
                            release.notified().await;
                            Ok::<_, KioskError>(1u32)
                        }
                    })
                    .await
            })
        };

        started.notified().await;
        client.clear();
        release.notify_one();
        assert_eq!(task.await.unwrap().unwrap(), 1);
        assert!(client.cached::<u32>("dashboard:1").is_none());

        // clear 之后开始的读取照常缓存
        client.fetch("dashboard:1", || async { Ok::<_, KioskError>(2u32) }).await.unwrap();
        assert_eq!(client.cached::<u32>("dashboard:1"), Some(2));
    }

    #[tokio::test]
    async fn test_stale_entries_refetch() {
        let client = QueryClient::new(QueryOptions {
            retry: 0,
            retry_delay: Duration::from_millis(1),
            stale: Duration::ZERO,
        });
        let calls = AtomicU32::new(0);
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, KioskError>("x".to_string()) }
        };
        client.fetch("k", fetch).await.unwrap();
        client.fetch("k", fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
