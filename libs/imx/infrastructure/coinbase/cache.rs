//! Time-windowed spot price cache

use super::{CryptoSymbol, FiatSymbol, SpotPriceSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(30);

/// A cached spot price and when it was fetched
#[derive(Debug, Clone, Copy)]
pub struct CachedPrice {
    pub price: f64,
    pub retrieved_at: Instant,
}

impl CachedPrice {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            retrieved_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.retrieved_at.elapsed()
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}

/// Most recent price per `"<FIAT>-<CRYPTO>"` pair
pub struct SpotPriceCache {
    source: Arc<dyn SpotPriceSource>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedPrice>>,
}

impl SpotPriceCache {
    pub fn new(source: Arc<dyn SpotPriceSource>) -> Self {
        Self::with_ttl(source, DEFAULT_PRICE_TTL)
    }

    pub fn with_ttl(source: Arc<dyn SpotPriceSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache_key(crypto: CryptoSymbol, fiat: FiatSymbol) -> String {
        format!("{}-{}", fiat, crypto)
    }

    /// Spot price for the pair, defaulting to ETH/USD.
    ///
    /// Serves a fresh cached value without I/O. On a miss or a stale entry,
    /// fetches once and stores the result. Any fetch failure yields `0.0`
    /// and leaves the cache untouched.
    pub async fn spot_price(&self, crypto: Option<CryptoSymbol>, fiat: Option<FiatSymbol>) -> f64 {
        let crypto = crypto.unwrap_or_default();
        let fiat = fiat.unwrap_or_default();
        let key = Self::cache_key(crypto, fiat);

        // held across the fetch so concurrent callers share one request
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(&key) {
            if !entry.is_stale(self.ttl) {
                debug!("{} price served from cache ({:?} old)", key, entry.age());
                return entry.price;
            }
        }

        match self.source.fetch_spot(crypto, fiat).await {
            Ok(price) => {
                debug!("{} price refreshed: {}", key, price);
                entries.insert(key, CachedPrice::new(price));
                price
            }
            Err(e) => {
                warn!("Failed to fetch {} spot price: {}", key, e);
                0.0
            }
        }
    }

    /// Cached entry for the pair, fresh or not
    pub async fn cached(&self, crypto: CryptoSymbol, fiat: FiatSymbol) -> Option<CachedPrice> {
        self.entries
            .lock()
            .await
            .get(&Self::cache_key(crypto, fiat))
            .copied()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::coinbase::{PriceError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        price: f64,
    }

    #[async_trait]
    impl SpotPriceSource for CountingSource {
        async fn fetch_spot(&self, _crypto: CryptoSymbol, _fiat: FiatSymbol) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.price)
        }
    }

    /// Takes a while to answer so concurrent callers overlap
    struct SlowSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl SpotPriceSource for SlowSource {
        async fn fetch_spot(&self, _crypto: CryptoSymbol, _fiat: FiatSymbol) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(1800.0)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SpotPriceSource for FailingSource {
        async fn fetch_spot(&self, _crypto: CryptoSymbol, _fiat: FiatSymbol) -> Result<f64> {
            Err(PriceError::ApiError("boom".to_string()))
        }
    }

    #[test]
    fn test_cache_key_is_fiat_first() {
        assert_eq!(
            SpotPriceCache::cache_key(CryptoSymbol::Imx, FiatSymbol::Gbp),
            "GBP-IMX"
        );
    }

    #[tokio::test]
    async fn test_defaults_to_eth_usd() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: 1500.0,
        });
        let cache = SpotPriceCache::new(source.clone());

        assert_eq!(cache.spot_price(None, None).await, 1500.0);
        assert!(cache.cached(CryptoSymbol::Eth, FiatSymbol::Usd).await.is_some());
    }

    #[tokio::test]
    async fn test_pairs_are_cached_independently() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: 2.0,
        });
        let cache = SpotPriceCache::new(source.clone());

        cache.spot_price(Some(CryptoSymbol::Imx), Some(FiatSymbol::Usd)).await;
        cache.spot_price(Some(CryptoSymbol::Imx), Some(FiatSymbol::Eur)).await;
        cache.spot_price(Some(CryptoSymbol::Imx), Some(FiatSymbol::Usd)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_returns_zero_and_is_not_cached() {
        let cache = SpotPriceCache::new(Arc::new(FailingSource));

        assert_eq!(cache.spot_price(None, None).await, 0.0);
        assert!(cache.cached(CryptoSymbol::Eth, FiatSymbol::Usd).await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let source = Arc::new(SlowSource {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(100),
        });
        let cache = Arc::new(SpotPriceCache::new(source.clone()));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.spot_price(None, None).await });
        }

        while let Some(price) = tasks.join_next().await {
            assert_eq!(price.unwrap(), 1800.0);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            price: 1.0,
        });
        let cache = SpotPriceCache::new(source.clone());

        cache.spot_price(None, None).await;
        cache.clear().await;
        cache.spot_price(None, None).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
