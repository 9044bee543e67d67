//! Rate Limiter
//!
//! Token bucket rate limiting for Horizon, Soroban RPC and the memo
//! directory, with per-domain configuration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Token bucket rate limiter with per-domain configuration
pub struct RateLimiter {
    buckets: HashMap<String, Bucket>,
    default_rate: u32,
    default_period: Duration,
    endpoint_configs: HashMap<String, EndpointConfig>,
}

/// Configuration for a specific domain
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub rate: u32,
    pub period: Duration,
    pub burst: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rate: 5,
            period: Duration::from_secs(1),
            burst: 10,
        }
    }
}

struct Bucket {
    tokens: u32,
    max_tokens: u32,
    last_refill: Instant,
    refill_period: Duration,
    tokens_per_refill: u32,
}

impl RateLimiter {
    /// `rate` requests are allowed per `period_seconds` for unknown domains
    pub fn new(rate: u32, period_seconds: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            default_rate: rate,
            default_period: Duration::from_secs(period_seconds),
            endpoint_configs: Self::default_endpoint_configs(),
        }
    }

    fn default_endpoint_configs() -> HashMap<String, EndpointConfig> {
        let mut configs = HashMap::new();

        // SDF Horizon allows ~3600 requests/hour per IP
        for endpoint in &[
            "horizon.stellar.org",
            "horizon-testnet.stellar.org",
            "horizon-futurenet.stellar.org",
        ] {
            configs.insert(
                endpoint.to_string(),
                EndpointConfig {
                    rate: 1,
                    period: Duration::from_secs(1),
                    burst: 10,
                },
            );
        }

        for endpoint in &[
            "soroban-testnet.stellar.org",
            "rpc-futurenet.stellar.org",
            "soroban-rpc.mainnet.stellar.gateway.fm",
        ] {
            configs.insert(
                endpoint.to_string(),
                EndpointConfig {
                    rate: 5,
                    period: Duration::from_secs(1),
                    burst: 10,
                },
            );
        }

        // Directory is fetched at most once per cache TTL
        configs.insert(
            "api.stellar.expert".to_string(),
            EndpointConfig {
                rate: 1,
                period: Duration::from_secs(1),
                burst: 3,
            },
        );

        configs
    }

    /// Check if a request is allowed for the given key
    pub fn check(&mut self, key: &str) -> bool {
        let config = self.endpoint_configs.get(key).cloned();

        let bucket = self.buckets.entry(key.to_string()).or_insert_with(|| {
            let cfg = config.unwrap_or(EndpointConfig {
                rate: self.default_rate,
                period: self.default_period,
                burst: self.default_rate,
            });
            Bucket {
                tokens: cfg.burst,
                max_tokens: cfg.burst,
                last_refill: Instant::now(),
                refill_period: cfg.period,
                tokens_per_refill: cfg.rate,
            }
        });

        // Refill tokens based on elapsed time
        let elapsed = bucket.last_refill.elapsed();
        if elapsed >= bucket.refill_period && !bucket.refill_period.is_zero() {
            let refills = (elapsed.as_millis() / bucket.refill_period.as_millis().max(1)) as u32;
            let new_tokens = bucket
                .tokens
                .saturating_add(refills.saturating_mul(bucket.tokens_per_refill));
            bucket.tokens = new_tokens.min(bucket.max_tokens);
            bucket.last_refill = Instant::now();
        }

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Configure rate limit for a specific domain
    pub fn configure_endpoint(&mut self, endpoint: &str, config: EndpointConfig) {
        self.endpoint_configs.insert(endpoint.to_string(), config);
        self.buckets.remove(endpoint);
    }

    /// Time until the next request is allowed, if currently limited
    pub fn time_until_allowed(&self, key: &str) -> Option<Duration> {
        self.buckets.get(key).and_then(|bucket| {
            if bucket.tokens > 0 {
                None
            } else {
                let elapsed = bucket.last_refill.elapsed();
                if elapsed < bucket.refill_period {
                    Some(bucket.refill_period - elapsed)
                } else {
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_basic() {
        let mut limiter = RateLimiter::new(3, 60);

        assert!(limiter.check("api1"));
        assert!(limiter.check("api1"));
        assert!(limiter.check("api1"));
        assert!(!limiter.check("api1"));
        assert!(limiter.time_until_allowed("api1").is_some());

        // Different key should work
        assert!(limiter.check("api2"));
    }

    #[test]
    fn test_horizon_burst() {
        let mut limiter = RateLimiter::new(1, 60);
        for _ in 0..10 {
            assert!(limiter.check("horizon.stellar.org"));
        }
        assert!(!limiter.check("horizon.stellar.org"));
    }

    #[test]
    fn test_custom_endpoint_config() {
        let mut limiter = RateLimiter::new(10, 1);

        limiter.configure_endpoint(
            "localhost:8000",
            EndpointConfig {
                rate: 1,
                period: Duration::from_secs(1),
                burst: 2,
            },
        );

        assert!(limiter.check("localhost:8000"));
        assert!(limiter.check("localhost:8000"));
        assert!(!limiter.check("localhost:8000"));
    }
}
