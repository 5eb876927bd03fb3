use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::cache::expiring::ExpiringCache;
use crate::config::AppConfig;
use crate::upstream::futures::SettlementPrice;

/// Per-request timeout applied by the shared upstream HTTP client.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub settlement_cache: ExpiringCache<SettlementPrice>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .expect("should have built the HTTP client.");

        let settlement_cache =
            ExpiringCache::new(ChronoDuration::hours(config.settlement_ttl_hours));

        Self {
            config,
            http,
            settlement_cache,
        }
    }
}
