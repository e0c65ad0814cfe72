use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use sea_orm::DatabaseConnection;

use crate::config::{CacheConfig, DistributionConfig};
use crate::minter::TokenMinter;
use crate::models::analytics::{OverviewAnalyticsView, PoapAnalyticsView};

#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub cache: Arc<ApiCache>,
    pub minter: Arc<dyn TokenMinter>,
    pub distribution: DistributionConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        database: DatabaseConnection,
        cache: Arc<ApiCache>,
        minter: Arc<dyn TokenMinter>,
        distribution: DistributionConfig,
    ) -> Self {
        assert!(
            distribution.max_claim_links_per_batch > 0,
            "Claim link batch limit must be configured"
        );
        Self {
            database,
            cache,
            minter,
            distribution,
            start_time: Instant::now(),
        }
    }
}

pub struct ApiCache {
    pub poap_analytics: Cache<i64, Arc<PoapAnalyticsView>>,
    pub overview_analytics: Cache<String, Arc<OverviewAnalyticsView>>,
}

impl ApiCache {
    pub fn new(config: &CacheConfig) -> Self {
        assert!(
            config.analytics_max_capacity >= 10,
            "Analytics cache capacity threshold"
        );
        assert!(
            config.overview_max_capacity >= 10,
            "Overview cache capacity threshold"
        );

        let poap_analytics = Cache::builder()
            .max_capacity(config.analytics_max_capacity)
            .time_to_live(Duration::from_secs(config.analytics_ttl_seconds))
            .time_to_idle(Duration::from_secs(config.analytics_ttl_seconds / 2 + 1))
            .build();

        let overview_analytics = Cache::builder()
            .max_capacity(config.overview_max_capacity)
            .time_to_live(Duration::from_secs(config.overview_ttl_seconds))
            .time_to_idle(Duration::from_secs(config.overview_ttl_seconds / 2 + 1))
            .build();

        Self {
            poap_analytics,
            overview_analytics,
        }
    }

    /// Drops every cached view a change to `poap_id` could affect.
    pub async fn invalidate_poap(&self, poap_id: i64) {
        self.poap_analytics.invalidate(&poap_id).await;
        self.overview_analytics.invalidate_all();
    }
}
