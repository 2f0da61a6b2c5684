use axum::Router;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::config::ApiConfig;

/// Per-client quota on review submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewThrottle {
    /// Sustained requests per second
    pub per_second: u64,
    /// Requests allowed in a burst
    pub burst: u32,
}

impl ReviewThrottle {
    pub const fn from_config(config: &ApiConfig) -> Self {
        Self {
            per_second: config.review_rate_per_second,
            burst: config.review_rate_burst,
        }
    }

    /// Milliseconds after which one request of the quota is replenished
    const fn replenish_ms(&self) -> u64 {
        let per_second = if self.per_second == 0 { 1 } else { self.per_second };
        let ms = 1000 / per_second;
        if ms == 0 { 1 } else { ms }
    }
}

/// Throttle every route of `router` per client IP.
///
/// Clients are told their remaining quota through the `x-ratelimit-*`
/// headers; exceeding it answers 429. A zero burst disables throttling.
pub fn apply_review_throttle<S>(router: Router<S>, throttle: ReviewThrottle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_millisecond(throttle.replenish_ms())
        .burst_size(throttle.burst)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
    else {
        tracing::warn!(?throttle, "Review throttling disabled by configuration");
        return router;
    };

    router.route_layer(GovernorLayer::new(governor_conf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replenish_interval() {
        let throttle = |per_second| ReviewThrottle {
            per_second,
            burst: 4,
        };
        assert_eq!(throttle(2).replenish_ms(), 500);
        assert_eq!(throttle(1).replenish_ms(), 1000);
        assert_eq!(throttle(0).replenish_ms(), 1000);
        assert_eq!(throttle(5000).replenish_ms(), 1);
    }
}
