use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter, clock::DefaultClock};
use reqwest::{Client as ReqwestClient, Error as ReqwestError, Request, Response};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::network::RateLimitWindow;

/// HTTP client shared by the aggregator APIs. Upstreams with strict quotas get
/// the rate-limited variant, which waits for a permit before every request.
#[derive(Debug, Clone)]
pub enum Client {
    RateLimited(RateLimitedClient),
    Unrestricted(ReqwestClient),
}

impl Client {
    pub async fn execute(&self, req: Request) -> Result<Response, ReqwestError> {
        match self {
            Client::RateLimited(rate_limited_client) => rate_limited_client.execute(req).await,
            Client::Unrestricted(unrestricted_client) => unrestricted_client.execute(req).await,
        }
    }

    pub fn inner_client(&self) -> &ReqwestClient {
        match self {
            Client::RateLimited(rate_limited_client) => rate_limited_client.inner_client(),
            Client::Unrestricted(unrestricted_client) => unrestricted_client,
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::Unrestricted(ReqwestClient::new())
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    inner: ReqwestClient,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimitedClient {
    pub fn new(limit: RateLimitWindow, burst: Option<NonZeroU32>) -> Self {
        let mut quota = match limit {
            RateLimitWindow::PerSecond(allowed) => Quota::per_second(allowed),
            RateLimitWindow::PerMinute(allowed) => Quota::per_minute(allowed),
            // Zero periods are rejected by RateLimitWindow::from_string
            RateLimitWindow::Custom { period } => {
                Quota::with_period(period).unwrap_or(Quota::per_second(NonZeroU32::MIN))
            }
        };
        if let Some(b) = burst {
            quota = quota.allow_burst(b);
        }
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self {
            inner: ReqwestClient::new(),
            limiter,
        }
    }

    pub fn inner_client(&self) -> &ReqwestClient {
        &self.inner
    }

    pub async fn execute(&self, req: Request) -> Result<Response, ReqwestError> {
        self.limiter.until_ready().await;
        self.inner.execute(req).await
    }
}
