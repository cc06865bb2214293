pub mod api_structs;
pub mod rate_limiter;

use std::{future::Future, time::Duration};

use futures::{stream, Stream, TryStreamExt};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{
    api_structs::{LeaderboardInfo, RankedList, Score},
    rate_limiter::RateLimiter
};

/// Number of leaderboard ids on a full ranked list page. A shorter page is the last one.
pub const RANKED_LIST_PAGE_SIZE: usize = 30;
pub const DEFAULT_API_ROOT: &str = "https://hitbloq.com/api";

/// Body the service sends when it wants the caller to try again.
const EMPTY_BODY: &str = "[]";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError
    },

    #[error("response body from {url} is still empty after {attempts} attempts")]
    EmptyAfterRetries { url: String, attempts: u32 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error
    }
}

impl ApiError {
    pub fn transport(url: &str, source: impl Into<BoxError>) -> Self {
        ApiError::Transport {
            url: url.to_string(),
            source: source.into()
        }
    }
}

/// Fetches the raw body of a GET request.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, ApiError>>;
}

pub struct HttpTransport {
    client: Client
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport("<client>", e))?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ApiError::transport(url, e))?;

        response.text().await.map_err(|e| ApiError::transport(url, e))
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_root: String,
    pub requests_per_second: f64,
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    pub retry_delay: Duration
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            api_root: DEFAULT_API_ROOT.to_string(),
            requests_per_second: 2.0,
            max_attempts: 3,
            retry_delay: Duration::from_secs(5)
        }
    }
}

/// Sequential, rate limited client for the scoring service.
pub struct ApiClient<T: Transport> {
    transport: T,
    limiter: RateLimiter,
    api_root: String,
    max_attempts: u32,
    retry_delay: Duration
}

impl ApiClient<HttpTransport> {
    pub fn http(config: &FetchConfig) -> Result<Self, ApiError> {
        Ok(Self::new(HttpTransport::new()?, config))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: &FetchConfig) -> Self {
        ApiClient {
            transport,
            limiter: RateLimiter::per_second(config.requests_per_second),
            api_root: config.api_root.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GETs `url` and decodes the body. Retries only when the service answers
    /// with the empty list marker, every other failure is returned as is.
    async fn request<R: DeserializeOwned>(&mut self, url: &str) -> Result<R, ApiError> {
        for attempt in 1..=self.max_attempts {
            self.limiter.acquire().await;

            debug!(url, attempt, "Fetching");
            let body = self.transport.get(url).await?;

            if body.trim() != EMPTY_BODY {
                return serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                    url: url.to_string(),
                    source
                });
            }

            if attempt < self.max_attempts {
                warn!(
                    url,
                    "Empty body received, retrying {}/{}",
                    attempt + 1,
                    self.max_attempts
                );
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(ApiError::EmptyAfterRetries {
            url: url.to_string(),
            attempts: self.max_attempts
        })
    }

    pub async fn ranked_list_page(&mut self, pool: &str, page: u32) -> Result<RankedList, ApiError> {
        let url = format!("{}/ranked_list/{}/{}", self.api_root, pool, page);
        self.request(&url).await
    }

    /// Every page of the pool's ranked list, in order, starting from page 0.
    /// The sequence ends after the first page holding fewer than
    /// [`RANKED_LIST_PAGE_SIZE`] ids; the service has no other end marker.
    pub fn ranked_list_pages<'a>(&'a mut self, pool: &'a str) -> impl Stream<Item = Result<RankedList, ApiError>> + 'a {
        stream::try_unfold((self, 0u32, false), move |(client, page, done)| async move {
            if done {
                return Ok::<_, ApiError>(None);
            }

            let list = client.ranked_list_page(pool, page).await?;
            let done = list.leaderboard_id_list.len() < RANKED_LIST_PAGE_SIZE;
            Ok(Some((list, (client, page + 1, done))))
        })
    }

    pub async fn leaderboard_ids(&mut self, pool: &str) -> Result<Vec<String>, ApiError> {
        self.ranked_list_pages(pool)
            .try_fold(Vec::new(), |mut ids, list| async move {
                if let (true, Some(curve)) = (ids.is_empty(), &list.cr_curve) {
                    info!(pool = %list.id, %curve, "Current pool curve");
                }

                ids.extend(list.leaderboard_id_list);
                Ok::<_, ApiError>(ids)
            })
            .await
    }

    pub async fn leaderboard_info(&mut self, id: &str) -> Result<LeaderboardInfo, ApiError> {
        let url = format!("{}/leaderboard/{}/info", self.api_root, id);
        self.request(&url).await
    }

    pub async fn scores(&mut self, id: &str, page: u32) -> Result<Vec<Score>, ApiError> {
        let url = format!("{}/leaderboard/{}/scores/{}", self.api_root, id, page);
        self.request(&url).await
    }
}
