//! HTTP client for the Strava API with rate limiting.
//!
//! This module provides the activity-data side of the pipeline:
//! - Paginated activity listing and single-activity lookup
//! - Stream fetching keyed by type, decoded into [`ActivityStreams`]
//! - Parallel stream fetching with bounded concurrency
//! - Dispatch rate limiting with exponential backoff on 429
//! - Access-token refresh via the `refresh_token` grant

use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::SceneError;
use crate::streams::{ActivityStreams, StreamType};

const API_BASE_URL: &str = "https://www.strava.com/api/v3";
const OAUTH_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

// Strava allows short bursts but counts every request against a 15-minute
// window. Space dispatches out and keep few requests in flight.
const DISPATCH_INTERVAL_MS: u64 = 100;
const MAX_CONCURRENCY: usize = 8;
const MAX_RETRIES: u32 = 3;
const BACKOFF_UNIT_MS: u64 = 500;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Summary of a recorded activity as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Meters.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub moving_time: u64,
    /// Seconds.
    #[serde(default)]
    pub elapsed_time: u64,
    /// Meters.
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default, rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub sport_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_date_local: String,
    #[serde(default)]
    pub timezone: String,
    /// `[lat, lng]`; `None` for activities without GPS (manual entries).
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub end_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub map: Option<ActivityMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMap {
    pub id: String,
    #[serde(default)]
    pub summary_polyline: Option<String>,
    #[serde(default)]
    pub resource_state: u32,
}

/// Tokens returned by the OAuth token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds).
    pub expires_at: i64,
}

/// Application credentials used to refresh tokens.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl OAuthApp {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: OAUTH_TOKEN_URL.to_string(),
        }
    }

    /// Exchange a refresh token for a fresh token set.
    pub async fn refresh_access_token(&self, client: &Client, refresh_token: &str) -> Result<TokenSet, SceneError> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            client_id: &'a str,
            client_secret: &'a str,
            grant_type: &'a str,
            refresh_token: &'a str,
        }

        let body = RefreshRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "refresh_token",
            refresh_token,
        };

        let resp = client
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(SceneError::http)?;
        let tokens: TokenSet = decode_response(resp).await?;
        info!("[OAuth] Refreshed access token, expires at {}", tokens.expires_at);
        Ok(tokens)
    }
}

/// Tokens held for the signed-in athlete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is stale.
    pub expires_at: Option<i64>,
}

impl Credentials {
    /// The access token if it is still usable at `now`, `Ok(None)` if it
    /// must be refreshed first.
    pub fn current_token(&self, now: i64) -> Result<Option<&str>, SceneError> {
        let token = self.access_token.as_deref().ok_or(SceneError::NotAuthenticated)?;
        match self.expires_at {
            Some(expires_at) if expires_at < now => {
                if self.refresh_token.is_none() {
                    return Err(SceneError::RefreshTokenUnavailable);
                }
                Ok(None)
            }
            _ => Ok(Some(token)),
        }
    }

    /// Return a valid access token, refreshing it through `app` when expired.
    pub async fn ensure_valid_token(&mut self, app: &OAuthApp, client: &Client, now: i64) -> Result<String, SceneError> {
        if let Some(token) = self.current_token(now)? {
            return Ok(token.to_string());
        }

        let refresh_token = self.refresh_token.as_deref().ok_or(SceneError::RefreshTokenUnavailable)?;
        debug!("[OAuth] Access token expired at {:?}, refreshing", self.expires_at);
        let tokens = app.refresh_access_token(client, refresh_token).await?;

        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token);
        self.expires_at = Some(tokens.expires_at);
        Ok(tokens.access_token)
    }
}

/// Result of fetching one activity's streams in a batch.
#[derive(Debug, Clone)]
pub struct StreamFetchResult {
    pub activity_id: u64,
    pub streams: Option<ActivityStreams>,
    pub error: Option<String>,
}

impl StreamFetchResult {
    pub fn success(&self) -> bool {
        self.streams.is_some()
    }
}

/// Progress callback type
pub type ProgressCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Dispatch rate limiter - spaces out when requests START.
struct DispatchRateLimiter {
    next_dispatch: Mutex<Instant>,
    dispatched_count: AtomicU32,
    consecutive_429s: AtomicU32,
    interval: Duration,
    backoff_unit: Duration,
}

impl DispatchRateLimiter {
    fn new(interval: Duration) -> Self {
        Self::with_backoff(interval, Duration::from_millis(BACKOFF_UNIT_MS))
    }

    fn with_backoff(interval: Duration, backoff_unit: Duration) -> Self {
        Self {
            next_dispatch: Mutex::new(Instant::now()),
            dispatched_count: AtomicU32::new(0),
            consecutive_429s: AtomicU32::new(0),
            interval,
            backoff_unit,
        }
    }

    /// Wait for our dispatch slot. Each caller gets a unique slot
    /// spaced `interval` apart.
    async fn wait_for_dispatch_slot(&self) -> u32 {
        let (wait_duration, dispatch_num) = {
            let mut next = self.next_dispatch.lock().await;
            let now = Instant::now();

            let dispatch_at = if *next > now { *next } else { now };

            // Reserve the next slot for the next caller
            *next = dispatch_at + self.interval;

            let num = self.dispatched_count.fetch_add(1, Ordering::Relaxed) + 1;

            (dispatch_at.saturating_duration_since(now), num)
        };

        // Wait outside the lock
        if wait_duration > Duration::from_millis(5) {
            debug!("[Dispatch #{}] Waiting {:?} for slot", dispatch_num, wait_duration);
            tokio::time::sleep(wait_duration).await;
        }

        dispatch_num
    }

    fn record_success(&self) {
        self.consecutive_429s.store(0, Ordering::Relaxed);
    }

    fn record_429(&self) -> Duration {
        let count = self.consecutive_429s.fetch_add(1, Ordering::Relaxed) + 1;
        // Exponential backoff: 1s, 2s, 4s, 8s max
        let backoff = self.backoff_unit * (1 << count.min(4));
        warn!("[DispatchRateLimiter] Got 429! Consecutive: {}, backing off {:?}", count, backoff);
        backoff
    }

    /// Wait before retrying a transport failure or 5xx: 0.5s, 1s, 2s, ...
    fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit * (1 << attempt.saturating_sub(1).min(4))
    }
}

/// Authenticated Strava API client.
pub struct StravaClient {
    client: Client,
    auth_header: String,
    base_url: String,
    rate_limiter: Arc<DispatchRateLimiter>,
}

impl StravaClient {
    /// Create a client for the given access token.
    pub fn new(access_token: &str) -> Result<Self, SceneError> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_CONCURRENCY * 2)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SceneError::http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            auth_header: format!("Bearer {}", access_token),
            base_url: API_BASE_URL.to_string(),
            rate_limiter: Arc::new(DispatchRateLimiter::new(Duration::from_millis(DISPATCH_INTERVAL_MS))),
        })
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The underlying HTTP client, shared with token refresh.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One page of the athlete's activities, most recent first. A `per_page`
    /// of 0 uses [`DEFAULT_PER_PAGE`].
    pub async fn list_activities(&self, page: u32, per_page: u32) -> Result<Vec<ActivitySummary>, SceneError> {
        let url = self.url("athlete/activities");
        let query = [("page", page.max(1).to_string()), ("per_page", page_size(per_page).to_string())];
        self.get_json(&url, |req| req.query(&query)).await
    }

    /// Walk pages until one comes back short or `max_pages` is reached.
    pub async fn list_all_activities(&self, per_page: u32, max_pages: u32) -> Result<Vec<ActivitySummary>, SceneError> {
        let per_page = page_size(per_page);
        let mut all = Vec::new();

        for page in 1..=max_pages {
            let batch = self.list_activities(page, per_page).await?;
            let count = batch.len();
            all.extend(batch);
            debug!("[StravaClient] Page {} returned {} activities", page, count);
            if count < per_page as usize {
                break;
            }
        }

        info!("[StravaClient] Listed {} activities", all.len());
        Ok(all)
    }

    /// Detailed activity by id.
    pub async fn get_activity(&self, activity_id: u64) -> Result<ActivitySummary, SceneError> {
        let url = self.url(&format!("activities/{}", activity_id));
        self.get_json(&url, |req| req).await
    }

    /// Streams for an activity, keyed by type. An empty `types` slice
    /// requests [`StreamType::DEFAULT_SET`].
    pub async fn get_activity_streams(&self, activity_id: u64, types: &[StreamType]) -> Result<ActivityStreams, SceneError> {
        let types = if types.is_empty() { &StreamType::DEFAULT_SET[..] } else { types };
        let url = self.url(&format!("activities/{}/streams", activity_id));
        let query = [("keys", StreamType::join(types)), ("key_by_type", "true".to_string())];
        self.get_json(&url, |req| req.query(&query)).await
    }

    /// Fetch streams for multiple activities in parallel.
    pub async fn fetch_streams_batch(
        &self,
        activity_ids: Vec<u64>,
        types: &[StreamType],
        on_progress: Option<ProgressCallback>,
    ) -> Vec<StreamFetchResult> {
        use futures::stream::{self, StreamExt};

        let total = activity_ids.len() as u32;
        let completed = Arc::new(AtomicU32::new(0));

        info!(
            "[StravaClient] Starting stream fetch of {} activities (dispatch interval: {}ms, max concurrent: {})",
            total,
            self.rate_limiter.interval.as_millis(),
            MAX_CONCURRENCY
        );

        let start = Instant::now();

        let results: Vec<StreamFetchResult> = stream::iter(activity_ids)
            .map(|id| {
                let completed = Arc::clone(&completed);
                let callback = on_progress.clone();

                async move {
                    let result = match self.get_activity_streams(id, types).await {
                        Ok(streams) => StreamFetchResult { activity_id: id, streams: Some(streams), error: None },
                        Err(e) => {
                            warn!("[Fetch {}] {}", id, e);
                            StreamFetchResult { activity_id: id, streams: None, error: Some(e.to_string()) }
                        }
                    };

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("[Progress] {}/{} done@{:.2}s", done, total, start.elapsed().as_secs_f64());
                    if let Some(ref cb) = callback {
                        cb(done, total);
                    }

                    result
                }
            })
            .buffer_unordered(MAX_CONCURRENCY)
            .collect()
            .await;

        let success_count = results.iter().filter(|r| r.success()).count();
        info!(
            "[StravaClient] DONE: {}/{} success ({} errors) in {:.2}s",
            success_count,
            total,
            results.len() - success_count,
            start.elapsed().as_secs_f64()
        );

        results
    }

    /// GET with rate limiting. 429s, 5xx and transport errors are retried
    /// up to `MAX_RETRIES` times.
    async fn get_json<T, F>(&self, url: &str, build: F) -> Result<T, SceneError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let mut retries = 0;

        loop {
            let dispatch_num = self.rate_limiter.wait_for_dispatch_slot().await;
            let req_start = Instant::now();

            let request = build(self.client.get(url).header("Authorization", self.auth_header.as_str()));

            let result = match request.send().await {
                Ok(resp) => {
                    if resp.status() != StatusCode::TOO_MANY_REQUESTS {
                        self.rate_limiter.record_success();
                    }
                    decode_response(resp).await
                }
                Err(e) => Err(SceneError::http(e)),
            };

            let err = match result {
                Ok(value) => {
                    debug!("[Fetch #{}] {} in {:?}", dispatch_num, url, req_start.elapsed());
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };

            let rate_limited = matches!(err, SceneError::Status { status: 429, .. });
            retries += 1;
            if retries > MAX_RETRIES {
                if rate_limited {
                    return Err(SceneError::Status {
                        status: 429,
                        message: "Max retries exceeded".to_string(),
                    });
                }
                return Err(err);
            }

            let wait = if rate_limited {
                self.rate_limiter.record_429()
            } else {
                self.rate_limiter.retry_delay(retries)
            };
            warn!("[Fetch #{}] {} for {}, retry {} after {:?}", dispatch_num, err, url, retries, wait);
            tokio::time::sleep(wait).await;
        }
    }
}

fn page_size(per_page: u32) -> u32 {
    if per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        per_page
    }
}

async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SceneError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(SceneError::Status { status: status.as_u16(), message });
    }

    let bytes = resp.bytes().await.map_err(SceneError::http)?;
    Ok(serde_json::from_slice(&bytes)?)
}
