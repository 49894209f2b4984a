//! Backend REST client with rate limiting.
//!
//! Provides typed access to the backend endpoints with automatic rate
//! limiting using the governor crate.
//!
//! # Example
//!
//! ```ignore
//! use parlay_client::{ApiClient, ApiClientConfig, EventFilters};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new(ApiClientConfig::default())?;
//!
//!     let events = client.random_events(4, &EventFilters::default(), &[]).await?;
//!     println!("Fetched {} events", events.len());
//!
//!     Ok(())
//! }
//! ```

use crate::auth::BearerAuth;
use crate::error::{ApiError, Result};
use crate::types::{
    BetRecommendation, Coupon, EventFilters, NewRecommendation, NewTipsterTier,
    RawUserWithSubscription, RecommendationUpdate, SubscriptionPlan, TipsterSummary, TipsterTier, TipsterTierUpdate,
};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use parlay_core::{ApiConfig, BettingEvent, CouponDraft, EventId, League, Sport, UserSession};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

/// Default backend base URL (local development server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the backend client.
#[derive(Debug)]
pub struct ApiClientConfig {
    /// Base URL for the API, without trailing slash.
    pub base_url: String,

    /// Session token. Public endpoints work without one.
    pub auth: Option<BearerAuth>,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: None,
            requests_per_minute: nonzero!(120u32),
            timeout_secs: 30,
        }
    }
}

impl ApiClientConfig {
    /// Builds a client configuration from the application config.
    ///
    /// The token comes from `api.token` or, failing that, `PARLAY_API_TOKEN`.
    #[must_use]
    pub fn from_app(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            auth: BearerAuth::resolve(api.token.as_deref()),
            requests_per_minute: NonZeroU32::new(api.requests_per_minute)
                .unwrap_or(nonzero!(120u32)),
            timeout_secs: api.timeout_secs,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the session token.
    #[must_use]
    pub fn with_auth(mut self, auth: BearerAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// `{"detail": "..."}` acknowledgement body.
#[derive(Debug, Deserialize)]
struct DetailResponse {
    detail: String,
}

/// Whether a request must carry the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Backend REST API client.
///
/// All requests are rate-limited. Endpoints that need a session fail with
/// [`ApiError::Unauthorized`] before sending anything when no token is set.
pub struct ApiClient {
    /// Configuration.
    config: ApiClientConfig,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.config.auth.is_some())
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// Creates a client from the application config.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn from_app(api: &ApiConfig) -> Result<Self> {
        Self::new(ApiClientConfig::from_app(api))
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// True if a session token is configured.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.config.auth.is_some()
    }

    /// Attaches the session cookie and bearer header when a token is set.
    fn authorize(&self, request: RequestBuilder, access: Access) -> Result<RequestBuilder> {
        match (access, &self.config.auth) {
            (_, Some(auth)) => Ok(request
                .header(reqwest::header::COOKIE, auth.cookie_value())
                .header(reqwest::header::AUTHORIZATION, auth.header_value())),
            (Access::Public, None) => Ok(request),
            (Access::Authenticated, None) => Err(ApiError::Unauthorized(
                "no API token configured".to_string(),
            )),
        }
    }

    /// Waits for rate limiter and makes a GET request.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        access: Access,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self
            .authorize(self.http.get(&url), access)?
            .header("Accept", "application/json")
            .query(query);

        self.rate_limiter.until_ready().await;
        tracing::debug!("GET {} params={}", url, query.len());

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Waits for rate limiter and makes a POST request with a JSON body.
    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    /// Waits for rate limiter and makes a PATCH request with a JSON body.
    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(reqwest::Method::PATCH, path, body).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let body_json = serde_json::to_string(body)?;
        let request = self
            .authorize(self.http.request(method.clone(), &url), Access::Authenticated)?
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(body_json.clone());

        self.rate_limiter.until_ready().await;
        tracing::debug!("{} {} body_len={}", method, url, body_json.len());

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Waits for rate limiter and makes an authenticated DELETE request,
    /// discarding the response body.
    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.send_delete(path).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }

    /// Authenticated DELETE that decodes the response body.
    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send_delete(path).await?;
        self.handle_response(response).await
    }

    async fn send_delete(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self
            .authorize(self.http.delete(&url), Access::Authenticated)?
            .header("Accept", "application/json");

        self.rate_limiter.until_ready().await;
        tracing::debug!("DELETE {}", url);

        Ok(request.send().await?)
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Converts a non-success response into an [`ApiError`].
    async fn error_for(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ApiError::rate_limit(retry_after);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status, "request failed: {}", text);
        ApiError::from_status(status, text)
    }

    // =========================================================================
    // Bet Event Endpoints
    // =========================================================================

    /// Fetches up to `limit` random events matching `filters`, none of whose
    /// ids are in `exclude_ids`.
    ///
    /// `exclude_ids` is sent comma-joined and omitted when empty, as are
    /// unset filters.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn random_events(
        &self,
        limit: usize,
        filters: &EventFilters,
        exclude_ids: &[EventId],
    ) -> Result<Vec<BettingEvent>> {
        let mut query = vec![("limit", limit.to_string())];
        query.extend(filters.query_pairs());
        if !exclude_ids.is_empty() {
            let joined = exclude_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("exclude_ids", joined));
        }

        self.get("/bet-events/random", &query, Access::Public).await
    }

    /// Gets a specific event by id.
    ///
    /// # Errors
    /// Returns [`ApiError::NotFound`] for unknown ids, or any other API error.
    pub async fn bet_event(&self, id: EventId) -> Result<BettingEvent> {
        self.get(&format!("/bet-events/{id}"), &[], Access::Public)
            .await
    }

    // =========================================================================
    // Sports and Leagues
    // =========================================================================

    /// Lists all sports.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn sports(&self) -> Result<Vec<Sport>> {
        self.get("/sports/", &[], Access::Public).await
    }

    /// Lists leagues, optionally of one sport.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn leagues(&self, sport_id: Option<i64>) -> Result<Vec<League>> {
        let query: Vec<(&str, String)> = sport_id
            .map(|id| ("sport_id", id.to_string()))
            .into_iter()
            .collect();
        self.get("/leagues/", &query, Access::Public).await
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Saves a parlay as a coupon.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn create_coupon(&self, draft: &CouponDraft) -> Result<Coupon> {
        let coupon: Coupon = self.post("/coupons/", draft).await?;
        tracing::info!(coupon_id = coupon.id, events = draft.bet_event_ids.len(), "saved coupon");
        Ok(coupon)
    }

    /// Lists the current user's coupons.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn my_coupons(&self) -> Result<Vec<Coupon>> {
        self.get("/coupons/", &[], Access::Authenticated).await
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Loads the current user and their subscription.
    ///
    /// Returns `Ok(None)` when there is no token or the backend rejects it.
    ///
    /// # Errors
    /// Returns error for any failure other than a rejected session.
    pub async fn current_user(&self) -> Result<Option<UserSession>> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        match self
            .get::<RawUserWithSubscription>("/subscriptions/me", &[], Access::Authenticated)
            .await
        {
            Ok(raw) => Ok(Some(UserSession::from(raw))),
            Err(ApiError::Unauthorized(reason)) => {
                tracing::debug!("session rejected: {}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Lists available subscription plans.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn subscription_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        self.get("/subscriptions/plans", &[], Access::Public).await
    }

    // =========================================================================
    // Tipsters
    // =========================================================================

    /// Lists public tipster profiles.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn tipsters(&self) -> Result<Vec<TipsterSummary>> {
        self.get("/tipsters/", &[], Access::Public).await
    }

    /// Follows a tipster. Returns the backend's acknowledgement.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn follow(&self, tipster_id: i64) -> Result<String> {
        let ack: DetailResponse = self
            .post(&format!("/tipsters/{tipster_id}/follow"), &serde_json::json!({}))
            .await?;
        Ok(ack.detail)
    }

    /// Unfollows a tipster. Returns the backend's acknowledgement.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn unfollow(&self, tipster_id: i64) -> Result<String> {
        let ack: DetailResponse = self
            .delete_json(&format!("/tipsters/{tipster_id}/follow"))
            .await?;
        Ok(ack.detail)
    }

    /// Ids of tipsters the current user follows.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn followed_ids(&self) -> Result<Vec<i64>> {
        self.get("/tipsters/following/ids", &[], Access::Authenticated)
            .await
    }

    /// Tiers of the current tipster.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn my_tiers(&self) -> Result<Vec<TipsterTier>> {
        self.get("/tipsters/me/tiers", &[], Access::Authenticated)
            .await
    }

    /// Creates a tier after local validation.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for an ill-formed tier, or any
    /// API error.
    pub async fn create_tier(&self, tier: NewTipsterTier) -> Result<TipsterTier> {
        let tier = tier.validated()?;
        self.post("/tipsters/me/tiers", &tier).await
    }

    /// Partially updates a tier.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for an empty update, or any API
    /// error.
    pub async fn update_tier(&self, tier_id: i64, update: &TipsterTierUpdate) -> Result<TipsterTier> {
        if update.is_empty() {
            return Err(ApiError::InvalidRequest("nothing to update".to_string()));
        }
        self.patch(&format!("/tipsters/me/tiers/{tier_id}"), update)
            .await
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    /// Recommendations published by the current tipster.
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn my_recommendations(&self) -> Result<Vec<BetRecommendation>> {
        self.get("/tipsters/me/recommendations", &[], Access::Authenticated)
            .await
    }

    /// Publishes a recommendation.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for a negative stake, or any API
    /// error.
    pub async fn create_recommendation(
        &self,
        recommendation: &NewRecommendation,
    ) -> Result<BetRecommendation> {
        recommendation.validate()?;
        self.post("/tipsters/me/recommendations", recommendation)
            .await
    }

    /// Edits a recommendation.
    ///
    /// Like [`Self::delete_recommendation`], this does not check the edit
    /// window.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] for an empty update or a negative
    /// stake, or any API error.
    pub async fn update_recommendation(
        &self,
        recommendation_id: i64,
        update: &RecommendationUpdate,
    ) -> Result<BetRecommendation> {
        update.validate()?;
        self.patch(
            &format!("/tipsters/me/recommendations/{recommendation_id}"),
            update,
        )
        .await
    }

    /// Deletes a recommendation.
    ///
    /// This does not check the edit window; see
    /// [`BetRecommendation::can_modify`].
    ///
    /// # Errors
    /// Returns error if not authenticated or the API call fails.
    pub async fn delete_recommendation(&self, recommendation_id: i64) -> Result<()> {
        self.delete(&format!("/tipsters/me/recommendations/{recommendation_id}"))
            .await
    }
}
