//! Marketplace REST API client.
//!
//! Every request carries the session's bearer credential. Reads are retried
//! on timeouts and connection failures; writes are sent once, since a
//! repeated mutation could land twice.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::ErrorBody;
use crate::domain::{Listing, ListingDraft, ListingId, UserId, UserProfile};
use crate::error::{ApiError, ConfigError, Error, Result};
use crate::infrastructure::config::Config;
use crate::port::{MarketplaceApi, SessionContext, StatusChange};

/// HTTP implementation of [`MarketplaceApi`].
pub struct HttpMarketplaceApi {
    http: HttpClient,
    base_url: Url,
    session: Arc<dyn SessionContext>,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl HttpMarketplaceApi {
    /// Client with reqwest defaults and no retries.
    #[must_use]
    pub fn new(base_url: Url, session: Arc<dyn SessionContext>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
            session,
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }

    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &Config, session: Arc<dyn SessionContext>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            base_url: config.base_url()?,
            session,
            retry_max_attempts: config.http.retry_max_attempts,
            retry_backoff_ms: config.http.retry_backoff_ms,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    #[allow(clippy::result_large_err)]
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidValue {
                field: "base_url",
                reason: "cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[allow(clippy::result_large_err)]
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self
            .session
            .credential()
            .ok_or(ApiError::Unauthenticated)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn get_with_retry<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.request(Method::GET, url.clone())?.send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = Self::check_status(response).await?;
            return Self::decode(response).await;
        }
    }

    async fn send<T>(&self, method: Method, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.request(method, url)?.send().await?;
        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, url)?.json(body).send().await?;
        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }

    /// Turn a non-success status into [`ApiError::Status`], keeping the
    /// body's `message` when it has one.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);
        debug!(status = status.as_u16(), message = ?message, "Request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| Error::Api(ApiError::Decode(err.to_string())))
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceApi {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        let url = self.endpoint(&["users", "profile"])?;
        info!(url = %url, "Fetching profile");
        self.get_with_retry(url).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        let url = self.endpoint(&["users", "profile"])?;
        info!(url = %url, "Saving profile");
        let response = self.request(Method::PUT, url)?.json(profile).send().await?;
        let response = Self::check_status(response).await?;
        // Some deployments answer with an acknowledgement instead of the
        // profile; the request still succeeded.
        match Self::decode::<UserProfile>(response).await {
            Ok(saved) => Ok(saved),
            Err(err) => {
                debug!(error = %err, "Profile save response not a profile");
                Ok(profile.clone())
            }
        }
    }

    async fn fetch_owned_listings(&self, owner: &UserId) -> Result<Vec<Listing>> {
        let mut url = self.endpoint(&["bikes"])?;
        url.query_pairs_mut().append_pair("owner", owner.as_str());
        info!(url = %url, "Fetching owned listings");
        self.get_with_retry(url).await
    }

    async fn delete_listing(&self, id: &ListingId) -> Result<()> {
        let url = self.endpoint(&["bikes", id.as_str()])?;
        info!(url = %url, "Deleting listing");
        let response = self.request(Method::DELETE, url)?.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn change_status(&self, id: &ListingId, change: StatusChange) -> Result<Listing> {
        let url = self.endpoint(&["bikes", id.as_str(), change.path_segment()])?;
        info!(url = %url, change = %change, "Changing listing status");
        self.send(Method::PATCH, url).await
    }

    async fn update_listing(&self, id: &ListingId, draft: &ListingDraft) -> Result<Listing> {
        let url = self.endpoint(&["bikes", id.as_str()])?;
        info!(url = %url, "Updating listing");
        self.send_json(Method::PUT, url, draft).await
    }

    async fn remove_buyer(&self, listing_id: &ListingId, buyer_id: &UserId) -> Result<Listing> {
        let url = self.endpoint(&["bikes", listing_id.as_str(), "book", buyer_id.as_str()])?;
        info!(url = %url, "Removing buyer");
        self.send(Method::DELETE, url).await
    }
}

impl std::fmt::Debug for HttpMarketplaceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMarketplaceApi")
            .field("base_url", &self.base_url.as_str())
            .field("retry_max_attempts", &self.retry_max_attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::session::StaticSession;

    fn client(base: &str) -> HttpMarketplaceApi {
        HttpMarketplaceApi::new(
            Url::parse(base).unwrap(),
            Arc::new(StaticSession::new(None, Some("t".into()))),
        )
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.endpoint(&["bikes", "a1", "sold"]).unwrap().as_str(),
            "http://localhost:5000/api/bikes/a1/sold"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let api = client("http://localhost:5000/api/");
        assert_eq!(
            api.endpoint(&["users", "profile"]).unwrap().as_str(),
            "http://localhost:5000/api/users/profile"
        );
    }

    #[test]
    fn endpoint_encodes_ids() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.endpoint(&["bikes", "a/1"]).unwrap().as_str(),
            "http://localhost:5000/api/bikes/a%2F1"
        );
    }

    #[test]
    fn from_config_uses_config_values() {
        let mut config = Config::default();
        config.http.retry_max_attempts = 5;
        config.api.base_url = "https://bikes.example.com/api".into();

        let api =
            HttpMarketplaceApi::from_config(&config, Arc::new(StaticSession::default())).unwrap();

        assert_eq!(api.retry_max_attempts, 5);
        assert_eq!(api.base_url().host_str(), Some("bikes.example.com"));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_sending() {
        let api = HttpMarketplaceApi::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Arc::new(StaticSession::default()),
        );
        let err = api.fetch_profile().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthenticated)));
    }
}
