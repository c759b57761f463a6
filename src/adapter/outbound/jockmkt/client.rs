//! Jock MKT REST API client.
//!
//! Every call carries a bearer token obtained with the account's API key
//! pair. Tokens are cached per client and refreshed once expired. Server
//! errors (5xx) are retried on the configured backoff schedule; a rate-limited
//! order waits for the next clock minute and is submitted once more.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Timelike, Utc};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::dto::{ErrorBody, OrderForm, OrderRequest, TokenBody, TokenResponse};
use super::settings::ApiConfig;
use crate::domain::{decode_as, Balance, Event, Order, Position, RequiredArg, Topic, Tradeable};
use crate::error::{ApiError, Error, Result};
use crate::infrastructure::config::settings::Credentials;
use crate::port::TokenProvider;

/// A bearer token and its expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at_ms: i64,
}

impl CachedToken {
    fn is_fresh(&self, now_ms: i64) -> bool {
        self.expires_at_ms > now_ms
    }
}

impl From<TokenBody> for CachedToken {
    fn from(body: TokenBody) -> Self {
        Self {
            access_token: body.access_token,
            expires_at_ms: body.expired_at,
        }
    }
}

/// HTTP client for the Jock MKT REST API.
pub struct JockmktClient {
    http: HttpClient,
    config: ApiConfig,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

impl JockmktClient {
    #[must_use]
    pub fn new(config: ApiConfig, credentials: Credentials) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            config,
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when the key pair is rejected.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now_ms = Utc::now().timestamp_millis();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now_ms)) {
            return Ok(token.access_token.clone());
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let url = self.config.endpoint("oauth/tokens");
        info!(url = %url, "Requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("key", self.credentials.api_key.as_str()),
            ("secret", self.credentials.secret.as_str()),
        ];
        let response = self.http.post(&url).form(&form).send().await?;
        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|err| {
            Error::Unauthorized(format!("unreadable token response ({status}): {err}"))
        })?;

        if !status.is_success() || body.status.as_deref() == Some("error") {
            return Err(Error::Unauthorized(
                body.message
                    .unwrap_or_else(|| format!("token request failed with {status}")),
            ));
        }
        let token = body
            .token
            .ok_or_else(|| Error::Unauthorized("token response carried no token".into()))?;
        debug!(expires_at_ms = token.expired_at, "Obtained access token");
        Ok(token.into())
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }

    /// Send an authenticated request and return the parsed JSON body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        form: Option<&OrderForm>,
    ) -> Result<Map<String, Value>> {
        let url = self.config.endpoint(path);
        let mut server_errors = 0usize;
        let mut rate_limited = false;

        loop {
            let token = self.access_token().await?;
            let mut request = self.http.request(method.clone(), &url).bearer_auth(&token);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(form) = form {
                request = request.form(form);
            }

            debug!(method = %method, url = %url, "Sending request");
            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS
                && form.is_some()
                && self.config.order_rate_limit_retry
                && !rate_limited
            {
                rate_limited = true;
                let wait = until_next_minute(Utc::now().second());
                warn!(wait_secs = wait.as_secs(), "Order rate limit reached, waiting for next minute");
                sleep(wait).await;
                continue;
            }

            if status.is_server_error() {
                if let Some(&delay_ms) = self.config.server_error_backoff_ms.get(server_errors) {
                    server_errors += 1;
                    warn!(
                        status = status.as_u16(),
                        attempt = server_errors,
                        delay_ms,
                        "Server error, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                    continue;
                }
            }

            if status == StatusCode::UNAUTHORIZED {
                self.forget_token().await;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let err = api_error(status, &text);
                if status == StatusCode::UNAUTHORIZED {
                    return Err(Error::Unauthorized(err.message));
                }
                return Err(err.into());
            }

            return Ok(response.json::<Map<String, Value>>().await?);
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Map<String, Value>> {
        self.request(Method::GET, path, query, None).await
    }

    /// The account record.
    pub async fn get_account(&self) -> Result<Map<String, Value>> {
        let mut body = self.get("account", &[]).await?;
        match body.remove("account") {
            Some(Value::Object(account)) => Ok(account),
            _ => Err(missing_field("account")),
        }
    }

    pub async fn get_balances(&self) -> Result<Vec<Balance>> {
        let body = self.get("balances", &[]).await?;
        field(body, "balances")
    }

    /// An event with its tradeables (including entities), games and payouts.
    pub async fn get_event(&self, event_id: &str) -> Result<Event> {
        let query = [("include", include_list(&["tradeables.entity", "games", "payouts"]))];
        let body = self.get(&format!("events/{event_id}"), &query).await?;
        field(body, "event")
    }

    pub async fn get_event_tradeables(&self, event_id: &str) -> Result<Vec<Tradeable>> {
        let body = self.get(&format!("events/{event_id}/tradeables"), &[]).await?;
        field(body, "tradeables")
    }

    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let body = self.get("positions", &[]).await?;
        field(body, "positions")
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let body = self.get(&format!("orders/{order_id}"), &[]).await?;
        field(body, "order")
    }

    /// Submit a limit order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] before any request is sent when the
    /// order cannot be expressed, otherwise API and transport errors.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<Order> {
        let form = order.to_form()?;
        info!(
            tradeable_id = %form.tradeable_id,
            side = %form.side,
            phase = %form.phase,
            quantity = %form.quantity,
            limit_price = %form.limit_price,
            "Placing order"
        );
        let body = self.request(Method::POST, "orders", &[], Some(&form)).await?;
        field(body, "order")
    }

    /// Cancel an order; returns the raw response body.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Map<String, Value>> {
        info!(order_id = %order_id, "Cancelling order");
        self.request(Method::DELETE, &format!("orders/{order_id}"), &[], None)
            .await
    }

    /// Streaming topics and the argument each requires.
    #[must_use]
    pub fn ws_topics() -> Vec<(Topic, Option<RequiredArg>)> {
        Topic::ALL
            .into_iter()
            .map(|topic| (topic, topic.required_arg()))
            .collect()
    }
}

/// A lightweight authenticated call proves the token works before the
/// streaming handshake uses it.
#[async_trait]
impl TokenProvider for JockmktClient {
    async fn bearer_token(&self) -> Result<String> {
        self.get_account().await?;
        self.access_token().await
    }
}

fn field<T: DeserializeOwned>(mut body: Map<String, Value>, key: &str) -> Result<T> {
    let value = body.remove(key).ok_or_else(|| missing_field(key))?;
    decode_as(key, value)
}

fn missing_field(key: &str) -> Error {
    Error::Decode {
        tag: key.to_string(),
        reason: "field missing from response".into(),
    }
}

/// Build an [`ApiError`] from a non-2xx response body.
fn api_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    ApiError {
        status: status.as_u16(),
        code: parsed.error.unwrap_or_else(|| "unknown".into()),
        message: parsed.message.unwrap_or_else(|| body.to_string()),
    }
}

/// The `include` parameter is a bracketed list of quoted names.
fn include_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn until_next_minute(second: u32) -> Duration {
    Duration::from_secs(u64::from(60 - second.min(59)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_token_expires_at_deadline() {
        let token = CachedToken {
            access_token: "t".into(),
            expires_at_ms: 1_000,
        };
        assert!(token.is_fresh(999));
        assert!(!token.is_fresh(1_000));
    }

    #[test]
    fn api_error_reads_code_and_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"status": "error", "error": "insufficient_funds", "message": "not enough"}"#,
        );
        assert_eq!(err.status, 400);
        assert_eq!(err.code, "insufficient_funds");
        assert_eq!(err.message, "not enough");
        assert!(err.hint().is_some());
    }

    #[test]
    fn api_error_keeps_unparseable_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.code, "unknown");
        assert_eq!(err.message, "<html>bad gateway</html>");
    }

    #[test]
    fn include_list_renders_bracketed_names() {
        assert_eq!(include_list(&["games", "payouts"]), "['games', 'payouts']");
    }

    #[test]
    fn waits_until_top_of_minute() {
        assert_eq!(until_next_minute(0), Duration::from_secs(60));
        assert_eq!(until_next_minute(45), Duration::from_secs(15));
        assert_eq!(until_next_minute(60), Duration::from_secs(1));
    }

    #[test]
    fn topic_table_lists_required_arguments() {
        let topics = JockmktClient::ws_topics();
        assert_eq!(topics.len(), 5);
        assert!(topics.contains(&(Topic::Games, Some(RequiredArg::League))));
        assert!(topics.contains(&(Topic::Account, None)));
    }

    #[test]
    fn field_decodes_typed_payload() {
        let mut body = Map::new();
        body.insert(
            "balances".into(),
            serde_json::json!([{"currency": "usd", "buying_power": 12}]),
        );
        let balances: Vec<Balance> = field(body, "balances").unwrap();
        assert_eq!(balances[0].currency, "usd");

        let err = field::<Vec<Balance>>(Map::new(), "balances").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_an_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_ms: 500,
            connect_timeout_ms: 500,
            ..ApiConfig::default()
        };
        let client = JockmktClient::new(config, Credentials::new("k", "s"));
        assert!(client.access_token().await.is_err());
    }
}
