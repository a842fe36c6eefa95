//! Client for the payment platform's Terminal and PaymentIntent endpoints.
//!
//! Every call is a single request/response exchange; reader and payment
//! state live on the remote side and are returned as-is. POST requests carry
//! an `Idempotency-Key` so that retried attempts cannot double-apply.

pub mod error;
pub mod types;

use std::{fmt, sync::Arc, time::Duration};

use reqwest::{
    Method, StatusCode, Url,
    header::{HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::config::{AppInfo, StripeConfig};

pub use error::{ApiErrorDetail, Error};
pub use types::{
    CreatePaymentIntent, List, ListReadersParams, PaymentIntent, PresentPaymentMethod, Reader,
    ReaderAction,
};

pub type Result<T> = std::result::Result<T, Error>;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: StripeConfig,
    client_user_agent: String,
}

impl fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.inner.config.api_base.as_str())
            .field("api_version", &self.inner.config.api_version)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

struct RequestSpec {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    idempotency_key: Option<String>,
}

impl RequestSpec {
    fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            query: Vec::new(),
            form: Vec::new(),
            idempotency_key: None,
        }
    }

    fn post(url: Url, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            url,
            query: Vec::new(),
            form,
            idempotency_key: None,
        }
    }
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent(&config.app_info))
            .build()?;
        let client_user_agent = client_user_agent(&config.app_info);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                client_user_agent,
            }),
        })
    }

    pub async fn list_readers(&self, params: &ListReadersParams) -> Result<List<Reader>> {
        let mut spec = RequestSpec::get(self.endpoint(&["terminal", "readers"])?);
        spec.query = params.to_query();
        self.execute(spec).await
    }

    pub async fn retrieve_reader(&self, reader_id: &str) -> Result<Reader> {
        let url = self.endpoint(&["terminal", "readers", reader_id])?;
        self.execute(RequestSpec::get(url)).await
    }

    /// Hands a PaymentIntent off to a reader so the device prompts for a card.
    pub async fn process_payment_intent(
        &self,
        reader_id: &str,
        payment_intent_id: &str,
    ) -> Result<Reader> {
        let url = self.endpoint(&["terminal", "readers", reader_id, "process_payment_intent"])?;
        let form = vec![("payment_intent".to_string(), payment_intent_id.to_string())];
        self.execute(RequestSpec::post(url, form)).await
    }

    /// Presents a test card on a simulated reader. Only valid with test keys.
    pub async fn present_payment_method(
        &self,
        reader_id: &str,
        params: &PresentPaymentMethod,
    ) -> Result<Reader> {
        let url = self.endpoint(&[
            "test_helpers",
            "terminal",
            "readers",
            reader_id,
            "present_payment_method",
        ])?;
        self.execute(RequestSpec::post(url, params.to_form())).await
    }

    /// Resets the reader to idle. In-flight payments are not canceled.
    pub async fn cancel_action(&self, reader_id: &str) -> Result<Reader> {
        let url = self.endpoint(&["terminal", "readers", reader_id, "cancel_action"])?;
        self.execute(RequestSpec::post(url, Vec::new())).await
    }

    pub async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent> {
        let url = self.endpoint(&["payment_intents"])?;
        let mut spec = RequestSpec::post(url, params.to_form());
        spec.idempotency_key = idempotency_key.map(str::to_string);
        self.execute(spec).await
    }

    pub async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let url = self.endpoint(&["payment_intents", payment_intent_id])?;
        self.execute(RequestSpec::get(url)).await
    }

    pub async fn capture_payment_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let url = self.endpoint(&["payment_intents", payment_intent_id, "capture"])?;
        self.execute(RequestSpec::post(url, Vec::new())).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.inner.config.api_base.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let config = &self.inner.config;
        let idempotency_key = (spec.method == Method::POST).then(|| {
            spec.idempotency_key
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string())
        });

        let mut attempt = 0;
        loop {
            tracing::debug!(
                method = %spec.method,
                path = spec.url.path(),
                attempt,
                "calling payment api"
            );

            let mut request = self
                .inner
                .http
                .request(spec.method.clone(), spec.url.clone())
                .bearer_auth(&config.secret_key)
                .header("Stripe-Version", &config.api_version)
                .header("X-Stripe-Client-User-Agent", &self.inner.client_user_agent);
            if !spec.query.is_empty() {
                request = request.query(&spec.query);
            }
            if spec.method == Method::POST {
                request = request.form(&spec.form);
            }
            if let Some(key) = &idempotency_key {
                request = request.header("Idempotency-Key", key);
            }

            let outcome = request.send().await;
            let retryable = match &outcome {
                Ok(response) => should_retry(response.status(), response.headers()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };

            if retryable && attempt < config.max_network_retries {
                attempt += 1;
                let delay = retry_delay(config.initial_retry_delay, attempt);
                tracing::warn!(
                    path = spec.url.path(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying payment api request"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let response = outcome?;
            let status = response.status();
            let body = response.bytes().await?;

            if !status.is_success() {
                let err = Error::from_response(status, &body);
                tracing::warn!(%status, path = spec.url.path(), error = %err, "payment api error");
                return Err(err);
            }

            return Ok(serde_json::from_slice(&body)?);
        }
    }
}

impl ListReadersParams {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        let filters = [
            ("location", &self.location),
            ("device_type", &self.device_type),
            ("status", &self.status),
        ];
        for (name, value) in filters {
            if let Some(value) = value {
                query.push((name.to_string(), value.clone()));
            }
        }
        query
    }
}

/// Whether a response is worth another attempt. The platform's
/// `Stripe-Should-Retry` header overrides the status-based rule.
pub(crate) fn should_retry(status: StatusCode, headers: &HeaderMap) -> bool {
    match headers
        .get("stripe-should-retry")
        .and_then(|v: &HeaderValue| v.to_str().ok())
    {
        Some("true") => true,
        Some("false") => false,
        _ => status == StatusCode::CONFLICT || status.is_server_error(),
    }
}

pub(crate) fn retry_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    initial.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

fn user_agent(app: &AppInfo) -> String {
    format!(
        "terminal-api/{} {}/{} ({})",
        env!("CARGO_PKG_VERSION"),
        app.name,
        app.version,
        app.url
    )
}

fn client_user_agent(app: &AppInfo) -> String {
    json!({
        "bindings_version": env!("CARGO_PKG_VERSION"),
        "lang": "rust",
        "publisher": "terminal-api",
        "application": {
            "name": app.name,
            "version": app.version,
            "url": app.url,
        },
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_retry_header_wins_over_status() {
        let mut headers = HeaderMap::new();
        assert!(should_retry(StatusCode::CONFLICT, &headers));
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE, &headers));
        assert!(!should_retry(StatusCode::BAD_REQUEST, &headers));
        assert!(!should_retry(StatusCode::TOO_MANY_REQUESTS, &headers));

        headers.insert("stripe-should-retry", HeaderValue::from_static("false"));
        assert!(!should_retry(StatusCode::SERVICE_UNAVAILABLE, &headers));

        headers.insert("stripe-should-retry", HeaderValue::from_static("true"));
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS, &headers));
    }

    #[test]
    fn retry_delay_doubles_then_caps() {
        let initial = Duration::from_millis(500);
        assert_eq!(retry_delay(initial, 1), Duration::from_millis(500));
        assert_eq!(retry_delay(initial, 2), Duration::from_secs(1));
        assert_eq!(retry_delay(initial, 3), Duration::from_secs(2));
        assert_eq!(retry_delay(initial, 5), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(initial, 40), MAX_RETRY_DELAY);
    }

    #[test]
    fn endpoint_encodes_ids_as_single_segments() {
        let config = StripeConfig::new("sk_test", Url::parse("https://api.stripe.com").unwrap());
        let client = StripeClient::new(config).unwrap();

        let url = client.endpoint(&["terminal", "readers", "tmr/../x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.stripe.com/v1/terminal/readers/tmr%2F..%2Fx"
        );
    }

    #[test]
    fn list_readers_query_skips_unset_filters() {
        let params = ListReadersParams {
            limit: Some(3),
            device_type: Some("simulated_wisepos_e".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query(),
            vec![
                ("limit".to_string(), "3".to_string()),
                ("device_type".to_string(), "simulated_wisepos_e".to_string()),
            ]
        );
    }

    #[test]
    fn debug_output_hides_secret_key() {
        let config = StripeConfig::new(
            "sk_test_secret",
            Url::parse("https://api.stripe.com").unwrap(),
        );
        let client = StripeClient::new(config).unwrap();
        assert!(!format!("{client:?}").contains("sk_test_secret"));
    }
}
