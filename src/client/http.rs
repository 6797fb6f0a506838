//! REST transport for the `googleAds:search` endpoint

use crate::core::config::AdsConfig;
use crate::core::error::{ClientError, QueryError};
use crate::core::traits::{SearchPage, SearchRequest, SearchTransport};
use crate::security::mask_secrets_in_string;
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Body of a search call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

/// Google API error envelope: `{"error": {"code", "message", "status", "details"}}`
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<Value>,
}

/// reqwest-backed transport
pub struct HttpSearchTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSearchTransport {
    pub fn new(cfg: &AdsConfig) -> Result<Self, ClientError> {
        let endpoint = cfg.api_endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ClientError::InvalidField {
                field: "api_endpoint",
                message: format!("'{}' is not an http(s) URL", cfg.api_endpoint),
            });
        }
        if cfg.api_version.trim().is_empty() {
            return Err(ClientError::MissingField("api_version"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .user_agent(concat!("ads-reporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidField {
                field: "request_timeout_secs",
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: format!("{}/{}", endpoint, cfg.api_version.trim()),
        })
    }

    fn search_url(&self, customer_id: &str) -> String {
        format!("{}/customers/{}/googleAds:search", self.base_url, customer_id)
    }
}

#[async_trait]
impl SearchTransport for HttpSearchTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn search_page(&self, request: &SearchRequest) -> Result<SearchPage, QueryError> {
        let url = self.search_url(&request.customer_id);
        tracing::debug!(%url, page_token = ?request.page_token, "search request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(request.access_token.expose_secret())
            .header("developer-token", request.developer_token.expose_secret())
            .header("login-customer-id", &request.login_customer_id)
            .json(&SearchBody {
                query: &request.query,
                page_token: request.page_token.as_deref(),
            })
            .send()
            .await
            .map_err(|e| {
                QueryError::Transport(mask_secrets_in_string(
                    &e.to_string(),
                    &[&request.access_token, &request.developer_token],
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status, &body, &request.customer_id));
        }

        Ok(response.json::<SearchPage>().await?)
    }
}

/// Classify a non-success response
pub(crate) fn map_error_response(status: StatusCode, body: &str, customer_id: &str) -> QueryError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let api_error = envelope.error;
    let message = if api_error.message.is_empty() {
        format!("HTTP {}", status)
    } else {
        api_error.message.clone()
    };

    let error_codes: Vec<&str> = api_error
        .details
        .iter()
        .filter_map(|detail| detail.get("errors").and_then(Value::as_array))
        .flatten()
        .filter_map(|err| err.get("errorCode").and_then(Value::as_object))
        .flat_map(|code| code.keys().map(String::as_str))
        .collect();

    let has_code = |name: &str| error_codes.iter().any(|c| *c == name);

    if status == StatusCode::FORBIDDEN
        || api_error.status == "PERMISSION_DENIED"
        || has_code("authorizationError")
    {
        return QueryError::AccountUnauthorized {
            account_id: customer_id.to_string(),
            message,
        };
    }

    if has_code("queryError")
        || (status == StatusCode::BAD_REQUEST && api_error.status == "INVALID_ARGUMENT")
    {
        return QueryError::InvalidQuery(message);
    }

    QueryError::Transport(message)
}
