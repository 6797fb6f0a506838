//! Configuration structures for ads-reporter
//!
//! [`ConfigFile`] is the partial, serde-friendly layer read from YAML, the
//! environment and CLI flags. [`AdsConfig`] is the resolved, immutable
//! configuration handed to the rest of the pipeline.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// OAuth scope required by the Google Ads API
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Default API host
pub const DEFAULT_API_ENDPOINT: &str = "https://googleads.googleapis.com";

/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v19";

/// Default service account key file name
pub const DEFAULT_SERVICE_ACCOUNT_FILE: &str = "service-account-key.json";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// One configuration layer; every field is optional so layers can be merged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_token: Option<String>,

    /// Manager account the requests are made on behalf of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_customer_id: Option<String>,

    /// Account the reports are run against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Overlay `source` on top of `self`; fields set in `source` win
    pub fn merge(&mut self, source: ConfigFile) {
        if source.developer_token.is_some() {
            self.developer_token = source.developer_token;
        }
        if source.login_customer_id.is_some() {
            self.login_customer_id = source.login_customer_id;
        }
        if source.customer_id.is_some() {
            self.customer_id = source.customer_id;
        }
        if source.service_account_file.is_some() {
            self.service_account_file = source.service_account_file;
        }
        if source.scopes.is_some() {
            self.scopes = source.scopes;
        }
        if source.api_endpoint.is_some() {
            self.api_endpoint = source.api_endpoint;
        }
        if source.api_version.is_some() {
            self.api_version = source.api_version;
        }
        if source.request_timeout_secs.is_some() {
            self.request_timeout_secs = source.request_timeout_secs;
        }
    }

    /// Resolve into the immutable configuration, filling defaults
    ///
    /// Missing required fields resolve to empty strings; the client factory
    /// reports them as `ClientError::MissingField`.
    pub fn resolve(self) -> AdsConfig {
        let scopes = self
            .scopes
            .map(|s| {
                s.into_iter()
                    .map(|scope| scope.trim().to_string())
                    .filter(|scope| !scope.is_empty())
                    .collect::<BTreeSet<_>>()
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| BTreeSet::from([ADWORDS_SCOPE.to_string()]));

        AdsConfig {
            developer_token: SecretString::new(self.developer_token.unwrap_or_default().into()),
            login_customer_id: self.login_customer_id.unwrap_or_default(),
            customer_id: self.customer_id.unwrap_or_default(),
            service_account_file: self
                .service_account_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVICE_ACCOUNT_FILE)),
            scopes,
            api_endpoint: self
                .api_endpoint
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Resolved configuration, built once at startup and passed by reference
pub struct AdsConfig {
    pub developer_token: SecretString,
    pub login_customer_id: String,
    pub customer_id: String,
    pub service_account_file: PathBuf,
    pub scopes: BTreeSet<String>,
    pub api_endpoint: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for AdsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdsConfig")
            .field(
                "developer_token",
                &crate::security::mask_token(self.developer_token.expose_secret()),
            )
            .field("login_customer_id", &self.login_customer_id)
            .field("customer_id", &self.customer_id)
            .field("service_account_file", &self.service_account_file)
            .field("scopes", &self.scopes)
            .field("api_endpoint", &self.api_endpoint)
            .field("api_version", &self.api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
