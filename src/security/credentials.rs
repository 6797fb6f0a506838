//! Service-account credential provider
//!
//! Loads a Google service-account JSON key and turns it into an opaque
//! [`Credential`]. Bearer tokens are obtained with the OAuth 2.0 JWT-bearer
//! grant: an RS256-signed assertion is exchanged at the key's `token_uri`.

use crate::core::error::CredentialError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime accepted by the token endpoint
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Cached tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// On-disk service-account key format
#[derive(Deserialize)]
struct ServiceAccountKey {
    #[serde(rename = "type")]
    key_type: String,
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

struct ServiceAccountSigner {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

enum CredentialKind {
    ServiceAccount(ServiceAccountSigner),
    Static(SecretString),
}

/// Opaque, scoped proof of identity
///
/// Cloning shares the underlying signer and its token cache.
#[derive(Clone)]
pub struct Credential {
    kind: Arc<CredentialKind>,
    scopes: Arc<BTreeSet<String>>,
}

/// Load a service-account key file scoped to exactly `scopes`
///
/// No network call is made here; the key is parsed and test-signed so that a
/// malformed key is reported now rather than on first use.
pub fn load_credentials(
    source: &Path,
    scopes: &BTreeSet<String>,
) -> Result<Credential, CredentialError> {
    if !source.exists() {
        return Err(CredentialError::NotFound(source.to_path_buf()));
    }

    let content = std::fs::read_to_string(source)
        .map_err(|e| CredentialError::Invalid(format!("cannot read key file: {}", e)))?;

    let credential = Credential::from_service_account_json(&content, scopes)?;
    tracing::debug!(path = %source.display(), scopes = scopes.len(), "service account credential loaded");
    Ok(credential)
}

impl Credential {
    /// Build a credential from the contents of a service-account key file
    pub fn from_service_account_json(
        json: &str,
        scopes: &BTreeSet<String>,
    ) -> Result<Self, CredentialError> {
        if scopes.is_empty() {
            return Err(CredentialError::Invalid("no scopes requested".to_string()));
        }

        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| CredentialError::Invalid(format!("malformed key file: {}", e)))?;

        if key.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(CredentialError::Invalid(format!(
                "expected key type '{}', found '{}'",
                SERVICE_ACCOUNT_TYPE, key.key_type
            )));
        }
        if key.client_email.trim().is_empty() {
            return Err(CredentialError::Invalid("client_email is empty".to_string()));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CredentialError::Invalid(format!("private key is not RSA PEM: {}", e)))?;

        let signer = ServiceAccountSigner {
            client_email: key.client_email,
            key_id: key.private_key_id,
            token_uri: key
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            encoding_key,
            http: reqwest::Client::new(),
            cache: Mutex::new(None),
        };

        // Parsing a PEM does not validate the key material; signing does
        signer.sign_assertion(scopes, Utc::now())?;

        Ok(Self {
            kind: Arc::new(CredentialKind::ServiceAccount(signer)),
            scopes: Arc::new(scopes.clone()),
        })
    }

    /// Wrap a bearer token obtained elsewhere
    pub fn from_access_token(token: SecretString, scopes: &BTreeSet<String>) -> Self {
        Self {
            kind: Arc::new(CredentialKind::Static(token)),
            scopes: Arc::new(scopes.clone()),
        }
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    /// Service-account email, if this credential was loaded from a key file
    pub fn principal(&self) -> Option<&str> {
        match self.kind.as_ref() {
            CredentialKind::ServiceAccount(signer) => Some(&signer.client_email),
            CredentialKind::Static(_) => None,
        }
    }

    /// Current bearer token, exchanging a fresh assertion when needed
    pub async fn access_token(&self) -> Result<SecretString, CredentialError> {
        match self.kind.as_ref() {
            CredentialKind::Static(token) => Ok(SecretString::new(token.expose_secret().into())),
            CredentialKind::ServiceAccount(signer) => signer.access_token(&self.scopes).await,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind.as_ref() {
            CredentialKind::ServiceAccount(_) => "service_account",
            CredentialKind::Static(_) => "access_token",
        };
        f.debug_struct("Credential")
            .field("kind", &kind)
            .field("principal", &self.principal())
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl ServiceAccountSigner {
    fn sign_assertion(
        &self,
        scopes: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scopes.iter().cloned().collect::<Vec<_>>().join(" "),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Invalid(format!("key rejected while signing: {}", e)))
    }

    async fn access_token(
        &self,
        scopes: &BTreeSet<String>,
    ) -> Result<SecretString, CredentialError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(SecretString::new(cached.token.expose_secret().into()));
            }
        }

        let assertion = self.sign_assertion(scopes, now)?;
        tracing::debug!(token_uri = %self.token_uri, principal = %self.client_email, "exchanging service account assertion");

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CredentialError::Exchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Exchange(format!("HTTP {}: {}", status, body.trim())));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::Exchange(format!("unreadable token response: {}", e)))?;

        let expires_at = now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));
        let secret = SecretString::new(token.access_token.into());
        *cache = Some(CachedToken {
            token: SecretString::new(secret.expose_secret().into()),
            expires_at,
        });

        Ok(secret)
    }
}
