//! Client factory
//!
//! Binds a [`Credential`] to the static parts of [`AdsConfig`]. Building a
//! handle is pure composition: nothing here touches the network.

use crate::client::gaql::normalize_customer_id;
use crate::client::http::HttpSearchTransport;
use crate::core::config::AdsConfig;
use crate::core::error::ClientError;
use crate::core::traits::SearchTransport;
use crate::security::{mask_token, Credential};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// A credential bound to one login account
///
/// Holds no per-query state and can be reused for any number of queries.
#[derive(Clone)]
pub struct ClientHandle {
    credential: Credential,
    developer_token: Arc<SecretString>,
    login_customer_id: String,
    transport: Arc<dyn SearchTransport>,
}

/// Bind `cred` to `cfg` using the HTTP transport
pub fn build_client(cfg: &AdsConfig, cred: Credential) -> Result<ClientHandle, ClientError> {
    let transport = HttpSearchTransport::new(cfg)?;
    build_client_with_transport(cfg, cred, Arc::new(transport))
}

/// Bind `cred` to `cfg` using a caller-supplied transport
pub fn build_client_with_transport(
    cfg: &AdsConfig,
    cred: Credential,
    transport: Arc<dyn SearchTransport>,
) -> Result<ClientHandle, ClientError> {
    if cfg.developer_token.expose_secret().trim().is_empty() {
        return Err(ClientError::MissingField("developer_token"));
    }
    if cfg.login_customer_id.trim().is_empty() {
        return Err(ClientError::MissingField("login_customer_id"));
    }

    let login_customer_id = normalize_customer_id(&cfg.login_customer_id).map_err(|message| {
        ClientError::InvalidField {
            field: "login_customer_id",
            message,
        }
    })?;

    tracing::debug!(
        login_customer_id = %login_customer_id,
        transport = transport.name(),
        developer_token = %mask_token(cfg.developer_token.expose_secret()),
        "client bound"
    );

    Ok(ClientHandle {
        credential: cred,
        developer_token: Arc::new(SecretString::new(
            cfg.developer_token.expose_secret().trim().into(),
        )),
        login_customer_id,
        transport,
    })
}

impl ClientHandle {
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn login_customer_id(&self) -> &str {
        &self.login_customer_id
    }

    pub(crate) fn developer_token(&self) -> SecretString {
        SecretString::new(self.developer_token.expose_secret().into())
    }

    pub(crate) fn transport(&self) -> &dyn SearchTransport {
        self.transport.as_ref()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("credential", &self.credential)
            .field("login_customer_id", &self.login_customer_id)
            .field("transport", &self.transport.name())
            .finish()
    }
}
