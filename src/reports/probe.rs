//! Connection probe

use crate::client::gaql::CONNECTION_QUERY;
use crate::client::{execute, ClientHandle};
use crate::core::error::QueryError;
use serde::{Deserialize, Serialize};

/// Result of a liveness check against one account
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Read at most one customer row; an empty result is "not connected"
pub async fn try_probe_connection(
    client: &ClientHandle,
    account_id: &str,
) -> Result<ProbeOutcome, QueryError> {
    let mut rows = execute(client, account_id, CONNECTION_QUERY).await?;

    Ok(match rows.try_next().await? {
        Some(row) => ProbeOutcome {
            connected: true,
            customer_id: row.get_i64("customer.id"),
            display_name: row.get_str("customer.descriptive_name").map(str::to_string),
        },
        None => ProbeOutcome::default(),
    })
}

/// Liveness check that never fails; errors are logged and read as `connected: false`
pub async fn probe_connection(client: &ClientHandle, account_id: &str) -> ProbeOutcome {
    match try_probe_connection(client, account_id).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(account_id, error = %err, "connection probe failed");
            ProbeOutcome::default()
        }
    }
}
