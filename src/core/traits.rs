//! Core traits and types for the search pipeline
//!
//! This module defines the row model and the transport seam that the query
//! executor drives. The HTTP implementation lives in `client::http`; tests
//! substitute in-memory transports.

use crate::core::error::QueryError;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Rows
// ============================================================================

/// One result row: a JSON object addressed by dotted field paths
/// such as `metrics.cost_micros` or `customer.descriptive_name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Value);

impl Row {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field by its GAQL path
    ///
    /// GAQL paths are snake_case while the REST API returns camelCase keys,
    /// so each segment is tried as written and then camelCased.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |node, segment| {
            node.get(segment)
                .or_else(|| node.get(snake_to_camel(segment).as_str()))
        })
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// int64 values arrive as JSON strings; plain numbers are accepted too
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

fn snake_to_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Transport
// ============================================================================

/// Everything needed to fetch one page of search results
#[derive(Debug)]
pub struct SearchRequest {
    pub customer_id: String,
    pub login_customer_id: String,
    pub query: String,
    pub page_token: Option<String>,
    pub access_token: SecretString,
    pub developer_token: SecretString,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// The API sends an empty string on the last page
    pub fn has_next(&self) -> bool {
        self.next_page_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

/// Remote search endpoint
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Transport name for logging (e.g., "http")
    fn name(&self) -> &str;

    /// Fetch a single page of results
    async fn search_page(&self, request: &SearchRequest) -> Result<SearchPage, QueryError>;
}
