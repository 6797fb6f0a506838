//! Query executor
//!
//! [`execute`] fetches the first page eagerly so request-level failures are
//! reported up front; [`RowStream`] pulls the remaining pages on demand.

use crate::client::factory::ClientHandle;
use crate::client::gaql::normalize_customer_id;
use crate::core::error::QueryError;
use crate::core::traits::{Row, SearchPage, SearchRequest};
use std::collections::VecDeque;
use tracing::instrument;

/// Lazy, finite, single-pass sequence of rows in remote order
#[derive(Debug)]
pub struct RowStream {
    client: ClientHandle,
    customer_id: String,
    query: String,
    buffer: VecDeque<Row>,
    next_page_token: Option<String>,
    pages_fetched: usize,
    failed: bool,
}

/// Run `query` against `account_id`
#[instrument(skip(client, query), fields(login = client.login_customer_id()), level = "debug")]
pub async fn execute(
    client: &ClientHandle,
    account_id: &str,
    query: &str,
) -> Result<RowStream, QueryError> {
    let customer_id = normalize_customer_id(account_id).map_err(QueryError::InvalidQuery)?;
    let query = query.trim();
    if query.is_empty() {
        return Err(QueryError::InvalidQuery("query is empty".to_string()));
    }

    let mut stream = RowStream {
        client: client.clone(),
        customer_id,
        query: query.to_string(),
        buffer: VecDeque::new(),
        next_page_token: None,
        pages_fetched: 0,
        failed: false,
    };
    stream.fetch_page(None).await?;
    Ok(stream)
}

impl RowStream {
    async fn fetch_page(&mut self, page_token: Option<String>) -> Result<(), QueryError> {
        let request = SearchRequest {
            customer_id: self.customer_id.clone(),
            login_customer_id: self.client.login_customer_id().to_string(),
            query: self.query.clone(),
            page_token,
            access_token: self.client.credential().access_token().await?,
            developer_token: self.client.developer_token(),
        };

        let page: SearchPage = self.client.transport().search_page(&request).await?;
        self.pages_fetched += 1;
        tracing::debug!(
            customer_id = %self.customer_id,
            page = self.pages_fetched,
            rows = page.results.len(),
            "search page received"
        );

        self.next_page_token = if page.has_next() {
            page.next_page_token
        } else {
            None
        };
        self.buffer.extend(page.results);
        Ok(())
    }

    /// Next row, fetching the next page when the buffer runs dry
    ///
    /// After an error the stream is exhausted.
    pub async fn try_next(&mut self) -> Result<Option<Row>, QueryError> {
        if self.failed {
            return Ok(None);
        }

        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Ok(Some(row));
            }

            let Some(token) = self.next_page_token.take() else {
                return Ok(None);
            };

            if let Err(err) = self.fetch_page(Some(token)).await {
                self.failed = true;
                return Err(err);
            }
        }
    }

    /// Drain the stream; any page failure discards everything read so far
    pub async fn collect(mut self) -> Result<Vec<Row>, QueryError> {
        let mut rows = Vec::new();
        while let Some(row) = self.try_next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::factory::build_client_with_transport;
    use crate::core::config::ConfigFile;
    use crate::core::traits::SearchTransport;
    use crate::security::Credential;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Serves pages in order; `None` entries fail with a transport error
    struct PagedTransport {
        pages: Mutex<VecDeque<Option<SearchPage>>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl PagedTransport {
        fn new(pages: Vec<Option<SearchPage>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages.into()),
                seen_tokens: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchTransport for PagedTransport {
        fn name(&self) -> &str {
            "paged"
        }

        async fn search_page(&self, request: &SearchRequest) -> Result<SearchPage, QueryError> {
            self.seen_tokens.lock().unwrap().push(request.page_token.clone());
            match self.pages.lock().unwrap().pop_front() {
                Some(Some(page)) => Ok(page),
                _ => Err(QueryError::Transport("connection reset".to_string())),
            }
        }
    }

    fn page(ids: &[i64], next: Option<&str>) -> SearchPage {
        SearchPage {
            results: ids
                .iter()
                .map(|id| Row::new(json!({ "campaign": { "id": id.to_string() } })))
                .collect(),
            next_page_token: next.map(str::to_string),
        }
    }

    fn client(transport: Arc<PagedTransport>) -> ClientHandle {
        let cfg = ConfigFile {
            developer_token: Some("dev-token-123".to_string()),
            login_customer_id: Some("6385295998".to_string()),
            ..Default::default()
        }
        .resolve();
        let cred = Credential::from_access_token(
            SecretString::new("ya29.test".into()),
            &BTreeSet::from(["scope".to_string()]),
        );
        build_client_with_transport(&cfg, cred, transport).unwrap()
    }

    #[tokio::test]
    async fn test_rows_follow_pages_in_order() {
        let transport = PagedTransport::new(vec![
            Some(page(&[1, 2], Some("p2"))),
            Some(page(&[3], Some(""))),
        ]);
        let stream = execute(&client(transport.clone()), "1849790507", "SELECT campaign.id FROM campaign")
            .await
            .unwrap();

        let ids: Vec<i64> = stream
            .collect()
            .await
            .unwrap()
            .iter()
            .map(|r| r.get_i64("campaign.id").unwrap())
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            *transport.seen_tokens.lock().unwrap(),
            vec![None, Some("p2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_later_pages_are_lazy() {
        let transport = PagedTransport::new(vec![
            Some(page(&[1], Some("p2"))),
            Some(page(&[2], None)),
        ]);
        let mut stream = execute(&client(transport.clone()), "1849790507", "SELECT campaign.id FROM campaign")
            .await
            .unwrap();

        assert_eq!(stream.pages_fetched(), 1);
        assert!(stream.try_next().await.unwrap().is_some());
        assert_eq!(stream.pages_fetched(), 1);
        assert!(stream.try_next().await.unwrap().is_some());
        assert_eq!(stream.pages_fetched(), 2);
        assert!(stream.try_next().await.unwrap().is_none());
        assert!(stream.try_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_page_failure_surfaces_from_execute() {
        let transport = PagedTransport::new(vec![None]);
        let result = execute(&client(transport), "1849790507", "SELECT customer.id FROM customer").await;
        assert!(matches!(result, Err(QueryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_later_page_failure_discards_partial_rows() {
        let transport = PagedTransport::new(vec![Some(page(&[1, 2], Some("p2"))), None]);
        let stream = execute(&client(transport), "1849790507", "SELECT campaign.id FROM campaign")
            .await
            .unwrap();

        assert!(matches!(stream.collect().await, Err(QueryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_invalid_inputs_make_no_call() {
        let transport = PagedTransport::new(vec![]);
        let handle = client(transport.clone());

        assert!(matches!(
            execute(&handle, "not-an-id", "SELECT customer.id FROM customer").await,
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(matches!(
            execute(&handle, "1849790507", "   ").await,
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(transport.seen_tokens.lock().unwrap().is_empty());
    }
}
