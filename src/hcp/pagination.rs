//! Sequential pagination over TFE collection endpoints
//!
//! Pages are walked in order starting at page 1. The server-reported
//! `total-count` is read from the first page only; walking stops once that
//! many items have been gathered, when a page comes back empty, or when
//! the page cap is reached with items still outstanding (fatal overflow).

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::error::{BackupError, Result};
use crate::hcp::traits::{ApiListResponse, NamedResource, PaginatedResponse};
use crate::hcp::TfeClient;

/// Items gathered across pages together with the server-reported total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedCollection<T> {
    pub items: Vec<T>,
    pub expected_total: u32,
}

impl<T> PaginatedCollection<T> {
    /// An empty collection that expects nothing
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            expected_total: 0,
        }
    }

    /// Number of items actually retrieved
    pub fn observed_total(&self) -> u32 {
        self.items.len() as u32
    }

    /// Whether the retrieved count matches the server-reported total
    pub fn is_consistent(&self) -> bool {
        self.observed_total() == self.expected_total
    }

    /// Warning text for a count mismatch, if any
    pub fn consistency_warning(&self, what: &str) -> Option<String> {
        if self.is_consistent() {
            None
        } else {
            Some(format!(
                "Expected {} {} but retrieved {}",
                self.expected_total,
                what,
                self.observed_total()
            ))
        }
    }

    /// Transform every item, keeping the expected total
    pub fn map<U, F>(self, f: F) -> PaginatedCollection<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedCollection {
            items: self.items.into_iter().map(f).collect(),
            expected_total: self.expected_total,
        }
    }
}

/// Build the URL of one page for the given path
fn page_url(base: &str, path: &str, page_size: u32, page: u32) -> String {
    let separator = if path.contains('?') { "&" } else { "?" };
    format!(
        "{}{}{}page[size]={}&page[number]={}",
        base, path, separator, page_size, page
    )
}

impl TfeClient {
    /// Collect `(name, id)` pairs from every page of a collection endpoint
    ///
    /// # Arguments
    /// * `path` - API path, optionally carrying its own query string
    /// * `page_size` - value for `page[size]`
    /// * `max_pages` - hard cap on pages walked
    ///
    /// # Type Parameters
    /// * `R` - wire type of a single item in the `data` array
    pub async fn collect_named_pages<R>(
        &self,
        path: &str,
        page_size: u32,
        max_pages: u32,
    ) -> Result<PaginatedCollection<(String, String)>>
    where
        R: DeserializeOwned + NamedResource,
    {
        let base = self.base_url();
        let mut collection = PaginatedCollection::empty();
        let mut page: u32 = 1;

        loop {
            let url = page_url(&base, path, page_size, page);
            debug!("Fetching page {} from: {}", page, url);

            let response: ApiListResponse<R> =
                self.fetch_json(&url)
                    .await
                    .map_err(|e| BackupError::Pagination {
                        page,
                        message: e.to_string(),
                    })?;

            if page == 1 {
                collection.expected_total = response
                    .meta()
                    .and_then(|m| m.pagination.as_ref())
                    .map(|p| p.total_count)
                    .unwrap_or(response.data.len() as u32);
                debug!("Server reports {} items", collection.expected_total);
                if collection.expected_total == 0 {
                    return Ok(collection);
                }
            }

            // Names and ids come from the same item, so they cannot drift apart
            let pairs: Vec<(String, String)> = response
                .into_data()
                .iter()
                .map(|item| (item.name().to_string(), item.id().to_string()))
                .collect();

            if pairs.is_empty() {
                warn!("Page {} of {} returned no items", page, path);
                return Ok(collection);
            }

            debug!("Page {} returned {} items", page, pairs.len());
            collection.items.extend(pairs);

            if collection.observed_total() >= collection.expected_total {
                return Ok(collection);
            }

            if page >= max_pages {
                return Err(BackupError::VarsetOverflow {
                    total: collection.expected_total,
                    fetched: collection.observed_total(),
                });
            }

            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Deserialize, Debug)]
    struct TestItem {
        id: String,
        attributes: TestAttributes,
    }

    #[derive(Deserialize, Debug)]
    struct TestAttributes {
        name: String,
    }

    impl NamedResource for TestItem {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.attributes.name
        }
    }

    fn item_json(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({"id": id, "attributes": {"name": name}})
    }

    fn page_json(items: Vec<serde_json::Value>, total: u32) -> serde_json::Value {
        serde_json::json!({
            "data": items,
            "meta": {"pagination": {"total-count": total}}
        })
    }

    async fn mount_page(server: &MockServer, number: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page[number]", number))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_page_url_separator() {
        assert_eq!(
            page_url("https://h/api/v2", "/items", 10, 2),
            "https://h/api/v2/items?page[size]=10&page[number]=2"
        );
        assert_eq!(
            page_url("https://h/api/v2", "/items?q=x", 10, 1),
            "https://h/api/v2/items?q=x&page[size]=10&page[number]=1"
        );
    }

    #[test]
    fn test_consistency_warning() {
        let collection = PaginatedCollection {
            items: vec![1, 2],
            expected_total: 3,
        };
        assert!(!collection.is_consistent());
        let warning = collection.consistency_warning("things").unwrap();
        assert!(warning.contains("Expected 3 things but retrieved 2"));

        let ok = PaginatedCollection {
            items: vec![1],
            expected_total: 1,
        };
        assert!(ok.consistency_warning("things").is_none());
    }

    #[tokio::test]
    async fn test_collect_single_page() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page[size]", "100"))
            .and(query_param("page[number]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
                vec![item_json("vs-1", "One"), item_json("vs-2", "Two")],
                2,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let collection = client
            .collect_named_pages::<TestItem>("/items", 100, 5)
            .await
            .unwrap();

        assert!(collection.is_consistent());
        assert_eq!(
            collection.items,
            vec![
                ("One".to_string(), "vs-1".to_string()),
                ("Two".to_string(), "vs-2".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_multiple_pages_in_order() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        mount_page(
            &server,
            "1",
            page_json(vec![item_json("vs-1", "A"), item_json("vs-2", "B")], 5),
        )
        .await;
        mount_page(
            &server,
            "2",
            page_json(vec![item_json("vs-3", "C"), item_json("vs-4", "D")], 5),
        )
        .await;
        mount_page(&server, "3", page_json(vec![item_json("vs-5", "E")], 5)).await;

        let collection = client
            .collect_named_pages::<TestItem>("/items", 2, 10)
            .await
            .unwrap();

        assert_eq!(collection.expected_total, 5);
        assert_eq!(collection.observed_total(), 5);
        let ids: Vec<&str> = collection.items.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["vs-1", "vs-2", "vs-3", "vs-4", "vs-5"]);
        let names: Vec<&str> = collection.items.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_collect_zero_total_is_empty() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 0)))
            .expect(1)
            .mount(&server)
            .await;

        let collection = client
            .collect_named_pages::<TestItem>("/items", 100, 5)
            .await
            .unwrap();

        assert!(collection.items.is_empty());
        assert!(collection.is_consistent());
    }

    #[tokio::test]
    async fn test_collect_failed_page_reports_page_number() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        mount_page(&server, "1", page_json(vec![item_json("vs-1", "A")], 2)).await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page[number]", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        match client.collect_named_pages::<TestItem>("/items", 1, 5).await {
            Err(BackupError::Pagination { page, .. }) => assert_eq!(page, 2),
            other => panic!("Expected BackupError::Pagination, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collect_overflow_beyond_page_cap() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        mount_page(&server, "1", page_json(vec![item_json("vs-1", "A")], 3)).await;

        match client.collect_named_pages::<TestItem>("/items", 1, 1).await {
            Err(BackupError::VarsetOverflow { total, fetched }) => {
                assert_eq!(total, 3);
                assert_eq!(fetched, 1);
            }
            other => panic!("Expected BackupError::VarsetOverflow, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collect_short_read_is_inconsistent() {
        let server = MockServer::start().await;
        let client = TfeClient::test_client(&server.uri());

        mount_page(&server, "1", page_json(vec![item_json("vs-1", "A")], 3)).await;
        mount_page(&server, "2", page_json(vec![], 3)).await;

        let collection = client
            .collect_named_pages::<TestItem>("/items", 1, 5)
            .await
            .unwrap();

        assert_eq!(collection.observed_total(), 1);
        assert!(!collection.is_consistent());
    }
}
