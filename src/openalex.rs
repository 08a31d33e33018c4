//! OpenAlex API client.
//!
//! Fetches every work of one author with cursor pagination. Requests are sequential and
//! are not retried: any non-success status aborts the fetch.

use reqwest::{Client, header};
use serde::Deserialize;

use crate::{AuthorId, FetchConfig, MetricsError, RawWork, Result};

/// Fields requested for every work.
pub const WORK_FIELDS: &[&str] = &[
    // identifiers + basics
    "id",
    "doi",
    "ids",
    "title",
    "display_name",
    "publication_year",
    "publication_date",
    "type",
    "type_crossref",
    // citations / impact
    "cited_by_count",
    "counts_by_year",
    "fwci",
    "citation_normalized_percentile",
    "cited_by_percentile_year",
    // venue / location / open access
    "primary_location",
    "locations",
    "best_oa_location",
    "open_access",
    // topics
    "primary_topic",
    "topics",
    "keywords",
    "concepts",
    // collaboration
    "authorships",
    // funding
    "apc_list",
    "apc_paid",
    "funders",
    "awards",
    "sustainable_development_goals",
    "updated_date",
];

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Cursor value that starts a paginated listing.
const FIRST_CURSOR: &str = "*";

/// One page of `/works` results.
#[derive(Debug, Default, Deserialize)]
pub struct WorksPage {
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default)]
    pub results: Vec<RawWork>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    pub count: Option<u64>,
    pub next_cursor: Option<String>,
}

impl WorksPage {
    /// Cursor for the following page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        self.meta
            .next_cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }
}

/// OpenAlex API client
pub struct OpenAlexClient {
    client: Client,
    config: FetchConfig,
}

impl OpenAlexClient {
    /// Creates a client with the configured timeout and crate user agent.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Http` if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Query parameters of one `/works` request.
    pub fn page_query(&self, author: &AuthorId, cursor: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("filter", format!("authorships.author.id:{}", author)),
            ("per-page", self.config.per_page.to_string()),
            ("cursor", cursor.to_string()),
            ("select", WORK_FIELDS.join(",")),
        ];
        if let Some(email) = &self.config.email {
            params.push(("mailto", email.clone()));
        }
        params
    }

    /// Fetches one page of works.
    pub async fn fetch_page(&self, author: &AuthorId, cursor: &str) -> Result<WorksPage> {
        let url = format!("{}/works", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&self.page_query(author, cursor))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "OpenAlex request failed");
            return Err(MetricsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<WorksPage>().await?)
    }

    /// Fetches every work of `author`, in API order.
    pub async fn fetch_author_works(&self, author: &AuthorId) -> Result<Vec<RawWork>> {
        let mut works = Vec::new();
        let mut cursor = FIRST_CURSOR.to_string();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(author, &cursor).await?;
            pages += 1;
            tracing::debug!(
                page = pages,
                results = page.results.len(),
                count = page.meta.count,
                "fetched works page"
            );

            let next = page.next_cursor().map(str::to_string);
            works.extend(page.results);

            match next {
                Some(next) => cursor = next,
                None => break,
            }
            tokio::time::sleep(self.config.page_delay).await;
        }

        tracing::info!(author = author.as_str(), pages, works = works.len(), "fetched works");
        Ok(works)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(email: Option<&str>) -> OpenAlexClient {
        let config = FetchConfig::default()
            .with_email(email.map(str::to_string))
            .with_per_page(50);
        OpenAlexClient::new(config).unwrap()
    }

    #[test]
    fn test_page_query() {
        let author = AuthorId::parse("A42").unwrap();
        let params = client(Some("me@example.org")).page_query(&author, "*");

        let names: Vec<_> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["filter", "per-page", "cursor", "select", "mailto"]);
        assert_eq!(params[0].1, "authorships.author.id:A42");
        assert_eq!(params[1].1, "50");
        assert_eq!(params[2].1, "*");
        assert!(params[3].1.starts_with("id,doi,ids,title,"));
        assert_eq!(params[4].1, "me@example.org");
    }

    #[test]
    fn test_page_query_without_email() {
        let author = AuthorId::parse("A42").unwrap();
        let params = client(None).page_query(&author, "abc");
        assert!(params.iter().all(|(k, _)| *k != "mailto"));
        assert_eq!(params[2].1, "abc");
    }

    #[test]
    fn test_works_page_cursor() {
        let page: WorksPage = serde_json::from_str(
            r#"{"meta": {"count": 2, "next_cursor": "IlsxNjA5"}, "results": [{"id": "W1"}]}"#,
        )
        .unwrap();
        assert_eq!(page.next_cursor(), Some("IlsxNjA5"));

        let last: WorksPage =
            serde_json::from_str(r#"{"meta": {"next_cursor": null}, "results": [{"id": "W1"}]}"#)
                .unwrap();
        assert_eq!(last.next_cursor(), None);

        let empty: WorksPage =
            serde_json::from_str(r#"{"meta": {"next_cursor": "more"}, "results": []}"#).unwrap();
        assert_eq!(empty.next_cursor(), None);

        let bare: WorksPage = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.next_cursor(), None);
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("scholar-metrics/"));
    }
}
