//! Feed retrieval and entry selection.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// A feed entry, reduced to what gets posted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    /// `None` when the feed gave no usable timestamp.
    pub updated: Option<DateTime<Utc>>,
}

impl From<feed_rs::model::Entry> for FeedEntry {
    fn from(entry: feed_rs::model::Entry) -> Self {
        Self {
            title: entry.title.map(|text| text.content).unwrap_or_default(),
            link: entry.links.into_iter().next().map(|link| link.href),
            updated: entry.updated.or(entry.published),
        }
    }
}

pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Downloads and parses the feed at `url`.
    pub async fn fetch(&self, url: &Url) -> anyhow::Result<Vec<FeedEntry>> {
        tracing::info!("Fetching feed from {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to HTTP GET feed")?
            .error_for_status()
            .context("Feed server returned an error")?;

        let content = response.bytes().await.context("No body in response")?;
        let entries = parse_entries(&content)?;

        tracing::info!("Fetched feed with {} entries", entries.len());
        Ok(entries)
    }
}

pub fn parse_entries(content: &[u8]) -> anyhow::Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(content).context("Failed to parse feed")?;
    Ok(feed.entries.into_iter().map(FeedEntry::from).collect())
}

/// Picks the `max_entries` most recently updated entries and returns them
/// oldest first, which is the order they get posted in.
///
/// Entries without a timestamp rank below every dated entry. Both passes are
/// stable, so ties keep their document order.
pub fn select_entries(mut entries: Vec<FeedEntry>, max_entries: usize) -> Vec<FeedEntry> {
    entries.sort_by(|a, b| b.updated.cmp(&a.updated));
    entries.truncate(max_entries);
    entries.sort_by(|a, b| a.updated.cmp(&b.updated));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Blog</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93c-0003939e0af6</id>
  <updated>2024-03-03T12:00:00Z</updated>
  <entry>
    <title>Third</title>
    <id>urn:example:3</id>
    <link href="https://example.com/c"/>
    <updated>2024-03-03T12:00:00Z</updated>
  </entry>
  <entry>
    <title>First</title>
    <id>urn:example:1</id>
    <link href="https://example.com/a"/>
    <link rel="alternate" href="https://example.com/a-mirror"/>
    <updated>2024-03-01T12:00:00Z</updated>
  </entry>
  <entry>
    <title>No link</title>
    <id>urn:example:x</id>
    <updated>2024-03-02T08:00:00Z</updated>
  </entry>
  <entry>
    <title>Second</title>
    <id>urn:example:2</id>
    <link href="https://example.com/b"/>
    <updated>2024-03-02T12:00:00+00:00</updated>
  </entry>
</feed>"#;

    fn at(day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap())
    }

    fn entry(title: &str, updated: Option<DateTime<Utc>>) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            link: Some(format!("https://example.com/{title}")),
            updated,
        }
    }

    fn titles(entries: &[FeedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_entries(ATOM_FEED.as_bytes()).unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].title, "Third");
        assert_eq!(entries[0].link.as_deref(), Some("https://example.com/c"));
        assert_eq!(entries[0].updated, at(3));

        // Only the first link counts.
        assert_eq!(entries[1].link.as_deref(), Some("https://example.com/a"));

        assert_eq!(entries[2].link, None);
        assert_eq!(entries[3].updated, at(2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_entries(b"this is not a feed").is_err());
    }

    #[test]
    fn test_select_orders_oldest_first() {
        let entries = vec![entry("c", at(3)), entry("a", at(1)), entry("b", at(2))];
        let selected = select_entries(entries, 100);
        assert_eq!(titles(&selected), ["a", "b", "c"]);
    }

    #[test]
    fn test_select_keeps_newest() {
        let entries = vec![
            entry("a", at(1)),
            entry("d", at(4)),
            entry("b", at(2)),
            entry("c", at(3)),
        ];
        let selected = select_entries(entries, 2);
        assert_eq!(titles(&selected), ["c", "d"]);
    }

    #[test]
    fn test_select_undated_entries_rank_last() {
        let entries = vec![entry("undated", None), entry("a", at(1)), entry("b", at(2))];

        let selected = select_entries(entries.clone(), 2);
        assert_eq!(titles(&selected), ["a", "b"]);

        let selected = select_entries(entries, 3);
        assert_eq!(titles(&selected), ["undated", "a", "b"]);
    }

    #[test]
    fn test_select_ties_keep_document_order() {
        let entries = vec![entry("x", at(1)), entry("y", at(1)), entry("z", at(1))];
        let selected = select_entries(entries, 2);
        assert_eq!(titles(&selected), ["x", "y"]);
    }

    #[test]
    fn test_select_empty() {
        assert!(select_entries(Vec::new(), 10).is_empty());
    }

    #[tokio::test]
    async fn test_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.atom"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ATOM_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/feed.atom", server.uri())).unwrap();
        let entries = FeedFetcher::new().unwrap().fetch(&url).await.unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.atom", server.uri())).unwrap();
        assert!(FeedFetcher::new().unwrap().fetch(&url).await.is_err());
    }
}
