//! URLs the account has already tweeted.

use std::collections::HashSet;

use anyhow::Context;

use crate::twitter::{Status, TwitterClient};

#[derive(Debug, Default)]
pub struct RecentUrls {
    urls: HashSet<String>,
}

impl RecentUrls {
    /// Fetches the account's latest statuses and collects their links.
    pub async fn fetch(
        client: &TwitterClient,
        user_id: u64,
        max_statuses: usize,
    ) -> anyhow::Result<Self> {
        tracing::info!("Fetching up to {max_statuses} recent statuses for user {user_id}");

        let timeline = client
            .user_timeline(user_id, max_statuses)
            .await
            .context("Failed to fetch user timeline")?;

        let recent = Self::from_statuses(&timeline);
        tracing::info!(
            "Found {} distinct URLs in {} statuses",
            recent.len(),
            timeline.len()
        );

        Ok(recent)
    }

    pub fn from_statuses(statuses: &[Status]) -> Self {
        let mut recent = Self::default();
        for status in statuses {
            for url in status.entities.urls.iter().filter_map(|u| u.expanded_url.as_ref()) {
                tracing::debug!("Status {} links to {url}", status.id_str);
                recent.insert(url.clone());
            }
        }
        recent
    }

    pub fn insert(&mut self, url: String) -> bool {
        self.urls.insert(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

impl FromIterator<String> for RecentUrls {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}
