//! Posts selected feed entries as tweets.

use anyhow::Context;
use async_trait::async_trait;

use crate::feed::FeedEntry;
use crate::history::RecentUrls;
use crate::twitter::{ErrorKind, TwitterClient, TwitterResult};

/// Something that can publish a status text.
#[async_trait]
pub trait Publisher {
    /// Publishes `text` and returns an identifier for the new post.
    async fn publish(&self, text: &str) -> TwitterResult<String>;
}

#[async_trait]
impl Publisher for TwitterClient {
    async fn publish(&self, text: &str) -> TwitterResult<String> {
        Ok(self.update_status(text).await?.id_str)
    }
}

/// Logs texts instead of posting them.
pub struct DryRun;

#[async_trait]
impl Publisher for DryRun {
    async fn publish(&self, text: &str) -> TwitterResult<String> {
        tracing::info!("[dry run] Would post: {text}");
        Ok("dry-run".to_string())
    }
}

/// What happened to a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Posted,
    NoLink,
    AlreadyPosted,
    Duplicate,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posted: usize,
    pub no_link: usize,
    pub already_posted: usize,
    pub duplicate: usize,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Posted => self.posted += 1,
            Outcome::NoLink => self.no_link += 1,
            Outcome::AlreadyPosted => self.already_posted += 1,
            Outcome::Duplicate => self.duplicate += 1,
        }
    }
}

/// Substitutes `{title}` and `{url}` in `template`.
///
/// Placeholders are replaced in a single pass, so text coming from the
/// substituted values is never expanded again.
pub fn render(template: &str, title: &str, url: &str) -> String {
    let mut rendered = String::with_capacity(template.len() + title.len() + url.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        rest = &rest[start..];

        if let Some(after) = rest.strip_prefix("{title}") {
            rendered.push_str(title);
            rest = after;
        } else if let Some(after) = rest.strip_prefix("{url}") {
            rendered.push_str(url);
            rest = after;
        } else {
            rendered.push('{');
            rest = &rest[1..];
        }
    }

    rendered.push_str(rest);
    rendered
}

/// Posts each entry, in order, unless it was already posted.
///
/// A duplicate-content rejection skips the entry. Any other publishing error
/// stops the run and is returned.
pub async fn post_entries(
    entries: &[FeedEntry],
    recent: &RecentUrls,
    template: &str,
    publisher: &dyn Publisher,
) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();

    for entry in entries {
        let outcome = post_entry(entry, recent, template, publisher).await?;
        summary.record(outcome);
    }

    Ok(summary)
}

async fn post_entry(
    entry: &FeedEntry,
    recent: &RecentUrls,
    template: &str,
    publisher: &dyn Publisher,
) -> anyhow::Result<Outcome> {
    let Some(link) = entry.link.as_deref() else {
        tracing::debug!("Skipping '{}': no link", entry.title);
        return Ok(Outcome::NoLink);
    };

    if recent.contains(link) {
        tracing::debug!("Skipping '{}': {link} was already posted", entry.title);
        return Ok(Outcome::AlreadyPosted);
    }

    let text = render(template, &entry.title, link);
    match publisher.publish(&text).await {
        Ok(id) => {
            tracing::info!("Posted '{}' as {id}", entry.title);
            Ok(Outcome::Posted)
        }
        Err(error) if error.kind() == ErrorKind::DuplicateContent => {
            tracing::warn!("Skipping '{}': {error}", entry.title);
            Ok(Outcome::Duplicate)
        }
        Err(error) => Err(error).with_context(|| format!("Failed to post '{}'", entry.title)),
    }
}
