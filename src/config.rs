//! Runtime configuration, read from the process environment.

use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_STATUSES: usize = 200;
pub const DEFAULT_MAX_ENTRIES: usize = 100;
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },

    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("TWITTER_OAUTH_TOKEN must start with a numeric user id followed by '-'")]
    InvalidUserId,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: Url,
    pub template: String,
    pub credentials: Credentials,
    pub user_id: u64,
    pub max_statuses: usize,
    pub max_entries: usize,
    pub api_url: Url,
    pub dry_run: bool,
}

#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("oauth_token", &self.oauth_token)
            .field("oauth_token_secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let credentials = Credentials {
            consumer_key: require("TWITTER_CONSUMER_KEY")?,
            consumer_secret: require("TWITTER_CONSUMER_SECRET")?,
            oauth_token: require("TWITTER_OAUTH_TOKEN")?,
            oauth_token_secret: require("TWITTER_OAUTH_TOKEN_SECRET")?,
        };

        let feed_url = parse_url("FEED_URL", &require("FEED_URL")?)?;
        let template = require("TEMPLATE")?;
        let user_id = user_id_from_token(&credentials.oauth_token)?;

        let max_statuses = match get("MAX_STATUSES") {
            Some(value) => parse_count("MAX_STATUSES", value)?,
            None => DEFAULT_MAX_STATUSES,
        };
        let max_entries = match get("MAX_ENTRIES") {
            Some(value) => parse_count("MAX_ENTRIES", value)?,
            None => DEFAULT_MAX_ENTRIES,
        };
        let api_url = match get("TWITTER_API_URL") {
            Some(value) => parse_url("TWITTER_API_URL", &value)?,
            None => parse_url("TWITTER_API_URL", DEFAULT_API_URL)?,
        };

        Ok(Self {
            feed_url,
            template,
            credentials,
            user_id,
            max_statuses,
            max_entries,
            api_url,
            dry_run: false,
        })
    }
}

/// Extracts the account id from an OAuth token of the form `<user id>-<rest>`.
pub fn user_id_from_token(token: &str) -> Result<u64, ConfigError> {
    let (id, _) = token.split_once('-').ok_or(ConfigError::InvalidUserId)?;
    id.parse().map_err(|_| ConfigError::InvalidUserId)
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_count(name: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
