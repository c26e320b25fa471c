//! Minimal Twitter v1.1 REST client: read a user timeline, post a status.

pub mod error;
pub mod oauth;

use std::time::Duration;

use reqwest::{Client, Response, header};
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::config::Credentials;
pub use error::{ErrorKind, TwitterError, TwitterResult};
use oauth::{OAuthSigner, percent_encode};

const USER_TIMELINE: &str = "1.1/statuses/user_timeline.json";
const UPDATE_STATUS: &str = "1.1/statuses/update.json";

/// A tweet, reduced to the fields this program reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id_str: String,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    /// The original link, before t.co shortening.
    pub expanded_url: Option<String>,
}

pub struct TwitterClient {
    client: Client,
    base_url: Url,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(credentials: &Credentials, base_url: Url) -> TwitterResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("feed-tweeter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            signer: OAuthSigner::new(credentials),
        })
    }

    /// Fetches the most recent statuses posted by `user_id`.
    pub async fn user_timeline(&self, user_id: u64, count: usize) -> TwitterResult<Vec<Status>> {
        let url = self.endpoint(USER_TIMELINE)?;
        let user_id = user_id.to_string();
        let count = count.to_string();
        let params = [("user_id", user_id.as_str()), ("count", count.as_str())];

        tracing::debug!("GET {url} user_id={user_id} count={count}");
        let auth = self.signer.sign("GET", url.as_str(), &params)?;
        let response = self
            .client
            .get(url)
            .query(&params)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await?;

        decode(response).await
    }

    /// Posts a new status with the given text.
    pub async fn update_status(&self, text: &str) -> TwitterResult<Status> {
        let url = self.endpoint(UPDATE_STATUS)?;
        let params = [("status", text)];

        tracing::debug!("POST {url}");
        let auth = self.signer.sign("POST", url.as_str(), &params)?;

        // Encode the body with the same rules as the signature base string.
        let body = params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let response = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        decode(response).await
    }

    fn endpoint(&self, path: &str) -> TwitterResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> TwitterResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        Err(TwitterError::from_response(status.as_u16(), &bytes))
    }
}
