//! Errors returned by the Twitter client.

use serde::Deserialize;
use thiserror::Error;

/// Twitter's error code for "Status is a duplicate."
pub const DUPLICATE_STATUS_CODE: i64 = 187;

/// Coarse classification of a failed request, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The exact content has already been posted on this account.
    DuplicateContent,
    Other,
}

#[derive(Debug, Error)]
pub enum TwitterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Twitter API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
}

impl TwitterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api {
                code: Some(DUPLICATE_STATUS_CODE),
                ..
            } => ErrorKind::DuplicateContent,
            _ => ErrorKind::Other,
        }
    }

    /// Decodes a non-success response body.
    ///
    /// The first entry of the `errors` array wins. Bodies that don't match the
    /// expected shape are kept verbatim as the message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            errors: Vec<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            code: Option<i64>,
            message: Option<String>,
        }

        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.errors.into_iter().next());

        match detail {
            Some(detail) => Self::Api {
                status,
                code: detail.code,
                message: detail.message.unwrap_or_else(|| "Unknown error".into()),
            },
            None => Self::Api {
                status,
                code: None,
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}

pub type TwitterResult<T> = Result<T, TwitterError>;
