use thiserror::Error;

/// Ways a resource fetch can fail. The display text is what the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    #[error("http {status} from {url}")]
    Http { url: String, status: u16 },
    #[error("malformed payload from {url}: {message}")]
    MalformedPayload { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Http { url, .. }
            | FetchError::MalformedPayload { url, .. } => url,
        }
    }

    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Network {
            url: url.into(),
            message: non_empty_message(message.into()),
        }
    }

    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::MalformedPayload {
            url: url.into(),
            message: non_empty_message(message.into()),
        }
    }
}

fn non_empty_message(message: String) -> String {
    if message.trim().is_empty() {
        "unknown error".to_string()
    } else {
        message
    }
}
