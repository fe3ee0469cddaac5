use thiserror::Error;

/// Errors returned by the store-status API client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure, or a non-2xx HTTP status, from the
    /// underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
