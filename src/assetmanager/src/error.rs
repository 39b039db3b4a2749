/// Errors from the asset manager client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The request URL could not be built
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Why it is invalid
        reason: String,
    },
    /// The server asked for authentication without a usable digest challenge
    #[error("Server requested authentication without a digest challenge")]
    MissingChallenge,
    /// The digest challenge could not be answered
    #[error("Digest authentication error: {0}")]
    Digest(#[from] digest_auth::Error),
    /// The answered challenge was rejected
    #[error("Digest login was rejected by {url}")]
    Unauthorized {
        /// URL that rejected the login
        url: String,
    },
    /// API returned an unexpected status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
}
