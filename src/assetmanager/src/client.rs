use crate::ClientError;
use common::config::DigestConfig;
use digest_auth::AuthContext;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use std::time::Duration;
use url::Url;

/// Headers Opencast expects before it offers a digest challenge
const REQUESTED_AUTH_HEADER: &str = "X-Requested-Auth";
const MATTERHORN_AUTH_HEADER: &str = "X-Opencast-Matterhorn-Authorization";

/// Blocking HTTP client for the asset manager, authenticating with HTTP digest
pub struct AssetManagerClient {
    user: String,
    password: String,
    http: Client,
}

impl AssetManagerClient {
    /// Create a new client with the digest login and a per request timeout
    pub fn new(digest: &DigestConfig, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            user: digest.user.clone(),
            password: digest.password.clone(),
            http,
        })
    }

    /// Whether the media package is still known to the asset manager.
    ///
    /// - `Ok(true)` if the episode endpoint answers with a success status
    /// - `Ok(false)` if it answers 404
    /// - `Err(_)` for every other outcome
    pub fn media_package_exists(
        &self,
        base_url: &str,
        media_package: &str,
    ) -> Result<bool, ClientError> {
        let url = episode_url(base_url, media_package)?;
        let resp = self.get(&url)?;

        match resp.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let message = match resp.text() {
                    Ok(body) => body.trim().to_string(),
                    Err(e) => {
                        tracing::debug!(
                            status = %status,
                            error = %e,
                            "Could not read error response body"
                        );
                        String::new()
                    }
                };
                Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Send a GET request, answering a digest challenge if the server sends one
    fn get(&self, url: &Url) -> Result<Response, ClientError> {
        tracing::trace!(url = %url, "GET");
        let resp = self.request(url).send()?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let challenge = resp
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.trim_start().starts_with("Digest"))
            .ok_or(ClientError::MissingChallenge)?;

        let mut prompt = digest_auth::parse(challenge)?;
        let uri = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let context = AuthContext::new(self.user.as_str(), self.password.as_str(), uri);
        let answer = prompt.respond(&context)?;

        let resp = self
            .request(url)
            .header(AUTHORIZATION, answer.to_header_string())
            .send()?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized {
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    fn request(&self, url: &Url) -> RequestBuilder {
        self.http
            .get(url.clone())
            .header(REQUESTED_AUTH_HEADER, "Digest")
            .header(MATTERHORN_AUTH_HEADER, "true")
    }
}

/// `<base_url>/assets/episode/<media_package>`, the id encoded as one path segment
pub fn episode_url(base_url: &str, media_package: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["assets", "episode", media_package]);
    Ok(url)
}
