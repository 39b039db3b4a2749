//! Opencast asset manager client.
//!
//! Answers "does this media package still exist?" over HTTP with digest
//! authentication, resolving the asset manager of each tenant from the
//! configuration.

mod checker;
mod client;
mod error;
mod urls;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checker::AssetManagerChecker;
pub use client::{AssetManagerClient, episode_url};
pub use error::ClientError;
pub use urls::UrlBuilder;
