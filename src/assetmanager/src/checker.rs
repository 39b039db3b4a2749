use crate::{AssetManagerClient, ClientError, UrlBuilder};
use audit::{CheckFailed, ExistenceChecker};
use common::Configuration;

/// Checks media package existence against the asset manager of each tenant
pub struct AssetManagerChecker {
    client: AssetManagerClient,
    urls: UrlBuilder,
}

impl AssetManagerChecker {
    pub fn new(client: AssetManagerClient, urls: UrlBuilder) -> Self {
        Self { client, urls }
    }

    pub fn from_config(config: &Configuration) -> Result<Self, ClientError> {
        let client = AssetManagerClient::new(&config.digest, config.assetmanager.timeout)?;
        Ok(Self::new(client, UrlBuilder::new(&config.assetmanager)))
    }
}

impl ExistenceChecker for AssetManagerChecker {
    fn exists(&self, tenant: &str, media_package: &str) -> Result<bool, CheckFailed> {
        let base_url = self.urls.base_url(tenant);
        self.client
            .media_package_exists(&base_url, media_package)
            .map_err(|e| CheckFailed::new(e.to_string()))
    }
}
