use common::config::{AssetManagerConfig, TENANT_PLACEHOLDER};
use std::collections::BTreeMap;

/// Builds the asset manager base URL of a tenant.
///
/// Lookup order: explicit tenant URL, URL pattern, fallback URL.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    fallback: String,
    pattern: Option<String>,
    tenant_urls: BTreeMap<String, String>,
}

impl UrlBuilder {
    pub fn new(config: &AssetManagerConfig) -> Self {
        Self {
            fallback: config.url.clone(),
            pattern: config.url_pattern.clone(),
            tenant_urls: config.tenant_urls.clone(),
        }
    }

    pub fn base_url(&self, tenant: &str) -> String {
        let url = match (self.tenant_urls.get(tenant), &self.pattern) {
            (Some(url), _) => url.clone(),
            (None, Some(pattern)) => pattern.replace(TENANT_PLACEHOLDER, tenant),
            (None, None) => self.fallback.clone(),
        };
        url.trim_end_matches('/').to_string()
    }
}
