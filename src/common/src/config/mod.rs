use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "artefact-audit.toml";

/// Prefix for environment overrides, nested keys are split on `__`
pub const ENV_PREFIX: &str = "ARTEFACT_AUDIT__";

/// Placeholder replaced by the tenant id in `assetmanager.url_pattern`
pub const TENANT_PLACEHOLDER: &str = "{}";

const REDACTED: &str = "********";

/// Where the asset manager of each tenant can be reached
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetManagerConfig {
    /// Fallback base URL used when no tenant specific URL applies
    pub url: String,
    /// Optional URL pattern, `{}` is replaced by the tenant id
    #[serde(default)]
    pub url_pattern: Option<String>,
    /// Explicit base URLs per tenant, these win over the pattern
    #[serde(default)]
    pub tenant_urls: BTreeMap<String, String>,
    /// Timeout for a single existence check
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for AssetManagerConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:8080"),
            url_pattern: None,
            tenant_urls: BTreeMap::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Credentials for HTTP digest authentication against the asset manager
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DigestConfig {
    pub user: String,
    pub password: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            user: String::from("opencast_system_account"),
            password: String::from("CHANGE_ME"),
        }
    }
}

/// Where distribution artefacts are found when no inventory file is given
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Distribution roots laid out as `<dir>/<tenant>/<channel>/<media package>/...`
    #[serde(default)]
    pub distribution_dirs: Vec<PathBuf>,
    /// Only scan these tenants, empty means all
    #[serde(default)]
    pub tenants: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Asset manager endpoints
    pub assetmanager: AssetManagerConfig,
    /// Digest login
    pub digest: DigestConfig,
    /// Inventory discovery
    pub inventory: InventoryConfig,
}

impl Configuration {
    /// Load defaults, then `artefact-audit.toml`, then `ARTEFACT_AUDIT__*` env vars.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::figment(Toml::file(DEFAULT_CONFIG_FILE))
            .extract()
            .map_err(Box::new)
    }

    /// Same as [`Configuration::load`] but reads the given file instead of the default one.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        Self::figment(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.digest.password = REDACTED.to_string();
        config
    }
}
