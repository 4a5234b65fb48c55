use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, DEFAULT_CATALOG_URL};
use crate::error::CalendarError;
use crate::link::LinkBuilder;

pub const LOCAL_CONFIG_FILE: &str = "uek-cal.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    /// Fetch the catalog from this URL instead of the bundled copy.
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<Utf8PathBuf>,
    /// Force the bundled catalog even when a URL or path is set.
    #[serde(default)]
    pub bundled: Option<bool>,
    #[serde(default)]
    pub schedules_base_url: Option<String>,
    #[serde(default)]
    pub telemetry_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub catalog: CatalogSource,
    pub links: LinkBuilder,
    pub telemetry_endpoint: Option<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<Utf8PathBuf>,
    /// `Some(None)` means "remote, default URL".
    pub remote: Option<Option<String>>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Explicit path, then `./uek-cal.json`, then the platform config
    /// directory. No file anywhere is not an error.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CalendarError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let Some(config_path) = config_path else {
            return Ok(Self::resolve_config(Config::default()));
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CalendarError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CalendarError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("pl", "uek", "uek-cal").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Log file used while the terminal screen owns stderr.
    pub fn log_path() -> Option<PathBuf> {
        ProjectDirs::from("pl", "uek", "uek-cal").map(|dirs| dirs.cache_dir().join("uek-cal.log"))
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        Self::global_config_path().filter(|path| path.exists())
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let schema_version = config.schema_version.unwrap_or(1);

        let catalog = if config.bundled.unwrap_or(false) {
            CatalogSource::Bundled
        } else if let Some(path) = config.catalog_path {
            CatalogSource::File(path)
        } else if let Some(url) = config.catalog_url {
            CatalogSource::Remote(url)
        } else {
            CatalogSource::Bundled
        };

        let links = config
            .schedules_base_url
            .map(LinkBuilder::new)
            .unwrap_or_default();

        let telemetry_endpoint = config
            .telemetry_endpoint
            .filter(|endpoint| !endpoint.trim().is_empty());

        ResolvedConfig {
            schema_version,
            catalog,
            links,
            telemetry_endpoint,
        }
    }
}

impl ResolvedConfig {
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.catalog_path {
            self.catalog = CatalogSource::File(path);
        } else if let Some(remote) = overrides.remote {
            self.catalog =
                CatalogSource::Remote(remote.unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()));
        }
        self
    }
}
