use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{GroupMapping, GroupRecord};
use crate::error::CalendarError;

pub const DEFAULT_CATALOG_URL: &str = "https://szymonkonopek.github.io/calendar/group_folder.json";

const BUNDLED_CATALOG: &str = include_str!("../data/group_folder.json");

/// Abstract reason a catalog could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    Fetch,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Bundled,
    File(Utf8PathBuf),
    Remote(String),
}

impl CatalogSource {
    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Bundled => "bundled".to_string(),
            CatalogSource::File(path) => format!("file:{path}"),
            CatalogSource::Remote(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub groups: usize,
}

/// Flat, ordered list of every group in the source mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<GroupRecord>,
    categories: Vec<CategorySummary>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn flatten(mapping: GroupMapping) -> Self {
        let mut records = Vec::new();
        let mut categories: Vec<CategorySummary> = Vec::new();
        for (category, groups) in mapping.into_categories() {
            // a repeated key folds into the first occurrence
            match categories.iter_mut().find(|summary| summary.name == category) {
                Some(summary) => summary.groups += groups.len(),
                None => categories.push(CategorySummary {
                    name: category.clone(),
                    groups: groups.len(),
                }),
            }
            records.extend(
                groups
                    .into_iter()
                    .map(|(name, id)| GroupRecord::new(name, id, category.clone())),
            );
        }
        Self {
            records,
            categories,
        }
    }

    pub fn from_json(content: &str) -> Result<Self, CalendarError> {
        let mapping: GroupMapping = serde_json::from_str(content)
            .map_err(|err| CalendarError::CatalogParse(err.to_string()))?;
        Ok(Self::flatten(mapping))
    }

    pub fn bundled() -> Result<Self, CalendarError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn records(&self) -> &[GroupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&GroupRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Categories in first-seen source order, empty ones included.
    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }
}

pub trait CatalogClient: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, CalendarError>;
}

#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
}

impl CatalogHttpClient {
    pub fn new() -> Result<Self, CalendarError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("uek-cal/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CalendarError::CatalogHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CalendarError::CatalogHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl CatalogClient for CatalogHttpClient {
    // Single attempt. A failed fetch goes straight back to the caller.
    fn fetch(&self, url: &str) -> Result<String, CalendarError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| CalendarError::CatalogHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "catalog request failed".to_string());
            return Err(CalendarError::CatalogStatus { status, message });
        }
        response
            .text()
            .map_err(|err| CalendarError::CatalogHttp(err.to_string()))
    }
}

/// Stands in for the HTTP client when the source is local.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

impl CatalogClient for OfflineClient {
    fn fetch(&self, url: &str) -> Result<String, CalendarError> {
        Err(CalendarError::CatalogHttp(format!(
            "no HTTP client configured for {url}"
        )))
    }
}

pub struct CatalogLoader<C: CatalogClient> {
    client: C,
}

impl<C: CatalogClient> CatalogLoader<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn load(&self, source: &CatalogSource) -> Result<Catalog, CalendarError> {
        debug!(source = %source.describe(), "loading catalog");
        let catalog = match source {
            CatalogSource::Bundled => Catalog::bundled()?,
            CatalogSource::File(path) => {
                let content = fs::read_to_string(path.as_std_path())
                    .map_err(|_| CalendarError::CatalogRead(path.clone().into_std_path_buf()))?;
                Catalog::from_json(&content)?
            }
            CatalogSource::Remote(url) => {
                let body = self.client.fetch(url)?;
                Catalog::from_json(&body)?
            }
        };
        info!(
            source = %source.describe(),
            groups = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

/// Loads `source`, building an HTTP client only when it is remote.
pub fn load_source(source: &CatalogSource) -> Result<Catalog, CalendarError> {
    match source {
        CatalogSource::Remote(_) => CatalogLoader::new(CatalogHttpClient::new()?).load(source),
        CatalogSource::Bundled | CatalogSource::File(_) => {
            CatalogLoader::new(OfflineClient).load(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.find_by_id(&catalog.records()[0].id).is_some());
    }

    #[test]
    fn categories_count_groups_in_order() {
        let catalog =
            Catalog::from_json(r#"{"B": [["x", "1"], ["y", "2"]], "A": [["z", "3"]], "C": []}"#)
                .unwrap();
        let summary = catalog
            .categories()
            .iter()
            .map(|category| (category.name.as_str(), category.groups))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("B", 2), ("A", 1), ("C", 0)]);
    }
}
