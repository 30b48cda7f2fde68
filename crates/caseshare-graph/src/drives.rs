//! Document library discovery

use caseshare_core::config::LibraryConfig;
use caseshare_core::models::DriveDescriptor;

use crate::client::{read_json, GraphClient};
use crate::error::{GraphError, GraphResult};
use crate::models::DriveList;

/// Name-matching rules for the target library.
///
/// A drive matches when its lowercased name contains any target substring, or contains
/// both words of any keyword pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveMatcher {
    targets: Vec<String>,
    keyword_pairs: Vec<(String, String)>,
}

impl DriveMatcher {
    pub fn new(targets: Vec<String>, keyword_pairs: Vec<(String, String)>) -> Self {
        Self {
            targets: targets
                .into_iter()
                .map(|t| t.to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            keyword_pairs: keyword_pairs
                .into_iter()
                .map(|(a, b)| (a.to_lowercase(), b.to_lowercase()))
                .collect(),
        }
    }

    pub fn from_config(library: &LibraryConfig) -> Self {
        let mut targets = vec![library.target_name.clone()];
        targets.extend(library.aliases.iter().cloned());
        Self::new(targets, library.keyword_pairs.clone())
    }

    pub fn matches(&self, drive_name: &str) -> bool {
        let name = drive_name.to_lowercase();
        self.targets.iter().any(|t| name.contains(t.as_str()))
            || self
                .keyword_pairs
                .iter()
                .any(|(a, b)| name.contains(a.as_str()) && name.contains(b.as_str()))
    }

    /// First matching drive in listing order, else the first document library.
    pub fn select<'a>(&self, drives: &'a [DriveDescriptor]) -> Option<&'a DriveDescriptor> {
        drives
            .iter()
            .find(|d| self.matches(&d.name))
            .or_else(|| drives.iter().find(|d| d.is_document_library()))
    }
}

/// Resolves the target drive of a site
#[derive(Debug, Clone)]
pub struct DriveResolver {
    site_id: String,
    matcher: DriveMatcher,
}

impl DriveResolver {
    pub fn new(site_id: impl Into<String>, matcher: DriveMatcher) -> Self {
        Self {
            site_id: site_id.into(),
            matcher,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn matcher(&self) -> &DriveMatcher {
        &self.matcher
    }

    /// List the drives of the site, in the order Graph returns them.
    pub async fn list_drives(&self, client: &GraphClient) -> GraphResult<Vec<DriveDescriptor>> {
        let response = client.get(&format!("/sites/{}/drives", self.site_id)).await?;
        let list: DriveList = read_json(response).await?;
        Ok(list.value)
    }

    #[tracing::instrument(skip(self, client), fields(site_id = %self.site_id))]
    pub async fn resolve(&self, client: &GraphClient) -> GraphResult<DriveDescriptor> {
        let drives = self.list_drives(client).await?;
        tracing::debug!(
            drives = %drives.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", "),
            "Listed site drives"
        );

        match self.matcher.select(&drives) {
            Some(drive) => {
                tracing::debug!(drive_id = %drive.id, drive_name = %drive.name, "Drive resolved");
                Ok(drive.clone())
            }
            None => {
                tracing::warn!(drive_count = drives.len(), "No suitable document library found");
                Err(GraphError::NoSuitableDrive(self.site_id.clone()))
            }
        }
    }
}
