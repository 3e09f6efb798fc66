// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use gridns::{
    CatalogFixture, ChildKinds, EntityKind, ListingEntry, Namespace, NamespaceConfig, OverlayType,
    SessionContext, StatRecord,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Which children a listing shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindChoice {
    /// Sub-collections only
    Collections,
    /// Data objects only
    Objects,
    /// Sub-collections, then data objects
    All,
}

impl From<KindChoice> for ChildKinds {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::Collections => ChildKinds::Collections,
            KindChoice::Objects => ChildKinds::DataObjects,
            KindChoice::All => ChildKinds::All,
        }
    }
}

/// Which kind of object a search matches
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityChoice {
    Collections,
    Objects,
}

impl From<EntityChoice> for EntityKind {
    fn from(choice: EntityChoice) -> Self {
        match choice {
            EntityChoice::Collections => EntityKind::Collection,
            EntityChoice::Objects => EntityKind::DataObject,
        }
    }
}

/// Everything a command needs to open a namespace session
#[derive(Clone, Debug, Default)]
pub struct GridContext {
    /// YAML catalog fixture to serve queries from
    pub catalog: PathBuf,
    pub user: String,
    /// Home zone of the caller; defaults to the fixture's zone
    pub zone: Option<String>,
    /// YAML namespace configuration
    pub config: Option<PathBuf>,
    pub fallback: bool,
    /// Hide rows the caller holds no grant on
    pub strict: bool,
    /// Zone hint forwarded on every query
    pub hint: Option<String>,
    pub json: bool,
}

impl GridContext {
    pub fn open_namespace(&self) -> Result<Namespace> {
        let fixture = CatalogFixture::from_file(&self.catalog)
            .with_context(|| format!("loading catalog {}", self.catalog.display()))?;
        let home_zone = self.zone.clone().unwrap_or_else(|| fixture.zone.clone());
        let federated = fixture.federated_zones.clone();
        let mut catalog = fixture.build()?;
        if self.strict {
            catalog = catalog.as_viewer(&self.user);
        }

        let mut config = match &self.config {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                NamespaceConfig::from_yaml_str(&yaml)?
            }
            None => NamespaceConfig::default(),
        };
        if self.fallback {
            config = config.with_fallback(true);
        }

        let mut session = SessionContext::new(self.user.as_str(), home_zone)?;
        for zone in federated {
            session = session.with_federated_zone(zone);
        }
        diagnostics::debug!("opening namespace for {user}", user: self.user.as_str());
        Ok(Namespace::new(Arc::new(catalog), session).with_config(config)?)
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

/// Helper function to format sizes
pub fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 * 1024 {
        format!("{:.1}GB", size as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{}B", size)
    }
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn overlay_marker(overlay: OverlayType) -> &'static str {
    match overlay {
        OverlayType::Normal => "",
        OverlayType::LinkedCollection => "@",
        OverlayType::MountedFilesystem => "%",
        OverlayType::StructuredFileMount => "&",
    }
}

/// One `ls -l` style line
pub fn format_entry(entry: &ListingEntry) -> String {
    let kind = if entry.is_collection() { 'C' } else { '-' };
    let mut line = format!(
        "{kind}{:<1} {:>5} {:<12} {:>8} {} {}",
        overlay_marker(entry.overlay),
        entry.sequence_index,
        entry.owner_name,
        format_size(entry.data_size),
        format_time(entry.modified_at),
        entry.name(),
    );
    if entry.canonical_path != entry.path_or_name {
        line.push_str(&format!(" -> {}", entry.canonical_path));
    }
    for permission in &entry.permissions {
        line.push_str(&format!(
            "\n        {}#{}: {}",
            permission.user_name, permission.user_zone, permission.level
        ));
    }
    line.push('\n');
    line
}

pub fn format_stat(record: &StatRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("path:      {}\n", record.absolute_path));
    out.push_str(&format!("kind:      {}\n", record.entity_kind));
    out.push_str(&format!("overlay:   {}\n", record.overlay));
    if record.canonical_collection_path != record.absolute_path {
        out.push_str(&format!("canonical: {}\n", record.canonical_collection_path));
    }
    if !record.owner_name.is_empty() {
        out.push_str(&format!("owner:     {}#{}\n", record.owner_name, record.owner_zone));
    }
    if !record.is_collection() {
        out.push_str(&format!("size:      {}\n", format_size(record.data_size)));
    }
    if let Some(resource) = &record.resource {
        out.push_str(&format!("resource:  {resource}\n"));
    }
    out.push_str(&format!("created:   {}\n", format_time(record.created_at)));
    out.push_str(&format!("modified:  {}\n", format_time(record.modified_at)));
    if record.is_stand_in {
        out.push_str("stand-in:  yes\n");
    }
    out
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(2048), "2.0KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0MB");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "-");
        let time = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(format_time(time), "2023-11-14 22:13");
    }

    #[test]
    fn test_kind_choices() {
        assert_eq!(ChildKinds::from(KindChoice::Objects), ChildKinds::DataObjects);
        assert_eq!(EntityKind::from(EntityChoice::Collections), EntityKind::Collection);
    }
}
