// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML description of a catalog's contents
//!
//! ```yaml
//! zone: tempZone
//! federated_zones: [otherZone]
//! collections:
//!   - path: /tempZone/home/alice/linked
//!     owner: alice
//!     overlay: linked-collection
//!     target: /tempZone/home/alice/data
//! data_objects:
//!   - path: /tempZone/home/alice/data/a.txt
//!     owner: alice
//!     size: 12
//! grants:
//!   - path: /tempZone/home/alice/data
//!     user: bob
//!     level: read
//! ```

use super::{MemoryCatalog, MemoryCatalogBuilder};
use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::overlay::OverlayType;
use crate::permissions::AccessLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFixture {
    pub zone: String,
    #[serde(default)]
    pub federated_zones: Vec<String>,
    #[serde(default)]
    pub collections: Vec<FixtureCollection>,
    #[serde(default)]
    pub data_objects: Vec<FixtureObject>,
    #[serde(default)]
    pub overlay_contents: Vec<FixtureOverlayContent>,
    #[serde(default)]
    pub grants: Vec<FixtureGrant>,
    #[serde(default)]
    pub metadata: Vec<FixtureMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureCollection {
    pub path: String,
    pub owner: String,
    #[serde(default)]
    pub overlay: OverlayType,
    /// Canonical path of a link, mount root, or archive
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureObject {
    pub path: String,
    pub owner: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureOverlayContent {
    pub mount: String,
    /// Path relative to the mount root
    pub path: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureGrant {
    pub path: String,
    pub user: String,
    pub level: AccessLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureMetadata {
    pub path: String,
    pub attribute: String,
    pub value: String,
    #[serde(default)]
    pub units: String,
}

impl CatalogFixture {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| Error::config(format!("invalid catalog fixture: {e}")))
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn into_builder(self) -> Result<MemoryCatalogBuilder> {
        let mut builder = MemoryCatalogBuilder::new(&self.zone);
        for zone in &self.federated_zones {
            builder = builder.federated_zone(zone);
        }

        for c in &self.collections {
            let target = c.target.as_deref();
            builder = match (c.overlay, target) {
                (OverlayType::Normal, _) => builder.collection(&c.path, &c.owner),
                (_, None) => {
                    return Err(Error::config(format!("{} at {} needs a target", c.overlay, c.path)));
                }
                (OverlayType::LinkedCollection, Some(target)) => builder.linked_collection(&c.path, target, &c.owner),
                (OverlayType::MountedFilesystem, Some(target)) => builder.mounted_collection(
                    &c.path,
                    target,
                    c.resource.as_deref().unwrap_or(""),
                    &c.owner,
                ),
                (OverlayType::StructuredFileMount, Some(target)) => {
                    builder.structured_file_collection(&c.path, target, &c.owner)
                }
            };
        }

        for o in &self.data_objects {
            builder = builder.data_object(&o.path, &o.owner, o.size);
        }

        for content in &self.overlay_contents {
            builder = match content.kind {
                EntityKind::Collection => builder.overlay_collection(&content.mount, &content.path),
                EntityKind::DataObject => builder.overlay_data_object(&content.mount, &content.path, content.size),
            };
        }

        for g in &self.grants {
            builder = builder.grant(&g.path, &g.user, g.level);
        }

        for m in &self.metadata {
            builder = builder.avu(&m.path, &m.attribute, &m.value, &m.units);
        }

        Ok(builder)
    }

    pub fn build(self) -> Result<MemoryCatalog> {
        self.into_builder()?.build()
    }
}
