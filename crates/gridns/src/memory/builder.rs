// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::MemoryCatalog;
use super::tables::{ANY_ZONE, AccessRow, CollectionRow, DataObjectRow, MetadataRow, Tables};
use crate::error::{Error, Result};
use crate::overlay::OverlayType;
use crate::path::{NsPath, join_str, parent_str};
use crate::permissions::AccessLevel;

/// Administrator that owns the zone skeleton
pub const ZONE_ADMIN: &str = "rods";

const FIRST_TIMESTAMP: i64 = 1_700_000_000;

/// Populates a [`MemoryCatalog`]
///
/// Every zone starts with `/`, `/<zone>` and `/<zone>/home` owned by
/// [`ZONE_ADMIN`]. Missing ancestors are created on demand, and owners get
/// an `own` grant on what they create. Path errors are collected and
/// reported by [`MemoryCatalogBuilder::build`].
#[derive(Debug)]
pub struct MemoryCatalogBuilder {
    local_zone: String,
    tables: Tables,
    clock: i64,
    default_resource: String,
    errors: Vec<String>,
}

impl MemoryCatalogBuilder {
    pub fn new(zone: &str) -> Self {
        let mut builder = Self {
            local_zone: zone.to_string(),
            tables: Tables::default(),
            clock: FIRST_TIMESTAMP,
            default_resource: "demoResc".to_string(),
            errors: Vec::new(),
        };
        builder.push_collection("/", "", "", "", ZONE_ADMIN, ANY_ZONE.to_string(), None);
        builder.add_zone(zone);
        builder
    }

    /// Adds a federated zone with its own skeleton
    #[must_use]
    pub fn federated_zone(mut self, zone: &str) -> Self {
        self.add_zone(zone);
        self
    }

    /// Resource recorded on data objects created without one
    #[must_use]
    pub fn default_resource(mut self, resource: &str) -> Self {
        self.default_resource = resource.to_string();
        self
    }

    #[must_use]
    pub fn collection(self, path: &str, owner: &str) -> Self {
        self.overlay(path, OverlayType::Normal, "", "", owner)
    }

    #[must_use]
    pub fn linked_collection(self, path: &str, target: &str, owner: &str) -> Self {
        self.overlay(path, OverlayType::LinkedCollection, target, "", owner)
    }

    #[must_use]
    pub fn mounted_collection(self, path: &str, physical_root: &str, resource: &str, owner: &str) -> Self {
        self.overlay(path, OverlayType::MountedFilesystem, physical_root, resource, owner)
    }

    #[must_use]
    pub fn structured_file_collection(self, path: &str, archive: &str, owner: &str) -> Self {
        self.overlay(path, OverlayType::StructuredFileMount, archive, "", owner)
    }

    /// A collection row with arbitrary overlay columns
    #[must_use]
    pub fn raw_collection(mut self, path: &str, coll_type: &str, info1: &str, info2: &str, owner: &str) -> Self {
        if let Some(path) = self.checked(path) {
            self.upsert_collection(&path, coll_type, info1, info2, owner);
        }
        self
    }

    fn overlay(mut self, path: &str, overlay: OverlayType, info1: &str, info2: &str, owner: &str) -> Self {
        let Some(path) = self.checked(path) else {
            return self;
        };
        let info1 = if overlay.is_overlay() {
            match self.checked(info1) {
                Some(target) => target.as_str().to_string(),
                None => return self,
            }
        } else {
            String::new()
        };
        self.upsert_collection(&path, overlay.discriminator(), &info1, info2, owner);
        self
    }

    /// A collection inside a mount's canonical subtree
    ///
    /// The row is stored under the mount's canonical path and shares the
    /// mount's ACL.
    #[must_use]
    pub fn overlay_collection(mut self, mount: &str, relative: &str) -> Self {
        if let Some((path, mount)) = self.overlay_content_path(mount, relative) {
            self.ensure_overlay_ancestors(&path, &mount);
            if self.tables.collection(&path).is_none() {
                let created = self.tick();
                self.tables.collections.push(CollectionRow {
                    name: path,
                    owner_name: mount.owner_name.clone(),
                    owner_zone: mount.owner_zone.clone(),
                    coll_type: String::new(),
                    info1: String::new(),
                    info2: String::new(),
                    created,
                    modified: created,
                    zone: mount.zone.clone(),
                    acl_path: mount.name.clone(),
                });
            }
        }
        self
    }

    /// A data object inside a mount's canonical subtree
    #[must_use]
    pub fn overlay_data_object(mut self, mount: &str, relative: &str, size: u64) -> Self {
        if let Some((path, mount)) = self.overlay_content_path(mount, relative) {
            self.ensure_overlay_ancestors(parent_str(&path), &mount);
            let created = self.tick();
            self.tables.data_objects.push(DataObjectRow {
                coll_name: parent_str(&path).to_string(),
                name: crate::path::basename_str(&path).to_string(),
                size,
                owner_name: mount.owner_name.clone(),
                owner_zone: mount.owner_zone.clone(),
                resource: if mount.info2.is_empty() {
                    self.default_resource.clone()
                } else {
                    mount.info2.clone()
                },
                created,
                modified: created,
                zone: mount.zone.clone(),
                acl_path: mount.name.clone(),
            });
        }
        self
    }

    #[must_use]
    pub fn data_object(mut self, path: &str, owner: &str, size: u64) -> Self {
        let Some(path) = self.checked(path) else {
            return self;
        };
        let (Some(parent), Some(name)) = (path.parent(), path.basename()) else {
            self.errors.push(format!("data object needs a parent: {path}"));
            return self;
        };
        self.ensure_collection(parent.as_str());
        let zone = self.zone_for(path.as_str());
        let created = self.tick();
        self.tables.data_objects.push(DataObjectRow {
            coll_name: parent.as_str().to_string(),
            name: name.to_string(),
            size,
            owner_name: owner.to_string(),
            owner_zone: self.local_zone.clone(),
            resource: self.default_resource.clone(),
            created,
            modified: created,
            zone: zone.clone(),
            acl_path: path.as_str().to_string(),
        });
        self.push_access(path.as_str(), owner, AccessLevel::Own, zone);
        self
    }

    /// Another replica of an existing data object on `resource`
    #[must_use]
    pub fn replica(mut self, path: &str, resource: &str) -> Self {
        let existing = self
            .tables
            .data_objects
            .iter()
            .find(|d| d.path() == path)
            .cloned();
        match existing {
            Some(mut row) => {
                row.resource = resource.to_string();
                self.tables.data_objects.push(row);
            }
            None => self.errors.push(format!("no data object to replicate at {path}")),
        }
        self
    }

    #[must_use]
    pub fn grant(mut self, path: &str, user: &str, level: AccessLevel) -> Self {
        if let Some(path) = self.checked(path) {
            let zone = self.zone_for(path.as_str());
            self.tables
                .access
                .retain(|a| !(a.object_path == path.as_str() && a.user_name == user));
            self.push_access(path.as_str(), user, level, zone);
        }
        self
    }

    #[must_use]
    pub fn avu(mut self, path: &str, attribute: &str, value: &str, units: &str) -> Self {
        if let Some(path) = self.checked(path) {
            let zone = self.zone_for(path.as_str());
            self.tables.metadata.push(MetadataRow {
                object_path: path.as_str().to_string(),
                attribute: attribute.to_string(),
                value: value.to_string(),
                units: units.to_string(),
                zone,
            });
        }
        self
    }

    pub fn build(self) -> Result<MemoryCatalog> {
        if !self.errors.is_empty() {
            return Err(Error::invalid_argument(format!(
                "invalid catalog contents: {}",
                self.errors.join("; ")
            )));
        }
        Ok(MemoryCatalog::from_tables(self.local_zone, self.tables))
    }

    fn checked(&mut self, path: &str) -> Option<NsPath> {
        match NsPath::parse(path) {
            Ok(path) => Some(path),
            Err(err) => {
                self.errors.push(err.to_string());
                None
            }
        }
    }

    fn tick(&mut self) -> i64 {
        let now = self.clock;
        self.clock += 60;
        now
    }

    fn add_zone(&mut self, zone: &str) {
        if self.tables.has_zone(zone) {
            return;
        }
        self.tables.zones.push(zone.to_string());
        let zone_root = format!("/{zone}");
        let home = format!("{zone_root}/home");
        for path in [zone_root, home] {
            self.push_collection(&path, "", "", "", ZONE_ADMIN, zone.to_string(), Some(zone));
        }
    }

    /// Routing zone of a catalog path
    fn zone_for(&self, path: &str) -> String {
        if path == "/" {
            return ANY_ZONE.to_string();
        }
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        if self.tables.has_zone(first) {
            first.to_string()
        } else {
            self.local_zone.clone()
        }
    }

    fn ensure_collection(&mut self, path: &str) {
        if path.is_empty() || self.tables.collection(path).is_some() {
            return;
        }
        self.ensure_collection(parent_str(path));
        let zone = self.zone_for(path);
        self.push_collection(path, "", "", "", ZONE_ADMIN, zone, None);
    }

    fn upsert_collection(&mut self, path: &NsPath, coll_type: &str, info1: &str, info2: &str, owner: &str) {
        let modified = self.tick();
        if let Some(row) = self.tables.collections.iter_mut().find(|c| c.name == path.as_str()) {
            row.coll_type = coll_type.to_string();
            row.info1 = info1.to_string();
            row.info2 = info2.to_string();
            row.owner_name = owner.to_string();
            row.modified = modified;
            let zone = row.zone.clone();
            self.push_access(path.as_str(), owner, AccessLevel::Own, zone);
            return;
        }
        if let Some(parent) = path.parent() {
            self.ensure_collection(parent.as_str());
        }
        let zone = self.zone_for(path.as_str());
        self.push_collection(path.as_str(), coll_type, info1, info2, owner, zone, None);
    }

    fn push_collection(
        &mut self,
        path: &str,
        coll_type: &str,
        info1: &str,
        info2: &str,
        owner: &str,
        zone: String,
        owner_zone: Option<&str>,
    ) {
        let created = self.tick();
        let owner_zone = owner_zone.unwrap_or(&self.local_zone).to_string();
        self.tables.collections.push(CollectionRow {
            name: path.to_string(),
            owner_name: owner.to_string(),
            owner_zone,
            coll_type: coll_type.to_string(),
            info1: info1.to_string(),
            info2: info2.to_string(),
            created,
            modified: created,
            zone: zone.clone(),
            acl_path: path.to_string(),
        });
        self.push_access(path, owner, AccessLevel::Own, zone);
    }

    fn push_access(&mut self, path: &str, user: &str, level: AccessLevel, zone: String) {
        let exists = self
            .tables
            .access
            .iter()
            .any(|a| a.object_path == path && a.user_name == user && a.level == level);
        if exists {
            return;
        }
        self.tables.access.push(AccessRow {
            object_path: path.to_string(),
            user_name: user.to_string(),
            user_zone: self.local_zone.clone(),
            level,
            zone,
        });
    }

    /// Catalog path of `relative` below a mount, plus the mount's row
    fn overlay_content_path(&mut self, mount: &str, relative: &str) -> Option<(String, CollectionRow)> {
        let mount = self.checked(mount)?;
        let row = match self.tables.collection(mount.as_str()) {
            Some(row) if !row.coll_type.is_empty() && !row.info1.is_empty() => row.clone(),
            _ => {
                self.errors.push(format!("no overlay collection at {mount}"));
                return None;
            }
        };
        let relative = relative.trim_matches('/');
        if relative.is_empty() || relative.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
            self.errors
                .push(format!("invalid path '{relative}' below overlay {mount}"));
            return None;
        }
        Some((join_str(&row.info1, relative), row))
    }

    /// Creates the collections strictly between a mount's canonical root
    /// and `path`
    fn ensure_overlay_ancestors(&mut self, path: &str, mount: &CollectionRow) {
        if path == mount.info1 || !crate::overlay::is_descendant(path, &mount.info1) {
            return;
        }
        if self.tables.collection(path).is_some() {
            return;
        }
        self.ensure_overlay_ancestors(parent_str(path), mount);
        let created = self.tick();
        self.tables.collections.push(CollectionRow {
            name: path.to_string(),
            owner_name: mount.owner_name.clone(),
            owner_zone: mount.owner_zone.clone(),
            coll_type: String::new(),
            info1: String::new(),
            info2: String::new(),
            created,
            modified: created,
            zone: mount.zone.clone(),
            acl_path: mount.name.clone(),
        });
    }
}
