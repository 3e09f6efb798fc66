// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{Column, Row};
use crate::entity::EntityKind;
use crate::error::Result;
use crate::overlay::{self, OverlayType};
use crate::path::join_str;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Columns a collection lookup selects, in this order
pub const COLLECTION_COLUMNS: [Column; 9] = [
    Column::CollName,
    Column::CollParentName,
    Column::CollOwnerName,
    Column::CollOwnerZone,
    Column::CollType,
    Column::CollInfo1,
    Column::CollInfo2,
    Column::CollCreateTime,
    Column::CollModifyTime,
];

/// Columns a data object lookup selects, in this order
pub const DATA_OBJECT_COLUMNS: [Column; 8] = [
    Column::DataCollName,
    Column::DataName,
    Column::DataSize,
    Column::DataOwnerName,
    Column::DataOwnerZone,
    Column::DataResource,
    Column::DataCreateTime,
    Column::DataModifyTime,
];

/// Object-level columns for listings and searches
///
/// Replicas differ only in their resource, so a distinct selection without
/// it answers one row per data object.
pub const DATA_OBJECT_LISTING_COLUMNS: [Column; 7] = [
    Column::DataCollName,
    Column::DataName,
    Column::DataSize,
    Column::DataOwnerName,
    Column::DataOwnerZone,
    Column::DataCreateTime,
    Column::DataModifyTime,
];

/// Resolved description of one namespace path
///
/// Built fresh by every resolution and never cached. When `overlay` is not
/// [`OverlayType::Normal`], `canonical_collection_path` differs from
/// `absolute_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    /// The path as requested
    pub absolute_path: String,
    pub entity_kind: EntityKind,
    pub overlay: OverlayType,
    pub canonical_collection_path: String,
    /// Path of the catalog row this record was read from
    pub catalog_path: String,
    /// Catalog path of the overlay root governing this record
    pub overlay_root: Option<String>,
    pub owner_name: String,
    pub owner_zone: String,
    pub data_size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub resource: Option<String>,
    pub is_stand_in: bool,
}

impl StatRecord {
    /// Reads a row selected with [`COLLECTION_COLUMNS`]
    pub fn from_collection_row(row: &Row<'_>) -> Result<Self> {
        let path = row.text(Column::CollName)?;
        let class = overlay::classify(path, row)?;
        Ok(Self {
            absolute_path: path.to_string(),
            entity_kind: EntityKind::Collection,
            overlay: class.overlay,
            canonical_collection_path: class.canonical_path,
            catalog_path: path.to_string(),
            overlay_root: class.overlay.is_overlay().then(|| path.to_string()),
            owner_name: row.text(Column::CollOwnerName)?.to_string(),
            owner_zone: row.text(Column::CollOwnerZone)?.to_string(),
            data_size: 0,
            created_at: row.timestamp(Column::CollCreateTime)?,
            modified_at: row.timestamp(Column::CollModifyTime)?,
            resource: class.resource,
            is_stand_in: false,
        })
    }

    /// Reads a row selected with [`DATA_OBJECT_COLUMNS`] or
    /// [`DATA_OBJECT_LISTING_COLUMNS`]
    pub fn from_data_object_row(row: &Row<'_>) -> Result<Self> {
        let path = join_str(row.text(Column::DataCollName)?, row.text(Column::DataName)?);
        let resource = row.selected_text(Column::DataResource)?.unwrap_or_default().trim();
        Ok(Self {
            absolute_path: path.clone(),
            entity_kind: EntityKind::DataObject,
            overlay: OverlayType::Normal,
            canonical_collection_path: path.clone(),
            catalog_path: path,
            overlay_root: None,
            owner_name: row.text(Column::DataOwnerName)?.to_string(),
            owner_zone: row.text(Column::DataOwnerZone)?.to_string(),
            data_size: row.unsigned(Column::DataSize)?,
            created_at: row.timestamp(Column::DataCreateTime)?,
            modified_at: row.timestamp(Column::DataModifyTime)?,
            resource: (!resource.is_empty()).then(|| resource.to_string()),
            is_stand_in: false,
        })
    }

    /// Synthetic collection record licensed by a visible deeper path
    pub(crate) fn stand_in(path: &str, zone: &str) -> Self {
        Self {
            absolute_path: path.to_string(),
            entity_kind: EntityKind::Collection,
            overlay: OverlayType::Normal,
            canonical_collection_path: path.to_string(),
            catalog_path: path.to_string(),
            overlay_root: None,
            owner_name: String::new(),
            owner_zone: zone.to_string(),
            data_size: 0,
            created_at: None,
            modified_at: None,
            resource: None,
            is_stand_in: true,
        }
    }

    /// Re-presents a record found below an overlay at `presented`
    ///
    /// A record without its own overlay takes on the enclosing one.
    #[must_use]
    pub(crate) fn presented_at(
        mut self,
        presented: &str,
        enclosing: OverlayType,
        enclosing_root: &str,
    ) -> Self {
        if self.overlay_root.is_none() {
            self.overlay = enclosing;
            self.overlay_root = Some(enclosing_root.to_string());
        }
        self.absolute_path = presented.to_string();
        self
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.entity_kind.is_collection()
    }

    /// True when the record was reached through an enclosing overlay
    #[must_use]
    pub fn is_presented_elsewhere(&self) -> bool {
        self.catalog_path != self.absolute_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_cells(path: &str, kind: &str, info1: &str) -> Vec<String> {
        vec![
            path.to_string(),
            crate::path::parent_str(path).to_string(),
            "alice".to_string(),
            "z".to_string(),
            kind.to_string(),
            info1.to_string(),
            String::new(),
            "1700000000".to_string(),
            "1700000100".to_string(),
        ]
    }

    #[test]
    fn test_collection_row() {
        let cells = collection_cells("/z/home/alice", "", "");
        let record = StatRecord::from_collection_row(&Row::new(&COLLECTION_COLUMNS, &cells)).unwrap();
        assert_eq!(record.absolute_path, "/z/home/alice");
        assert_eq!(record.canonical_collection_path, "/z/home/alice");
        assert_eq!(record.overlay, OverlayType::Normal);
        assert_eq!(record.overlay_root, None);
        assert_eq!(record.owner_name, "alice");
        assert!(record.is_collection());
        assert!(!record.is_stand_in);
        assert!(!record.is_presented_elsewhere());
        assert_eq!(record.modified_at.unwrap().timestamp(), 1_700_000_100);
    }

    #[test]
    fn test_linked_collection_row() {
        let cells = collection_cells("/z/home/alice/dst", "linked", "/z/home/alice/src");
        let record = StatRecord::from_collection_row(&Row::new(&COLLECTION_COLUMNS, &cells)).unwrap();
        assert_eq!(record.overlay, OverlayType::LinkedCollection);
        assert_eq!(record.canonical_collection_path, "/z/home/alice/src");
        assert_eq!(record.overlay_root.as_deref(), Some("/z/home/alice/dst"));
        assert_ne!(record.canonical_collection_path, record.absolute_path);
    }

    #[test]
    fn test_data_object_row() {
        let cells: Vec<String> = ["/z/home/alice", "a.txt", "12", "alice", "z", "demoResc", "", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let record = StatRecord::from_data_object_row(&Row::new(&DATA_OBJECT_COLUMNS, &cells)).unwrap();
        assert_eq!(record.absolute_path, "/z/home/alice/a.txt");
        assert_eq!(record.entity_kind, EntityKind::DataObject);
        assert_eq!(record.data_size, 12);
        assert_eq!(record.resource.as_deref(), Some("demoResc"));
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn test_listing_row_serializes_timestamps() {
        let cells: Vec<String> = ["/z/home/alice", "a.txt", "12", "alice", "z", "1700000000", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let record =
            StatRecord::from_data_object_row(&Row::new(&DATA_OBJECT_LISTING_COLUMNS, &cells)).unwrap();
        assert_eq!(record.resource, None);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_at"], "2023-11-14T22:13:20Z");
        assert!(json["modified_at"].is_null());
    }

    #[test]
    fn test_stand_in_invariants() {
        let record = StatRecord::stand_in("/", "z");
        assert!(record.is_stand_in);
        assert_eq!(record.overlay, OverlayType::Normal);
        assert_eq!(record.entity_kind, EntityKind::Collection);
        assert_eq!(record.canonical_collection_path, "/");
    }

    #[test]
    fn test_presented_at_inherits_enclosing_overlay() {
        let cells = collection_cells("/z/src/sub", "", "");
        let record = StatRecord::from_collection_row(&Row::new(&COLLECTION_COLUMNS, &cells))
            .unwrap()
            .presented_at("/z/dst/sub", OverlayType::LinkedCollection, "/z/dst");
        assert_eq!(record.absolute_path, "/z/dst/sub");
        assert_eq!(record.catalog_path, "/z/src/sub");
        assert_eq!(record.canonical_collection_path, "/z/src/sub");
        assert_eq!(record.overlay, OverlayType::LinkedCollection);
        assert_eq!(record.overlay_root.as_deref(), Some("/z/dst"));
        assert!(record.is_presented_elsewhere());
    }
}
