// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Overlay classification
//!
//! Every collection row carries an overlay discriminator and a canonical
//! path field. This module is the one place that turns those into an
//! [`OverlayType`] and decides how presented paths map onto canonical ones
//! and where access control for a path is read from. It does no I/O.

use crate::catalog::{Column, Row};
use crate::error::{Error, Result};
use crate::path::{basename_str, join_str, parent_str};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayType {
    #[default]
    Normal,
    /// Presented path points at a canonical collection elsewhere
    LinkedCollection,
    /// Foreign filesystem subtree exposed as collection contents
    MountedFilesystem,
    /// Archive data object exposed as a collection
    StructuredFileMount,
}

impl OverlayType {
    /// Catalog discriminator stored in the collection type column
    pub fn discriminator(&self) -> &'static str {
        match self {
            OverlayType::Normal => "",
            OverlayType::LinkedCollection => "linked",
            OverlayType::MountedFilesystem => "filesystem-mount",
            OverlayType::StructuredFileMount => "structured-file",
        }
    }

    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value.trim() {
            "" => Some(OverlayType::Normal),
            "linked" => Some(OverlayType::LinkedCollection),
            "filesystem-mount" => Some(OverlayType::MountedFilesystem),
            "structured-file" => Some(OverlayType::StructuredFileMount),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_overlay(&self) -> bool {
        !matches!(self, OverlayType::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayType::Normal => "normal",
            OverlayType::LinkedCollection => "linked-collection",
            OverlayType::MountedFilesystem => "mounted-filesystem",
            OverlayType::StructuredFileMount => "structured-file-mount",
        }
    }
}

impl std::fmt::Display for OverlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overlay facts read from one collection row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub overlay: OverlayType,
    /// Where the collection's contents actually live
    pub canonical_path: String,
    /// Storage resource backing a mount, when the catalog names one
    pub resource: Option<String>,
}

/// Classifies the collection row stored at `path`
///
/// Normal collections ignore the overlay info columns. An overlay whose
/// canonical path is the collection itself, or lies inside it, cannot be
/// translated without looping and is reported as [`Error::AmbiguousPath`].
pub fn classify(path: &str, row: &Row<'_>) -> Result<Classification> {
    let raw_type = row.text(Column::CollType)?;
    let overlay = OverlayType::from_discriminator(raw_type).ok_or_else(|| {
        Error::malformed_row(
            Column::CollType,
            format!("unknown overlay discriminator '{raw_type}'"),
        )
    })?;

    if !overlay.is_overlay() {
        return Ok(Classification {
            overlay,
            canonical_path: path.to_string(),
            resource: None,
        });
    }

    let target = row.text(Column::CollInfo1)?.trim().trim_end_matches('/');
    if target.is_empty() || !target.starts_with('/') {
        return Err(Error::malformed_row(
            Column::CollInfo1,
            format!("{overlay} at {path} has no absolute canonical path ('{target}')"),
        ));
    }
    if target == path || is_descendant(target, path) {
        return Err(Error::ambiguous_path(
            path,
            format!("{overlay} target {target} is inside the overlay itself"),
        ));
    }

    let resource = row.text(Column::CollInfo2)?.trim();
    Ok(Classification {
        overlay,
        canonical_path: target.to_string(),
        resource: (!resource.is_empty()).then(|| resource.to_string()),
    })
}

/// True when `path` lies strictly below `ancestor`
#[must_use]
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return path != "/" && path.starts_with('/');
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Maps a path below an overlay root onto the root's canonical subtree
pub fn translate_descendant(root_path: &str, root_canonical: &str, path: &str) -> Option<String> {
    if path == root_path {
        return Some(root_canonical.to_string());
    }
    if !is_descendant(path, root_path) {
        return None;
    }
    let suffix = path[root_path.len()..].trim_start_matches('/');
    Some(join_str(root_canonical, suffix))
}

/// Presented and canonical paths of one child named `name`
///
/// Children of an overlay are queried under the parent's canonical path but
/// presented under the path the caller listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPaths {
    pub presented: String,
    pub catalog: String,
}

pub fn child_paths(presented_parent: &str, canonical_parent: &str, catalog_child: &str) -> ChildPaths {
    let name = basename_str(catalog_child);
    ChildPaths {
        presented: join_str(presented_parent, name),
        catalog: join_str(canonical_parent, name),
    }
}

/// Where the access control list for one catalog path is read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionSource {
    /// The object's own ACL, batched with its siblings under `parent`
    ChildrenOf { parent: String },
    /// Mount contents have no ACL rows of their own and share the root's
    InheritedFrom { object: String },
}

/// Decides the ACL source for an object found at `catalog_path`
///
/// Linked content is stored under its canonical path, so its own rows
/// apply. Mount and archive content inherits from the mount root.
pub fn permission_source(
    overlay: OverlayType,
    catalog_path: &str,
    overlay_root: Option<&str>,
) -> PermissionSource {
    match (overlay, overlay_root) {
        (OverlayType::MountedFilesystem | OverlayType::StructuredFileMount, Some(root))
            if root != catalog_path =>
        {
            PermissionSource::InheritedFrom {
                object: root.to_string(),
            }
        }
        _ => PermissionSource::ChildrenOf {
            parent: parent_str(catalog_path).to_string(),
        },
    }
}
