// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Permission augmentation for listing entries

use crate::catalog::{Column, Condition};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::listing::ListingEntry;
use crate::overlay::PermissionSource;
use diagnostics::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Access granted to one principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Null,
    ReadMetadata,
    Read,
    Write,
    Own,
}

impl AccessLevel {
    /// Name used in the catalog's access level column
    pub fn catalog_name(&self) -> &'static str {
        match self {
            AccessLevel::Null => "null",
            AccessLevel::ReadMetadata => "read metadata",
            AccessLevel::Read => "read object",
            AccessLevel::Write => "modify object",
            AccessLevel::Own => "own",
        }
    }

    pub fn from_catalog_name(name: &str) -> Option<Self> {
        match name.trim() {
            "null" => Some(AccessLevel::Null),
            "read metadata" => Some(AccessLevel::ReadMetadata),
            "read object" | "read" => Some(AccessLevel::Read),
            "modify object" | "write" => Some(AccessLevel::Write),
            "own" => Some(AccessLevel::Own),
            _ => None,
        }
    }

    #[must_use]
    pub fn allows_read(&self) -> bool {
        *self >= AccessLevel::Read
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.catalog_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPermission {
    pub user_name: String,
    pub user_zone: String,
    pub level: AccessLevel,
}

const ACCESS_COLUMNS: [Column; 4] = [
    Column::AccessObjectPath,
    Column::AccessUserName,
    Column::AccessUserZone,
    Column::AccessLevel,
];

/// Attaches ACL rows to every entry
///
/// Entries are grouped by where their ACL lives and each group costs one
/// catalog query, so a page of siblings costs one round trip.
pub async fn augment(ctx: &CallContext<'_>, entries: &mut [ListingEntry]) -> Result<()> {
    let mut groups: BTreeMap<PermissionSource, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        groups.entry(entry.permission_source()).or_default().push(idx);
    }

    let group_count = groups.len();
    debug!("permission augmentation over {group_count} ACL sources", group_count: group_count);

    for (source, members) in groups {
        let condition = match &source {
            PermissionSource::ChildrenOf { parent } => {
                Condition::Equal(Column::AccessParentPath, parent.clone())
            }
            PermissionSource::InheritedFrom { object } => {
                Condition::Equal(Column::AccessObjectPath, object.clone())
            }
        };
        let query = ctx
            .query()
            .select_all(&ACCESS_COLUMNS)
            .filter(condition)
            .build()?;
        let rows = ctx.run_all(&query).await?;

        let mut acl: Vec<(String, UserPermission)> = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let raw_level = row.text(Column::AccessLevel)?;
            let level = AccessLevel::from_catalog_name(raw_level).ok_or_else(|| {
                Error::malformed_row(Column::AccessLevel, format!("unknown access level '{raw_level}'"))
            })?;
            acl.push((
                row.text(Column::AccessObjectPath)?.to_string(),
                UserPermission {
                    user_name: row.text(Column::AccessUserName)?.to_string(),
                    user_zone: row.text(Column::AccessUserZone)?.to_string(),
                    level,
                },
            ));
        }

        for idx in members {
            let entry = &mut entries[idx];
            entry.permissions = match &source {
                PermissionSource::ChildrenOf { .. } => acl
                    .iter()
                    .filter(|(object, _)| *object == entry.catalog_path)
                    .map(|(_, perm)| perm.clone())
                    .collect(),
                PermissionSource::InheritedFrom { .. } => {
                    acl.iter().map(|(_, perm)| perm.clone()).collect()
                }
            };
        }
    }

    Ok(())
}
