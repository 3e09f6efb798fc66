// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Paginated listings of a collection's children
//!
//! A page is built from two bounded sub-queries against the parent's
//! canonical path, sub-collections first and data objects second. Children
//! of an overlay are re-presented under the path the caller listed. A page
//! is all-or-nothing: any failing round trip discards it.

use crate::catalog::{Column, Condition};
use crate::context::CallContext;
use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::fallback;
use crate::overlay::{self, OverlayType, PermissionSource};
use crate::path::parent_str;
use crate::permissions::{self, UserPermission};
use crate::stat::{COLLECTION_COLUMNS, DATA_OBJECT_LISTING_COLUMNS, StatRecord};
use chrono::{DateTime, Utc};
use diagnostics::*;
use serde::{Deserialize, Serialize};

/// Which children a listing enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildKinds {
    Collections,
    DataObjects,
    #[default]
    All,
}

impl ChildKinds {
    fn includes_collections(&self) -> bool {
        matches!(self, ChildKinds::Collections | ChildKinds::All)
    }

    fn includes_data_objects(&self) -> bool {
        matches!(self, ChildKinds::DataObjects | ChildKinds::All)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Position of the first entry within the full listing, 0-based
    pub offset: u64,
    /// Rows per sub-query; `None` uses the configured page size
    pub page_size: Option<usize>,
    pub with_permissions: bool,
    /// Stamp every entry with the total child count
    pub with_total: bool,
}

impl ListOptions {
    pub fn at(offset: u64) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_permissions(mut self) -> Self {
        self.with_permissions = true;
        self
    }

    #[must_use]
    pub fn with_total(mut self) -> Self {
        self.with_total = true;
        self
    }
}

/// One child in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    /// The path the caller listed
    pub parent_path: String,
    /// The child's presented absolute path
    pub path_or_name: String,
    pub entity_kind: EntityKind,
    pub overlay: OverlayType,
    /// Where the child's own contents live
    pub canonical_path: String,
    /// Canonical path of `parent_path` when the parent is an overlay, else empty
    pub special_object_path: String,
    /// 1-based position within the full listing
    pub sequence_index: u64,
    pub total_record_count: Option<u64>,
    pub is_last_result: bool,
    pub permissions: Vec<UserPermission>,
    pub owner_name: String,
    pub owner_zone: String,
    pub data_size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub(crate) catalog_path: String,
    #[serde(skip)]
    pub(crate) overlay_root: Option<String>,
}

impl ListingEntry {
    /// Entry for a resolved record, numbered as the only result
    pub fn from_record(record: &StatRecord) -> Self {
        let special_object_path = if record.is_presented_elsewhere() {
            parent_str(&record.catalog_path).to_string()
        } else {
            String::new()
        };
        Self {
            parent_path: parent_str(&record.absolute_path).to_string(),
            path_or_name: record.absolute_path.clone(),
            entity_kind: record.entity_kind,
            overlay: record.overlay,
            canonical_path: record.canonical_collection_path.clone(),
            special_object_path,
            sequence_index: 1,
            total_record_count: None,
            is_last_result: true,
            permissions: Vec::new(),
            owner_name: record.owner_name.clone(),
            owner_zone: record.owner_zone.clone(),
            data_size: record.data_size,
            created_at: record.created_at,
            modified_at: record.modified_at,
            catalog_path: record.catalog_path.clone(),
            overlay_root: record.overlay_root.clone(),
        }
    }

    pub(crate) fn permission_source(&self) -> PermissionSource {
        overlay::permission_source(self.overlay, &self.catalog_path, self.overlay_root.as_deref())
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.entity_kind.is_collection()
    }

    /// Final path component
    pub fn name(&self) -> &str {
        crate::path::basename_str(&self.path_or_name)
    }
}

/// Position reached by one sub-query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubQueryProgress {
    /// The sub-query ran for this page
    pub queried: bool,
    pub returned: usize,
    /// No rows remain past this page
    pub complete: bool,
    pub total: Option<u64>,
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub entries: Vec<ListingEntry>,
    pub offset: u64,
    pub has_more: bool,
    pub collections: SubQueryProgress,
    pub data_objects: SubQueryProgress,
    /// Total children, when known without an extra round trip or requested
    pub total: Option<u64>,
}

impl Page {
    /// Offset at which the following page starts
    #[must_use]
    pub fn next_offset(&self) -> u64 {
        self.offset + self.entries.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numbers entries from `offset` and flags the final one
    pub(crate) fn assemble(
        records: Vec<StatRecord>,
        offset: u64,
        has_more: bool,
        total: Option<u64>,
        stamp_total: bool,
    ) -> Self {
        let count = records.len();
        let entries = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut entry = ListingEntry::from_record(record);
                entry.sequence_index = offset + i as u64 + 1;
                entry.is_last_result = !has_more && i + 1 == count;
                entry.total_record_count = if stamp_total { total } else { None };
                entry
            })
            .collect();
        Self {
            entries,
            offset,
            has_more,
            total,
            ..Default::default()
        }
    }
}

/// Rows fetched by one bounded sub-query
struct SubPage {
    records: Vec<StatRecord>,
    has_more: bool,
    total: u64,
}

/// Lists the children of a resolved collection
pub async fn list_children(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    kinds: ChildKinds,
    options: &ListOptions,
) -> Result<Page> {
    if !parent.is_collection() {
        return Err(Error::not_a_collection(&parent.absolute_path));
    }
    if parent.is_stand_in {
        return fallback::list_stand_in(ctx, parent, kinds, options).await;
    }
    list_from_catalog(ctx, parent, kinds, options).await
}

/// Lists the catalog's rows under the parent's canonical path
pub(crate) async fn list_from_catalog(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    kinds: ChildKinds,
    options: &ListOptions,
) -> Result<Page> {
    let page_size = ctx.config().effective_page_size(options.page_size) as u64;
    let offset = options.offset;
    let path = &parent.absolute_path;
    let canonical = &parent.canonical_collection_path;
    let kind_name = format!("{kinds:?}");
    debug!(
        "listing {kind} under {path} (canonical {canonical}) from {offset}",
        kind: kind_name.as_str(),
        path: path.as_str(),
        canonical: canonical.as_str(),
        offset: offset
    );

    let mut page = match kinds {
        ChildKinds::Collections => {
            let sub = fetch_collections(ctx, parent, offset, page_size).await?;
            let progress = sub_progress(&sub);
            let mut page = Page::assemble(sub.records, offset, sub.has_more, Some(sub.total), options.with_total);
            page.collections = progress;
            page
        }
        ChildKinds::DataObjects => {
            let sub = fetch_data_objects(ctx, parent, offset, page_size).await?;
            let progress = sub_progress(&sub);
            let mut page = Page::assemble(sub.records, offset, sub.has_more, Some(sub.total), options.with_total);
            page.data_objects = progress;
            page
        }
        ChildKinds::All => list_all(ctx, parent, offset, page_size, options.with_total).await?,
    };

    if options.with_permissions && !page.entries.is_empty() {
        permissions::augment(ctx, &mut page.entries).await?;
    }

    let returned = page.entries.len();
    let has_more = page.has_more;
    debug!(
        "listing under {path} returned {returned} entries, more: {has_more}",
        path: path.as_str(),
        returned: returned,
        has_more: has_more
    );
    Ok(page)
}

fn sub_progress(sub: &SubPage) -> SubQueryProgress {
    SubQueryProgress {
        queried: true,
        returned: sub.records.len(),
        complete: !sub.has_more,
        total: Some(sub.total),
    }
}

/// Collections first; data objects start once collections are exhausted
async fn list_all(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    offset: u64,
    page_size: u64,
    stamp_total: bool,
) -> Result<Page> {
    let colls = fetch_collections(ctx, parent, offset, page_size).await?;
    let coll_progress = sub_progress(&colls);
    let coll_total = colls.total;
    let returned = colls.records.len() as u64;
    let mut records = colls.records;

    let (data_progress, data_total, data_has_more) = if colls.has_more {
        let data_total = if stamp_total {
            Some(count_data_objects(ctx, parent).await?)
        } else {
            None
        };
        let progress = SubQueryProgress {
            total: data_total,
            ..Default::default()
        };
        (progress, data_total, true)
    } else {
        let data_offset = (offset + returned).saturating_sub(coll_total);
        let remaining = page_size.saturating_sub(returned);
        if remaining > 0 {
            let data = fetch_data_objects(ctx, parent, data_offset, remaining).await?;
            let progress = sub_progress(&data);
            let has_more = data.has_more;
            records.extend(data.records);
            (progress, Some(data.total), has_more)
        } else {
            let data_total = count_data_objects(ctx, parent).await?;
            let progress = SubQueryProgress {
                total: Some(data_total),
                ..Default::default()
            };
            (progress, Some(data_total), data_total > data_offset)
        }
    };

    let has_more = colls.has_more || data_has_more;
    let total = data_total.map(|d| coll_total + d);
    let mut page = Page::assemble(records, offset, has_more, total, stamp_total);
    page.collections = coll_progress;
    page.data_objects = data_progress;
    Ok(page)
}

/// Places a child row found under the parent's canonical path
fn present_child(parent: &StatRecord, record: StatRecord) -> StatRecord {
    if !parent.overlay.is_overlay() {
        return record;
    }
    let paths = overlay::child_paths(
        &parent.absolute_path,
        &parent.canonical_collection_path,
        &record.catalog_path,
    );
    let root = parent
        .overlay_root
        .clone()
        .unwrap_or_else(|| parent.catalog_path.clone());
    record.presented_at(&paths.presented, parent.overlay, &root)
}

async fn fetch_collections(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    offset: u64,
    limit: u64,
) -> Result<SubPage> {
    let query = ctx
        .query()
        .select_all(&COLLECTION_COLUMNS)
        .equal(Column::CollParentName, parent.canonical_collection_path.as_str())
        .filter(Condition::NotEqual(Column::CollName, "/".to_string()))
        .offset(offset)
        .limit(limit)
        .with_total_count()
        .build()?;
    let result = ctx.run(&query).await?;

    let mut records = Vec::with_capacity(result.len());
    for row in result.iter() {
        let record = StatRecord::from_collection_row(&row)?;
        // The catalog reports the root as a child of itself
        if record.catalog_path == "/" {
            continue;
        }
        records.push(present_child(parent, record));
    }

    let total = match result.total_records {
        Some(total) => total,
        None if !result.has_more => offset + result.len() as u64,
        None => count_collections(ctx, parent).await?,
    };
    Ok(SubPage {
        records,
        has_more: result.has_more,
        total,
    })
}

async fn fetch_data_objects(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    offset: u64,
    limit: u64,
) -> Result<SubPage> {
    let query = ctx
        .query()
        .select_all(&DATA_OBJECT_LISTING_COLUMNS)
        .equal(Column::DataCollName, parent.canonical_collection_path.as_str())
        .distinct()
        .offset(offset)
        .limit(limit)
        .with_total_count()
        .build()?;
    let result = ctx.run(&query).await?;

    let mut records = Vec::with_capacity(result.len());
    for row in result.iter() {
        let record = StatRecord::from_data_object_row(&row)?;
        records.push(present_child(parent, record));
    }

    let total = match result.total_records {
        Some(total) => total,
        None if !result.has_more => offset + result.len() as u64,
        None => count_data_objects(ctx, parent).await?,
    };
    Ok(SubPage {
        records,
        has_more: result.has_more,
        total,
    })
}

async fn count_collections(ctx: &CallContext<'_>, parent: &StatRecord) -> Result<u64> {
    let query = ctx
        .query()
        .count(Column::CollName)
        .equal(Column::CollParentName, parent.canonical_collection_path.as_str())
        .filter(Condition::NotEqual(Column::CollName, "/".to_string()))
        .build()?;
    Ok(ctx.run(&query).await?.scalar()?)
}

async fn count_data_objects(ctx: &CallContext<'_>, parent: &StatRecord) -> Result<u64> {
    let query = ctx
        .query()
        .count(Column::DataName)
        .equal(Column::DataCollName, parent.canonical_collection_path.as_str())
        .distinct()
        .build()?;
    Ok(ctx.run(&query).await?.scalar()?)
}

/// Children directly under a collection, non-recursive
pub async fn count_children(ctx: &CallContext<'_>, parent: &StatRecord, kinds: ChildKinds) -> Result<u64> {
    if !parent.is_collection() {
        return Err(Error::not_a_collection(&parent.absolute_path));
    }
    if parent.is_stand_in {
        return fallback::count_stand_in(ctx, parent, kinds).await;
    }
    count_from_catalog(ctx, parent, kinds).await
}

pub(crate) async fn count_from_catalog(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    kinds: ChildKinds,
) -> Result<u64> {
    let mut total = 0;
    if kinds.includes_collections() {
        total += count_collections(ctx, parent).await?;
    }
    if kinds.includes_data_objects() {
        total += count_data_objects(ctx, parent).await?;
    }
    Ok(total)
}

/// Sum of data object sizes directly under a collection
pub async fn total_data_size(ctx: &CallContext<'_>, parent: &StatRecord) -> Result<u64> {
    if !parent.is_collection() {
        return Err(Error::not_a_collection(&parent.absolute_path));
    }
    // One row per object, so replicas are not summed twice
    let query = ctx
        .query()
        .select(Column::DataName)
        .select(Column::DataSize)
        .equal(Column::DataCollName, parent.canonical_collection_path.as_str())
        .distinct()
        .build()?;
    let mut total: u64 = 0;
    for row in ctx.run_all(&query).await?.iter() {
        total = total.saturating_add(row.unsigned(Column::DataSize)?);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> StatRecord {
        StatRecord::stand_in(path, "z")
    }

    #[test]
    fn test_assemble_numbers_from_offset() {
        let records = vec![record("/z/a"), record("/z/b"), record("/z/c")];
        let page = Page::assemble(records, 10, false, Some(13), true);
        let indexes: Vec<u64> = page.entries.iter().map(|e| e.sequence_index).collect();
        assert_eq!(indexes, vec![11, 12, 13]);
        assert_eq!(page.entries.iter().filter(|e| e.is_last_result).count(), 1);
        assert!(page.entries[2].is_last_result);
        assert_eq!(page.entries[0].total_record_count, Some(13));
        assert_eq!(page.next_offset(), 13);
    }

    #[test]
    fn test_assemble_with_more_has_no_last() {
        let page = Page::assemble(vec![record("/z/a")], 0, true, None, false);
        assert!(!page.entries[0].is_last_result);
        assert_eq!(page.entries[0].total_record_count, None);
    }

    #[test]
    fn test_assemble_empty() {
        let page = Page::assemble(Vec::new(), 0, false, Some(0), true);
        assert!(page.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_entry_from_plain_record() {
        let entry = ListingEntry::from_record(&record("/z/home/u"));
        assert_eq!(entry.parent_path, "/z/home");
        assert_eq!(entry.path_or_name, "/z/home/u");
        assert_eq!(entry.special_object_path, "");
        assert_eq!(entry.name(), "u");
    }

    #[test]
    fn test_entry_from_relocated_record() {
        let relocated = record("/z/src/sub").presented_at("/z/dst/sub", OverlayType::LinkedCollection, "/z/dst");
        let entry = ListingEntry::from_record(&relocated);
        assert_eq!(entry.parent_path, "/z/dst");
        assert_eq!(entry.special_object_path, "/z/src");
        assert_eq!(entry.overlay, OverlayType::LinkedCollection);
    }
}
