// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Name search across the catalog

use crate::catalog::{Column, Condition};
use crate::context::CallContext;
use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::listing::{ListOptions, Page, SubQueryProgress};
use crate::stat::{COLLECTION_COLUMNS, DATA_OBJECT_LISTING_COLUMNS, StatRecord};
use diagnostics::*;

/// Lists collections or data objects whose name contains `term`
///
/// Collections match on their full path, data objects on their name. Hits
/// are reported at their catalog paths.
pub async fn search_by_name(
    ctx: &CallContext<'_>,
    kind: EntityKind,
    term: &str,
    options: &ListOptions,
) -> Result<Page> {
    let term = term.trim();
    if term.is_empty() {
        return Err(Error::invalid_argument("search term is blank"));
    }
    let pattern = format!("%{term}%");
    let page_size = ctx.config().effective_page_size(options.page_size) as u64;
    debug!("searching {kind} names for {pattern}", kind: kind.as_str(), pattern: pattern.as_str());

    let builder = match kind {
        EntityKind::Collection => ctx
            .query()
            .select_all(&COLLECTION_COLUMNS)
            .filter(Condition::Like(Column::CollName, pattern))
            .filter(Condition::NotEqual(Column::CollName, "/".to_string())),
        EntityKind::DataObject => ctx
            .query()
            .select_all(&DATA_OBJECT_LISTING_COLUMNS)
            .filter(Condition::Like(Column::DataName, pattern))
            .distinct(),
    };
    let query = builder
        .offset(options.offset)
        .limit(page_size)
        .with_total_count()
        .build()?;
    let result = ctx.run(&query).await?;

    let mut records = Vec::with_capacity(result.len());
    for row in result.iter() {
        records.push(match kind {
            EntityKind::Collection => StatRecord::from_collection_row(&row)?,
            EntityKind::DataObject => StatRecord::from_data_object_row(&row)?,
        });
    }

    let total = result
        .total_records
        .or_else(|| (!result.has_more).then(|| options.offset + records.len() as u64));
    let progress = SubQueryProgress {
        queried: true,
        returned: records.len(),
        complete: !result.has_more,
        total,
    };
    let mut page = Page::assemble(records, options.offset, result.has_more, total, options.with_total);
    match kind {
        EntityKind::Collection => page.collections = progress,
        EntityKind::DataObject => page.data_objects = progress,
    }
    Ok(page)
}
