// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{EntityChoice, GridContext, to_json};
use anyhow::Result;
use gridns::ListOptions;

/// Searches collection paths or data object names for `term`
pub async fn find_command<F>(
    ctx: &GridContext,
    term: &str,
    kind: EntityChoice,
    offset: u64,
    page_size: Option<usize>,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let ns = ctx.open_namespace()?;
    let mut options = ListOptions::at(offset);
    if let Some(page_size) = page_size {
        options = options.page_size(page_size);
    }
    let page = ns.search_by_name(kind.into(), term, &options, ctx.hint()).await?;
    if ctx.json {
        handler(&to_json(&page.entries)?);
        return Ok(());
    }
    for entry in &page.entries {
        handler(&format!("{}\n", entry.path_or_name));
    }
    if page.has_more {
        handler(&format!("... more at offset {}\n", page.next_offset()));
    }
    Ok(())
}
