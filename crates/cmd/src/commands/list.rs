// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{GridContext, KindChoice, format_entry, to_json};
use anyhow::Result;
use gridns::{ListOptions, ListingEntry};

#[derive(Clone, Debug)]
pub struct ListArgs {
    pub offset: u64,
    pub page_size: Option<usize>,
    pub kind: KindChoice,
    pub permissions: bool,
    /// Keep fetching pages until the listing is exhausted
    pub all_pages: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            offset: 0,
            page_size: None,
            kind: KindChoice::All,
            permissions: false,
            all_pages: false,
        }
    }
}

/// Lists the children of `path`, one page or every page
pub async fn list_command<F>(ctx: &GridContext, path: &str, args: &ListArgs, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let ns = ctx.open_namespace()?;
    let record = ns.resolve(path, ctx.hint()).await?;
    diagnostics::debug!("listing {path}", path: record.absolute_path.as_str());

    let mut options = ListOptions::at(args.offset);
    if let Some(page_size) = args.page_size {
        options = options.page_size(page_size);
    }
    if args.permissions {
        options = options.with_permissions();
    }

    let mut collected: Vec<ListingEntry> = Vec::new();
    loop {
        let page = ns.list_children(&record, args.kind.into(), &options, ctx.hint()).await?;
        if !ctx.json {
            for entry in &page.entries {
                handler(&format_entry(entry));
            }
        }
        let next = page.next_offset();
        let has_more = page.has_more;
        collected.extend(page.entries);

        if !has_more || next == options.offset {
            break;
        }
        if !args.all_pages {
            if !ctx.json {
                handler(&format!("... more at offset {next}\n"));
            }
            break;
        }
        options.offset = next;
    }

    if ctx.json {
        handler(&to_json(&collected)?);
    }
    Ok(())
}
