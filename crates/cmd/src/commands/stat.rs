// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{GridContext, format_stat, to_json};
use anyhow::Result;

/// Resolves one path and prints its stat record
pub async fn stat_command<F>(ctx: &GridContext, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let ns = ctx.open_namespace()?;
    let record = ns.resolve(path, ctx.hint()).await?;
    let output = if ctx.json {
        to_json(&record)?
    } else {
        format_stat(&record)
    };
    handler(&output);
    Ok(())
}
