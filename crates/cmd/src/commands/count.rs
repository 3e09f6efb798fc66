// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{GridContext, KindChoice, format_size};
use anyhow::Result;

/// Prints the number of children directly under `path`
///
/// With `with_size`, also prints the total size of the data objects there.
pub async fn count_command<F>(
    ctx: &GridContext,
    path: &str,
    kind: KindChoice,
    with_size: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let ns = ctx.open_namespace()?;
    let record = ns.resolve(path, ctx.hint()).await?;
    let count = ns.count(&record, kind.into(), ctx.hint()).await?;
    handler(&format!("{count}\n"));
    if with_size {
        let size = ns.total_data_size_under_path(path, ctx.hint()).await?;
        handler(&format!("{} ({size} bytes)\n", format_size(size)));
    }
    Ok(())
}
