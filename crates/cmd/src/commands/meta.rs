// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{GridContext, to_json};
use anyhow::Result;

pub async fn meta_command<F>(ctx: &GridContext, path: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let ns = ctx.open_namespace()?;
    let avus = ns.collection_metadata(path, ctx.hint()).await?;
    if ctx.json {
        handler(&to_json(&avus)?);
        return Ok(());
    }
    for avu in &avus {
        if avu.units.is_empty() {
            handler(&format!("{} = {}\n", avu.attribute, avu.value));
        } else {
            handler(&format!("{} = {} [{}]\n", avu.attribute, avu.value, avu.units));
        }
    }
    Ok(())
}
