// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::catalog::Column;
use crate::context::CallContext;
use crate::error::Result;
use crate::stat::StatRecord;
use serde::{Deserialize, Serialize};

/// One attribute-value-units triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Avu {
    pub attribute: String,
    pub value: String,
    #[serde(default)]
    pub units: String,
}

impl Avu {
    pub fn new<A: Into<String>, V: Into<String>, U: Into<String>>(attribute: A, value: V, units: U) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            units: units.into(),
        }
    }
}

/// AVUs attached at the record's presented path
///
/// Metadata is never translated across an overlay: a link and its target
/// are tagged independently.
pub async fn metadata_for(ctx: &CallContext<'_>, record: &StatRecord) -> Result<Vec<Avu>> {
    let query = ctx
        .query()
        .select(Column::MetaAttrName)
        .select(Column::MetaAttrValue)
        .select(Column::MetaAttrUnits)
        .equal(Column::MetaObjectPath, record.absolute_path.as_str())
        .build()?;
    let rows = ctx.run_all(&query).await?;

    let mut avus = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        avus.push(Avu {
            attribute: row.text(Column::MetaAttrName)?.to_string(),
            value: row.text(Column::MetaAttrValue)?.to_string(),
            units: row.text(Column::MetaAttrUnits)?.to_string(),
        });
    }
    Ok(avus)
}
