// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Stand-in records for shallow paths hidden by strict ACLs
//!
//! Under a strict ACL regime an unprivileged caller cannot see `/`,
//! `/<zone>` or `/<zone>/home`. When enabled, a visible deeper path
//! licenses a synthetic record for each level:
//!
//! | requested       | probe                  |
//! |-----------------|------------------------|
//! | `/`             | `/<zone>`              |
//! | `/<zone>`       | `/<zone>/home`         |
//! | `/<zone>/home`  | `/<zone>/home/public`  |

use crate::catalog::Column;
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::listing::{self, ChildKinds, ListOptions, Page, SubQueryProgress};
use crate::path::NsPath;
use crate::permissions;
use crate::resolver;
use crate::stat::StatRecord;
use diagnostics::*;

/// Path shapes eligible for a stand-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShallowPath {
    Root,
    Zone(String),
    ZoneHome(String),
}

impl ShallowPath {
    pub fn of(path: &NsPath) -> Option<Self> {
        let components: Vec<&str> = path.components().collect();
        match components.as_slice() {
            [] => Some(ShallowPath::Root),
            [zone] => Some(ShallowPath::Zone((*zone).to_string())),
            [zone, "home"] => Some(ShallowPath::ZoneHome((*zone).to_string())),
            _ => None,
        }
    }

    /// Deeper path whose visibility licenses the stand-in
    fn probe(&self, zone: &str) -> Result<NsPath> {
        let probe = match self {
            ShallowPath::Root => format!("/{zone}"),
            ShallowPath::Zone(_) => format!("/{zone}/home"),
            ShallowPath::ZoneHome(_) => format!("/{zone}/home/public"),
        };
        NsPath::parse(&probe)
    }
}

/// Synthesizes a record for `path`, or fails with `NotFound`
pub(crate) async fn stand_in(
    ctx: &CallContext<'_>,
    path: &NsPath,
    shape: &ShallowPath,
    hops: usize,
) -> Result<StatRecord> {
    if !ctx.config().fallback_to_public_under_root {
        return Err(Error::not_found(path));
    }

    let zone = match shape {
        ShallowPath::Root => ctx.effective_zone().to_string(),
        ShallowPath::Zone(zone) | ShallowPath::ZoneHome(zone) => {
            if !zone_exists(ctx, zone).await? {
                debug!("{path} does not name a known zone", path: path.as_str());
                return Err(Error::not_found(path));
            }
            zone.clone()
        }
    };

    let probe = shape.probe(&zone)?;
    match resolver::resolve_nested(ctx, &probe, hops + 1).await {
        Ok(_) => {
            info!("stand-in record for {path} licensed by {probe}", path: path.as_str(), probe: probe.as_str());
            Ok(StatRecord::stand_in(path.as_str(), &zone))
        }
        Err(err) if err.is_not_found() => Err(Error::not_found(path)),
        Err(err) => Err(err),
    }
}

async fn zone_exists(ctx: &CallContext<'_>, zone: &str) -> Result<bool> {
    let query = ctx
        .query()
        .select(Column::ZoneName)
        .equal(Column::ZoneName, zone)
        .build()?;
    Ok(!ctx.run(&query).await?.is_empty())
}

/// Synthetic children of a stand-in collection
async fn synthetic_children(ctx: &CallContext<'_>, shape: &ShallowPath) -> Result<Vec<StatRecord>> {
    match shape {
        ShallowPath::Root => {
            let query = ctx.query().select(Column::ZoneName).build()?;
            let zones = ctx.run_all(&query).await?;
            let mut records = Vec::with_capacity(zones.len());
            for row in zones.iter() {
                let zone = row.text(Column::ZoneName)?;
                records.push(StatRecord::stand_in(&format!("/{zone}"), zone));
            }
            Ok(records)
        }
        ShallowPath::Zone(zone) => Ok(vec![StatRecord::stand_in(&format!("/{zone}/home"), zone)]),
        ShallowPath::ZoneHome(_) => Ok(Vec::new()),
    }
}

/// Lists a stand-in without failing
///
/// The real listing wins whenever the caller can see anything. `/<zone>/home`
/// always lists for real; the visible children there are what the caller
/// may browse.
pub(crate) async fn list_stand_in(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    kinds: ChildKinds,
    options: &ListOptions,
) -> Result<Page> {
    let path = NsPath::parse(&parent.absolute_path)?;
    let shape = match ShallowPath::of(&path) {
        Some(ShallowPath::ZoneHome(_)) | None => {
            return listing::list_from_catalog(ctx, parent, kinds, options).await;
        }
        Some(shape) => shape,
    };

    let real = listing::list_from_catalog(ctx, parent, kinds, options).await?;
    let real_is_empty =
        real.total == Some(0) || (options.offset == 0 && real.is_empty() && !real.has_more);
    if !real_is_empty || kinds == ChildKinds::DataObjects {
        return Ok(real);
    }

    let records = synthetic_children(ctx, &shape).await?;
    let total = records.len() as u64;
    let page_size = ctx.config().effective_page_size(options.page_size);
    let records: Vec<StatRecord> = records
        .into_iter()
        .skip(usize::try_from(options.offset).unwrap_or(usize::MAX))
        .take(page_size)
        .collect();
    let returned = records.len();
    let has_more = options.offset + (returned as u64) < total;
    info!("synthesized {returned} stand-in entries under {path}", returned: returned, path: path.as_str());

    let mut page = Page::assemble(records, options.offset, has_more, Some(total), options.with_total);
    page.collections = SubQueryProgress {
        queried: true,
        returned,
        complete: !has_more,
        total: Some(total),
    };
    page.data_objects = real.data_objects;

    if options.with_permissions && !page.entries.is_empty() {
        permissions::augment(ctx, &mut page.entries).await?;
    }
    Ok(page)
}

/// Child count consistent with [`list_stand_in`]
pub(crate) async fn count_stand_in(
    ctx: &CallContext<'_>,
    parent: &StatRecord,
    kinds: ChildKinds,
) -> Result<u64> {
    let path = NsPath::parse(&parent.absolute_path)?;
    let real = listing::count_from_catalog(ctx, parent, kinds).await?;
    match ShallowPath::of(&path) {
        Some(ShallowPath::ZoneHome(_)) | None => Ok(real),
        Some(_) if real > 0 || kinds == ChildKinds::DataObjects => Ok(real),
        Some(shape) => Ok(synthetic_children(ctx, &shape).await?.len() as u64),
    }
}
