// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Stat resolution
//!
//! A path is first looked up directly. Misses at `/`, `/<zone>` and
//! `/<zone>/home` go to the fallback resolver; other misses are checked
//! against overlay ancestors, since paths inside a linked or mounted
//! collection have no catalog rows of their own.

use crate::catalog::{Column, Condition};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::fallback::{self, ShallowPath};
use crate::overlay::{self, OverlayType};
use crate::path::NsPath;
use crate::stat::{COLLECTION_COLUMNS, DATA_OBJECT_COLUMNS, StatRecord};
use diagnostics::*;
use std::future::Future;
use std::pin::Pin;

/// Overlay translations followed before a path is declared ambiguous
pub const MAX_OVERLAY_HOPS: usize = 16;

pub(crate) type ResolveFuture<'c> = Pin<Box<dyn Future<Output = Result<StatRecord>> + Send + 'c>>;

/// Resolves one path to a fresh stat record
pub async fn resolve(ctx: &CallContext<'_>, path: &NsPath) -> Result<StatRecord> {
    resolve_at(ctx, path, 0).await
}

/// Boxed entry point for resolutions nested inside another resolution
pub(crate) fn resolve_nested<'c>(
    ctx: &'c CallContext<'_>,
    path: &'c NsPath,
    hops: usize,
) -> ResolveFuture<'c> {
    Box::pin(resolve_at(ctx, path, hops))
}

async fn resolve_at(ctx: &CallContext<'_>, path: &NsPath, hops: usize) -> Result<StatRecord> {
    if hops > MAX_OVERLAY_HOPS {
        return Err(Error::ambiguous_path(
            path,
            format!("overlay chain longer than {MAX_OVERLAY_HOPS} hops"),
        ));
    }
    debug!("resolving {path} at hop {hops}", path: path.as_str(), hops: hops);

    if let Some(record) = lookup(ctx, path).await? {
        return Ok(record);
    }
    if let Some(shape) = ShallowPath::of(path) {
        return fallback::stand_in(ctx, path, &shape, hops).await;
    }
    if let Some(record) = resolve_below_overlay(ctx, path, hops).await? {
        return Ok(record);
    }
    Err(Error::not_found(path))
}

/// Direct catalog lookup, `None` when no row names the path
async fn lookup(ctx: &CallContext<'_>, path: &NsPath) -> Result<Option<StatRecord>> {
    let query = ctx
        .query()
        .select_all(&COLLECTION_COLUMNS)
        .equal(Column::CollName, path.as_str())
        .build()?;
    let collections = ctx.run(&query).await?;

    let mut data_objects: Vec<StatRecord> = Vec::new();
    if let (Some(parent), Some(name)) = (path.parent(), path.basename()) {
        let query = ctx
            .query()
            .select_all(&DATA_OBJECT_COLUMNS)
            .equal(Column::DataCollName, parent.as_str())
            .equal(Column::DataName, name)
            .distinct()
            .build()?;
        for row in ctx.run(&query).await?.iter() {
            let record = StatRecord::from_data_object_row(&row)?;
            // Replicas share a path
            if !data_objects.iter().any(|r| r.catalog_path == record.catalog_path) {
                data_objects.push(record);
            }
        }
    }

    match (collections.len(), data_objects.len()) {
        (0, 0) => Ok(None),
        (1, 0) => match collections.row(0) {
            Some(row) => Ok(Some(StatRecord::from_collection_row(&row)?)),
            None => Ok(None),
        },
        (0, 1) => Ok(data_objects.pop()),
        (c, d) => Err(Error::ambiguous_path(
            path,
            format!("catalog answered {c} collection rows and {d} data object rows"),
        )),
    }
}

/// Resolves a path that lies below an overlay root
///
/// One query finds every overlay among the path's ancestors. The innermost
/// one wins, and the path is resolved again under its canonical subtree.
async fn resolve_below_overlay(
    ctx: &CallContext<'_>,
    path: &NsPath,
    hops: usize,
) -> Result<Option<StatRecord>> {
    let mut ancestors: Vec<String> = Vec::new();
    let mut cursor = path.parent();
    while let Some(ancestor) = cursor {
        if ancestor.is_root() {
            break;
        }
        cursor = ancestor.parent();
        ancestors.push(ancestor.as_str().to_string());
    }
    if ancestors.is_empty() {
        return Ok(None);
    }

    let query = ctx
        .query()
        .select_all(&COLLECTION_COLUMNS)
        .filter(Condition::In(Column::CollName, ancestors))
        .filter(Condition::NotEqual(
            Column::CollType,
            OverlayType::Normal.discriminator().to_string(),
        ))
        .build()?;
    let result = ctx.run_all(&query).await?;

    let mut innermost: Option<StatRecord> = None;
    for row in result.iter() {
        let record = StatRecord::from_collection_row(&row)?;
        match &innermost {
            Some(current) if current.catalog_path == record.catalog_path => {
                return Err(Error::ambiguous_path(
                    path,
                    format!("conflicting overlay rows for {}", record.catalog_path),
                ));
            }
            Some(current) if current.catalog_path.len() >= record.catalog_path.len() => {}
            _ => innermost = Some(record),
        }
    }
    let Some(root) = innermost else {
        return Ok(None);
    };

    let Some(canonical) =
        overlay::translate_descendant(&root.catalog_path, &root.canonical_collection_path, path.as_str())
    else {
        return Ok(None);
    };
    debug!(
        "{path} lies under overlay {root}, resolving {canonical}",
        path: path.as_str(),
        root: root.catalog_path.as_str(),
        canonical: canonical.as_str()
    );

    let canonical = NsPath::parse(&canonical)?;
    let target = match resolve_nested(ctx, &canonical, hops + 1).await {
        Ok(target) => target,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };
    if target.is_stand_in {
        return Ok(None);
    }
    Ok(Some(target.presented_at(path.as_str(), root.overlay, &root.catalog_path)))
}
