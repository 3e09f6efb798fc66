// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! An in-memory catalog
//!
//! [`MemoryCatalog`] answers the same structured queries a grid catalog
//! would, with zone routing, strict ACL visibility and row caps. It records
//! every query it receives so callers can assert on round trips, and can be
//! told to fail the next query against a given table.

mod builder;
mod fixture;
mod tables;

pub use builder::MemoryCatalogBuilder;
pub use fixture::{
    CatalogFixture, FixtureCollection, FixtureGrant, FixtureMetadata, FixtureObject, FixtureOverlayContent,
};

use crate::catalog::{Catalog, CatalogError, CatalogQuery, ResultSet, Table};
use crate::metadata::Avu;
use async_trait::async_trait;
use diagnostics::*;
use std::sync::Arc;
use tables::{MetadataRow, Tables, Viewer};
use tokio::sync::Mutex;

/// Rows returned by one round trip unless the query asks for fewer
pub const DEFAULT_MAX_ROWS: u64 = 5000;

#[derive(Clone)]
pub struct MemoryCatalog {
    local_zone: String,
    tables: Arc<Mutex<Tables>>,
    viewer: Option<Viewer>,
    max_rows: u64,
    log: Arc<Mutex<Vec<CatalogQuery>>>,
    failures: Arc<Mutex<Vec<(Table, CatalogError)>>>,
}

impl MemoryCatalog {
    pub(crate) fn from_tables(local_zone: String, tables: Tables) -> Self {
        Self {
            local_zone,
            tables: Arc::new(Mutex::new(tables)),
            viewer: None,
            max_rows: DEFAULT_MAX_ROWS,
            log: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn local_zone(&self) -> &str {
        &self.local_zone
    }

    /// A view of the same tables under a strict ACL regime
    ///
    /// Rows are only visible when `user` or `public` holds a grant on them.
    /// The query log and failure list are shared with `self`.
    #[must_use]
    pub fn as_viewer(&self, user: &str) -> Self {
        let mut view = self.clone();
        view.viewer = Some(Viewer {
            principals: vec![user.to_string(), "public".to_string()],
        });
        view
    }

    /// Caps the rows returned per round trip
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    /// Every query received so far, oldest first
    pub async fn queries(&self) -> Vec<CatalogQuery> {
        self.log.lock().await.clone()
    }

    pub async fn clear_log(&self) {
        self.log.lock().await.clear();
    }

    /// The next query against `table` fails with `err`
    pub async fn fail_next_query_on(&self, table: Table, err: CatalogError) {
        self.failures.lock().await.push((table, err));
    }

    pub async fn add_avu(&self, path: &str, avu: Avu) {
        let mut tables = self.tables.lock().await;
        let zone = tables
            .collection(path)
            .map(|c| c.zone.clone())
            .unwrap_or_else(|| self.local_zone.clone());
        tables.metadata.push(MetadataRow {
            object_path: path.to_string(),
            attribute: avu.attribute,
            value: avu.value,
            units: avu.units,
            zone,
        });
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<ResultSet, CatalogError> {
        self.log.lock().await.push(query.clone());

        {
            let mut failures = self.failures.lock().await;
            if let Some(idx) = failures.iter().position(|(table, _)| *table == query.table) {
                let (_, err) = failures.remove(idx);
                let message = err.to_string();
                debug!("memory catalog injecting failure: {message}", message: message.as_str());
                return Err(err);
            }
        }

        let tables = self.tables.lock().await;
        let zone = query.zone.as_deref().unwrap_or(&self.local_zone);
        if !tables.has_zone(zone) {
            return Err(CatalogError::UnknownZone(zone.to_string()));
        }
        tables.evaluate(query, zone, self.viewer.as_ref(), self.max_rows)
    }
}

impl std::fmt::Debug for MemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCatalog")
            .field("local_zone", &self.local_zone)
            .field("viewer", &self.viewer)
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}
