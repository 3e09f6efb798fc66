// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The catalog collaborator
//!
//! The engine never talks to a grid server directly. Everything it knows
//! comes from [`Catalog::query`], which answers one structured query per
//! round trip.

mod query;
mod result;

pub use query::{CatalogQuery, Column, Condition, QueryBuilder, Select, Table};
pub use result::{ResultSet, Row};

use async_trait::async_trait;

/// Failures reported by a catalog implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog connection failed: {0}")]
    Connection(String),

    #[error("Catalog authentication failed: {0}")]
    Authentication(String),

    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Catalog query failed: {0}")]
    Query(String),
}

/// Structured query access to the namespace catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Run one query and return one page of rows
    async fn query(&self, query: &CatalogQuery) -> Result<ResultSet, CatalogError>;
}

/// Follows `has_more` until the catalog is exhausted
pub async fn query_all(
    catalog: &dyn Catalog,
    query: &CatalogQuery,
) -> Result<ResultSet, CatalogError> {
    let mut page = catalog.query(query).await?;
    let mut all = ResultSet {
        columns: std::mem::take(&mut page.columns),
        rows: Vec::new(),
        has_more: false,
        total_records: page.total_records,
    };
    let mut offset = query.offset;

    loop {
        let fetched = page.rows.len() as u64;
        let has_more = page.has_more;
        all.rows.append(&mut page.rows);
        if !has_more || fetched == 0 {
            break;
        }
        offset += fetched;
        page = catalog.query(&query.clone().with_offset(offset)).await?;
    }

    Ok(all)
}
