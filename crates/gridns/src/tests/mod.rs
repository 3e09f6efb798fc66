// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod links;
mod permissions;

use crate::catalog::{CatalogQuery, Table};
use crate::config::NamespaceConfig;
use crate::context::SessionContext;
use crate::memory::{MemoryCatalog, MemoryCatalogBuilder};
use crate::namespace::Namespace;
use std::sync::Arc;

pub(crate) const ZONE: &str = "tempZone";
pub(crate) const ALICE_HOME: &str = "/tempZone/home/alice";
pub(crate) const DATA: &str = "/tempZone/home/alice/data";
pub(crate) const LINK: &str = "/tempZone/home/alice/link";

/// Alice's home with a data collection and a link to it
///
/// ```text
/// /tempZone/home/alice
///   data/        sub1/ (deep.txt), sub2/, a.txt (10), b.txt (20)
///   link/     -> data
/// /tempZone/home/public
/// ```
pub(crate) fn sample() -> MemoryCatalogBuilder {
    MemoryCatalogBuilder::new(ZONE)
        .collection(ALICE_HOME, "alice")
        .collection(DATA, "alice")
        .collection("/tempZone/home/alice/data/sub1", "alice")
        .collection("/tempZone/home/alice/data/sub2", "alice")
        .data_object("/tempZone/home/alice/data/a.txt", "alice", 10)
        .data_object("/tempZone/home/alice/data/b.txt", "alice", 20)
        .data_object("/tempZone/home/alice/data/sub1/deep.txt", "alice", 5)
        .linked_collection(LINK, DATA, "alice")
        .collection("/tempZone/home/public", "rods")
}

pub(crate) fn namespace(catalog: &MemoryCatalog, user: &str) -> Namespace {
    let session = SessionContext::new(user, ZONE).unwrap();
    Namespace::new(Arc::new(catalog.clone()), session)
}

pub(crate) fn namespace_with(catalog: &MemoryCatalog, user: &str, config: NamespaceConfig) -> Namespace {
    namespace(catalog, user).with_config(config).unwrap()
}

pub(crate) fn queries_on(queries: &[CatalogQuery], table: Table) -> usize {
    queries.iter().filter(|q| q.table == table).count()
}
