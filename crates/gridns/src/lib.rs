// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Namespace resolution and listing for a federated data grid
//!
//! A grid catalog stores collections and data objects under absolute
//! paths, some of which are overlays: links to other collections, mounted
//! filesystems, or archives presented as collections. This crate resolves
//! any path to a [`StatRecord`], lists collection children in pages, and
//! attaches permissions and metadata, all through queries against a
//! [`Catalog`].
//!
//! ```no_run
//! # async fn demo(catalog: std::sync::Arc<dyn gridns::Catalog>) -> gridns::Result<()> {
//! use gridns::{ChildKinds, ListOptions, Namespace, SessionContext};
//!
//! let session = SessionContext::new("alice", "tempZone")?;
//! let ns = Namespace::new(catalog, session);
//! let home = ns.resolve("/tempZone/home/alice", None).await?;
//! let page = ns.list_children(&home, ChildKinds::All, &ListOptions::default(), None).await?;
//! for entry in &page.entries {
//!     println!("{} {}", entry.entity_kind, entry.path_or_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
mod fallback;
pub mod listing;
pub mod memory;
pub mod metadata;
pub mod namespace;
pub mod overlay;
pub mod path;
pub mod permissions;
pub mod resolver;
pub mod search;
pub mod stat;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogError, CatalogQuery, Column, Condition, ResultSet, Select, Table};
pub use config::NamespaceConfig;
pub use context::{CallContext, SessionContext};
pub use entity::EntityKind;
pub use error::{Error, Result};
pub use fallback::ShallowPath;
pub use listing::{ChildKinds, ListOptions, ListingEntry, Page, SubQueryProgress};
pub use memory::{CatalogFixture, MemoryCatalog, MemoryCatalogBuilder};
pub use metadata::Avu;
pub use namespace::Namespace;
pub use overlay::{OverlayType, PermissionSource};
pub use path::NsPath;
pub use permissions::{AccessLevel, UserPermission};
pub use stat::StatRecord;
