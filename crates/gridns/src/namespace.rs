// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The namespace facade
//!
//! A [`Namespace`] is scoped to one authenticated session. Every method
//! takes an optional zone hint, which is validated up front and forwarded
//! on every catalog query the call issues. Nothing is cached between calls.

use crate::catalog::Catalog;
use crate::config::NamespaceConfig;
use crate::context::{CallContext, SessionContext};
use crate::entity::EntityKind;
use crate::error::Result;
use crate::listing::{self, ChildKinds, ListOptions, ListingEntry, Page};
use crate::metadata::{self, Avu};
use crate::path::NsPath;
use crate::resolver;
use crate::search;
use crate::stat::StatRecord;
use std::sync::Arc;

pub struct Namespace {
    catalog: Arc<dyn Catalog>,
    session: SessionContext,
    config: NamespaceConfig,
}

impl Namespace {
    pub fn new(catalog: Arc<dyn Catalog>, session: SessionContext) -> Self {
        Self {
            catalog,
            session,
            config: NamespaceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: NamespaceConfig) -> Result<Self> {
        self.set_config(config)?;
        Ok(self)
    }

    /// Replaces the configuration seen by later calls
    pub fn set_config(&mut self, config: NamespaceConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn context(&self, zone: Option<&str>) -> Result<CallContext<'_>> {
        CallContext::new(self.catalog.as_ref(), &self.session, self.config.clone(), zone)
    }

    pub async fn resolve(&self, path: &str, zone: Option<&str>) -> Result<StatRecord> {
        let path = NsPath::parse(path)?;
        let ctx = self.context(zone)?;
        resolver::resolve(&ctx, &path).await
    }

    /// Resolves `name` directly under `parent`
    pub async fn resolve_child(&self, parent: &str, name: &str, zone: Option<&str>) -> Result<StatRecord> {
        let path = NsPath::parse(parent)?.join(name)?;
        let ctx = self.context(zone)?;
        resolver::resolve(&ctx, &path).await
    }

    /// Lists an already resolved collection
    pub async fn list_children(
        &self,
        record: &StatRecord,
        kinds: ChildKinds,
        options: &ListOptions,
        zone: Option<&str>,
    ) -> Result<Page> {
        let ctx = self.context(zone)?;
        listing::list_children(&ctx, record, kinds, options).await
    }

    /// Resolves `path` and lists it within the same call
    pub async fn list_under_path(
        &self,
        path: &str,
        kinds: ChildKinds,
        options: &ListOptions,
        zone: Option<&str>,
    ) -> Result<Page> {
        let path = NsPath::parse(path)?;
        let ctx = self.context(zone)?;
        let record = resolver::resolve(&ctx, &path).await?;
        listing::list_children(&ctx, &record, kinds, options).await
    }

    pub async fn list_collections_under_path(&self, path: &str, offset: u64, zone: Option<&str>) -> Result<Page> {
        self.list_under_path(path, ChildKinds::Collections, &ListOptions::at(offset), zone)
            .await
    }

    pub async fn list_data_objects_under_path(&self, path: &str, offset: u64, zone: Option<&str>) -> Result<Page> {
        self.list_under_path(path, ChildKinds::DataObjects, &ListOptions::at(offset), zone)
            .await
    }

    pub async fn list_data_objects_and_collections_under_path(
        &self,
        path: &str,
        offset: u64,
        zone: Option<&str>,
    ) -> Result<Page> {
        self.list_under_path(path, ChildKinds::All, &ListOptions::at(offset), zone)
            .await
    }

    pub async fn list_collections_under_path_with_permissions(
        &self,
        path: &str,
        offset: u64,
        zone: Option<&str>,
    ) -> Result<Page> {
        let options = ListOptions::at(offset).with_permissions();
        self.list_under_path(path, ChildKinds::Collections, &options, zone)
            .await
    }

    pub async fn list_data_objects_under_path_with_permissions(
        &self,
        path: &str,
        offset: u64,
        zone: Option<&str>,
    ) -> Result<Page> {
        let options = ListOptions::at(offset).with_permissions();
        self.list_under_path(path, ChildKinds::DataObjects, &options, zone)
            .await
    }

    /// Collections plus data objects directly under `path`
    pub async fn count_data_objects_and_collections_under_path(&self, path: &str, zone: Option<&str>) -> Result<u64> {
        let path = NsPath::parse(path)?;
        let ctx = self.context(zone)?;
        let record = resolver::resolve(&ctx, &path).await?;
        listing::count_children(&ctx, &record, ChildKinds::All).await
    }

    /// Counts the children of an already resolved collection
    pub async fn count(&self, record: &StatRecord, kinds: ChildKinds, zone: Option<&str>) -> Result<u64> {
        let ctx = self.context(zone)?;
        listing::count_children(&ctx, record, kinds).await
    }

    pub async fn total_data_size_under_path(&self, path: &str, zone: Option<&str>) -> Result<u64> {
        let path = NsPath::parse(path)?;
        let ctx = self.context(zone)?;
        let record = resolver::resolve(&ctx, &path).await?;
        listing::total_data_size(&ctx, &record).await
    }

    /// The entry listing the parent would produce for this child
    pub async fn get_entry_at_path(&self, path: &str, zone: Option<&str>) -> Result<ListingEntry> {
        let record = self.resolve(path, zone).await?;
        Ok(ListingEntry::from_record(&record))
    }

    pub async fn search_collections_by_name(&self, term: &str, offset: u64, zone: Option<&str>) -> Result<Page> {
        let ctx = self.context(zone)?;
        search::search_by_name(&ctx, EntityKind::Collection, term, &ListOptions::at(offset)).await
    }

    pub async fn search_data_objects_by_name(&self, term: &str, offset: u64, zone: Option<&str>) -> Result<Page> {
        let ctx = self.context(zone)?;
        search::search_by_name(&ctx, EntityKind::DataObject, term, &ListOptions::at(offset)).await
    }

    /// Searches with explicit paging options
    pub async fn search_by_name(
        &self,
        kind: EntityKind,
        term: &str,
        options: &ListOptions,
        zone: Option<&str>,
    ) -> Result<Page> {
        let ctx = self.context(zone)?;
        search::search_by_name(&ctx, kind, term, options).await
    }

    /// AVUs attached at the presented `path`
    pub async fn collection_metadata(&self, path: &str, zone: Option<&str>) -> Result<Vec<Avu>> {
        let path = NsPath::parse(path)?;
        let ctx = self.context(zone)?;
        let record = resolver::resolve(&ctx, &path).await?;
        metadata::metadata_for(&ctx, &record).await
    }
}
