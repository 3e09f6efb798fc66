// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Identity and per-call context

use crate::catalog::{query_all, Catalog, CatalogQuery, QueryBuilder, ResultSet};
use crate::config::NamespaceConfig;
use crate::error::{Error, Result};
use diagnostics::*;

/// The authenticated caller, read-only to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_name: String,
    home_zone: String,
    default_resource: Option<String>,
    federated_zones: Vec<String>,
}

impl SessionContext {
    pub fn new<U: Into<String>, Z: Into<String>>(user_name: U, home_zone: Z) -> Result<Self> {
        let user_name = user_name.into().trim().to_string();
        let home_zone = home_zone.into().trim().to_string();
        if user_name.is_empty() {
            return Err(Error::invalid_argument("session user name is blank"));
        }
        if home_zone.is_empty() || home_zone.contains('/') {
            return Err(Error::invalid_argument(format!(
                "session home zone is not a zone name: '{home_zone}'"
            )));
        }
        Ok(Self {
            user_name,
            home_zone,
            default_resource: None,
            federated_zones: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_default_resource<S: Into<String>>(mut self, resource: S) -> Self {
        self.default_resource = Some(resource.into());
        self
    }

    /// Allows zone hints naming `zone`
    #[must_use]
    pub fn with_federated_zone<S: Into<String>>(mut self, zone: S) -> Self {
        let zone = zone.into();
        if zone != self.home_zone && !self.federated_zones.contains(&zone) {
            self.federated_zones.push(zone);
        }
        self
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn home_zone(&self) -> &str {
        &self.home_zone
    }

    pub fn default_resource(&self) -> Option<&str> {
        self.default_resource.as_deref()
    }

    pub fn federated_zones(&self) -> &[String] {
        &self.federated_zones
    }

    #[must_use]
    pub fn knows_zone(&self, zone: &str) -> bool {
        zone == self.home_zone || self.federated_zones.iter().any(|z| z == zone)
    }

    /// Home collection of this user in `zone`
    ///
    /// Users visiting a federated zone get a `user#homezone` collection there.
    #[must_use]
    pub fn home_collection(&self, zone: &str) -> String {
        if zone == self.home_zone {
            format!("/{zone}/home/{}", self.user_name)
        } else {
            format!("/{zone}/home/{}#{}", self.user_name, self.home_zone)
        }
    }
}

/// Everything one engine call reads: the catalog, the caller, a config
/// snapshot and the zone hint forwarded on every query
pub struct CallContext<'a> {
    catalog: &'a dyn Catalog,
    session: &'a SessionContext,
    config: NamespaceConfig,
    zone: Option<String>,
}

impl<'a> CallContext<'a> {
    /// Validates the zone hint before any catalog round trip
    pub fn new(
        catalog: &'a dyn Catalog,
        session: &'a SessionContext,
        config: NamespaceConfig,
        zone_hint: Option<&str>,
    ) -> Result<Self> {
        let zone = match zone_hint {
            None => None,
            Some(hint) => {
                let hint = hint.trim();
                if hint.is_empty() {
                    return Err(Error::invalid_argument("zone hint is blank"));
                }
                if !session.knows_zone(hint) {
                    return Err(Error::invalid_argument(format!(
                        "zone hint names an unknown zone: {hint}"
                    )));
                }
                Some(hint.to_string())
            }
        };
        Ok(Self {
            catalog,
            session,
            config,
            zone,
        })
    }

    pub fn session(&self) -> &SessionContext {
        self.session
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn zone_hint(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// The hinted zone, or the caller's home zone
    pub fn effective_zone(&self) -> &str {
        self.zone.as_deref().unwrap_or(self.session.home_zone())
    }

    /// A query builder already addressed to the hinted zone
    pub fn query(&self) -> QueryBuilder {
        CatalogQuery::builder().zone(self.zone.as_deref())
    }

    /// One catalog round trip
    pub async fn run(&self, query: &CatalogQuery) -> Result<ResultSet> {
        let table = format!("{:?}", query.table);
        let offset = query.offset;
        let zone = query.zone.as_deref().unwrap_or(self.session.home_zone());
        debug!(
            "catalog query on {table} at offset {offset} in zone {zone}",
            table: table.as_str(),
            offset: offset,
            zone: zone
        );
        let result = self.catalog.query(query).await?;
        let rows = result.rows.len();
        let more = result.has_more;
        debug!("catalog answered {rows} rows, more: {more}", rows: rows, more: more);
        Ok(result)
    }

    /// Every page of a query, for lookups that must see all rows
    pub async fn run_all(&self, query: &CatalogQuery) -> Result<ResultSet> {
        let table = format!("{:?}", query.table);
        debug!("catalog query on {table}, all pages", table: table.as_str());
        Ok(query_all(self.catalog, query).await?)
    }
}
