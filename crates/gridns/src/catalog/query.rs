// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured catalog queries
//!
//! Queries select columns from exactly one catalog table and filter them by
//! conjunctive conditions. The engine only builds queries; executing them is
//! the [`Catalog`](super::Catalog) implementation's job.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Catalog table a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Collection,
    DataObject,
    Access,
    Metadata,
    Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    CollName,
    CollParentName,
    CollOwnerName,
    CollOwnerZone,
    /// Overlay discriminator (empty for normal collections)
    CollType,
    /// Overlay target: link target path or mount point
    CollInfo1,
    /// Overlay detail such as the resource backing a mount
    CollInfo2,
    CollCreateTime,
    CollModifyTime,

    DataName,
    DataCollName,
    DataSize,
    DataOwnerName,
    DataOwnerZone,
    DataResource,
    DataCreateTime,
    DataModifyTime,

    /// Absolute path of the object an ACL row protects
    AccessObjectPath,
    /// Collection holding the protected object
    AccessParentPath,
    AccessUserName,
    AccessUserZone,
    AccessLevel,

    MetaObjectPath,
    MetaAttrName,
    MetaAttrValue,
    MetaAttrUnits,

    ZoneName,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::CollName => "COLL_NAME",
            Column::CollParentName => "COLL_PARENT_NAME",
            Column::CollOwnerName => "COLL_OWNER_NAME",
            Column::CollOwnerZone => "COLL_OWNER_ZONE",
            Column::CollType => "COLL_TYPE",
            Column::CollInfo1 => "COLL_INFO1",
            Column::CollInfo2 => "COLL_INFO2",
            Column::CollCreateTime => "COLL_CREATE_TIME",
            Column::CollModifyTime => "COLL_MODIFY_TIME",
            Column::DataName => "DATA_NAME",
            Column::DataCollName => "DATA_COLL_NAME",
            Column::DataSize => "DATA_SIZE",
            Column::DataOwnerName => "DATA_OWNER_NAME",
            Column::DataOwnerZone => "DATA_OWNER_ZONE",
            Column::DataResource => "DATA_RESC_NAME",
            Column::DataCreateTime => "DATA_CREATE_TIME",
            Column::DataModifyTime => "DATA_MODIFY_TIME",
            Column::AccessObjectPath => "ACCESS_OBJECT_PATH",
            Column::AccessParentPath => "ACCESS_PARENT_PATH",
            Column::AccessUserName => "ACCESS_USER_NAME",
            Column::AccessUserZone => "ACCESS_USER_ZONE",
            Column::AccessLevel => "ACCESS_LEVEL",
            Column::MetaObjectPath => "META_OBJECT_PATH",
            Column::MetaAttrName => "META_ATTR_NAME",
            Column::MetaAttrValue => "META_ATTR_VALUE",
            Column::MetaAttrUnits => "META_ATTR_UNITS",
            Column::ZoneName => "ZONE_NAME",
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Column::CollName
            | Column::CollParentName
            | Column::CollOwnerName
            | Column::CollOwnerZone
            | Column::CollType
            | Column::CollInfo1
            | Column::CollInfo2
            | Column::CollCreateTime
            | Column::CollModifyTime => Table::Collection,
            Column::DataName
            | Column::DataCollName
            | Column::DataSize
            | Column::DataOwnerName
            | Column::DataOwnerZone
            | Column::DataResource
            | Column::DataCreateTime
            | Column::DataModifyTime => Table::DataObject,
            Column::AccessObjectPath
            | Column::AccessParentPath
            | Column::AccessUserName
            | Column::AccessUserZone
            | Column::AccessLevel => Table::Access,
            Column::MetaObjectPath
            | Column::MetaAttrName
            | Column::MetaAttrValue
            | Column::MetaAttrUnits => Table::Metadata,
            Column::ZoneName => Table::Zone,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One selected output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Select {
    Column(Column),
    /// Number of matching rows (distinct values when the query is distinct)
    Count(Column),
    /// Numeric sum over matching rows
    Sum(Column),
}

impl Select {
    pub fn column(&self) -> Column {
        match self {
            Select::Column(c) | Select::Count(c) | Select::Sum(c) => *c,
        }
    }

    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, Select::Column(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Equal(Column, String),
    NotEqual(Column, String),
    /// `%` matches any run of characters
    Like(Column, String),
    In(Column, Vec<String>),
}

impl Condition {
    pub fn column(&self) -> Column {
        match self {
            Condition::Equal(c, _)
            | Condition::NotEqual(c, _)
            | Condition::Like(c, _)
            | Condition::In(c, _) => *c,
        }
    }
}

/// A fully specified catalog query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub table: Table,
    pub selects: Vec<Select>,
    pub conditions: Vec<Condition>,
    pub offset: u64,
    /// Maximum rows to return; `None` lets the catalog choose
    pub limit: Option<u64>,
    pub distinct: bool,
    /// Ask the catalog to report the total matching row count
    pub with_total_count: bool,
    /// Federated zone the query is addressed to
    pub zone: Option<String>,
}

impl CatalogQuery {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value of the first `Equal` condition on `column`
    pub fn equal_value(&self, column: Column) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Equal(col, value) if *col == column => Some(value.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.selects.iter().any(Select::is_aggregate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    selects: Vec<Select>,
    conditions: Vec<Condition>,
    offset: u64,
    limit: Option<u64>,
    distinct: bool,
    with_total_count: bool,
    zone: Option<String>,
}

impl QueryBuilder {
    #[must_use]
    pub fn select(mut self, column: Column) -> Self {
        self.selects.push(Select::Column(column));
        self
    }

    #[must_use]
    pub fn select_all(mut self, columns: &[Column]) -> Self {
        self.selects.extend(columns.iter().copied().map(Select::Column));
        self
    }

    #[must_use]
    pub fn count(mut self, column: Column) -> Self {
        self.selects.push(Select::Count(column));
        self
    }

    #[must_use]
    pub fn sum(mut self, column: Column) -> Self {
        self.selects.push(Select::Sum(column));
        self
    }

    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn equal<S: Into<String>>(self, column: Column, value: S) -> Self {
        self.filter(Condition::Equal(column, value.into()))
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn with_total_count(mut self) -> Self {
        self.with_total_count = true;
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: Option<&str>) -> Self {
        self.zone = zone.map(str::to_string);
        self
    }

    /// Checks that every column comes from one table
    /// Checks the query names one table; failures are engine bugs, not catalog errors
    pub fn build(self) -> Result<CatalogQuery> {
        let first = self
            .selects
            .first()
            .ok_or_else(|| Error::invalid_query("query selects no columns"))?;
        let table = first.column().table();

        let stray = self
            .selects
            .iter()
            .map(Select::column)
            .chain(self.conditions.iter().map(Condition::column))
            .find(|c| c.table() != table);
        if let Some(column) = stray {
            return Err(Error::invalid_query(format!(
                "column {column} does not belong to table {table:?}"
            )));
        }

        Ok(CatalogQuery {
            table,
            selects: self.selects,
            conditions: self.conditions,
            offset: self.offset,
            limit: self.limit,
            distinct: self.distinct,
            with_total_count: self.with_total_count,
            zone: self.zone,
        })
    }
}
