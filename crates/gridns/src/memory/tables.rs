// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory catalog tables and query evaluation

use crate::catalog::{CatalogError, CatalogQuery, Column, Condition, ResultSet, Select, Table};
use crate::path::parent_str;
use crate::permissions::AccessLevel;
use std::collections::HashSet;

/// Rows routed to every zone, such as the namespace root
pub(crate) const ANY_ZONE: &str = "";

#[derive(Debug, Clone)]
pub(crate) struct CollectionRow {
    pub name: String,
    pub owner_name: String,
    pub owner_zone: String,
    /// Raw overlay discriminator, as the catalog stores it
    pub coll_type: String,
    pub info1: String,
    pub info2: String,
    pub created: i64,
    pub modified: i64,
    pub zone: String,
    /// Path whose ACL rows govern visibility of this row
    pub acl_path: String,
}

#[derive(Debug, Clone)]
pub(crate) struct DataObjectRow {
    pub coll_name: String,
    pub name: String,
    pub size: u64,
    pub owner_name: String,
    pub owner_zone: String,
    pub resource: String,
    pub created: i64,
    pub modified: i64,
    pub zone: String,
    pub acl_path: String,
}

impl DataObjectRow {
    pub fn path(&self) -> String {
        crate::path::join_str(&self.coll_name, &self.name)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AccessRow {
    pub object_path: String,
    pub user_name: String,
    pub user_zone: String,
    pub level: AccessLevel,
    pub zone: String,
}

#[derive(Debug, Clone)]
pub(crate) struct MetadataRow {
    pub object_path: String,
    pub attribute: String,
    pub value: String,
    pub units: String,
    pub zone: String,
}

/// Principals whose grants make rows visible to a strict-ACL viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Viewer {
    pub principals: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub zones: Vec<String>,
    pub collections: Vec<CollectionRow>,
    pub data_objects: Vec<DataObjectRow>,
    pub access: Vec<AccessRow>,
    pub metadata: Vec<MetadataRow>,
}

/// A row's values keyed by column, plus its routing facts
struct Candidate {
    values: Vec<(Column, String)>,
    zone: String,
    acl_path: Option<String>,
    sort_key: String,
}

impl Candidate {
    fn value(&self, column: Column) -> &str {
        self.values
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

impl Tables {
    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z == zone)
    }

    pub fn collection(&self, path: &str) -> Option<&CollectionRow> {
        self.collections.iter().find(|c| c.name == path)
    }

    pub fn has_data_object(&self, path: &str) -> bool {
        self.data_objects.iter().any(|d| d.path() == path)
    }

    fn visible(&self, viewer: Option<&Viewer>, acl_path: Option<&str>) -> bool {
        let (Some(viewer), Some(acl_path)) = (viewer, acl_path) else {
            return true;
        };
        self.access.iter().any(|a| {
            a.object_path == acl_path
                && a.level != AccessLevel::Null
                && viewer.principals.iter().any(|p| *p == a.user_name)
        })
    }

    fn candidates(&self, table: Table) -> Vec<Candidate> {
        match table {
            Table::Collection => self
                .collections
                .iter()
                .map(|c| Candidate {
                    values: vec![
                        (Column::CollName, c.name.clone()),
                        (Column::CollParentName, parent_str(&c.name).to_string()),
                        (Column::CollOwnerName, c.owner_name.clone()),
                        (Column::CollOwnerZone, c.owner_zone.clone()),
                        (Column::CollType, c.coll_type.clone()),
                        (Column::CollInfo1, c.info1.clone()),
                        (Column::CollInfo2, c.info2.clone()),
                        (Column::CollCreateTime, c.created.to_string()),
                        (Column::CollModifyTime, c.modified.to_string()),
                    ],
                    zone: c.zone.clone(),
                    acl_path: Some(c.acl_path.clone()),
                    sort_key: c.name.clone(),
                })
                .collect(),
            Table::DataObject => self
                .data_objects
                .iter()
                .map(|d| Candidate {
                    values: vec![
                        (Column::DataName, d.name.clone()),
                        (Column::DataCollName, d.coll_name.clone()),
                        (Column::DataSize, d.size.to_string()),
                        (Column::DataOwnerName, d.owner_name.clone()),
                        (Column::DataOwnerZone, d.owner_zone.clone()),
                        (Column::DataResource, d.resource.clone()),
                        (Column::DataCreateTime, d.created.to_string()),
                        (Column::DataModifyTime, d.modified.to_string()),
                    ],
                    zone: d.zone.clone(),
                    acl_path: Some(d.acl_path.clone()),
                    sort_key: d.path(),
                })
                .collect(),
            Table::Access => self
                .access
                .iter()
                .map(|a| Candidate {
                    values: vec![
                        (Column::AccessObjectPath, a.object_path.clone()),
                        (Column::AccessParentPath, parent_str(&a.object_path).to_string()),
                        (Column::AccessUserName, a.user_name.clone()),
                        (Column::AccessUserZone, a.user_zone.clone()),
                        (Column::AccessLevel, a.level.catalog_name().to_string()),
                    ],
                    zone: a.zone.clone(),
                    acl_path: Some(a.object_path.clone()),
                    sort_key: format!("{}\u{0}{}", a.object_path, a.user_name),
                })
                .collect(),
            Table::Metadata => self
                .metadata
                .iter()
                .map(|m| Candidate {
                    values: vec![
                        (Column::MetaObjectPath, m.object_path.clone()),
                        (Column::MetaAttrName, m.attribute.clone()),
                        (Column::MetaAttrValue, m.value.clone()),
                        (Column::MetaAttrUnits, m.units.clone()),
                    ],
                    zone: m.zone.clone(),
                    acl_path: Some(m.object_path.clone()),
                    sort_key: format!("{}\u{0}{}\u{0}{}", m.object_path, m.attribute, m.value),
                })
                .collect(),
            Table::Zone => self
                .zones
                .iter()
                .map(|z| Candidate {
                    values: vec![(Column::ZoneName, z.clone())],
                    zone: ANY_ZONE.to_string(),
                    acl_path: None,
                    sort_key: z.clone(),
                })
                .collect(),
        }
    }

    /// Answers one query as the catalog in `zone` would
    pub fn evaluate(
        &self,
        query: &CatalogQuery,
        zone: &str,
        viewer: Option<&Viewer>,
        max_rows: u64,
    ) -> Result<ResultSet, CatalogError> {
        let mut matched: Vec<Candidate> = self
            .candidates(query.table)
            .into_iter()
            .filter(|c| c.zone == ANY_ZONE || c.zone == zone)
            .filter(|c| self.visible(viewer, c.acl_path.as_deref()))
            .filter(|c| query.conditions.iter().all(|cond| matches(c, cond)))
            .collect();
        matched.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

        let columns: Vec<Column> = query.selects.iter().map(Select::column).collect();

        if query.is_aggregate() {
            if query.selects.iter().any(|s| !s.is_aggregate()) {
                return Err(CatalogError::Query(
                    "grouped aggregates are not supported".to_string(),
                ));
            }
            let mut cells = Vec::with_capacity(query.selects.len());
            for select in &query.selects {
                cells.push(aggregate(&matched, select, query.distinct)?);
            }
            let mut result = ResultSet::new(columns);
            result.rows.push(cells);
            if query.with_total_count {
                result.total_records = Some(1);
            }
            return Ok(result);
        }

        let mut rows: Vec<Vec<String>> = matched
            .iter()
            .map(|c| columns.iter().map(|col| c.value(*col).to_string()).collect())
            .collect();
        if query.distinct {
            let mut seen = HashSet::new();
            rows.retain(|row| seen.insert(row.clone()));
        }

        let total = rows.len() as u64;
        let limit = query.limit.unwrap_or(max_rows).min(max_rows);
        let start = query.offset.min(total);
        let end = start.saturating_add(limit).min(total);
        let page = rows
            .into_iter()
            .skip(start as usize)
            .take((end - start) as usize)
            .collect();

        Ok(ResultSet {
            columns,
            rows: page,
            has_more: end < total,
            total_records: query.with_total_count.then_some(total),
        })
    }
}

fn matches(candidate: &Candidate, condition: &Condition) -> bool {
    match condition {
        Condition::Equal(column, value) => candidate.value(*column) == value,
        Condition::NotEqual(column, value) => candidate.value(*column) != value,
        Condition::Like(column, pattern) => like(candidate.value(*column), pattern),
        Condition::In(column, values) => values.iter().any(|v| candidate.value(*column) == v),
    }
}

fn aggregate(matched: &[Candidate], select: &Select, distinct: bool) -> Result<String, CatalogError> {
    match select {
        Select::Count(column) => {
            if distinct {
                let unique: HashSet<&str> = matched.iter().map(|c| c.value(*column)).collect();
                Ok(unique.len().to_string())
            } else {
                Ok(matched.len().to_string())
            }
        }
        Select::Sum(column) => {
            let mut sum: u64 = 0;
            for candidate in matched {
                let text = candidate.value(*column);
                if text.is_empty() {
                    continue;
                }
                let value = text.parse::<u64>().map_err(|e| {
                    CatalogError::Query(format!("cannot sum {column} value '{text}': {e}"))
                })?;
                sum = sum.saturating_add(value);
            }
            Ok(sum.to_string())
        }
        Select::Column(column) => Err(CatalogError::Query(format!(
            "column {column} selected in an aggregate"
        ))),
    }
}

/// SQL-style LIKE where `%` matches any run of characters
pub(crate) fn like(text: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() {
        return false;
    }
    let mut rest = &text[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Tables {
        let collection = |name: &str, zone: &str| CollectionRow {
            name: name.to_string(),
            owner_name: "rods".to_string(),
            owner_zone: "z".to_string(),
            coll_type: String::new(),
            info1: String::new(),
            info2: String::new(),
            created: 1,
            modified: 2,
            zone: zone.to_string(),
            acl_path: name.to_string(),
        };
        Tables {
            zones: vec!["z".to_string(), "other".to_string()],
            collections: vec![
                collection("/", ANY_ZONE),
                collection("/z", "z"),
                collection("/z/home", "z"),
                collection("/z/home/alice", "z"),
                collection("/other", "other"),
            ],
            data_objects: Vec::new(),
            access: vec![AccessRow {
                object_path: "/z/home/alice".to_string(),
                user_name: "alice".to_string(),
                user_zone: "z".to_string(),
                level: AccessLevel::Own,
                zone: "z".to_string(),
            }],
            metadata: Vec::new(),
        }
    }

    fn children_of(parent: &str) -> CatalogQuery {
        CatalogQuery::builder()
            .select(Column::CollName)
            .equal(Column::CollParentName, parent)
            .filter(Condition::NotEqual(Column::CollName, "/".to_string()))
            .with_total_count()
            .build()
            .unwrap()
    }

    #[test]
    fn test_like() {
        assert!(like("alice", "%lic%"));
        assert!(like("alice", "ali%"));
        assert!(like("alice", "%ice"));
        assert!(like("alice", "alice"));
        assert!(!like("alice", "%bob%"));
        assert!(!like("ab", "a%b%b"));
        assert!(like("abcb", "a%b%b"));
    }

    #[test]
    fn test_zone_routing() {
        let tables = tables();
        let local = tables.evaluate(&children_of("/"), "z", None, 100).unwrap();
        assert_eq!(local.rows, vec![vec!["/z".to_string()]]);
        let remote = tables.evaluate(&children_of("/"), "other", None, 100).unwrap();
        assert_eq!(remote.rows, vec![vec!["/other".to_string()]]);
    }

    #[test]
    fn test_strict_visibility() {
        let tables = tables();
        let viewer = Viewer {
            principals: vec!["alice".to_string(), "public".to_string()],
        };
        let hidden = tables.evaluate(&children_of("/"), "z", Some(&viewer), 100).unwrap();
        assert!(hidden.is_empty());
        let visible = tables
            .evaluate(&children_of("/z/home"), "z", Some(&viewer), 100)
            .unwrap();
        assert_eq!(visible.rows, vec![vec!["/z/home/alice".to_string()]]);
    }

    #[test]
    fn test_paging_and_totals() {
        let tables = tables();
        let query = CatalogQuery::builder()
            .select(Column::CollName)
            .filter(Condition::Like(Column::CollName, "/z%".to_string()))
            .limit(2)
            .with_total_count()
            .build()
            .unwrap();
        let first = tables.evaluate(&query, "z", None, 100).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.has_more);
        assert_eq!(first.total_records, Some(3));

        let second = tables.evaluate(&query.clone().with_offset(2), "z", None, 100).unwrap();
        assert_eq!(second.len(), 1);
        assert!(!second.has_more);
    }

    #[test]
    fn test_count_aggregate() {
        let tables = tables();
        let query = CatalogQuery::builder()
            .count(Column::CollName)
            .equal(Column::CollParentName, "/z")
            .build()
            .unwrap();
        let result = tables.evaluate(&query, "z", None, 100).unwrap();
        assert_eq!(result.rows, vec![vec!["1".to_string()]]);
    }
}
