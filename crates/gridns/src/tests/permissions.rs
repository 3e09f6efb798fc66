// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::catalog::{CatalogError, Condition};
use crate::error::Error;
use crate::listing::{ChildKinds, ListOptions, ListingEntry};
use crate::permissions::{AccessLevel, UserPermission};

fn levels_of<'a>(entry: &'a ListingEntry) -> Vec<(&'a str, AccessLevel)> {
    entry
        .permissions
        .iter()
        .map(|p| (p.user_name.as_str(), p.level))
        .collect()
}

#[tokio::test]
async fn test_one_acl_query_per_page() {
    let catalog = sample()
        .grant("/tempZone/home/alice/data/sub1", "bob", AccessLevel::Read)
        .grant("/tempZone/home/alice/data/b.txt", "bob", AccessLevel::Write)
        .build()
        .unwrap();
    let ns = namespace(&catalog, "alice");
    let record = ns.resolve(DATA, None).await.unwrap();
    catalog.clear_log().await;

    let options = ListOptions::default().with_permissions();
    let page = ns.list_children(&record, ChildKinds::All, &options, None).await.unwrap();
    assert_eq!(page.entries.len(), 4);
    assert_eq!(queries_on(&catalog.queries().await, Table::Access), 1);

    let sub1 = &page.entries[0];
    assert_eq!(sub1.name(), "sub1");
    assert!(levels_of(sub1).contains(&("alice", AccessLevel::Own)));
    assert!(levels_of(sub1).contains(&("bob", AccessLevel::Read)));

    let sub2 = &page.entries[1];
    assert_eq!(levels_of(sub2), vec![("alice", AccessLevel::Own)]);

    let b = &page.entries[3];
    assert_eq!(b.name(), "b.txt");
    assert!(levels_of(b).contains(&("bob", AccessLevel::Write)));
    assert!(b.permissions.iter().all(|p| p.user_zone == ZONE));
}

#[tokio::test]
async fn test_permissions_not_fetched_by_default() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let page = ns.list_collections_under_path(DATA, 0, None).await.unwrap();
    assert!(page.entries.iter().all(|e| e.permissions.is_empty()));
    assert_eq!(queries_on(&catalog.queries().await, Table::Access), 0);

    let page = ns.list_collections_under_path_with_permissions(DATA, 0, None).await.unwrap();
    assert!(page.entries.iter().all(|e| !e.permissions.is_empty()));
}

#[tokio::test]
async fn test_linked_children_use_canonical_acl() {
    let catalog = sample()
        .grant("/tempZone/home/alice/data/a.txt", "bob", AccessLevel::Read)
        .build()
        .unwrap();
    let ns = namespace(&catalog, "alice");
    catalog.clear_log().await;

    let page = ns.list_data_objects_under_path_with_permissions(LINK, 0, None).await.unwrap();
    let a = page.entries.iter().find(|e| e.name() == "a.txt").unwrap();
    assert_eq!(a.path_or_name, "/tempZone/home/alice/link/a.txt");
    assert!(levels_of(a).contains(&("bob", AccessLevel::Read)));

    let acl_queries: Vec<CatalogQuery> = catalog
        .queries()
        .await
        .into_iter()
        .filter(|q| q.table == Table::Access)
        .collect();
    assert_eq!(acl_queries.len(), 1);
    assert_eq!(
        acl_queries[0].conditions,
        vec![Condition::Equal(crate::catalog::Column::AccessParentPath, DATA.to_string())]
    );
}

#[tokio::test]
async fn test_mount_contents_inherit_root_acl() {
    let catalog = sample()
        .mounted_collection("/tempZone/home/alice/mnt", "/export/alice", "unixfs", "alice")
        .grant("/tempZone/home/alice/mnt", "bob", AccessLevel::Read)
        .overlay_collection("/tempZone/home/alice/mnt", "scans")
        .overlay_data_object("/tempZone/home/alice/mnt", "r1.csv", 7)
        .build()
        .unwrap();
    let ns = namespace(&catalog, "alice");
    catalog.clear_log().await;

    let options = ListOptions::default().with_permissions();
    let page = ns
        .list_under_path("/tempZone/home/alice/mnt", ChildKinds::All, &options, None)
        .await
        .unwrap();
    assert_eq!(page.entries.len(), 2);
    for entry in &page.entries {
        let levels = levels_of(entry);
        assert!(levels.contains(&("alice", AccessLevel::Own)), "{}", entry.path_or_name);
        assert!(levels.contains(&("bob", AccessLevel::Read)), "{}", entry.path_or_name);
    }
    assert_eq!(queries_on(&catalog.queries().await, Table::Access), 1);
}

#[tokio::test]
async fn test_mount_is_visible_through_its_acl() {
    let catalog = sample()
        .mounted_collection("/tempZone/home/alice/mnt", "/export/alice", "unixfs", "alice")
        .grant("/tempZone/home/alice/mnt", "bob", AccessLevel::Read)
        .overlay_data_object("/tempZone/home/alice/mnt", "r1.csv", 7)
        .build()
        .unwrap()
        .as_viewer("bob");
    let ns = namespace(&catalog, "bob");

    let page = ns
        .list_data_objects_under_path("/tempZone/home/alice/mnt", 0, None)
        .await
        .unwrap();
    assert_eq!(page.entries.len(), 1);
    let err = ns.resolve(DATA, None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_acl_failure_discards_page() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    catalog
        .fail_next_query_on(Table::Access, CatalogError::Query("acl table offline".into()))
        .await;
    let err = ns
        .list_collections_under_path_with_permissions(DATA, 0, None)
        .await
        .unwrap_err();
    assert_eq!(err, Error::Catalog(CatalogError::Query("acl table offline".into())));
}

#[test]
fn test_permission_serializes_level_name() {
    let permission = UserPermission {
        user_name: "bob".into(),
        user_zone: ZONE.into(),
        level: AccessLevel::ReadMetadata,
    };
    let json = serde_json::to_value(&permission).unwrap();
    assert_eq!(json["level"], "read_metadata");
    assert_eq!(json["user_name"], "bob");
}
