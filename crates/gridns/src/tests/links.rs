// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::entity::EntityKind;
use crate::listing::{ChildKinds, ListOptions};
use crate::memory::MemoryCatalogBuilder;
use crate::overlay::OverlayType;

#[tokio::test]
async fn test_link_listing_presents_under_link() {
    let catalog = MemoryCatalogBuilder::new("zoneA")
        .collection("/zoneA/home/u/src", "u")
        .collection("/zoneA/home/u/src/child", "u")
        .linked_collection("/zoneA/home/u/dst", "/zoneA/home/u/src", "u")
        .build()
        .unwrap();
    let session = crate::SessionContext::new("u", "zoneA").unwrap();
    let ns = crate::Namespace::new(std::sync::Arc::new(catalog), session);

    let page = ns.list_collections_under_path("/zoneA/home/u/dst", 0, None).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0];
    assert_eq!(entry.parent_path, "/zoneA/home/u/dst");
    assert_eq!(entry.special_object_path, "/zoneA/home/u/src");
    assert_eq!(entry.path_or_name, "/zoneA/home/u/dst/child");
    assert_eq!(entry.canonical_path, "/zoneA/home/u/src/child");
    assert!(entry.is_last_result);
}

#[tokio::test]
async fn test_link_and_canonical_listings_agree() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let via_link = ns
        .list_data_objects_and_collections_under_path(LINK, 0, None)
        .await
        .unwrap();
    let direct = ns
        .list_data_objects_and_collections_under_path(DATA, 0, None)
        .await
        .unwrap();
    assert_eq!(via_link.entries.len(), 4);
    assert_eq!(direct.entries.len(), 4);

    for entry in &via_link.entries {
        assert_eq!(entry.parent_path, LINK);
        assert_eq!(entry.special_object_path, DATA);
        assert!(entry.path_or_name.starts_with(LINK));
    }
    for entry in &direct.entries {
        assert_eq!(entry.parent_path, DATA);
        assert_eq!(entry.special_object_path, "");
        assert_eq!(entry.overlay, OverlayType::Normal);
    }

    let link_names: Vec<&str> = via_link.entries.iter().map(|e| e.name()).collect();
    let direct_names: Vec<&str> = direct.entries.iter().map(|e| e.name()).collect();
    assert_eq!(link_names, direct_names);
    assert_eq!(link_names, vec!["sub1", "sub2", "a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_resolve_link_itself() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let link = ns.resolve(LINK, None).await.unwrap();
    assert_eq!(link.overlay, OverlayType::LinkedCollection);
    assert_eq!(link.absolute_path, LINK);
    assert_eq!(link.canonical_collection_path, DATA);
    assert!(!link.is_stand_in);
}

#[tokio::test]
async fn test_resolve_through_link() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let sub = ns.resolve("/tempZone/home/alice/link/sub1", None).await.unwrap();
    assert_eq!(sub.absolute_path, "/tempZone/home/alice/link/sub1");
    assert_eq!(sub.canonical_collection_path, "/tempZone/home/alice/data/sub1");
    assert_eq!(sub.overlay, OverlayType::LinkedCollection);

    let deep = ns
        .resolve("/tempZone/home/alice/link/sub1/deep.txt", None)
        .await
        .unwrap();
    assert_eq!(deep.entity_kind, EntityKind::DataObject);
    assert_eq!(deep.data_size, 5);
    assert_eq!(deep.absolute_path, "/tempZone/home/alice/link/sub1/deep.txt");

    let page = ns
        .list_under_path("/tempZone/home/alice/link/sub1", ChildKinds::All, &ListOptions::default(), None)
        .await
        .unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].path_or_name, "/tempZone/home/alice/link/sub1/deep.txt");
    assert_eq!(page.entries[0].special_object_path, "/tempZone/home/alice/data/sub1");
}

#[tokio::test]
async fn test_missing_path_under_link() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let err = ns.resolve("/tempZone/home/alice/link/nope", None).await.unwrap_err();
    assert_eq!(err, crate::Error::not_found("/tempZone/home/alice/link/nope"));
}

#[tokio::test]
async fn test_mount_contents() {
    let catalog = sample()
        .mounted_collection("/tempZone/home/alice/mnt", "/export/alice", "unixfs", "alice")
        .overlay_collection("/tempZone/home/alice/mnt", "scans")
        .overlay_data_object("/tempZone/home/alice/mnt", "r1.csv", 7)
        .overlay_data_object("/tempZone/home/alice/mnt", "scans/s1.tif", 900)
        .build()
        .unwrap();
    let ns = namespace(&catalog, "alice");

    let mount = ns.resolve("/tempZone/home/alice/mnt", None).await.unwrap();
    assert_eq!(mount.overlay, OverlayType::MountedFilesystem);
    assert_eq!(mount.canonical_collection_path, "/export/alice");
    assert_eq!(mount.resource.as_deref(), Some("unixfs"));

    let page = ns
        .list_data_objects_and_collections_under_path("/tempZone/home/alice/mnt", 0, None)
        .await
        .unwrap();
    let paths: Vec<&str> = page.entries.iter().map(|e| e.path_or_name.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/tempZone/home/alice/mnt/scans", "/tempZone/home/alice/mnt/r1.csv"]
    );
    assert!(page.entries.iter().all(|e| e.overlay == OverlayType::MountedFilesystem));
    assert!(page.entries.iter().all(|e| e.special_object_path == "/export/alice"));

    let tif = ns
        .get_entry_at_path("/tempZone/home/alice/mnt/scans/s1.tif", None)
        .await
        .unwrap();
    assert_eq!(tif.parent_path, "/tempZone/home/alice/mnt/scans");
    assert_eq!(tif.special_object_path, "/export/alice/scans");
    assert_eq!(tif.canonical_path, "/export/alice/scans/s1.tif");
    assert_eq!(tif.data_size, 900);
    assert_eq!(tif.sequence_index, 1);
    assert!(tif.is_last_result);
}

#[tokio::test]
async fn test_structured_file_contents() {
    let catalog = sample()
        .data_object("/tempZone/home/alice/bundle.tar", "alice", 4096)
        .structured_file_collection("/tempZone/home/alice/bundle", "/tempZone/home/alice/bundle.tar", "alice")
        .overlay_data_object("/tempZone/home/alice/bundle", "README", 64)
        .build()
        .unwrap();
    let ns = namespace(&catalog, "alice");

    let page = ns
        .list_data_objects_under_path("/tempZone/home/alice/bundle", 0, None)
        .await
        .unwrap();
    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0];
    assert_eq!(entry.path_or_name, "/tempZone/home/alice/bundle/README");
    assert_eq!(entry.overlay, OverlayType::StructuredFileMount);
    assert_eq!(entry.special_object_path, "/tempZone/home/alice/bundle.tar");
}

#[tokio::test]
async fn test_get_entry_at_plain_path() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let entry = ns.get_entry_at_path("/tempZone/home/alice/data/a.txt", None).await.unwrap();
    assert_eq!(entry.parent_path, DATA);
    assert_eq!(entry.path_or_name, "/tempZone/home/alice/data/a.txt");
    assert_eq!(entry.entity_kind, EntityKind::DataObject);
    assert_eq!(entry.special_object_path, "");
    assert_eq!(entry.data_size, 10);
    assert_eq!(entry.owner_name, "alice");
}

#[tokio::test]
async fn test_get_entry_matches_listing_through_link() {
    let catalog = sample().build().unwrap();
    let ns = namespace(&catalog, "alice");

    let entry = ns.get_entry_at_path("/tempZone/home/alice/link/a.txt", None).await.unwrap();
    let page = ns.list_data_objects_under_path(LINK, 0, None).await.unwrap();
    let listed = page
        .entries
        .iter()
        .find(|e| e.name() == "a.txt")
        .unwrap();
    assert_eq!(entry.parent_path, listed.parent_path);
    assert_eq!(entry.special_object_path, listed.special_object_path);
    assert_eq!(entry.canonical_path, listed.canonical_path);
    assert_eq!(entry.overlay, listed.overlay);
}
