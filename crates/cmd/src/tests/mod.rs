// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::commands::{self, ListArgs};
use crate::common::{EntityChoice, GridContext, KindChoice};
use tempfile::TempDir;

const CATALOG: &str = r#"
zone: tempZone
federated_zones: [otherZone]
collections:
  - path: /tempZone/home/alice/src
    owner: alice
  - path: /tempZone/home/alice/src/child
    owner: alice
  - path: /tempZone/home/alice/dst
    owner: alice
    overlay: linked-collection
    target: /tempZone/home/alice/src
  - path: /tempZone/home/public
    owner: rods
  - path: /otherZone/home/shared
    owner: carol
data_objects:
  - path: /tempZone/home/alice/src/notes.txt
    owner: alice
    size: 2048
  - path: /tempZone/home/alice/src/run.log
    owner: alice
    size: 10
grants:
  - path: /tempZone/home/public
    user: public
    level: read
metadata:
  - path: /tempZone/home/alice/dst
    attribute: project
    value: rivers
    units: basin
"#;

fn setup() -> (TempDir, GridContext) {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = tmp.path().join("catalog.yaml");
    std::fs::write(&catalog, CATALOG).unwrap();
    let ctx = GridContext {
        catalog,
        user: "alice".to_string(),
        ..Default::default()
    };
    (tmp, ctx)
}

fn output() -> (std::rc::Rc<std::cell::RefCell<String>>, impl FnMut(&str)) {
    let buffer = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
    let sink = buffer.clone();
    (buffer, move |s: &str| sink.borrow_mut().push_str(s))
}

#[tokio::test]
async fn test_stat_link() {
    let (_tmp, ctx) = setup();
    let (buffer, handler) = output();
    commands::stat_command(&ctx, "/tempZone/home/alice/dst", handler).await.unwrap();

    let text = buffer.borrow();
    assert!(text.contains("overlay:   linked-collection"));
    assert!(text.contains("canonical: /tempZone/home/alice/src"));
    assert!(text.contains("owner:     alice#tempZone"));
}

#[tokio::test]
async fn test_list_through_link() {
    let (_tmp, ctx) = setup();
    let (buffer, handler) = output();
    commands::list_command(&ctx, "/tempZone/home/alice/dst", &ListArgs::default(), handler)
        .await
        .unwrap();

    let text = buffer.borrow();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("C@"));
    assert!(lines[0].contains("child -> /tempZone/home/alice/src/child"));
    assert!(lines[1].contains("notes.txt"));
    assert!(lines[1].contains("2.0KB"));
}

#[tokio::test]
async fn test_list_pages_and_json() {
    let (_tmp, mut ctx) = setup();
    let args = ListArgs {
        page_size: Some(1),
        ..Default::default()
    };
    let (buffer, handler) = output();
    commands::list_command(&ctx, "/tempZone/home/alice/src", &args, handler)
        .await
        .unwrap();
    assert!(buffer.borrow().contains("... more at offset 1"));

    ctx.json = true;
    let args = ListArgs {
        page_size: Some(1),
        all_pages: true,
        ..Default::default()
    };
    let (buffer, handler) = output();
    commands::list_command(&ctx, "/tempZone/home/alice/src", &args, handler)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&buffer.borrow()).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2]["sequence_index"], 3);
    assert_eq!(entries[2]["is_last_result"], true);
}

#[tokio::test]
async fn test_count_with_size() {
    let (_tmp, ctx) = setup();
    let (buffer, handler) = output();
    commands::count_command(&ctx, "/tempZone/home/alice/src", KindChoice::All, true, handler)
        .await
        .unwrap();
    assert_eq!(buffer.borrow().as_str(), "3\n2.0KB (2058 bytes)\n");
}

#[tokio::test]
async fn test_meta_on_link() {
    let (_tmp, ctx) = setup();
    let (buffer, handler) = output();
    commands::meta_command(&ctx, "/tempZone/home/alice/dst", handler).await.unwrap();
    assert_eq!(buffer.borrow().as_str(), "project = rivers [basin]\n");

    let (buffer, handler) = output();
    commands::meta_command(&ctx, "/tempZone/home/alice/src", handler).await.unwrap();
    assert!(buffer.borrow().is_empty());
}

#[tokio::test]
async fn test_find_objects() {
    let (_tmp, ctx) = setup();
    let (buffer, handler) = output();
    commands::find_command(&ctx, "log", EntityChoice::Objects, 0, None, handler)
        .await
        .unwrap();
    assert_eq!(buffer.borrow().as_str(), "/tempZone/home/alice/src/run.log\n");
}

#[tokio::test]
async fn test_strict_fallback_root() {
    let (_tmp, mut ctx) = setup();
    ctx.user = "bob".to_string();
    ctx.strict = true;

    let (_, handler) = output();
    assert!(commands::stat_command(&ctx, "/", handler).await.is_err());

    ctx.fallback = true;
    let (buffer, handler) = output();
    commands::stat_command(&ctx, "/", handler).await.unwrap();
    assert!(buffer.borrow().contains("stand-in:  yes"));
}

#[tokio::test]
async fn test_hint_reaches_federated_zone() {
    let (_tmp, mut ctx) = setup();
    let (_, handler) = output();
    assert!(commands::stat_command(&ctx, "/otherZone/home/shared", handler).await.is_err());

    ctx.hint = Some("otherZone".to_string());
    let (buffer, handler) = output();
    commands::stat_command(&ctx, "/otherZone/home/shared", handler).await.unwrap();
    assert!(buffer.borrow().contains("owner:     carol#tempZone"));
}

#[tokio::test]
async fn test_config_file() {
    let (tmp, mut ctx) = setup();
    let config = tmp.path().join("config.yaml");
    std::fs::write(&config, "page_size: 2\n").unwrap();
    ctx.config = Some(config);

    let (buffer, handler) = output();
    commands::list_command(&ctx, "/tempZone/home/alice/src", &ListArgs::default(), handler)
        .await
        .unwrap();
    assert!(buffer.borrow().contains("... more at offset 2"));

    std::fs::write(tmp.path().join("config.yaml"), "page_size: 0\n").unwrap();
    let (_, handler) = output();
    assert!(
        commands::list_command(&ctx, "/tempZone/home/alice/src", &ListArgs::default(), handler)
            .await
            .is_err()
    );
}
