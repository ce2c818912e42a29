use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Arc;
use std::thread;

use dostman::collections::{move_saved_request, rename_saved_collection, rename_saved_request};
use dostman::storage::{COLLECTIONS_FILE, HISTORY_FILE};
use dostman::{Collection, HistoryItem, HttpMethod, KeyValue, RequestData, ResponseData, StorageError, Store};
use tempfile::TempDir;

fn store() -> (Store, TempDir) {
    let dir = TempDir::new().unwrap();
    (Store::new(dir.path(), 100), dir)
}

fn make_request(id: &str) -> RequestData {
    let mut request = RequestData::new(id, HttpMethod::Post, format!("https://api.example.com/{id}"));
    request.name = format!("Request {id}");
    request.headers = vec![KeyValue::new("Accept", "application/json"), KeyValue::disabled("X-Debug", "1")];
    request.params = vec![KeyValue::new("page", "1")];
    request.body = "{\"a\":1}".into();
    request.body_type = "json".into();
    request
}

fn collection(id: &str, name: &str, request_ids: &[&str]) -> Collection {
    Collection {
        id: id.into(),
        name: name.into(),
        requests: request_ids.iter().map(|id| make_request(id)).collect(),
    }
}

fn history_item(id: &str, timestamp_millis: i64) -> HistoryItem {
    HistoryItem {
        id: id.into(),
        request: make_request(&format!("req-{id}")),
        response: ResponseData {
            status: 200,
            status_text: "200 OK".into(),
            time_millis: 15,
            size_label: "2 B".into(),
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: "{}".into(),
            content_type: "application/json".into(),
        },
        timestamp_millis,
    }
}

fn by_id(collections: Vec<Collection>) -> HashMap<String, Collection> {
    collections.into_iter().map(|c| (c.id.clone(), c)).collect()
}

#[test]
fn fresh_store_loads_empty_lists() {
    let (store, _dir) = store();
    assert!(store.load_collections().unwrap().is_empty());
    assert!(store.load_history().unwrap().is_empty());
}

#[test]
fn saving_a_collection_keeps_its_siblings() {
    let (store, _dir) = store();
    store.save_collections(&[collection("c1", "A", &[])]).unwrap();
    store.save_collections(&[collection("c2", "B", &[])]).unwrap();

    let loaded = by_id(store.load_collections().unwrap());
    assert_eq!(loaded.len(), 2);
    assert!(loaded.contains_key("c1"));
    assert!(loaded.contains_key("c2"));

    store.save_collections(&[collection("c1", "A2", &["r1"])]).unwrap();

    let loaded = by_id(store.load_collections().unwrap());
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["c1"].name, "A2");
    assert_eq!(loaded["c1"].requests, vec![make_request("r1")]);
    assert_eq!(loaded["c2"], collection("c2", "B", &[]));
}

#[test]
fn resaving_replaces_the_whole_request_list() {
    let (store, _dir) = store();
    store.save_collections(&[collection("c1", "A", &["r1", "r2", "r3"])]).unwrap();
    store.save_collections(&[collection("c1", "A", &["r2"])]).unwrap();

    let loaded = store.load_collections().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].requests, vec![make_request("r2")]);
}

#[test]
fn collection_saves_are_idempotent_and_commutative() {
    let (first, _first_dir) = store();
    let (second, _second_dir) = store();
    let a = collection("a", "Alpha", &["r1"]);
    let b = collection("b", "Beta", &["r2", "r3"]);

    first.save_collections(std::slice::from_ref(&a)).unwrap();
    first.save_collections(std::slice::from_ref(&b)).unwrap();
    first.save_collections(std::slice::from_ref(&a)).unwrap();

    second.save_collections(std::slice::from_ref(&b)).unwrap();
    second.save_collections(std::slice::from_ref(&a)).unwrap();

    assert_eq!(by_id(first.load_collections().unwrap()), by_id(second.load_collections().unwrap()));
}

#[test]
fn entities_round_trip_without_loss() {
    let (store, _dir) = store();
    let original = collection("c1", "Full", &["r1", "r2"]);
    store.save_collections(std::slice::from_ref(&original)).unwrap();
    assert_eq!(store.load_collections().unwrap(), vec![original]);

    let item = history_item("h1", 1_700_000_000_000);
    store.save_history(std::slice::from_ref(&item)).unwrap();
    assert_eq!(store.load_history().unwrap(), vec![item]);
}

#[test]
fn history_keeps_exactly_the_most_recent_hundred() {
    let (store, _dir) = store();
    let mut saved_ids = Vec::new();

    for batch in 0..5 {
        // Newest first within a batch, like the front end's prepend order.
        let items: Vec<_> = (batch * 30..batch * 30 + 30)
            .rev()
            .map(|n| history_item(&format!("item-{n}"), n as i64))
            .collect();
        saved_ids.extend((batch * 30..batch * 30 + 30).map(|n| format!("item-{n}")));
        store.save_history(&items).unwrap();
    }

    let loaded = store.load_history().unwrap();
    assert_eq!(loaded.len(), 100);

    let expected: HashSet<_> = saved_ids[50..].iter().cloned().collect();
    let actual: HashSet<_> = loaded.iter().map(|item| item.id.clone()).collect();
    assert_eq!(actual, expected);
    assert_eq!(loaded[0].id, "item-149");
    assert_eq!(loaded[99].id, "item-50");
}

#[test]
fn history_order_follows_saves_not_timestamps() {
    let (store, _dir) = store();
    store.save_history(&[history_item("late-clock", 9_000)]).unwrap();
    store.save_history(&[history_item("early-clock", 1)]).unwrap();

    let ids: Vec<_> = store.load_history().unwrap().into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec!["early-clock", "late-clock"]);
}

#[test]
fn history_limit_is_configurable() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), 3);
    for n in 0..5 {
        store.save_history(&[history_item(&n.to_string(), n)]).unwrap();
    }

    let ids: Vec<_> = store.load_history().unwrap().into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec!["4", "3", "2"]);
}

#[test]
fn delete_all_history_leaves_collections_alone() {
    let (store, _dir) = store();
    store.save_collections(&[collection("c1", "A", &["r1"])]).unwrap();
    store.save_history(&[history_item("h1", 1), history_item("h2", 2)]).unwrap();

    store.delete_all_history().unwrap();

    assert!(store.load_history().unwrap().is_empty());
    assert_eq!(store.load_collections().unwrap().len(), 1);
}

#[test]
fn corrupt_records_are_errors_not_empty() {
    let (store, dir) = store();
    fs::write(dir.path().join(COLLECTIONS_FILE), "{ definitely not a list").unwrap();
    fs::write(dir.path().join(HISTORY_FILE), "[{\"id\": 1}]").unwrap();

    assert!(matches!(store.load_collections(), Err(StorageError::Corrupt { .. })));
    assert!(matches!(store.load_history(), Err(StorageError::Corrupt { .. })));
}

#[test]
fn saves_refuse_to_overwrite_a_corrupt_record() {
    let (store, dir) = store();
    let path = dir.path().join(COLLECTIONS_FILE);
    fs::write(&path, "garbage").unwrap();

    let result = store.save_collections(&[collection("c1", "A", &[])]);
    assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");
}

#[test]
fn base_dir_is_created_on_first_save() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("nested").join(".apiforge");
    let store = Store::new(&base, 100);

    store.save_collections(&[collection("c1", "A", &[])]).unwrap();
    assert!(base.join(COLLECTIONS_FILE).exists());
}

#[test]
fn reads_records_written_with_original_field_names() {
    let (store, dir) = store();
    let raw = r#"[{"id":"h1","request":{"id":"r1","name":"n","url":"http://x","method":"DELETE","headers":[],"params":null,"body":"","bodyType":"none"},"response":{"status":204,"statusText":"204 No Content","time":7,"size":"0 B","headers":{"Date":"today"},"body":"","contentType":""},"timestamp":1700000000000}]"#;
    fs::write(dir.path().join(HISTORY_FILE), raw).unwrap();

    let history = store.load_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].request.method, HttpMethod::Delete);
    assert_eq!(history[0].response.time_millis, 7);
    assert_eq!(history[0].response.size_label, "0 B");
    assert_eq!(history[0].timestamp_millis, 1_700_000_000_000);
}

#[test]
fn move_persists_both_sides_in_one_save() {
    let (store, _dir) = store();
    store
        .save_collections(&[
            collection("c1", "Source", &["r1", "r2"]),
            collection("c2", "Target", &["r3"]),
            collection("c3", "Bystander", &["r4"]),
        ])
        .unwrap();

    move_saved_request(&store, "r1", "c1", "c2").unwrap();

    let loaded = by_id(store.load_collections().unwrap());
    let ids = |id: &str| -> Vec<String> { loaded[id].requests.iter().map(|r| r.id.clone()).collect() };
    assert_eq!(ids("c1"), vec!["r2"]);
    assert_eq!(ids("c2"), vec!["r3", "r1"]);
    assert_eq!(ids("c3"), vec!["r4"]);
}

#[test]
fn renames_keep_siblings_and_requests() {
    let (store, _dir) = store();
    store
        .save_collections(&[collection("c1", "Auth", &["r1", "r2"]), collection("c2", "Billing", &["r3"])])
        .unwrap();

    rename_saved_collection(&store, "c1", "Accounts").unwrap();
    rename_saved_request(&store, "c1", "r2", "Refresh token").unwrap();

    let loaded = by_id(store.load_collections().unwrap());
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["c1"].name, "Accounts");
    assert_eq!(loaded["c1"].requests[0], make_request("r1"));
    assert_eq!(loaded["c1"].requests[1].name, "Refresh token");
    assert_eq!(loaded["c1"].requests[1].url, make_request("r2").url);
    assert_eq!(loaded["c2"], collection("c2", "Billing", &["r3"]));
}

#[test]
fn failed_move_changes_nothing_on_disk() {
    let (store, dir) = store();
    store.save_collections(&[collection("c1", "Source", &["r1"])]).unwrap();
    let before = fs::read_to_string(dir.path().join(COLLECTIONS_FILE)).unwrap();

    assert!(move_saved_request(&store, "r1", "c1", "missing").is_err());
    assert_eq!(fs::read_to_string(dir.path().join(COLLECTIONS_FILE)).unwrap(), before);
}

#[test]
fn concurrent_history_saves_lose_nothing() {
    let (store, _dir) = store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..5 {
                    store.save_history(&[history_item(&format!("{worker}-{n}"), n)]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load_history().unwrap().len(), 40);
}

#[test]
fn concurrent_moves_are_serialized() {
    let (store, _dir) = store();
    let request_ids: Vec<String> = (0..10).map(|n| format!("r{n}")).collect();
    let refs: Vec<&str> = request_ids.iter().map(String::as_str).collect();
    store
        .save_collections(&[collection("from", "From", &refs), collection("to", "To", &[])])
        .unwrap();
    let store = Arc::new(store);

    let handles: Vec<_> = request_ids
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || move_saved_request(&store, &id, "from", "to").unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let loaded = by_id(store.load_collections().unwrap());
    assert!(loaded["from"].requests.is_empty());
    assert_eq!(loaded["to"].requests.len(), 10);
}
