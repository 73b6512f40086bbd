#![cfg(test)]
//! End-to-end scenarios: the dispatch contract as collaborators see it.

use crate::events::Delivery;
use crate::level::{Cancel, Query};
use crate::utils::{create_event_space, global};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    body: String,
}

fn note(body: &str) -> Note {
    Note { body: body.to_string() }
}

#[tokio::test]
async fn test_namespace_scenario_walkthrough() {
    let space = create_event_space();
    let log = Arc::new(Mutex::new(Vec::<String>::new()));

    for path in ["test", "test.2", "test.2.3"] {
        let log = log.clone();
        let label = path.to_string();
        space
            .receive(path, move |event: Note| {
                log.lock().unwrap().push(format!("{}={}", label, event.body));
                Ok(())
            })
            .await
            .unwrap();
    }

    // Exact-level dispatch touches one level at a time.
    space.trigger("test", &note("a"), false, Delivery::Inline).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["test=a"]);

    // Descendant-inclusive send: the target level and its subtree, never the
    // ancestor.
    log.lock().unwrap().clear();
    space.send("test.2", &note("b")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["test.2=b", "test.2.3=b"]);

    log.lock().unwrap().clear();
    space.send("test.2.3", &note("c")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["test.2.3=c"]);

    // Subtree cancellation: test.2 and everything below stop firing, the
    // ancestor is untouched.
    space.cancel("test.2", Cancel::All).await;
    log.lock().unwrap().clear();
    space.send("test", &note("d")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["test=d"]);
}

#[tokio::test]
async fn test_one_shot_scenario() {
    let space = create_event_space();
    let count = Arc::new(Mutex::new(0u32));

    let count_clone = count.clone();
    space
        .receive_once("test", move |_: Note| {
            *count_clone.lock().unwrap() += 1;
            Ok(())
        })
        .await
        .unwrap();

    space.send("test", &note("first")).await.unwrap();
    space.send("test", &note("second")).await.unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_independent_spaces_are_disjoint() {
    let space_a = create_event_space();
    let space_b = create_event_space();
    let fired = Arc::new(Mutex::new(false));

    let fired_clone = fired.clone();
    space_a
        .receive("test", move |_: Note| {
            *fired_clone.lock().unwrap() = true;
            Ok(())
        })
        .await
        .unwrap();

    space_b.send("test", &note("x")).await.unwrap();
    assert!(!*fired.lock().unwrap());
    assert!(!space_b.has("test", Query::Any).await);

    space_a.send("test", &note("y")).await.unwrap();
    assert!(*fired.lock().unwrap());
}

#[tokio::test]
async fn test_global_space_is_shared() {
    let fired = Arc::new(Mutex::new(false));

    let fired_clone = fired.clone();
    global()
        .receive("itest.global.ping", move |_: Note| {
            *fired_clone.lock().unwrap() = true;
            Ok(())
        })
        .await
        .unwrap();

    // A separately obtained handle reaches the same universe.
    global().send("itest.global.ping", &note("x")).await.unwrap();
    assert!(*fired.lock().unwrap());

    global().cancel("itest.global.ping", Cancel::All).await;
}

/// The cache-collaborator contract: a value-holding helper built purely on
/// `receive`/`send`/`cancel`, with no special-casing in the core.
#[tokio::test]
async fn test_cache_collaborator_contract() {
    let space = create_event_space();

    // The collaborator installs a value holder on its write path and a
    // responder on a parallel reserved read prefix.
    let store = Arc::new(Mutex::new(Option::<Note>::None));

    let store_writer = store.clone();
    space
        .receive("cache.config", move |event: Note| {
            *store_writer.lock().unwrap() = Some(event);
            Ok(())
        })
        .await
        .unwrap();

    let last_read = Arc::new(Mutex::new(Option::<Note>::None));
    let store_reader = store.clone();
    let last_read_clone = last_read.clone();
    space
        .receive("cache_read.config", move |_: Note| {
            *last_read_clone.lock().unwrap() = store_reader.lock().unwrap().clone();
            Ok(())
        })
        .await
        .unwrap();

    // Push an update, then pull it back through the read prefix.
    space.send("cache.config", &note("v1")).await.unwrap();
    space.send("cache_read.config", &note("read")).await.unwrap();
    assert_eq!(*last_read.lock().unwrap(), Some(note("v1")));

    // Updates overwrite.
    space.send("cache.config", &note("v2")).await.unwrap();
    space.send("cache_read.config", &note("read")).await.unwrap();
    assert_eq!(*last_read.lock().unwrap(), Some(note("v2")));

    // Teardown through the public API.
    space.cancel("cache", Cancel::All).await;
    space.send("cache.config", &note("v3")).await.unwrap();
    assert_eq!(*store.lock().unwrap(), Some(note("v2")));
}

#[tokio::test]
async fn test_presplit_and_string_names_address_the_same_level() {
    let space = create_event_space();
    let log = Arc::new(Mutex::new(Vec::<String>::new()));

    let log_clone = log.clone();
    space
        .receive(["player", "inventory"], move |event: Note| {
            log_clone.lock().unwrap().push(event.body);
            Ok(())
        })
        .await
        .unwrap();

    space.send("player.inventory", &note("dot-form")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["dot-form"]);
}
