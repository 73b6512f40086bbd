//! Tests for the facade: registration, triggering, cancellation, queries

#[cfg(test)]
mod tests {
    use crate::events::Delivery;
    use crate::level::{Cancel, Query};
    use crate::system::EventSpace;
    use crate::utils::create_event_space;
    use serde::{Deserialize, Serialize};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ping {
        tag: String,
    }

    fn ping(tag: &str) -> Ping {
        Ping { tag: tag.to_string() }
    }

    /// Shared log that listeners append to, for asserting who fired and in
    /// what order.
    fn log_listener(
        log: &Arc<Mutex<Vec<String>>>,
        label: &str,
    ) -> impl Fn(Ping) -> Result<(), crate::events::EventError> + Send + Sync + Clone + 'static
    {
        let log = log.clone();
        let label = label.to_string();
        move |event: Ping| {
            log.lock().unwrap().push(format!("{}:{}", label, event.tag));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_event_space_creation() {
        let space = EventSpace::new();
        let stats = space.get_stats().await;

        assert_eq!(stats.total_listeners, 0);
        assert_eq!(stats.events_triggered, 0);
    }

    #[tokio::test]
    async fn test_registration_updates_stats() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "a")).await.unwrap();
        space.receive("test.2", log_listener(&log, "b")).await.unwrap();

        let stats = space.get_stats().await;
        assert_eq!(stats.total_listeners, 2);
        assert_eq!(space.listener_count("test").await, 1);
        assert_eq!(space.total_listeners().await, 2);
    }

    #[tokio::test]
    async fn test_exact_level_trigger() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "test")).await.unwrap();
        space.receive("test.2", log_listener(&log, "test.2")).await.unwrap();

        space
            .trigger("test", &ping("x"), false, Delivery::Inline)
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["test:x"]);
    }

    #[tokio::test]
    async fn test_descendant_inclusive_trigger_order() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("a", log_listener(&log, "a")).await.unwrap();
        space.receive("a.b", log_listener(&log, "a.b")).await.unwrap();
        space.receive("a.b.c", log_listener(&log, "a.b.c")).await.unwrap();

        space
            .trigger("a", &ping("x"), true, Delivery::Inline)
            .await
            .unwrap();

        // Root-to-leaf order along the chain.
        assert_eq!(*log.lock().unwrap(), vec!["a:x", "a.b:x", "a.b.c:x"]);
    }

    #[tokio::test]
    async fn test_send_is_descendant_inclusive() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "test")).await.unwrap();
        space.receive("test.2", log_listener(&log, "test.2")).await.unwrap();
        space.receive("test.2.3", log_listener(&log, "test.2.3")).await.unwrap();

        space.send("test.2", &ping("b")).await.unwrap();

        // test.2 and its descendant fire; the ancestor "test" does not.
        assert_eq!(*log.lock().unwrap(), vec!["test.2:b", "test.2.3:b"]);
    }

    #[tokio::test]
    async fn test_trigger_descendants_without_self() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("a", log_listener(&log, "a")).await.unwrap();
        space.receive("a.b", log_listener(&log, "a.b")).await.unwrap();

        space
            .trigger_descendants("a", &ping("x"), false, Delivery::Inline)
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a.b:x"]);
    }

    #[tokio::test]
    async fn test_trigger_ancestors() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("", log_listener(&log, "root")).await.unwrap();
        space.receive("a", log_listener(&log, "a")).await.unwrap();
        space.receive("a.b", log_listener(&log, "a.b")).await.unwrap();

        space
            .trigger_ancestors("a.b", &ping("x"), false, Delivery::Inline)
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["root:x", "a:x"]);

        log.lock().unwrap().clear();
        space.send_ancestors("a.b", &ping("y")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["root:y", "a:y", "a.b:y"]);
    }

    #[tokio::test]
    async fn test_trigger_missing_path_is_silent_noop() {
        let space = EventSpace::new();

        space.send("no.such.path", &ping("x")).await.unwrap();
        space
            .trigger("also.missing", &ping("x"), false, Delivery::Inline)
            .await
            .unwrap();
        space
            .trigger_ancestors("also.missing", &ping("x"), true, Delivery::Inline)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deferred_delivery_runs_all_listeners() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "a")).await.unwrap();
        space.receive("test", log_listener(&log, "b")).await.unwrap();

        space
            .trigger("test", &ping("x"), false, Delivery::Deferred)
            .await
            .unwrap();

        // Deferred invocations run on later turns of the event loop.
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let mut fired = log.lock().unwrap().clone();
        fired.sort();
        assert_eq!(fired, vec!["a:x", "b:x"]);

        let stats = space.get_stats().await;
        assert_eq!(stats.deferred_invocations, 2);
    }

    #[tokio::test]
    async fn test_deferred_invocation_survives_cancellation_after_schedule() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "a")).await.unwrap();

        space
            .trigger("test", &ping("scheduled"), false, Delivery::Deferred)
            .await
            .unwrap();
        // Cancelling between schedule and run does not recall the task; it
        // still runs with the payload captured at schedule time.
        space.cancel("test", Cancel::All).await;

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(*log.lock().unwrap(), vec!["a:scheduled"]);

        // The cancellation itself took effect for later triggers.
        log.lock().unwrap().clear();
        space.send("test", &ping("late")).await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_subtree() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "test")).await.unwrap();
        space.receive("test.2", log_listener(&log, "test.2")).await.unwrap();
        space.receive("test.2.3", log_listener(&log, "test.2.3")).await.unwrap();

        let removed = space.cancel("test.2", Cancel::All).await;
        assert_eq!(removed, 2);

        space.send("test", &ping("x")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["test:x"]);

        let stats = space.get_stats().await;
        assert_eq!(stats.total_listeners, 1);
    }

    #[tokio::test]
    async fn test_cancel_specific_listener_identity() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let listener = space.receive("test", log_listener(&log, "a")).await.unwrap();
        space.receive("test", log_listener(&log, "b")).await.unwrap();

        assert!(space.has("test", Query::Listener(listener.clone())).await);

        let removed = space.cancel("test", Cancel::Listener(listener.clone())).await;
        assert_eq!(removed, 1);
        assert!(!space.has("test", Query::Listener(listener)).await);

        space.send("test", &ping("x")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b:x"]);
    }

    #[tokio::test]
    async fn test_cancel_empty_path_is_idempotent() {
        let space = EventSpace::new();

        assert_eq!(space.cancel("nothing.here", Cancel::All).await, 0);
        assert_eq!(space.cancel("nothing.here", Cancel::All).await, 0);
        assert_eq!(space.off("nothing.here", Cancel::LocalOnly).await, 0);
    }

    #[tokio::test]
    async fn test_clear_wipes_universe() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("a", log_listener(&log, "a")).await.unwrap();
        space.receive("b.c", log_listener(&log, "b.c")).await.unwrap();

        let removed = space.clear().await;
        assert_eq!(removed, 2);
        assert_eq!(space.total_listeners().await, 0);
        assert!(space.registered_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_descendants_and_ancestors() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("", log_listener(&log, "root")).await.unwrap();
        space.receive("a", log_listener(&log, "a")).await.unwrap();
        space.receive("a.b", log_listener(&log, "a.b")).await.unwrap();
        space.receive("a.b.c", log_listener(&log, "a.b.c")).await.unwrap();

        assert_eq!(space.cancel_descendants("a.b", false).await, 1);
        assert!(space.has("a.b", Query::Any).await);
        assert!(!space.has_descendants("a.b", Query::Any, false).await);

        assert_eq!(space.off_ancestors("a.b", true).await, 3);
        assert!(!space.has("a", Query::Any).await);
        assert!(!space.has("", Query::Any).await);
    }

    #[tokio::test]
    async fn test_once_fires_exactly_once() {
        let space = create_event_space();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.once("test", log_listener(&log, "once")).await.unwrap();

        space.send("test", &ping("first")).await.unwrap();
        space.send("test", &ping("second")).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["once:first"]);

        // The private leaf is pruned after the first invocation.
        assert!(!space.has_descendants("test", Query::Any, true).await);
        assert_eq!(space.get_stats().await.total_listeners, 0);
    }

    #[tokio::test]
    async fn test_once_survives_local_only_cancellation() {
        let space = create_event_space();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("test", log_listener(&log, "persistent")).await.unwrap();
        space.once("test", log_listener(&log, "once")).await.unwrap();

        // Clearing the nominal path's local set must not touch the one-shot
        // listener living at its private leaf.
        space.cancel("test", Cancel::LocalOnly).await;

        space.send("test", &ping("x")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["once:x"]);
    }

    #[tokio::test]
    async fn test_has_registration_lifecycle() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let listener = space.receive("test", log_listener(&log, "a")).await.unwrap();
        assert!(space.has("test", Query::Listener(listener.clone())).await);

        space.cancel("test", Cancel::Listener(listener.clone())).await;
        assert!(!space.has("test", Query::Listener(listener)).await);
    }

    #[tokio::test]
    async fn test_listener_failure_is_isolated() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space
            .receive("test", |_: Ping| {
                Err(crate::events::EventError::HandlerExecution(
                    "deliberate".to_string(),
                ))
            })
            .await
            .unwrap();
        space.receive("test", log_listener(&log, "b")).await.unwrap();

        // The erring listener is logged and skipped; its sibling still runs
        // and the trigger itself succeeds.
        space.send("test", &ping("x")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b:x"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_mutation_during_dispatch_does_not_affect_current_pass() {
        let space = create_event_space();
        let log = Arc::new(Mutex::new(Vec::new()));

        let space_ref = space.clone();
        space
            .receive("test", move |_: Ping| {
                // Cancel the very level being dispatched; the snapshot taken
                // before invocation keeps the current pass intact.
                let space = space_ref.clone();
                tokio::task::block_in_place(|| {
                    tokio::runtime::Handle::current()
                        .block_on(async move { space.cancel("test", Cancel::All).await });
                });
                Ok(())
            })
            .await
            .unwrap();
        space.receive("test", log_listener(&log, "second")).await.unwrap();

        space.send("test", &ping("x")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["second:x"]);

        // The cancellation is visible to the next trigger.
        log.lock().unwrap().clear();
        space.send("test", &ping("y")).await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_reports_empty_shells() {
        let space = EventSpace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        space.receive("a.b", log_listener(&log, "b")).await.unwrap();
        space.cancel("a.b", Cancel::LocalOnly).await;

        let issues = space.validate().await;
        assert!(issues.iter().any(|i| i.contains("a.b")));
    }
}
