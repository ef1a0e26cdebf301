//! Integration tests for the session cache.
//!
//! The remote store is an in-process `MemoryRemote` so fetches can be counted
//! and outages simulated.

use join_board::remote::MemoryRemote;
use join_board::session::{CACHE_KEY, MemorySessionStorage, SessionStorage};
use join_board::store::DataStore;
use join_board::types::{Category, CollectionKind, Priority, Task, to_collection};
use serde_json::json;
use std::sync::Arc;

fn seeded_remote() -> Arc<MemoryRemote> {
    Arc::new(
        MemoryRemote::new()
            .with_collection(
                "tasks",
                json!({
                    "task1": {
                        "title": "Set up repository",
                        "description": "Create the project skeleton",
                        "dueDate": "2026-11-02",
                        "priority": "urgent",
                        "taskType": "Technical Task",
                        "category": "to do",
                        "assignedTo": ["contactId1"],
                        "subtasks": [{"title": "Init", "done": true}]
                    },
                    "task2": {
                        "title": "Write onboarding guide",
                        "dueDate": "2026-11-10",
                        "priority": "low",
                        "taskType": "User Story",
                        "category": "await feedback"
                    }
                }),
            )
            .with_collection(
                "contacts",
                json!({
                    "contactId1": {"name": "Anna Berg", "email": "anna@join.dev"},
                    "contactId2": {"name": "Tom Wolf", "email": "tom@join.dev", "phone": "+49 151 0000"}
                }),
            )
            .with_collection(
                "users",
                json!({"user1": {"name": "Sofia Müller", "email": "sofia@join.dev", "password": "secret1"}}),
            ),
    )
}

fn setup(remote: &Arc<MemoryRemote>, storage: &Arc<MemorySessionStorage>) -> DataStore {
    DataStore::new(remote.clone(), storage.clone())
}

fn new_task(title: &str) -> Task {
    Task {
        id: String::new(),
        title: title.into(),
        description: String::new(),
        due_date: "2026-12-01".into(),
        priority: Priority::Medium,
        task_type: "Technical Task".into(),
        category: Category::ToDo,
        assigned_to: vec![],
        subtasks: vec![],
    }
}

mod initialize_tests {
    use super::*;

    #[tokio::test]
    async fn fetches_each_collection_once() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        assert_eq!(remote.fetch_count(), 3);
        assert!(store.is_initialized());
        assert_eq!(store.get_tasks().len(), 2);
        assert_eq!(store.get_users().len(), 1);
        assert!(storage.get_item(CACHE_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn records_carry_their_keys() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        let ids: Vec<String> = store.get_tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["task1", "task2"]);
        let task2 = store.find_task("task2").unwrap();
        assert_eq!(task2.category, Category::AwaitFeedback);
        assert!(task2.assigned_to.is_empty());
    }

    #[tokio::test]
    async fn existing_blob_is_reused_without_fetching() {
        let storage = Arc::new(MemorySessionStorage::new());
        let mut first = setup(&seeded_remote(), &storage);
        first.initialize().await.unwrap();

        let remote = seeded_remote();
        let mut second = setup(&remote, &storage);
        second.initialize().await.unwrap();

        assert_eq!(remote.fetch_count(), 0);
        assert_eq!(second.get_tasks(), first.get_tasks());
        assert_eq!(second.find_task("task1").unwrap().id, "task1");
    }

    #[tokio::test]
    async fn unreadable_blob_triggers_refetch() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set_item(CACHE_KEY, "{not json").unwrap();

        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        assert_eq!(remote.fetch_count(), 3);
        assert_eq!(store.get_tasks().len(), 2);
    }

    #[tokio::test]
    async fn offline_remote_yields_empty_collections() {
        let remote = seeded_remote();
        remote.set_offline(true);
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);

        store.initialize().await.unwrap();

        assert!(store.get_tasks().is_empty());
        assert!(store.get_contacts().is_empty());
        assert!(store.get_users().is_empty());
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let remote = Arc::new(MemoryRemote::new().with_collection(
            "tasks",
            json!({"good": {"title": "Fine"}, "bad": {"title": 42}}),
        ));
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        let tasks = store.get_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "good");
        assert_eq!(tasks[0].category, Category::ToDo);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        store.clear().unwrap();
        assert!(!store.is_initialized());
        assert!(storage.get_item(CACHE_KEY).unwrap().is_none());

        store.initialize().await.unwrap();
        assert_eq!(remote.fetch_count(), 6);
    }
}

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn update_then_get_round_trips() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        let mut tasks = store.get_tasks();
        tasks[0].title = "Set up monorepo".into();
        tasks.pop();
        store.update_tasks(to_collection(tasks.clone())).unwrap();

        assert_eq!(store.get_tasks(), tasks);

        let mut reloaded = setup(&remote, &storage);
        reloaded.initialize().await.unwrap();
        assert_eq!(reloaded.get_tasks(), tasks);
    }

    #[tokio::test]
    async fn contact_colors_are_stable() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        let first = store.get_contacts();
        assert!(first.iter().all(|c| c.color.is_some()));
        assert_ne!(first[0].color, first[1].color);

        let second = store.get_contacts();
        assert_eq!(first, second);

        let mut reloaded = setup(&remote, &storage);
        reloaded.initialize().await.unwrap();
        assert_eq!(reloaded.get_contacts(), first);
    }

    #[tokio::test]
    async fn create_task_uses_remote_key() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        let created = store.create_task(new_task("Plan retro")).await.unwrap();

        assert!(created.id.starts_with("-Join"));
        assert_eq!(store.find_task(&created.id).unwrap().title, "Plan retro");
        let remote_tasks = remote.collection("tasks").unwrap();
        assert_eq!(remote_tasks[created.id.as_str()]["title"], "Plan retro");
    }

    #[tokio::test]
    async fn create_task_offline_falls_back_to_local_id() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();
        remote.set_offline(true);

        let a = store.create_task(new_task("First")).await.unwrap();
        let b = store.create_task(new_task("Second")).await.unwrap();

        assert!(a.id.starts_with("task"));
        assert!(b.id.starts_with("task"));
        assert_ne!(a.id, b.id);
        assert_eq!(store.get_tasks().len(), 4);
    }

    #[tokio::test]
    async fn sync_only_with_write_through() {
        let remote = seeded_remote();
        let storage = Arc::new(MemorySessionStorage::new());
        let mut store = setup(&remote, &storage);
        store.initialize().await.unwrap();

        store.update_tasks(Default::default()).unwrap();
        assert!(!store.sync(CollectionKind::Tasks).await);
        assert!(remote.collection("tasks").unwrap().get("task1").is_some());

        let mut store = store.with_write_through(true);
        store.update_tasks(Default::default()).unwrap();
        assert!(store.sync(CollectionKind::Tasks).await);
        assert_eq!(remote.collection("tasks"), Some(json!({})));
    }
}
