#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use taskdeck_app::{AsyncTaskStore, LoadState, Operation, TaskLifecycle};
use taskdeck_core::{CategoryId, Priority, Task, TaskDraft, TaskError, TaskId, TaskUpdate};
use taskdeck_store_local::LocalStore;
use time::macros::date;
use tokio::sync::oneshot;

/// Local store wrapper with failure injection and held responses.
struct MockStore {
    inner: LocalStore,
    fail_next: Mutex<Option<TaskError>>,
    gates: Mutex<HashMap<&'static str, oneshot::Receiver<()>>>,
}

impl MockStore {
    fn new() -> Self {
        Self {
            inner: LocalStore::in_memory(),
            fail_next: Mutex::new(None),
            gates: Mutex::new(HashMap::new()),
        }
    }

    fn fail_next(&self, err: TaskError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// The next `operation` call runs against the store but returns only after the sender fires.
    fn hold(&self, operation: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(operation, rx);
        tx
    }

    fn injected(&self) -> Result<(), TaskError> {
        self.fail_next.lock().unwrap().take().map_or(Ok(()), Err)
    }

    async fn release<T>(&self, operation: &'static str, result: Result<T, TaskError>) -> Result<T, TaskError> {
        let gate = self.gates.lock().unwrap().remove(operation);
        if let Some(rx) = gate {
            rx.await.expect("gate sender dropped");
        }
        result
    }
}

impl AsyncTaskStore for MockStore {
    type Error = TaskError;

    async fn fetch_all(&self) -> Result<Vec<Task>, Self::Error> {
        self.injected()?;
        let result = self.inner.fetch_all().map_err(TaskError::from);
        self.release("fetch_all", result).await
    }

    async fn fetch_by_id(&self, id: TaskId) -> Result<Task, Self::Error> {
        self.injected()?;
        self.inner.fetch_by_id(id).map_err(TaskError::from)
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, Self::Error> {
        self.injected()?;
        let result = self.inner.create(draft).map_err(TaskError::from);
        self.release("create", result).await
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task, Self::Error> {
        self.injected()?;
        let result = self.inner.update(id, update).map_err(TaskError::from);
        self.release("update", result).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), Self::Error> {
        self.injected()?;
        let result = self.inner.delete(id).map_err(TaskError::from);
        self.release("delete", result).await
    }

    async fn toggle_complete(&self, id: TaskId) -> Result<Task, Self::Error> {
        self.injected()?;
        let result = self.inner.toggle_complete(id).map_err(TaskError::from);
        self.release("toggle", result).await
    }
}

async fn seeded(titles: &[&str]) -> TaskLifecycle<MockStore> {
    let store = MockStore::new();
    for title in titles {
        store
            .inner
            .create(TaskDraft::new(*title, CategoryId(1)))
            .expect("seed task");
    }
    let lifecycle = TaskLifecycle::new(store);
    lifecycle.load().await.expect("initial load");
    lifecycle
}

fn titles(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|task| task.title.clone()).collect()
}

#[tokio::test]
async fn load_moves_through_states_and_replaces_collection() {
    let lifecycle = TaskLifecycle::new(MockStore::new());
    assert_eq!(lifecycle.state().await, LoadState::Idle);

    assert_eq!(lifecycle.load().await.expect("empty load"), 0);
    assert_eq!(lifecycle.state().await, LoadState::Ready);

    lifecycle
        .store()
        .inner
        .create(TaskDraft::new("Buy groceries", CategoryId(1)))
        .expect("create");
    assert_eq!(lifecycle.reload().await.expect("reload"), 1);
    assert_eq!(titles(&lifecycle.tasks().await), vec!["Buy groceries"]);
}

#[tokio::test]
async fn failed_load_preserves_previous_tasks() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let before = lifecycle.snapshot().await;

    lifecycle.store().fail_next(TaskError::store("connection reset"));
    let err = lifecycle.reload().await.expect_err("load should fail");
    assert_eq!(err.operation, Operation::Load);
    assert_eq!(err.to_string(), "failed to load tasks: store error: connection reset");

    let after = lifecycle.snapshot().await;
    assert_eq!(after.state, LoadState::Failed);
    assert_eq!(after.error.as_deref(), Some(err.to_string().as_str()));
    assert_eq!(after.tasks, before.tasks);

    lifecycle.reload().await.expect("retry");
    let retried = lifecycle.snapshot().await;
    assert_eq!(retried.state, LoadState::Ready);
    assert!(retried.error.is_none());
}

#[tokio::test]
async fn create_round_trip_appends_fresh_record() {
    let lifecycle = seeded(&["Call mom"]).await;
    let existing = lifecycle.tasks().await;

    let draft = TaskDraft::new("Buy groceries", CategoryId(2))
        .with_description("milk, eggs")
        .with_priority(Priority::High)
        .with_due_date(date!(2024 - 05 - 15));
    let created = lifecycle.create(draft.clone()).await.expect("create");

    assert_eq!(created.title, draft.title);
    assert_eq!(created.description, draft.description);
    assert_eq!(created.category_id, draft.category_id);
    assert_eq!(created.priority, draft.priority);
    assert_eq!(created.due_date, draft.due_date);
    assert!(!created.completed);
    assert!(created.completed_at.is_none());
    assert!(existing.iter().all(|task| task.id != created.id));

    let fetched = lifecycle.store().fetch_by_id(created.id).await.expect("fetch");
    assert_eq!(fetched, created);
    assert_eq!(lifecycle.task(created.id).await, Some(created));
    assert_eq!(titles(&lifecycle.tasks().await), vec!["Call mom", "Buy groceries"]);
}

#[tokio::test]
async fn failed_create_inserts_nothing() {
    let lifecycle = seeded(&["Call mom"]).await;
    let before = lifecycle.snapshot().await;

    let err = lifecycle
        .create(TaskDraft::new("   ", CategoryId(1)))
        .await
        .expect_err("blank title rejected by the store");
    assert!(matches!(err.kind(), TaskError::Validation(_)));
    assert_eq!(lifecycle.snapshot().await, before);
}

#[tokio::test]
async fn update_of_missing_id_is_not_found_and_changes_nothing() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let before = lifecycle.snapshot().await;
    let template = before.tasks[0].clone();

    let err = lifecycle
        .update(TaskId(404), TaskUpdate::from_task(&template).title("ghost"))
        .await
        .expect_err("missing id");
    assert_eq!(err.kind(), &TaskError::NotFound(TaskId(404)));
    assert_eq!(err.operation, Operation::Update);
    assert_eq!(lifecycle.snapshot().await, before);
}

#[tokio::test]
async fn update_replaces_in_place() {
    let lifecycle = seeded(&["first", "second", "third"]).await;
    let order = titles(&lifecycle.tasks().await);
    let target = lifecycle.tasks().await[1].clone();

    let updated = lifecycle
        .update(target.id, TaskUpdate::from_task(&target).title("renamed"))
        .await
        .expect("update");
    assert_eq!(updated.title, "renamed");

    let mut expected = order;
    expected[1] = "renamed".into();
    assert_eq!(titles(&lifecycle.tasks().await), expected);
}

#[tokio::test]
async fn toggle_twice_restores_original_state() {
    let lifecycle = seeded(&["Buy groceries"]).await;
    let original = lifecycle.tasks().await[0].clone();

    let done = lifecycle.toggle_complete(original.id).await.expect("toggle on");
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let undone = lifecycle.toggle_complete(original.id).await.expect("toggle off");
    assert_eq!(undone.completed, original.completed);
    assert_eq!(undone.completed_at, original.completed_at);
    assert_eq!(lifecycle.task(original.id).await, Some(undone));
}

#[tokio::test]
async fn failed_toggle_leaves_local_state_untouched() {
    let lifecycle = seeded(&["Buy groceries"]).await;
    let before = lifecycle.snapshot().await;
    let id = before.tasks[0].id;

    lifecycle.store().fail_next(TaskError::store("timeout"));
    let err = lifecycle.toggle_complete(id).await.expect_err("toggle fails");
    assert_eq!(err.to_string(), "failed to toggle task completion: store error: timeout");
    assert_eq!(lifecycle.snapshot().await, before);
}

#[tokio::test]
async fn delete_removes_and_missing_delete_fails() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let id = lifecycle.tasks().await[0].id;

    lifecycle.delete(id).await.expect("delete");
    assert!(lifecycle.task(id).await.is_none());
    assert_eq!(lifecycle.tasks().await.len(), 1);

    let err = lifecycle.delete(id).await.expect_err("second delete");
    assert!(err.kind().is_not_found());
    assert_eq!(lifecycle.tasks().await.len(), 1);
}

#[tokio::test]
async fn version_tracks_local_changes_only() {
    let lifecycle = seeded(&["Buy groceries"]).await;
    let id = lifecycle.tasks().await[0].id;
    let start = lifecycle.snapshot().await.version;

    lifecycle.toggle_complete(id).await.expect("toggle");
    assert_eq!(lifecycle.snapshot().await.version, start + 1);

    lifecycle.store().fail_next(TaskError::store("down"));
    lifecycle.toggle_complete(id).await.expect_err("failure");
    assert_eq!(lifecycle.snapshot().await.version, start + 1);
}

#[tokio::test]
async fn stale_update_response_does_not_overwrite_newer_one() {
    let lifecycle = seeded(&["Buy groceries"]).await;
    let task = lifecycle.tasks().await[0].clone();
    let release = lifecycle.store().hold("update");

    let (slow, fast) = tokio::join!(
        lifecycle.update(task.id, TaskUpdate::from_task(&task).title("first")),
        async {
            let result = lifecycle
                .update(task.id, TaskUpdate::from_task(&task).title("second"))
                .await;
            release.send(()).expect("release slow update");
            result
        }
    );

    assert_eq!(slow.expect("slow update").title, "first");
    assert_eq!(fast.expect("fast update").title, "second");
    assert_eq!(
        lifecycle.task(task.id).await.map(|task| task.title),
        Some("second".into())
    );
}

#[tokio::test]
async fn late_toggle_cannot_resurrect_deleted_task() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let id = lifecycle.tasks().await[0].id;
    let release = lifecycle.store().hold("toggle");

    let (toggled, deleted) = tokio::join!(lifecycle.toggle_complete(id), async {
        let result = lifecycle.delete(id).await;
        release.send(()).expect("release toggle");
        result
    });

    toggled.expect("toggle reached the store first");
    deleted.expect("delete");
    assert!(lifecycle.task(id).await.is_none());
    assert_eq!(titles(&lifecycle.tasks().await).len(), 1);
}

#[tokio::test]
async fn in_flight_load_does_not_restore_deleted_task() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let id = lifecycle.tasks().await[0].id;
    let release = lifecycle.store().hold("fetch_all");

    let (loaded, deleted) = tokio::join!(lifecycle.reload(), async {
        let result = lifecycle.delete(id).await;
        release.send(()).expect("release load");
        result
    });

    deleted.expect("delete");
    assert_eq!(loaded.expect("load"), 1);
    assert!(lifecycle.task(id).await.is_none());
}

#[tokio::test]
async fn in_flight_load_keeps_newer_update_and_creation() {
    let lifecycle = seeded(&["Buy groceries", "Call mom"]).await;
    let [untouched, target]: [Task; 2] = lifecycle.tasks().await.try_into().expect("two tasks");
    let release = lifecycle.store().hold("fetch_all");

    let (loaded, (updated, created)) = tokio::join!(lifecycle.reload(), async {
        let updated = lifecycle
            .update(target.id, TaskUpdate::from_task(&target).title("renamed"))
            .await;
        let created = lifecycle.create(TaskDraft::new("Write report", CategoryId(1))).await;
        release.send(()).expect("release load");
        (updated, created)
    });

    updated.expect("update");
    let created = created.expect("create");
    assert_eq!(loaded.expect("load"), 3);
    assert_eq!(
        lifecycle.task(target.id).await.map(|task| task.title),
        Some("renamed".into())
    );
    assert_eq!(lifecycle.task(created.id).await, Some(created));

    lifecycle.reload().await.expect("fresh load");
    let mut current = titles(&lifecycle.tasks().await);
    current.sort();
    let mut expected = vec![untouched.title, "Write report".to_string(), "renamed".to_string()];
    expected.sort();
    assert_eq!(current, expected);
}

#[tokio::test]
async fn load_overtaken_by_newer_load_is_discarded() {
    let lifecycle = seeded(&["Buy groceries"]).await;
    let release = lifecycle.store().hold("fetch_all");

    let (stale, fresh) = tokio::join!(lifecycle.reload(), async {
        lifecycle
            .store()
            .inner
            .create(TaskDraft::new("Call mom", CategoryId(1)))
            .expect("create behind the session");
        let result = lifecycle.reload().await;
        release.send(()).expect("release stale load");
        result
    });

    assert_eq!(fresh.expect("fresh load"), 2);
    assert_eq!(stale.expect("stale load"), 2);
    assert_eq!(lifecycle.state().await, LoadState::Ready);
    assert_eq!(lifecycle.tasks().await.len(), 2);
}

#[tokio::test]
async fn mutations_on_different_ids_run_concurrently() {
    let lifecycle = seeded(&["a", "b"]).await;
    let tasks = lifecycle.tasks().await;

    let (first, second) = tokio::join!(
        lifecycle.toggle_complete(tasks[0].id),
        lifecycle.update(tasks[1].id, TaskUpdate::from_task(&tasks[1]).priority(Priority::Low)),
    );
    first.expect("toggle");
    second.expect("update");

    let current = lifecycle.tasks().await;
    assert!(current[0].completed);
    assert_eq!(current[1].priority, Priority::Low);
}
