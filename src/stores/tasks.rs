use validator::Validate;

use super::{EntityState, StoreStatus};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};

/// Fetched tasks, the selected task, and the status of the last request.
#[derive(Debug)]
pub struct TaskStore {
    api: ApiClient,
    state: EntityState<Task>,
}

impl TaskStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: EntityState::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.items()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.state.current()
    }

    pub fn status(&self) -> &StoreStatus {
        self.state.status()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Replaces the whole collection with the server's filtered list.
    pub async fn fetch_tasks(&mut self, filters: &TaskQuery) -> Result<Vec<Task>, ClientError> {
        let api = &self.api;
        let tasks = self
            .state
            .status_mut()
            .track("Failed to fetch tasks", api.get_tasks(filters))
            .await?;
        self.state.replace_all(tasks.clone());
        Ok(tasks)
    }

    /// Loads one task and makes it the current selection.
    pub async fn fetch_task_by_id(&mut self, id: i64) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track("Failed to fetch task", api.get_task_by_id(id))
            .await?;
        self.state.select(task.clone());
        Ok(task)
    }

    pub async fn create_task(&mut self, input: &TaskInput) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track("Failed to create task", async {
                input.validate()?;
                api.create_task(input).await
            })
            .await?;
        self.state.append(task.clone());
        Ok(task)
    }

    pub async fn update_task(&mut self, id: i64, input: &TaskInput) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track("Failed to update task", async {
                input.validate()?;
                api.update_task(id, input).await
            })
            .await?;
        self.state.replace(id, task.clone());
        Ok(task)
    }

    pub async fn update_task_status(
        &mut self,
        id: i64,
        status: TaskStatus,
    ) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track("Failed to update task status", api.update_task_status(id, status))
            .await?;
        self.state.replace(id, task.clone());
        Ok(task)
    }

    pub async fn update_task_priority(
        &mut self,
        id: i64,
        priority: TaskPriority,
    ) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track(
                "Failed to update task priority",
                api.update_task_priority(id, priority),
            )
            .await?;
        self.state.replace(id, task.clone());
        Ok(task)
    }

    pub async fn assign_user_to_task(
        &mut self,
        task_id: i64,
        user_id: i64,
    ) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track(
                "Failed to assign user to task",
                api.assign_user_to_task(task_id, user_id),
            )
            .await?;
        self.state.replace(task_id, task.clone());
        Ok(task)
    }

    pub async fn unassign_user_from_task(
        &mut self,
        task_id: i64,
        user_id: i64,
    ) -> Result<Task, ClientError> {
        let api = &self.api;
        let task = self
            .state
            .status_mut()
            .track(
                "Failed to unassign user from task",
                api.unassign_user_from_task(task_id, user_id),
            )
            .await?;
        self.state.replace(task_id, task.clone());
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn task_json(id: i64, status: &str) -> Value {
        json!({ "id": id, "title": format!("Task {}", id), "status": status, "priority": "Media" })
    }

    fn store() -> (Arc<MockTransport>, TaskStore) {
        let (transport, api) = MockTransport::client(Arc::new(MemoryStorage::new()));
        (transport, TaskStore::new(api))
    }

    async fn seeded_store() -> (Arc<MockTransport>, TaskStore) {
        let (transport, mut store) = store();
        transport.respond(200, json!([task_json(4, "Pendiente"), task_json(5, "Pendiente")]));
        transport.respond(200, task_json(5, "Pendiente"));
        store.fetch_tasks(&TaskQuery::default()).await.unwrap();
        store.fetch_task_by_id(5).await.unwrap();
        (transport, store)
    }

    #[tokio::test]
    async fn test_status_update_replaces_list_entry_and_selection() {
        let (transport, mut store) = seeded_store().await;
        transport.respond(200, task_json(5, "Completada"));

        store.update_task_status(5, TaskStatus::Completed).await.unwrap();

        assert_eq!(store.tasks()[0].status, TaskStatus::Pending);
        assert_eq!(store.tasks()[1].status, TaskStatus::Completed);
        assert_eq!(store.current_task().map(|t| t.status), Some(TaskStatus::Completed));
        assert_eq!(store.status(), &StoreStatus::Ready);
    }

    #[tokio::test]
    async fn test_update_of_unlisted_task_leaves_list_alone() {
        let (transport, mut store) = seeded_store().await;
        let before = store.tasks().to_vec();
        transport.respond(200, task_json(99, "Completada"));

        let updated = store.update_task_status(99, TaskStatus::Completed).await.unwrap();

        assert_eq!(updated.id, 99);
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.current_task().map(|t| t.id), Some(5));
    }

    #[tokio::test]
    async fn test_failed_create_leaves_tasks_unchanged() {
        let (transport, mut store) = seeded_store().await;
        let before = store.tasks().to_vec();
        transport.respond(400, json!({ "error": "Title, description, and priority are required" }));

        let input = TaskInput {
            title: "New".into(),
            ..Default::default()
        };
        let err = store.create_task(&input).await.unwrap_err();

        assert!(err.is_request_failure());
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.error(), Some("Title, description, and priority are required"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_create_appends() {
        let (transport, mut store) = seeded_store().await;
        transport.respond(201, task_json(6, "Pendiente"));

        let input = TaskInput {
            title: "Task 6".into(),
            priority: Some(TaskPriority::Medium),
            ..Default::default()
        };
        store.create_task(&input).await.unwrap();

        let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_invalid_input_fails_without_request() {
        let (transport, mut store) = store();

        let err = store.create_task(&TaskInput::default()).await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(store.error().is_some());
        assert!(!store.is_loading());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_fallback_message() {
        let (transport, mut store) = store();
        transport.fail_unreachable();

        store.fetch_tasks(&TaskQuery::default()).await.unwrap_err();

        assert_eq!(store.error(), Some("Failed to fetch tasks"));
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_success_and_reset() {
        let (transport, mut store) = store();
        transport.fail_unreachable();
        transport.respond(200, json!([task_json(1, "Pendiente")]));

        store.fetch_tasks(&TaskQuery::default()).await.unwrap_err();
        store.fetch_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(store.error(), None);
        assert_eq!(store.tasks().len(), 1);

        store.reset();
        assert_eq!(store.status(), &StoreStatus::Idle);
        assert!(store.tasks().is_empty());
        assert!(store.current_task().is_none());
    }

    #[tokio::test]
    async fn test_assignment_replaces_task() {
        let (transport, mut store) = seeded_store().await;
        let mut assigned = task_json(5, "Pendiente");
        assigned["assigned_users"] =
            json!([{ "id": 8, "name": "Kim", "email": "kim@example.com", "role": "Desarrollador" }]);
        transport.respond(200, assigned);
        transport.respond(200, task_json(5, "Pendiente"));

        store.assign_user_to_task(5, 8).await.unwrap();
        assert!(store.tasks()[1].is_assigned_to(8));
        assert!(store.current_task().unwrap().is_assigned_to(8));

        store.unassign_user_from_task(5, 8).await.unwrap();
        assert!(!store.tasks()[1].is_assigned_to(8));
    }

    #[tokio::test]
    async fn test_full_update_replaces_list_entry_and_selection() {
        let (transport, mut store) = seeded_store().await;
        let mut renamed = task_json(5, "En Revisión");
        renamed["title"] = json!("Renamed");
        transport.respond(200, renamed);

        let input = TaskInput {
            title: "Renamed".into(),
            status: Some(TaskStatus::InReview),
            ..Default::default()
        };
        store.update_task(5, &input).await.unwrap();

        assert_eq!(store.tasks()[1].title, "Renamed");
        assert_eq!(store.tasks()[1].status, TaskStatus::InReview);
        assert_eq!(store.tasks()[0].title, "Task 4");
        assert_eq!(store.current_task().map(|t| t.title.as_str()), Some("Renamed"));

        let sent = transport.requests();
        let last = sent.last().unwrap();
        assert_eq!(last.path, "/tasks/5");
        assert_eq!(
            last.body,
            Some(json!({ "title": "Renamed", "status": "En Revisión" }))
        );
    }
}
