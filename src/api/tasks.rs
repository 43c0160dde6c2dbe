// ### Task Endpoints

use reqwest::Method;

use crate::api::ApiClient;
use crate::error::Result;
use crate::task::{Task, TaskDraft};

impl ApiClient {
    /// List every task visible to the current user
    ///
    /// GET /tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, "/tasks")?;
        self.send_json(builder).await
    }

    /// Tasks assigned to the current user
    ///
    /// GET /tasks/my_tasks
    pub async fn my_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, "/tasks/my_tasks")?;
        self.send_json(builder).await
    }

    /// GET /tasks/{id}
    pub async fn get_task(&self, task_id: u64) -> Result<Task> {
        let builder = self.request(Method::GET, &format!("/tasks/{task_id}"))?;
        self.send_json(builder).await
    }

    /// POST /tasks
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let builder = self.request(Method::POST, "/tasks")?.json(draft);
        self.send_json(builder).await
    }

    /// Partial update; only the fields set on `draft` are sent.
    ///
    /// PUT /tasks/{id}
    pub async fn update_task(&self, task_id: u64, draft: &TaskDraft) -> Result<Task> {
        let builder = self
            .request(Method::PUT, &format!("/tasks/{task_id}"))?
            .json(draft);
        self.send_json(builder).await
    }

    /// DELETE /tasks/{id}
    pub async fn delete_task(&self, task_id: u64) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/tasks/{task_id}"))?;
        self.send_empty(builder).await
    }
}
