// ### Project Endpoints

use reqwest::Method;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Project, ProjectDraft};
use crate::task::{Task, TaskDraft};

impl ApiClient {
    /// GET /projects
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let builder = self.request(Method::GET, "/projects")?;
        self.send_json(builder).await
    }

    /// GET /projects/{id}
    pub async fn get_project(&self, project_id: u64) -> Result<Project> {
        let builder = self.request(Method::GET, &format!("/projects/{project_id}"))?;
        self.send_json(builder).await
    }

    /// POST /projects
    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project> {
        let builder = self.request(Method::POST, "/projects")?.json(draft);
        self.send_json(builder).await
    }

    /// PUT /projects/{id}
    pub async fn update_project(&self, project_id: u64, draft: &ProjectDraft) -> Result<Project> {
        let builder = self
            .request(Method::PUT, &format!("/projects/{project_id}"))?
            .json(draft);
        self.send_json(builder).await
    }

    /// DELETE /projects/{id}
    pub async fn delete_project(&self, project_id: u64) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/projects/{project_id}"))?;
        self.send_empty(builder).await
    }

    /// Tasks belonging to one project, as shown on its board
    ///
    /// GET /projects/{id}/tasks
    pub async fn project_tasks(&self, project_id: u64) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, &format!("/projects/{project_id}/tasks"))?;
        self.send_json(builder).await
    }

    /// POST /projects/{id}/tasks
    pub async fn create_project_task(&self, project_id: u64, draft: &TaskDraft) -> Result<Task> {
        let builder = self
            .request(Method::POST, &format!("/projects/{project_id}/tasks"))?
            .json(draft);
        self.send_json(builder).await
    }

    /// PUT /projects/{id}/tasks/{task_id}
    pub async fn update_project_task(
        &self,
        project_id: u64,
        task_id: u64,
        draft: &TaskDraft,
    ) -> Result<Task> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/projects/{project_id}/tasks/{task_id}"),
            )?
            .json(draft);
        self.send_json(builder).await
    }

    /// DELETE /projects/{id}/tasks/{task_id}
    pub async fn delete_project_task(&self, project_id: u64, task_id: u64) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &format!("/projects/{project_id}/tasks/{task_id}"),
        )?;
        self.send_empty(builder).await
    }
}
