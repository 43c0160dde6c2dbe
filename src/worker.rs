use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::{ApiClient, CallbackParams};
use crate::error::Result;
use crate::kanban_board::StatusChange;
use crate::models::{
    AuthResponse, DashboardOverview, DetailedProject, Project, ProjectDraft, User, UserSummary,
};
use crate::task::{Task, TaskDraft, TaskStatus};

/// Everything the UI can ask of the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SetToken(String),
    ClearToken,
    ExchangeCode(CallbackParams),
    LoadCurrentUser,
    LoadUsers,
    LoadMyTasks,
    LoadProjects,
    LoadProject(u64),
    LoadProjectTasks(u64),
    LoadTask(u64),
    LoadDashboard,
    MoveTask {
        project_id: Option<u64>,
        change: StatusChange,
    },
    CompleteTask {
        project_id: Option<u64>,
        task_id: u64,
    },
    SaveDescription {
        task_id: u64,
        text: String,
    },
    CreateTask {
        project_id: Option<u64>,
        draft: TaskDraft,
    },
    UpdateTask {
        project_id: Option<u64>,
        task_id: u64,
        draft: TaskDraft,
    },
    DeleteTask {
        project_id: Option<u64>,
        task_id: u64,
    },
    CreateProject(ProjectDraft),
    DeleteProject(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub overview: DashboardOverview,
    pub projects: Vec<DetailedProject>,
    pub users: Vec<UserSummary>,
}

/// Outcome of one server call, delivered back to the UI thread.
#[derive(Debug)]
pub enum ApiEvent {
    LoggedIn(Result<AuthResponse>),
    CurrentUser(Result<User>),
    Users(Result<Vec<User>>),
    MyTasks(Result<Vec<Task>>),
    Projects(Result<Vec<Project>>),
    Project {
        project_id: u64,
        result: Result<Project>,
    },
    ProjectTasks {
        project_id: u64,
        result: Result<Vec<Task>>,
    },
    TaskLoaded {
        task_id: u64,
        result: Result<Task>,
    },
    Dashboard(Result<DashboardData>),
    StatusUpdated {
        project_id: Option<u64>,
        change: StatusChange,
        result: Result<Task>,
    },
    TaskCompleted {
        project_id: Option<u64>,
        task_id: u64,
        result: Result<Task>,
    },
    DescriptionSaved {
        task_id: u64,
        text: String,
        result: Result<Task>,
    },
    TaskCreated {
        project_id: Option<u64>,
        result: Result<Task>,
    },
    TaskUpdated {
        project_id: Option<u64>,
        result: Result<Task>,
    },
    TaskDeleted {
        project_id: Option<u64>,
        task_id: u64,
        result: Result<()>,
    },
    ProjectCreated(Result<Project>),
    ProjectDeleted {
        project_id: u64,
        result: Result<()>,
    },
}

/// Runs requests on the tokio runtime and reports each outcome over a channel.
/// Requests are independent; nothing orders them except the chains inside [`execute`].
pub struct Worker {
    handle: Handle,
    client: ApiClient,
    events: UnboundedSender<ApiEvent>,
}

impl Worker {
    pub fn new(handle: Handle, client: ApiClient) -> (Self, UnboundedReceiver<ApiEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                handle,
                client,
                events,
            },
            receiver,
        )
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn dispatch(&mut self, request: Request) {
        match request {
            Request::SetToken(token) => self.client.set_token(token),
            Request::ClearToken => self.client.clear_token(),
            request => {
                debug!(?request, "dispatching");
                let client = self.client.clone();
                let events = self.events.clone();
                self.handle.spawn(async move {
                    execute(&client, request, &events).await;
                });
            }
        }
    }

    pub fn dispatch_all(&mut self, requests: impl IntoIterator<Item = Request>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    /// Runs a request to completion on the calling thread. Used on shutdown, where
    /// spawned work would be dropped together with the runtime.
    pub fn run_blocking(&mut self, request: Request) {
        match request {
            Request::SetToken(token) => self.client.set_token(token),
            Request::ClearToken => self.client.clear_token(),
            request => {
                debug!(?request, "running before exit");
                let client = self.client.clone();
                let events = self.events.clone();
                self.handle
                    .block_on(async move { execute(&client, request, &events).await });
            }
        }
    }
}

fn emit(events: &UnboundedSender<ApiEvent>, event: ApiEvent) {
    if events.send(event).is_err() {
        warn!("event receiver dropped, discarding api result");
    }
}

/// Performs one request. A successful task mutation is chained with a `/users/me`
/// refetch so the coin balance always comes from the server.
pub async fn execute(client: &ApiClient, request: Request, events: &UnboundedSender<ApiEvent>) {
    let mut refetch_user = false;
    let event = match request {
        Request::SetToken(_) | Request::ClearToken => return,
        Request::ExchangeCode(params) => ApiEvent::LoggedIn(client.exchange_code(&params).await),
        Request::LoadCurrentUser => ApiEvent::CurrentUser(client.current_user().await),
        Request::LoadUsers => ApiEvent::Users(client.list_users().await),
        Request::LoadMyTasks => ApiEvent::MyTasks(client.my_tasks().await),
        Request::LoadProjects => ApiEvent::Projects(client.list_projects().await),
        Request::LoadProject(project_id) => ApiEvent::Project {
            project_id,
            result: client.get_project(project_id).await,
        },
        Request::LoadProjectTasks(project_id) => ApiEvent::ProjectTasks {
            project_id,
            result: client.project_tasks(project_id).await,
        },
        Request::LoadTask(task_id) => ApiEvent::TaskLoaded {
            task_id,
            result: client.get_task(task_id).await,
        },
        Request::LoadDashboard => ApiEvent::Dashboard(load_dashboard(client).await),
        Request::MoveTask { project_id, change } => {
            let draft = TaskDraft::status_change(change.task_id, change.to);
            let result = update(client, project_id, change.task_id, &draft).await;
            refetch_user = result.is_ok();
            ApiEvent::StatusUpdated {
                project_id,
                change,
                result,
            }
        }
        Request::CompleteTask {
            project_id,
            task_id,
        } => {
            let draft = TaskDraft::status_change(task_id, TaskStatus::Done);
            let result = update(client, project_id, task_id, &draft).await;
            refetch_user = result.is_ok();
            ApiEvent::TaskCompleted {
                project_id,
                task_id,
                result,
            }
        }
        Request::SaveDescription { task_id, text } => {
            let draft = TaskDraft::description_change(task_id, text.clone());
            ApiEvent::DescriptionSaved {
                task_id,
                text,
                result: client.update_task(task_id, &draft).await,
            }
        }
        Request::CreateTask { project_id, draft } => {
            let result = match project_id {
                Some(project_id) => client.create_project_task(project_id, &draft).await,
                None => client.create_task(&draft).await,
            };
            ApiEvent::TaskCreated { project_id, result }
        }
        Request::UpdateTask {
            project_id,
            task_id,
            draft,
        } => {
            let result = update(client, project_id, task_id, &draft).await;
            refetch_user = result.is_ok() && draft.status == Some(TaskStatus::Done);
            ApiEvent::TaskUpdated { project_id, result }
        }
        Request::DeleteTask {
            project_id,
            task_id,
        } => {
            let result = match project_id {
                Some(project_id) => client.delete_project_task(project_id, task_id).await,
                None => client.delete_task(task_id).await,
            };
            ApiEvent::TaskDeleted {
                project_id,
                task_id,
                result,
            }
        }
        Request::CreateProject(draft) => {
            ApiEvent::ProjectCreated(client.create_project(&draft).await)
        }
        Request::DeleteProject(project_id) => ApiEvent::ProjectDeleted {
            project_id,
            result: client.delete_project(project_id).await,
        },
    };

    emit(events, event);
    if refetch_user {
        emit(events, ApiEvent::CurrentUser(client.current_user().await));
    }
}

async fn update(
    client: &ApiClient,
    project_id: Option<u64>,
    task_id: u64,
    draft: &TaskDraft,
) -> Result<Task> {
    match project_id {
        Some(project_id) => client.update_project_task(project_id, task_id, draft).await,
        None => client.update_task(task_id, draft).await,
    }
}

async fn load_dashboard(client: &ApiClient) -> Result<DashboardData> {
    let (overview, projects, users) = tokio::try_join!(
        client.dashboard_overview(),
        client.detailed_projects(),
        client.users_summary(),
    )?;
    Ok(DashboardData {
        overview,
        projects,
        users,
    })
}
