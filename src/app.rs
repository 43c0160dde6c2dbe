use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::api::CallbackParams;
use crate::autosave::DescriptionAutosave;
use crate::error::ApiError;
use crate::form::TaskForm;
use crate::kanban_board::KanbanBoard;
use crate::models::{Project, ProjectDraft, User};
use crate::notify::{Notifier, ToastKind};
use crate::session::{Route, Session, SessionStore};
use crate::task::{Task, TaskStatus};
use crate::worker::{ApiEvent, DashboardData, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    MyTasks,
    Projects,
    Board,
    Dashboard,
    Coins,
}

impl View {
    pub const TABS: [View; 5] = [
        View::MyTasks,
        View::Projects,
        View::Board,
        View::Dashboard,
        View::Coins,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Login => "Login",
            View::MyTasks => "My Tasks",
            View::Projects => "Projects",
            View::Board => "Board",
            View::Dashboard => "Dashboard",
            View::Coins => "AXO",
        }
    }
}

/// Task details dialog with its description editor.
#[derive(Debug, Clone)]
pub struct TaskDetails {
    pub task: Task,
    pub project_id: Option<u64>,
    pub editor: DescriptionAutosave,
    pub editing: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Task {
        project_id: Option<u64>,
        task_id: u64,
        title: String,
    },
    Project {
        project_id: u64,
        name: String,
    },
}

pub struct App {
    pub view: View,
    pub user: Option<User>,
    pub users: Vec<User>,
    pub my_tasks: Vec<Task>,
    pub my_task_selected: usize,
    pub projects: Vec<Project>,
    pub project_selected: usize,
    pub board: KanbanBoard,
    pub board_project: Option<Project>,
    pub dashboard: Option<DashboardData>,
    pub details: Option<TaskDetails>,
    pub form: Option<TaskForm>,
    pub pending_delete: Option<PendingDelete>,
    pub project_input: Option<String>,
    pub show_help: bool,
    pub login_url: String,
    pub login_input: String,
    pub login_pending: bool,
    pub notifier: Notifier,
    pub should_quit: bool,
    store: SessionStore,
    autosave_delay: Duration,
}

impl App {
    pub fn new(
        store: SessionStore,
        login_url: impl Into<String>,
        autosave_delay: Duration,
        toast_duration: Duration,
    ) -> Self {
        Self {
            view: View::Login,
            user: None,
            users: Vec::new(),
            my_tasks: Vec::new(),
            my_task_selected: 0,
            projects: Vec::new(),
            project_selected: 0,
            board: KanbanBoard::new(None),
            board_project: None,
            dashboard: None,
            details: None,
            form: None,
            pending_delete: None,
            project_input: None,
            show_help: false,
            login_url: login_url.into(),
            login_input: String::new(),
            login_pending: false,
            notifier: Notifier::new(toast_duration),
            should_quit: false,
            store,
            autosave_delay,
        }
    }

    /// Picks the opening screen from the stored session and returns the initial loads.
    pub fn start(&mut self) -> Vec<Request> {
        let session = self.store.load();
        match Route::for_session(session.as_ref()) {
            Route::Login => {
                self.view = View::Login;
                Vec::new()
            }
            Route::Main => {
                let Some(session) = session else {
                    return Vec::new();
                };
                self.user = Some(session.user);
                self.view = View::MyTasks;
                vec![
                    Request::SetToken(session.token),
                    Request::LoadCurrentUser,
                    Request::LoadUsers,
                    Request::LoadMyTasks,
                ]
            }
        }
    }

    pub fn coins(&self) -> i64 {
        self.user.as_ref().map(|u| u.coins).unwrap_or(0)
    }

    pub fn selected_my_task(&self) -> Option<&Task> {
        self.my_tasks.get(self.my_task_selected)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.project_selected)
    }

    // ----- server events -----

    pub fn handle_event(&mut self, event: ApiEvent) -> Vec<Request> {
        if self.view == View::Login && !matches!(event, ApiEvent::LoggedIn(_)) {
            debug!(?event, "dropping reply for a closed session");
            return Vec::new();
        }
        match event {
            ApiEvent::LoggedIn(result) => {
                self.login_pending = false;
                match result {
                    Ok(auth) => {
                        let session = Session {
                            token: auth.token.clone(),
                            user: auth.user.clone(),
                        };
                        if let Err(err) = self.store.save(&session) {
                            warn!(error = %err, "could not persist session");
                            self.notifier.error("Session not saved", err.to_string());
                        }
                        info!(user = %auth.user.email, "logged in");
                        self.notifier.push(
                            ToastKind::Success,
                            "Login Successful",
                            Some(format!("Welcome back, {}!", auth.user.display_name())),
                        );
                        self.user = Some(auth.user);
                        self.login_input.clear();
                        self.view = View::MyTasks;
                        vec![
                            Request::SetToken(auth.token),
                            Request::LoadUsers,
                            Request::LoadMyTasks,
                        ]
                    }
                    Err(err) => {
                        warn!(error = %err, "login failed");
                        self.notifier.error("Authentication Failed", err.to_string());
                        Vec::new()
                    }
                }
            }
            ApiEvent::CurrentUser(result) => match result {
                Ok(user) => {
                    if let Err(err) = self.store.update_user(&user) {
                        warn!(error = %err, "could not refresh stored profile");
                    }
                    self.user = Some(user);
                    Vec::new()
                }
                Err(err) => self.fail("Error loading user data", err),
            },
            ApiEvent::Users(result) => match result {
                Ok(users) => {
                    self.users = users;
                    Vec::new()
                }
                Err(err) => self.fail("Error loading users", err),
            },
            ApiEvent::MyTasks(result) => match result {
                Ok(tasks) => {
                    self.my_tasks = tasks;
                    self.clamp_my_tasks();
                    Vec::new()
                }
                Err(err) => self.fail("Error loading tasks", err),
            },
            ApiEvent::Projects(result) => match result {
                Ok(projects) => {
                    self.projects = projects;
                    self.project_selected = self
                        .project_selected
                        .min(self.projects.len().saturating_sub(1));
                    Vec::new()
                }
                Err(err) => self.fail("Error loading projects", err),
            },
            ApiEvent::Project { project_id, result } => match result {
                Ok(project) if self.board.project_id == Some(project_id) => {
                    self.board_project = Some(project);
                    Vec::new()
                }
                Ok(_) => Vec::new(),
                Err(err) => self.fail("Error loading project", err),
            },
            ApiEvent::ProjectTasks { project_id, result } => match result {
                Ok(tasks) if self.board.project_id == Some(project_id) => {
                    self.board.replace_tasks(tasks);
                    Vec::new()
                }
                Ok(_) => Vec::new(),
                Err(err) => self.fail("Error loading project tasks", err),
            },
            ApiEvent::TaskLoaded { task_id, result } => match result {
                Ok(task) => {
                    if let Some(details) = self.details.as_mut().filter(|d| d.task.id == task_id) {
                        details.editor.reset(task.description());
                        details.task = task;
                        details.loading = false;
                    }
                    Vec::new()
                }
                Err(err) => {
                    if let Some(details) = self.details.as_mut().filter(|d| d.task.id == task_id) {
                        details.loading = false;
                    }
                    self.fail("Error loading task", err)
                }
            },
            ApiEvent::Dashboard(result) => match result {
                Ok(data) => {
                    self.dashboard = Some(data);
                    Vec::new()
                }
                Err(err) => self.fail("Error loading dashboard", err),
            },
            ApiEvent::StatusUpdated {
                project_id,
                change,
                result,
            } => match result {
                Ok(task) => {
                    self.board.confirm(change.task_id, change.to);
                    self.board.upsert_if_present(task.clone());
                    self.replace_my_task(task);
                    self.notifier.success("Task updated successfully");
                    self.task_list_refresh(project_id)
                }
                Err(err) => {
                    if let Some(restored) = self.board.reject(change.task_id, change.to) {
                        warn!(
                            task_id = change.task_id,
                            restored = %restored,
                            error = %err,
                            "status update failed, card moved back"
                        );
                    }
                    let mut requests = self.fail("Failed to update task", err);
                    requests.extend(self.task_list_refresh(project_id));
                    requests
                }
            },
            ApiEvent::TaskCompleted {
                project_id,
                task_id,
                result,
            } => match result {
                Ok(task) => {
                    self.board.confirm(task_id, TaskStatus::Done);
                    self.board.upsert_if_present(task.clone());
                    self.replace_my_task(task);
                    self.notifier.push(
                        ToastKind::Success,
                        "Task Completed!",
                        Some("Great job! Keep up the good work!".to_string()),
                    );
                    self.task_list_refresh(project_id)
                }
                Err(err) => self.fail("Failed to update task", err),
            },
            ApiEvent::DescriptionSaved {
                task_id,
                text,
                result,
            } => match result {
                Ok(_) => {
                    if let Some(details) = self.details.as_mut().filter(|d| d.task.id == task_id) {
                        details.editor.mark_saved(&text);
                        details.task.description = Some(text.clone());
                    }
                    for task in self.my_tasks.iter_mut().filter(|t| t.id == task_id) {
                        task.description = Some(text.clone());
                    }
                    Vec::new()
                }
                Err(err) => self.fail(
                    "Failed to update task description. Please try again.",
                    err,
                ),
            },
            ApiEvent::TaskCreated { project_id, result } => match result {
                Ok(task) => {
                    self.form = None;
                    if project_id.is_some() && self.board.project_id == project_id {
                        self.board.upsert(task);
                    }
                    self.notifier.success("Task created successfully");
                    self.task_list_refresh(project_id)
                }
                Err(err) => self.fail("Failed to create task", err),
            },
            ApiEvent::TaskUpdated { project_id, result } => match result {
                Ok(task) => {
                    self.form = None;
                    self.board.upsert_if_present(task.clone());
                    self.replace_my_task(task);
                    self.notifier.success("Task updated successfully");
                    self.task_list_refresh(project_id)
                }
                Err(err) => self.fail("Failed to update task", err),
            },
            ApiEvent::TaskDeleted {
                project_id,
                task_id,
                result,
            } => match result {
                Ok(()) => {
                    self.remove_task_everywhere(task_id);
                    self.notifier.success("Task deleted successfully");
                    self.task_list_refresh(project_id)
                }
                Err(err) => self.fail("Failed to delete task", err),
            },
            ApiEvent::ProjectCreated(result) => match result {
                Ok(project) => {
                    self.notifier.success(format!("Project '{}' created", project.name));
                    self.projects.push(project);
                    vec![Request::LoadProjects]
                }
                Err(err) => self.fail("Failed to create project", err),
            },
            ApiEvent::ProjectDeleted { project_id, result } => match result {
                Ok(()) => {
                    self.projects.retain(|p| p.id != project_id);
                    self.project_selected = self
                        .project_selected
                        .min(self.projects.len().saturating_sub(1));
                    if self.board.project_id == Some(project_id) {
                        self.board = KanbanBoard::new(None);
                        self.board_project = None;
                    }
                    self.notifier.success("Project deleted successfully");
                    vec![Request::LoadProjects]
                }
                Err(err) => self.fail("Failed to delete project", err),
            },
        }
    }

    /// Surfaces a failure as a toast. An auth failure ends the session instead.
    fn fail(&mut self, title: &str, err: ApiError) -> Vec<Request> {
        if err.is_auth_error() && self.view != View::Login {
            warn!(error = %err, "session rejected by server");
            let requests = self.logout();
            self.notifier.error("Session expired", "Please log in again.");
            return requests;
        }
        warn!(error = %err, "{title}");
        self.notifier.error(title, err.to_string());
        Vec::new()
    }

    /// Refreshes "my tasks" and, when the change belongs to it, the open board.
    fn task_list_refresh(&self, project_id: Option<u64>) -> Vec<Request> {
        let mut requests = vec![Request::LoadMyTasks];
        if let Some(board_id) = self.board.project_id {
            if project_id.map_or(true, |id| id == board_id) {
                requests.push(Request::LoadProjectTasks(board_id));
            }
        }
        requests
    }

    fn replace_my_task(&mut self, task: Task) {
        if let Some(existing) = self.my_tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
    }

    fn remove_task_everywhere(&mut self, task_id: u64) {
        self.board.remove_task(task_id);
        self.my_tasks.retain(|t| t.id != task_id);
        self.clamp_my_tasks();
        if self.details.as_ref().is_some_and(|d| d.task.id == task_id) {
            self.details = None;
        }
    }

    fn clamp_my_tasks(&mut self) {
        self.my_task_selected = self
            .my_task_selected
            .min(self.my_tasks.len().saturating_sub(1));
    }

    pub fn logout(&mut self) -> Vec<Request> {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "could not remove session file");
        }
        info!("logged out");
        self.user = None;
        self.users.clear();
        self.my_tasks.clear();
        self.projects.clear();
        self.board = KanbanBoard::new(None);
        self.board_project = None;
        self.dashboard = None;
        self.details = None;
        self.form = None;
        self.pending_delete = None;
        self.project_input = None;
        self.view = View::Login;
        vec![Request::ClearToken]
    }

    // ----- timers -----

    pub fn tick(&mut self, now: Instant) -> Vec<Request> {
        self.notifier.prune(now);
        self.details
            .as_mut()
            .and_then(|details| {
                let task_id = details.editor.task_id();
                details
                    .editor
                    .poll(now)
                    .map(|text| Request::SaveDescription { task_id, text })
            })
            .into_iter()
            .collect()
    }

    /// Saves that must still go out before the process exits.
    pub fn shutdown_requests(&mut self) -> Vec<Request> {
        self.details
            .as_mut()
            .and_then(|details| {
                let task_id = details.editor.task_id();
                details
                    .editor
                    .flush()
                    .map(|text| Request::SaveDescription { task_id, text })
            })
            .into_iter()
            .collect()
    }

    // ----- navigation -----

    pub fn switch_view(&mut self, view: View) -> Vec<Request> {
        if view == View::Board && self.board.project_id.is_none() {
            self.notifier.push(ToastKind::Info, "Open a project first", None);
            return self.switch_view(View::Projects);
        }
        self.view = view;
        self.refresh()
    }

    pub fn refresh(&self) -> Vec<Request> {
        match self.view {
            View::Login => Vec::new(),
            View::MyTasks => vec![Request::LoadMyTasks, Request::LoadCurrentUser],
            View::Projects => vec![Request::LoadProjects],
            View::Board => match self.board.project_id {
                Some(project_id) => vec![
                    Request::LoadProject(project_id),
                    Request::LoadProjectTasks(project_id),
                ],
                None => Vec::new(),
            },
            View::Dashboard => vec![Request::LoadDashboard],
            View::Coins => vec![Request::LoadCurrentUser],
        }
    }

    pub fn open_board(&mut self, project_id: u64) -> Vec<Request> {
        self.board = KanbanBoard::new(Some(project_id));
        self.board_project = self.projects.iter().find(|p| p.id == project_id).cloned();
        self.view = View::Board;
        vec![
            Request::LoadProject(project_id),
            Request::LoadProjectTasks(project_id),
            Request::LoadUsers,
        ]
    }

    pub fn open_details(&mut self, task: Task, project_id: Option<u64>) -> Vec<Request> {
        let task_id = task.id;
        let editor = DescriptionAutosave::new(task_id, task.description(), self.autosave_delay);
        self.details = Some(TaskDetails {
            task,
            project_id,
            editor,
            editing: false,
            loading: true,
        });
        vec![Request::LoadTask(task_id)]
    }

    fn close_details(&mut self) -> Vec<Request> {
        let requests = self.shutdown_requests();
        self.details = None;
        requests
    }

    // ----- keyboard -----

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Request> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }
        if self.view == View::Login {
            return self.handle_login_key(key);
        }
        if self.show_help {
            self.show_help = false;
            return Vec::new();
        }
        if self.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.pending_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        if self.project_input.is_some() {
            return self.handle_project_input_key(key);
        }
        if self.details.is_some() {
            return self.handle_details_key(key, now);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Vec::new()
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('O') => self.logout(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.switch_view(View::TABS[index])
            }
            KeyCode::Tab => {
                let index = View::TABS.iter().position(|v| *v == self.view).unwrap_or(0);
                let next = View::TABS[(index + 1) % View::TABS.len()];
                self.switch_view(next)
            }
            _ => match self.view {
                View::MyTasks => self.handle_my_tasks_key(key),
                View::Projects => self.handle_projects_key(key),
                View::Board => self.handle_board_key(key),
                View::Login | View::Dashboard | View::Coins => Vec::new(),
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Enter if !self.login_pending => {
                match CallbackParams::parse(&self.login_input) {
                    Ok(params) => {
                        self.login_pending = true;
                        vec![Request::ExchangeCode(params)]
                    }
                    Err(err) => {
                        self.notifier.error("Authentication Failed", err.to_string());
                        Vec::new()
                    }
                }
            }
            KeyCode::Backspace => {
                self.login_input.pop();
                Vec::new()
            }
            KeyCode::Char(c) => {
                self.login_input.push(c);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let Some(form) = self.form.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.cycle(-1, &self.users),
            KeyCode::Right => form.cycle(1, &self.users),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.to_request() {
                Ok(request) => return vec![request],
                Err(err) => self.notifier.error("Invalid task", err.to_string()),
            },
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => match self.pending_delete.take() {
                Some(PendingDelete::Task {
                    project_id,
                    task_id,
                    ..
                }) => vec![Request::DeleteTask {
                    project_id,
                    task_id,
                }],
                Some(PendingDelete::Project { project_id, .. }) => {
                    vec![Request::DeleteProject(project_id)]
                }
                None => Vec::new(),
            },
            KeyCode::Char('n') | KeyCode::Esc => {
                self.pending_delete = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_project_input_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let Some(input) = self.project_input.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => self.project_input = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let name = input.trim().to_string();
                if name.is_empty() {
                    self.notifier.error("Invalid project", "name is required");
                } else {
                    self.project_input = None;
                    return vec![Request::CreateProject(ProjectDraft {
                        name: Some(name),
                        description: None,
                    })];
                }
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_details_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Request> {
        let Some(details) = self.details.as_mut() else {
            return Vec::new();
        };
        if details.editing {
            match key.code {
                KeyCode::Esc => {
                    details.editing = false;
                    let task_id = details.editor.task_id();
                    return details
                        .editor
                        .flush()
                        .map(|text| Request::SaveDescription { task_id, text })
                        .into_iter()
                        .collect();
                }
                KeyCode::Enter => details.editor.push_char('\n', now),
                KeyCode::Backspace => details.editor.backspace(now),
                KeyCode::Char(c) => details.editor.push_char(c, now),
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_details(),
            KeyCode::Char('e') => {
                details.editing = true;
                Vec::new()
            }
            KeyCode::Char('c') => {
                let task_id = details.task.id;
                let project_id = details.project_id;
                self.complete_task(task_id, project_id)
            }
            KeyCode::Char('d') => {
                self.pending_delete = Some(PendingDelete::Task {
                    project_id: details.project_id,
                    task_id: details.task.id,
                    title: details.task.title.clone(),
                });
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_my_tasks_key(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.my_task_selected = self.my_task_selected.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.my_task_selected + 1 < self.my_tasks.len() {
                    self.my_task_selected += 1;
                }
                Vec::new()
            }
            KeyCode::Enter => match self.selected_my_task().cloned() {
                Some(task) => {
                    let project_id = task.project_id;
                    self.open_details(task, project_id)
                }
                None => Vec::new(),
            },
            KeyCode::Char('c') => match self.selected_my_task() {
                Some(task) => {
                    let (task_id, project_id) = (task.id, task.project_id);
                    self.complete_task(task_id, project_id)
                }
                None => Vec::new(),
            },
            KeyCode::Char('n') => {
                let assignee = self.user.as_ref().map(|u| u.id);
                self.form = Some(TaskForm::create(None, assignee, TaskStatus::Todo));
                Vec::new()
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_my_task() {
                    self.form = Some(TaskForm::edit(task, None));
                }
                Vec::new()
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_my_task() {
                    self.pending_delete = Some(PendingDelete::Task {
                        project_id: None,
                        task_id: task.id,
                        title: task.title.clone(),
                    });
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.project_selected = self.project_selected.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.project_selected + 1 < self.projects.len() {
                    self.project_selected += 1;
                }
                Vec::new()
            }
            KeyCode::Enter => match self.selected_project() {
                Some(project) => {
                    let project_id = project.id;
                    self.open_board(project_id)
                }
                None => Vec::new(),
            },
            KeyCode::Char('n') => {
                self.project_input = Some(String::new());
                Vec::new()
            }
            KeyCode::Char('d') => {
                if let Some(project) = self.selected_project() {
                    self.pending_delete = Some(PendingDelete::Project {
                        project_id: project.id,
                        name: project.name.clone(),
                    });
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Vec<Request> {
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Left if shifted => self.move_selected_card(-1),
            KeyCode::Right if shifted => self.move_selected_card(1),
            KeyCode::Char('H') | KeyCode::Char('<') => self.move_selected_card(-1),
            KeyCode::Char('L') | KeyCode::Char('>') => self.move_selected_card(1),
            KeyCode::Left | KeyCode::Char('h') => {
                self.board.select_prev_column();
                Vec::new()
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.board.select_next_column();
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.board.select_prev_task();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.board.select_next_task();
                Vec::new()
            }
            KeyCode::Enter => match self.board.selected().cloned() {
                Some(task) => {
                    let project_id = self.board.project_id;
                    self.open_details(task, project_id)
                }
                None => Vec::new(),
            },
            KeyCode::Char('c') => {
                let project_id = self.board.project_id;
                self.board
                    .move_selected_to(TaskStatus::Done)
                    .map(|change| Request::MoveTask { project_id, change })
                    .into_iter()
                    .collect()
            }
            KeyCode::Char('n') => {
                let assignee = self.user.as_ref().map(|u| u.id);
                let column = self.board.selected_column();
                self.form = Some(TaskForm::create(self.board.project_id, assignee, column));
                Vec::new()
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.board.selected() {
                    self.form = Some(TaskForm::edit(task, self.board.project_id));
                }
                Vec::new()
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.board.selected() {
                    self.pending_delete = Some(PendingDelete::Task {
                        project_id: self.board.project_id,
                        task_id: task.id,
                        title: task.title.clone(),
                    });
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Optimistic card move: the board changes now, the request follows.
    fn move_selected_card(&mut self, direction: isize) -> Vec<Request> {
        let project_id = self.board.project_id;
        self.board
            .move_selected(direction)
            .map(|change| Request::MoveTask { project_id, change })
            .into_iter()
            .collect()
    }

    fn complete_task(&mut self, task_id: u64, project_id: Option<u64>) -> Vec<Request> {
        if self.board.task(task_id).is_some() {
            if let Some(change) = self.board.move_task(task_id, TaskStatus::Done) {
                return vec![Request::MoveTask { project_id, change }];
            }
        }
        let already_done = self
            .my_tasks
            .iter()
            .chain(self.board.tasks())
            .any(|t| t.id == task_id && t.status == TaskStatus::Done);
        if already_done {
            self.notifier.push(ToastKind::Info, "Task is already done", None);
            return Vec::new();
        }
        vec![Request::CompleteTask {
            project_id,
            task_id,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban_board::StatusChange;
    use crate::models::AuthResponse;
    use crate::task::Priority;

    fn user(coins: i64) -> User {
        User {
            id: 1,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            profile_picture: None,
            coins,
        }
    }

    fn task(id: u64, status: TaskStatus) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: Some("notes".to_string()),
            status,
            priority: Priority::High,
            coins: 30,
            due_date: Some("2024-06-01".to_string()),
            created_at: Some("2024-05-01".to_string()),
            updated_at: None,
            user: None,
            user_id: Some(1),
            project_id: Some(7),
            project: None,
        }
    }

    fn app(dir: &tempfile::TempDir) -> App {
        App::new(
            SessionStore::new(dir.path().join("session.json")),
            "http://localhost:3000/users/auth/google_oauth2",
            Duration::from_secs(2),
            Duration::from_secs(3),
        )
    }

    fn logged_in_app(dir: &tempfile::TempDir) -> App {
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&Session {
                token: "tok".to_string(),
                user: user(100),
            })
            .unwrap();
        let mut app = app(dir);
        app.start();
        app
    }

    fn board_app(dir: &tempfile::TempDir) -> App {
        let mut app = logged_in_app(dir);
        app.open_board(7);
        app.handle_event(ApiEvent::ProjectTasks {
            project_id: 7,
            result: Ok(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::InProgress)]),
        });
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn api_failure() -> ApiError {
        ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn no_token_opens_login_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(app.start().is_empty());
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn stored_token_is_attached_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&Session {
                token: "tok".to_string(),
                user: user(5),
            })
            .unwrap();
        let mut app = app(&dir);
        let requests = app.start();
        assert_eq!(app.view, View::MyTasks);
        assert_eq!(requests[0], Request::SetToken("tok".to_string()));
        assert!(requests.contains(&Request::LoadMyTasks));
    }

    #[test]
    fn login_flow_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.start();
        for c in "code=abc&state=xyz".chars() {
            app.handle_key(key(KeyCode::Char(c)), Instant::now());
        }
        let requests = app.handle_key(key(KeyCode::Enter), Instant::now());
        assert!(matches!(requests.as_slice(), [Request::ExchangeCode(_)]));

        let requests = app.handle_event(ApiEvent::LoggedIn(Ok(AuthResponse {
            token: "fresh".to_string(),
            user: user(0),
        })));
        assert_eq!(app.view, View::MyTasks);
        assert_eq!(requests[0], Request::SetToken("fresh".to_string()));
        assert!(SessionStore::new(dir.path().join("session.json")).load().is_some());
    }

    #[test]
    fn login_without_params_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.start();
        assert!(app.handle_key(key(KeyCode::Enter), Instant::now()).is_empty());
        assert!(!app.notifier.is_empty());
        assert_eq!(app.view, View::Login);
    }

    #[test]
    fn shift_arrow_moves_card_before_any_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let requests = app.handle_key(
            KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT),
            Instant::now(),
        );
        assert_eq!(
            requests,
            vec![Request::MoveTask {
                project_id: Some(7),
                change: StatusChange {
                    task_id: 1,
                    from: TaskStatus::Todo,
                    to: TaskStatus::InProgress,
                },
            }]
        );
        assert_eq!(app.board.task(1).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn failed_move_rolls_back_and_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let change = app.board.move_task(1, TaskStatus::Done).unwrap();
        let requests = app.handle_event(ApiEvent::StatusUpdated {
            project_id: Some(7),
            change,
            result: Err(api_failure()),
        });
        assert_eq!(app.board.task(1).unwrap().status, TaskStatus::Todo);
        assert!(requests.contains(&Request::LoadProjectTasks(7)));
        let toast = app.notifier.visible().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Failed to update task");
    }

    #[test]
    fn coins_only_change_from_server_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let requests = app.handle_key(key(KeyCode::Char('c')), Instant::now());
        assert!(matches!(requests.as_slice(), [Request::MoveTask { .. }]));
        assert_eq!(app.coins(), 100);

        let change = StatusChange {
            task_id: 1,
            from: TaskStatus::Todo,
            to: TaskStatus::Done,
        };
        app.handle_event(ApiEvent::StatusUpdated {
            project_id: Some(7),
            change,
            result: Ok(task(1, TaskStatus::Done)),
        });
        assert_eq!(app.coins(), 100);

        app.handle_event(ApiEvent::CurrentUser(Ok(user(130))));
        assert_eq!(app.coins(), 130);
    }

    #[test]
    fn delete_removes_task_from_every_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        app.handle_event(ApiEvent::MyTasks(Ok(vec![task(1, TaskStatus::Todo)])));
        app.handle_key(key(KeyCode::Char('d')), Instant::now());
        let requests = app.handle_key(key(KeyCode::Char('y')), Instant::now());
        assert_eq!(
            requests,
            vec![Request::DeleteTask {
                project_id: Some(7),
                task_id: 1
            }]
        );
        app.handle_event(ApiEvent::TaskDeleted {
            project_id: Some(7),
            task_id: 1,
            result: Ok(()),
        });
        assert!(app.board.task(1).is_none());
        assert!(app.my_tasks.is_empty());
    }

    #[test]
    fn unauthorized_response_routes_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(&dir);
        let requests = app.handle_event(ApiEvent::MyTasks(Err(ApiError::Unauthorized)));
        assert_eq!(requests, vec![Request::ClearToken]);
        assert_eq!(app.view, View::Login);
        assert!(SessionStore::new(dir.path().join("session.json")).load().is_none());
    }

    #[test]
    fn description_autosaves_after_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let start = Instant::now();
        let requests = app.handle_key(key(KeyCode::Enter), start);
        assert_eq!(requests, vec![Request::LoadTask(1)]);
        app.handle_key(key(KeyCode::Char('e')), start);
        app.handle_key(key(KeyCode::Char('!')), start);
        assert!(app.tick(start + Duration::from_secs(1)).is_empty());
        assert_eq!(
            app.tick(start + Duration::from_secs(2)),
            vec![Request::SaveDescription {
                task_id: 1,
                text: "notes!".to_string()
            }]
        );
    }

    #[test]
    fn leaving_editor_saves_then_close_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let now = Instant::now();
        app.handle_key(key(KeyCode::Enter), now);
        app.handle_key(key(KeyCode::Char('e')), now);
        app.handle_key(key(KeyCode::Backspace), now);
        let requests = app.handle_key(key(KeyCode::Esc), now);
        assert_eq!(
            requests,
            vec![Request::SaveDescription {
                task_id: 1,
                text: "note".to_string()
            }]
        );
        app.handle_event(ApiEvent::DescriptionSaved {
            task_id: 1,
            text: "note".to_string(),
            result: Ok(task(1, TaskStatus::Todo)),
        });
        let requests = app.handle_key(key(KeyCode::Esc), now);
        assert!(requests.is_empty());
        assert!(app.details.is_none());
    }

    #[test]
    fn board_tab_without_project_falls_back_to_projects() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(&dir);
        let requests = app.handle_key(key(KeyCode::Char('3')), Instant::now());
        assert_eq!(app.view, View::Projects);
        assert_eq!(requests, vec![Request::LoadProjects]);
    }
    #[test]
    fn completing_a_task_from_another_project_leaves_the_board_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let mut foreign = task(50, TaskStatus::Todo);
        foreign.project_id = Some(9);
        app.handle_event(ApiEvent::MyTasks(Ok(vec![foreign.clone()])));
        app.view = View::MyTasks;

        let requests = app.handle_key(key(KeyCode::Char('c')), Instant::now());
        assert_eq!(
            requests,
            vec![Request::CompleteTask {
                project_id: Some(9),
                task_id: 50
            }]
        );

        foreign.status = TaskStatus::Done;
        let requests = app.handle_event(ApiEvent::TaskCompleted {
            project_id: Some(9),
            task_id: 50,
            result: Ok(foreign),
        });
        assert!(app.board.task(50).is_none());
        assert_eq!(app.board.tasks().len(), 2);
        assert_eq!(app.my_tasks[0].status, TaskStatus::Done);
        assert_eq!(requests, vec![Request::LoadMyTasks]);
    }

    #[test]
    fn replies_after_logout_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = logged_in_app(&dir);
        app.handle_key(key(KeyCode::Char('O')), Instant::now());
        assert_eq!(app.view, View::Login);

        assert!(app.handle_event(ApiEvent::CurrentUser(Ok(user(777)))).is_empty());
        app.handle_event(ApiEvent::MyTasks(Ok(vec![task(1, TaskStatus::Todo)])));
        app.handle_event(ApiEvent::ProjectTasks {
            project_id: 7,
            result: Ok(vec![task(2, TaskStatus::Todo)]),
        });

        assert_eq!(app.view, View::Login);
        assert!(app.user.is_none());
        assert_eq!(app.coins(), 0);
        assert!(app.my_tasks.is_empty());
        assert!(app.board.task(2).is_none());
    }

    #[test]
    fn edit_reply_does_not_request_the_balance() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let requests = app.handle_event(ApiEvent::TaskUpdated {
            project_id: Some(7),
            result: Ok(task(1, TaskStatus::Done)),
        });
        assert_eq!(
            requests,
            vec![Request::LoadMyTasks, Request::LoadProjectTasks(7)]
        );
        assert_eq!(app.board.task(1).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn load_failure_for_another_task_keeps_details_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = board_app(&dir);
        let requests = app.handle_key(key(KeyCode::Enter), Instant::now());
        assert_eq!(requests, vec![Request::LoadTask(1)]);
        assert!(app.details.as_ref().unwrap().loading);

        app.handle_event(ApiEvent::TaskLoaded {
            task_id: 2,
            result: Err(api_failure()),
        });
        assert!(app.details.as_ref().unwrap().loading);

        app.handle_event(ApiEvent::TaskLoaded {
            task_id: 1,
            result: Err(api_failure()),
        });
        assert!(!app.details.as_ref().unwrap().loading);
    }
}
