use crate::error::{ApiError, Result};
use crate::models::User;
use crate::task::{Priority, Task, TaskDraft, TaskStatus};
use crate::worker::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Status,
    Coins,
    Assignee,
    Priority,
    DueDate,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Status,
        FormField::Coins,
        FormField::Assignee,
        FormField::Priority,
        FormField::DueDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Status => "Status",
            FormField::Coins => "Coins",
            FormField::Assignee => "Assign To",
            FormField::Priority => "Priority",
            FormField::DueDate => "Due Date",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

/// Create/edit dialog state for a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub mode: FormMode,
    pub project_id: Option<u64>,
    pub title: String,
    pub status: TaskStatus,
    pub coins: String,
    pub assignee: Option<u64>,
    pub priority: Priority,
    pub due_date: String,
    pub focus: FormField,
}

impl TaskForm {
    pub fn create(project_id: Option<u64>, assignee: Option<u64>, status: TaskStatus) -> Self {
        Self {
            mode: FormMode::Create,
            project_id,
            title: String::new(),
            status,
            coins: String::new(),
            assignee,
            priority: Priority::Medium,
            due_date: String::new(),
            focus: FormField::Title,
        }
    }

    pub fn edit(task: &Task, project_id: Option<u64>) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            project_id: project_id.or(task.project_id),
            title: task.title.clone(),
            status: task.status,
            coins: task.coins.to_string(),
            assignee: task.owner_id(),
            priority: task.priority,
            due_date: task.due_date.clone().unwrap_or_default(),
            focus: FormField::Title,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Task",
            FormMode::Edit(_) => "Edit Task",
        }
    }

    pub fn next_field(&mut self) {
        let next = (self.focus.position() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub fn prev_field(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focus.position() + len - 1) % len;
        self.focus = FormField::ALL[prev];
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            FormField::Title => self.title.push(c),
            FormField::Coins if c.is_ascii_digit() => self.coins.push(c),
            FormField::DueDate if c.is_ascii_digit() || c == '-' => self.due_date.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Coins => {
                self.coins.pop();
            }
            FormField::DueDate => {
                self.due_date.pop();
            }
            _ => {}
        }
    }

    /// Left/right on a choice field.
    pub fn cycle(&mut self, direction: isize, users: &[User]) {
        match self.focus {
            FormField::Status => self.status = self.status.offset(direction),
            FormField::Priority => {
                self.priority = if direction >= 0 {
                    self.priority.cycle()
                } else {
                    self.priority.cycle().cycle()
                }
            }
            FormField::Assignee if !users.is_empty() => {
                let current = self
                    .assignee
                    .and_then(|id| users.iter().position(|u| u.id == id));
                let len = users.len() as isize;
                let next = match current {
                    Some(index) => (index as isize + direction).rem_euclid(len),
                    None => 0,
                };
                self.assignee = Some(users[next as usize].id);
            }
            _ => {}
        }
    }

    pub fn assignee_name<'a>(&self, users: &'a [User]) -> &'a str {
        self.assignee
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map(|u| u.display_name())
            .unwrap_or("-")
    }

    pub fn to_draft(&self) -> Result<TaskDraft> {
        let coins = self.coins.trim();
        if coins.is_empty() {
            return Err(ApiError::Validation("coins are required".to_string()));
        }
        let coins = coins.parse::<u64>().map_err(|_| {
            ApiError::Validation("coins must be a non-negative number".to_string())
        })?;
        let draft = TaskDraft {
            id: match self.mode {
                FormMode::Create => None,
                FormMode::Edit(id) => Some(id),
            },
            title: Some(self.title.trim().to_string()),
            description: None,
            status: Some(self.status),
            coins: Some(coins),
            priority: Some(self.priority),
            due_date: Some(self.due_date.trim().to_string()),
            user_id: self.assignee,
            project_id: self.project_id,
        };
        draft.validate_for_create()?;
        Ok(draft)
    }

    pub fn to_request(&self) -> Result<Request> {
        let draft = self.to_draft()?;
        Ok(match self.mode {
            FormMode::Create => Request::CreateTask {
                project_id: self.project_id,
                draft,
            },
            FormMode::Edit(task_id) => Request::UpdateTask {
                project_id: self.project_id,
                task_id,
                draft,
            },
        })
    }
}
