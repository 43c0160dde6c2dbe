use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::models::{ProjectRef, TaskUser};

/// Board column a task sits in. The server only ever knows these three.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Neighbouring column, clamped at both ends of the board.
    pub fn offset(self, direction: isize) -> Self {
        let index = (self.index() as isize + direction).clamp(0, Self::ALL.len() as isize - 1);
        Self::ALL[index as usize]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(ApiError::Validation(format!("unknown task status '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ApiError::Validation(format!("unknown priority '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user: Option<TaskUser>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

impl Task {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn owner_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("unassigned")
    }

    pub fn owner_id(&self) -> Option<u64> {
        self.user.as_ref().map(|u| u.id).or(self.user_id)
    }

    pub fn due_label(&self) -> String {
        format_date(self.due_date.as_deref().unwrap_or_default())
    }
}

/// Partial task payload sent on create and update. Unset fields are left out of the body.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TaskDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
}

impl TaskDraft {
    pub fn status_change(id: u64, status: TaskStatus) -> Self {
        Self {
            id: Some(id),
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn description_change(id: u64, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// A create form must carry a title and a parseable due date.
    pub fn validate_for_create(&self) -> Result<()> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => {}
            _ => return Err(ApiError::Validation("title is required".to_string())),
        }
        match self.due_date.as_deref() {
            Some(due) if parse_timestamp(due).is_some() => Ok(()),
            Some(due) => Err(ApiError::Validation(format!("invalid due date '{due}'"))),
            None => Err(ApiError::Validation("due date is required".to_string())),
        }
    }
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_date(value: &str) -> String {
    parse_timestamp(value)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

/// Time since creation as `"{days}d {hours}h"`.
pub fn task_duration(created_at: &str, now: DateTime<Utc>) -> Option<String> {
    let start = parse_timestamp(created_at)?;
    let elapsed = (now - start).num_hours().max(0);
    Some(format!("{}d {}h", elapsed / 24, elapsed % 24))
}

/// Share of the created→due window already elapsed, capped at 100.
pub fn progress_percentage(created_at: &str, due_date: &str, now: DateTime<Utc>) -> Option<u8> {
    let start = parse_timestamp(created_at)?;
    let end = parse_timestamp(due_date)?;
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return Some(if now >= end { 100 } else { 0 });
    }
    let elapsed = (now - start).num_milliseconds() as f64;
    let percent = (elapsed / total as f64 * 100.0).round().clamp(0.0, 100.0);
    Some(percent as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_rejects_unknown_values() {
        let ok: TaskStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(ok, TaskStatus::InProgress);
        assert!(serde_json::from_str::<TaskStatus>("\"blocked\"").is_err());
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_offset_is_clamped() {
        assert_eq!(TaskStatus::Todo.offset(-1), TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.offset(1), TaskStatus::InProgress);
        assert_eq!(TaskStatus::InProgress.offset(5), TaskStatus::Done);
    }

    #[test]
    fn task_deserializes_server_shape() {
        let raw = serde_json::json!({
            "id": 7,
            "title": "Write docs",
            "description": null,
            "status": "done",
            "priority": "high",
            "coins": 40,
            "due_date": "2024-05-01",
            "created_at": "2024-04-01T10:00:00.000Z",
            "user": { "id": 3, "name": "Ana", "email": "ana@example.com", "profile_picture": null },
            "project_id": 2
        });
        let task: Task = serde_json::from_value(raw).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.description(), "");
        assert_eq!(task.owner_name(), "Ana");
        assert_eq!(task.owner_id(), Some(3));
        assert_eq!(task.due_label(), "2024-05-01");
    }

    #[test]
    fn status_draft_serializes_only_set_fields() {
        let body =
            serde_json::to_value(TaskDraft::status_change(9, TaskStatus::InProgress)).unwrap();
        assert_eq!(body, serde_json::json!({ "id": 9, "status": "in_progress" }));
    }

    #[test]
    fn create_validation() {
        let mut draft = TaskDraft {
            title: Some("  ".to_string()),
            due_date: Some("2024-01-01".to_string()),
            ..TaskDraft::default()
        };
        assert!(draft.validate_for_create().is_err());
        draft.title = Some("Ship".to_string());
        assert!(draft.validate_for_create().is_ok());
        draft.due_date = Some("tomorrow".to_string());
        assert!(draft.validate_for_create().is_err());
    }

    #[test]
    fn invalid_dates_are_labelled() {
        assert_eq!(format_date("not a date"), "Invalid Date");
        assert_eq!(format_date("2024-02-03T08:00:00Z"), "2024-02-03");
    }

    #[test]
    fn duration_and_progress() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 6, 0, 0).unwrap();
        assert_eq!(task_duration("2024-01-01", now).as_deref(), Some("2d 6h"));
        assert_eq!(progress_percentage("2024-01-01", "2024-01-05", now), Some(56));
        assert_eq!(progress_percentage("2024-01-01", "2024-01-02", now), Some(100));
        assert_eq!(progress_percentage("2024-01-04", "2024-01-05", now), Some(0));
        assert_eq!(progress_percentage("bad", "2024-01-05", now), None);
    }
}
