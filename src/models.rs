use serde::{Deserialize, Serialize};

/// Owner embedded in task payloads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TaskUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl TaskUser {
    /// Avatar fallback: first letter of the display name.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A user account. `coins` is server-authoritative and never adjusted locally.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub coins: i64,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProjectTaskSummary {
    pub id: u64,
    pub title: String,
    pub status: String,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<ProjectTaskSummary>,
}

impl Project {
    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.status == "done").count()
    }
}

/// `/dashboard/detailed_projects` returns projects with their task summaries inlined.
pub type DetailedProject = Project;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    #[serde(default)]
    pub todo: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub done: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DashboardOverview {
    pub total_projects: u64,
    pub total_users: u64,
    pub total_tasks: u64,
    #[serde(default)]
    pub tasks_by_status: StatusCounts,
    #[serde(default)]
    pub completion_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub tasks_count: u64,
}

/// Body returned by the OAuth callback exchange.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_parses() {
        let raw = serde_json::json!({
            "total_projects": 2,
            "total_users": 5,
            "total_tasks": 12,
            "tasks_by_status": { "todo": 4, "in_progress": 3, "done": 5 },
            "completion_rate": 41.67
        });
        let overview: DashboardOverview = serde_json::from_value(raw).unwrap();
        assert_eq!(overview.tasks_by_status.done, 5);
        assert!((overview.completion_rate - 41.67).abs() < f64::EPSILON);
    }

    #[test]
    fn project_counts_done_tasks() {
        let raw = serde_json::json!({
            "id": 1,
            "name": "Launch",
            "description": "Go live",
            "tasks": [
                { "id": 1, "title": "a", "status": "done", "coins": 5, "user_id": 1 },
                { "id": 2, "title": "b", "status": "todo", "coins": 5, "user_id": 1 }
            ]
        });
        let project: Project = serde_json::from_value(raw).unwrap();
        assert_eq!(project.completed_tasks(), 1);
    }

    #[test]
    fn user_without_name_falls_back_to_email() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 4,
            "email": "x@example.com",
            "profile_picture": null
        }))
        .unwrap();
        assert_eq!(user.display_name(), "x@example.com");
        assert_eq!(user.coins, 0);
    }
}
