use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::User;

/// Represents the priority of a task.
///
/// Serialized with the API's wire names; `FromStr` also accepts the lowercase slugs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskPriority {
    /// Low priority.
    #[serde(rename = "Baja")]
    Low,
    /// Medium priority.
    #[serde(rename = "Media")]
    Medium,
    /// High priority.
    #[serde(rename = "Alta")]
    High,
    /// Urgent priority.
    #[serde(rename = "Urgente")]
    Urgent,
}

/// Represents the status of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[serde(rename = "Pendiente")]
    Pending,
    /// Task is currently being worked on.
    #[serde(rename = "En Progreso")]
    InProgress,
    /// Task cannot progress until something else happens.
    #[serde(rename = "Bloqueada")]
    Blocked,
    /// Task is completed and under review.
    #[serde(rename = "En Revisión")]
    InReview,
    /// Task is completed.
    #[serde(rename = "Completada")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::InReview,
        TaskStatus::Completed,
    ];

    /// Wire name, as used in bodies and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pendiente",
            TaskStatus::InProgress => "En Progreso",
            TaskStatus::Blocked => "Bloqueada",
            TaskStatus::InReview => "En Revisión",
            TaskStatus::Completed => "Completada",
        }
    }

    /// Command-line spelling.
    pub fn slug(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::InReview => "in_review",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.slug() == s || status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown status {:?} (expected pending, in_progress, blocked, in_review or completed)",
                    s
                )
            })
    }
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Baja",
            TaskPriority::Medium => "Media",
            TaskPriority::High => "Alta",
            TaskPriority::Urgent => "Urgente",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.slug() == s || priority.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown priority {:?} (expected low, medium, high or urgent)",
                    s
                )
            })
    }
}

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The priority of the task. The server applies its default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// The status of the task. New tasks start as pending when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Optional due date for the task.
    #[serde(
        default,
        with = "super::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDateTime>,

    /// Users to assign on creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_user_ids: Vec<i64>,
}

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: i64,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    #[serde(default)]
    pub description: Option<String>,
    /// The current status of the task.
    pub status: TaskStatus,
    /// The priority of the task.
    pub priority: TaskPriority,
    /// Optional due date for the task.
    #[serde(default, with = "super::timestamp")]
    pub due_date: Option<NaiveDateTime>,
    // The server writes local times without an offset.
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "super::timestamp")]
    pub updated_at: Option<NaiveDateTime>,
    /// Identifier of the user who created the task.
    #[serde(default)]
    pub creator_id: Option<i64>,
    /// Users currently assigned to the task.
    #[serde(default)]
    pub assigned_users: Vec<User>,
}

impl Task {
    pub fn is_assigned_to(&self, user_id: i64) -> bool {
        self.assigned_users.iter().any(|u| u.id == user_id)
    }
}

/// Filters accepted by `GET /tasks`. Absent fields are not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Only tasks assigned to this user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(
        default,
        with = "super::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDateTime>,
}
