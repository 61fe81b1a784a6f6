//! Project tasks.

use std::fmt;

use super::id::{EntityId, Keyed};
use super::user::UserRef;
use crate::error::ValidationError;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        };
        write!(formatter, "{label}")
    }
}

/// A task within a project.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    id: EntityId,
    project_id: u64,
    title: String,
    status: TaskStatus,
    created_by: Option<UserRef>,
}

impl Task {
    /// Creates a validated task in the [`TaskStatus::Todo`] state.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank title.
    pub fn new(
        id: EntityId,
        project_id: u64,
        title: impl Into<String>,
        created_by: Option<UserRef>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        Ok(Self {
            id,
            project_id,
            title,
            status: TaskStatus::default(),
            created_by,
        })
    }

    /// The project this task belongs to.
    #[must_use]
    pub const fn project_id(&self) -> u64 {
        self.project_id
    }

    /// The task's title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current workflow state.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Who created the task, when known.
    #[must_use]
    pub const fn created_by(&self) -> Option<&UserRef> {
        self.created_by.as_ref()
    }

    /// Moves the task to a new workflow state.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Retitles the task.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank title.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        self.title = title;
        Ok(())
    }
}

impl Keyed for Task {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}
