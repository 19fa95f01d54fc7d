use serde::{Deserialize, Serialize};

pub const UPLOAD_DOCUMENTS_TASK: &str = "upload-documents";
pub const DEFAULT_UPLOAD_THRESHOLD: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task '{0}' does not exist")]
    UnknownTask(String),
}

/// To-do item shown on the dashboard. Completion is never reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Completes `task` once `uploaded_log_len` reaches `threshold`.
///
/// Only the number of uploads is considered; which documents were uploaded
/// does not matter.
pub fn evaluate(task: &Task, uploaded_log_len: usize, threshold: usize) -> Task {
    if !task.completed && uploaded_log_len >= threshold {
        Task {
            completed: true,
            count: Some(0),
            ..task.clone()
        }
    } else {
        task.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadThresholdRule {
    pub task_id: String,
    pub threshold: usize,
}

impl UploadThresholdRule {
    pub fn new(task_id: impl Into<String>, threshold: usize) -> Self {
        Self {
            task_id: task_id.into(),
            threshold,
        }
    }

    /// Applies the rule to the board. Returns the board and, when the task
    /// flipped during this call, the newly completed task.
    pub fn apply(&self, board: &TaskBoard, uploaded_log_len: usize) -> (TaskBoard, Option<Task>) {
        let Some(task) = board.get(&self.task_id) else {
            return (board.clone(), None);
        };

        let next = evaluate(task, uploaded_log_len, self.threshold);
        if next == *task {
            return (board.clone(), None);
        }

        (board.replace(next.clone()), Some(next))
    }
}

impl Default for UploadThresholdRule {
    fn default() -> Self {
        Self::new(UPLOAD_DOCUMENTS_TASK, DEFAULT_UPLOAD_THRESHOLD)
    }
}

/// Ordered task list backing the dashboard's to-do panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Task::new(UPLOAD_DOCUMENTS_TASK, "Upload Documents").with_count(3),
            Task::new("verify-information", "Verify Information").completed(),
            Task::new("sign-agreements", "Sign Agreements"),
        ])
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task(&self, task_id: &str) -> Result<&Task, TaskError> {
        self.get(task_id)
            .ok_or_else(|| TaskError::UnknownTask(task_id.to_owned()))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Marks a task completed; completing twice is a no-op.
    pub fn complete(&self, task_id: &str) -> Result<Self, TaskError> {
        let task = self.task(task_id)?;
        if task.completed {
            return Ok(self.clone());
        }
        Ok(self.replace(task.clone().completed()))
    }

    fn replace(&self, updated: Task) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == updated.id {
                    updated.clone()
                } else {
                    task.clone()
                }
            })
            .collect();
        Self { tasks }
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::standard()
    }
}
