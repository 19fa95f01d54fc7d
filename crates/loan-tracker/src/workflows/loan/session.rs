//! Explicit dashboard state. Every operation takes the current session and
//! returns the next one; nothing is mutated in place.

use serde::Serialize;
use std::time::Duration;

use super::checklist::{ChecklistError, DocumentChecklist, RequiredDocument, UploadedDocumentLog};
use super::domain::ApplicationId;
use super::tasks::{Task, TaskBoard, TaskError, UploadThresholdRule};

pub const DOCUMENTS_COMPLETE_MESSAGE: &str = "All required documents have been uploaded!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSession {
    checklist: DocumentChecklist,
    log: UploadedDocumentLog,
    tasks: TaskBoard,
    rule: UploadThresholdRule,
    notice_delay: Duration,
    selected: Option<ApplicationId>,
}

/// Emitted when an upload completes a task. Presentation may wait
/// `surface_after_ms` before showing it; the task is already completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCompletionNotice {
    pub task: Task,
    pub message: &'static str,
    pub surface_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub checklist: Vec<RequiredDocument>,
    pub uploaded_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<TaskCompletionNotice>,
}

impl DashboardSession {
    pub fn new(
        checklist: DocumentChecklist,
        tasks: TaskBoard,
        rule: UploadThresholdRule,
        notice_delay: Duration,
    ) -> Self {
        Self {
            checklist,
            log: UploadedDocumentLog::default(),
            tasks,
            rule,
            notice_delay,
            selected: None,
        }
    }

    pub fn with_documents<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            DocumentChecklist::initialize(names),
            TaskBoard::standard(),
            UploadThresholdRule::default(),
            Duration::ZERO,
        )
    }

    pub fn checklist(&self) -> &DocumentChecklist {
        &self.checklist
    }

    pub fn log(&self) -> &UploadedDocumentLog {
        &self.log
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    pub fn selected(&self) -> Option<&ApplicationId> {
        self.selected.as_ref()
    }

    pub fn task(&self, task_id: &str) -> Result<&Task, TaskError> {
        self.tasks.task(task_id)
    }

    /// Uploads a file against a checklist entry. An unknown document leaves
    /// the log untouched.
    pub fn upload_document(
        &self,
        document_id: &str,
        file_name: &str,
    ) -> Result<(Self, UploadReceipt), ChecklistError> {
        let checklist = self.checklist.mark_uploaded(document_id)?;
        Ok(self.record(checklist, file_name))
    }

    /// Uploads a file that belongs to no checklist entry. It still counts
    /// toward the upload threshold.
    pub fn upload_supplemental(&self, file_name: &str) -> (Self, UploadReceipt) {
        self.record(self.checklist.clone(), file_name)
    }

    pub fn complete_task(&self, task_id: &str) -> Result<Self, TaskError> {
        let tasks = self.tasks.complete(task_id)?;
        Ok(Self {
            tasks,
            ..self.clone()
        })
    }

    pub fn select_application(&self, application_id: ApplicationId) -> Self {
        Self {
            selected: Some(application_id),
            ..self.clone()
        }
    }

    fn record(&self, checklist: DocumentChecklist, file_name: &str) -> (Self, UploadReceipt) {
        // log append must precede rule evaluation
        let log = self.log.append(file_name);
        let (tasks, flipped) = self.rule.apply(&self.tasks, log.len());

        let completion = flipped.map(|task| TaskCompletionNotice {
            task,
            message: DOCUMENTS_COMPLETE_MESSAGE,
            surface_after_ms: u64::try_from(self.notice_delay.as_millis()).unwrap_or(u64::MAX),
        });

        let receipt = UploadReceipt {
            checklist: checklist.documents().to_vec(),
            uploaded_files: log.files().to_vec(),
            completion,
        };

        let next = Self {
            checklist,
            log,
            tasks,
            ..self.clone()
        };

        (next, receipt)
    }
}
