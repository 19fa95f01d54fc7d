use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecklistError {
    #[error("document '{0}' is not on the checklist")]
    UnknownDocument(String),
    #[error("completion ratio requested on an empty checklist")]
    EmptyChecklist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Uploaded,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Uploaded => "Uploaded",
        }
    }
}

/// A named document category requested of the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredDocument {
    pub id: String,
    pub name: String,
    pub status: DocumentStatus,
}

/// Required documents in display order. Entries are never removed and only
/// move from pending to uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentChecklist {
    documents: Vec<RequiredDocument>,
}

impl DocumentChecklist {
    pub fn initialize<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let documents = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let id = unique_id(&name, &mut seen);
                RequiredDocument {
                    id,
                    name,
                    status: DocumentStatus::Pending,
                }
            })
            .collect();

        Self { documents }
    }

    /// Returns the checklist with `document_id` uploaded. Uploading an
    /// already-uploaded entry yields an identical checklist.
    pub fn mark_uploaded(&self, document_id: &str) -> Result<Self, ChecklistError> {
        let position = self
            .documents
            .iter()
            .position(|document| document.id == document_id)
            .ok_or_else(|| ChecklistError::UnknownDocument(document_id.to_owned()))?;

        let mut next = self.clone();
        next.documents[position].status = DocumentStatus::Uploaded;
        Ok(next)
    }

    pub fn completion_count(&self) -> (usize, usize) {
        let uploaded = self
            .documents
            .iter()
            .filter(|document| document.status == DocumentStatus::Uploaded)
            .count();
        (uploaded, self.documents.len())
    }

    pub fn completion_ratio(&self) -> Result<f64, ChecklistError> {
        let (uploaded, total) = self.completion_count();
        if total == 0 {
            return Err(ChecklistError::EmptyChecklist);
        }
        Ok(uploaded as f64 / total as f64)
    }

    pub fn get(&self, document_id: &str) -> Option<&RequiredDocument> {
        self.documents
            .iter()
            .find(|document| document.id == document_id)
    }

    pub fn documents(&self) -> &[RequiredDocument] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Append-only record of uploaded file names in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadedDocumentLog {
    files: Vec<String>,
}

impl UploadedDocumentLog {
    pub fn append(&self, file_name: impl Into<String>) -> Self {
        let mut files = self.files.clone();
        files.push(file_name.into());
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

fn unique_id(name: &str, seen: &mut HashSet<String>) -> String {
    let base = slugify(name);
    let base = if base.is_empty() {
        "document".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
