use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub surname: String,
    pub first_name: String,
    pub username_fragment: String,
}

impl StudentRecord {
    pub fn new(
        surname: impl Into<String>,
        first_name: impl Into<String>,
        username_fragment: impl Into<String>,
    ) -> Self {
        Self {
            surname: surname.into(),
            first_name: first_name.into(),
            username_fragment: username_fragment.into(),
        }
    }

    pub fn email_address(&self, domain: &str) -> String {
        format!("{}@{}", self.username_fragment, domain)
    }
}

/// One corrected submission as found in the sheet directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetFile {
    pub file_name: String,
}

impl SheetFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheetName {
    pub sheet_number: String,
    pub surnames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub student: StudentRecord,
    pub file: SheetFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedName {
    pub surname: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub targets: Vec<ResolvedTarget>,
    pub unresolved: Vec<UnresolvedName>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentMail {
    pub recipient: String,
    pub first_name: String,
    pub file_name: String,
    pub attempts: u32,
    pub sent_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSend {
    pub recipient: String,
    pub file_name: String,
    pub attempts: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub sent: Vec<SentMail>,
    pub failed: Vec<FailedSend>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sheet_number: String,
    pub files_found: usize,
    pub targets: usize,
    pub sent: Vec<SentMail>,
    pub failed: Vec<FailedSend>,
    pub unresolved: Vec<UnresolvedName>,
    pub skipped: Vec<SkippedFile>,
    pub dry_run: bool,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
