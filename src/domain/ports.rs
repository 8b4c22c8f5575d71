use crate::domain::model::{OutgoingMail, StudentRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where corrected sheets live: a directory on disk, or memory in tests.
pub trait SheetSource: Send + Sync {
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn read_file(&self, name: &str)
        -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Picks one of several students sharing a surname.
///
/// Each call is one question and one answer. `None` means the answer was not
/// a number. The caller checks the range and owns the attempt budget.
pub trait ChoicePrompter {
    fn resolve_ambiguity(
        &mut self,
        surname: &str,
        candidates: &[&StudentRecord],
    ) -> Result<Option<usize>>;
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}
