pub mod dispatcher;
pub mod filename;
pub mod matcher;
pub mod roster;
pub mod run;

pub use crate::domain::model::{ResolvedTarget, SheetFile, StudentRecord};
pub use crate::domain::ports::{ChoicePrompter, MailTransport, SheetSource};
pub use crate::utils::error::Result;
