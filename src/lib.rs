pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::prompt::{ConsolePrompter, ScriptedChooser};
pub use adapters::smtp::SmtpMailer;
pub use config::{cli::LocalSheetDirectory, normalize_sheet_number, toml_config::TomlConfig};
pub use self::core::{
    dispatcher::{DispatchSettings, Dispatcher},
    filename::SheetPattern,
    matcher::Matcher,
    roster::Roster,
    run::MailRun,
};
pub use utils::error::{MailerError, Result};
