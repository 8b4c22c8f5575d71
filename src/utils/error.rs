use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Roster is missing required columns: {}", missing.join(", "))]
    DataFormatError { missing: Vec<String> },

    #[error("Malformed sheet filename '{file_name}': {reason}")]
    FilenameError { file_name: String, reason: String },

    #[error("No usable choice for '{surname}': {message}")]
    SelectionError { surname: String, message: String },

    #[error("Mail transport failed: {message}")]
    TransportError { message: String },

    #[error("Invalid email address '{address}': {reason}")]
    AddressError { address: String, reason: String },

    #[error("Could not build message: {message}")]
    MessageError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Operator,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MailerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MailerError::CsvError(_)
            | MailerError::DataFormatError { .. }
            | MailerError::FilenameError { .. } => ErrorCategory::Input,
            MailerError::SelectionError { .. } => ErrorCategory::Operator,
            MailerError::TransportError { .. }
            | MailerError::AddressError { .. }
            | MailerError::MessageError { .. } => ErrorCategory::Network,
            MailerError::ConfigValidationError { .. }
            | MailerError::InvalidConfigValueError { .. }
            | MailerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MailerError::IoError(_) | MailerError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MailerError::FilenameError { .. } => ErrorSeverity::Low,
            MailerError::TransportError { .. } => ErrorSeverity::Medium,
            MailerError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MailerError::CsvError(_) => "Check that the roster file is a valid delimited text export",
            MailerError::DataFormatError { .. } => {
                "Check the [roster] column names and delimiter against the roster export header"
            }
            MailerError::FilenameError { .. } => {
                "Rename the file to <sheet>_<surname>[_<surname>...]<suffix>"
            }
            MailerError::SelectionError { .. } => {
                "Answer disambiguation prompts with one of the listed numbers"
            }
            MailerError::TransportError { .. } => {
                "Check the mail relay, network connection and credentials, then rerun"
            }
            MailerError::AddressError { .. } => {
                "Check mail.from, mail.recipient_domain and the roster usernames"
            }
            MailerError::MessageError { .. } => "Check the message templates",
            MailerError::ConfigValidationError { .. }
            | MailerError::InvalidConfigValueError { .. }
            | MailerError::MissingConfigError { .. } => {
                "Fix the configuration file or the environment variables it references"
            }
            MailerError::IoError(_) => "Check that the paths exist and are readable",
            MailerError::SerializationError(_) => "Check that the summary path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Input data problem: {}", self),
            ErrorCategory::Operator => format!("Run aborted by invalid input: {}", self),
            ErrorCategory::Network => format!("Sending mail failed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;
