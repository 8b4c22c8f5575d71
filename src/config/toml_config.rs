use crate::utils::error::{MailerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub roster: RosterConfig,
    pub sheets: SheetsConfig,
    pub mail: MailConfig,
    pub message: MessageConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub path: String,
    pub delimiter: String,
    pub username_column: String,
    pub surname_column: String,
    pub first_name_column: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: "Punkteliste.csv".to_string(),
            delimiter: ";".to_string(),
            username_column: "Stud.IP Benutzername".to_string(),
            surname_column: "Nachname".to_string(),
            first_name_column: "Vorname".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Directory holding one sub-directory per sheet.
    pub root: String,
    /// Sub-directory name before the sheet number, e.g. `Blatt` -> `Blatt05`.
    pub directory_prefix: String,
    /// Characters in front of the first surname (sheet number plus delimiter).
    pub prefix_len: usize,
    pub delimiter: String,
    pub suffix: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            directory_prefix: "Blatt".to_string(),
            prefix_len: 3,
            delimiter: "_".to_string(),
            suffix: "_korrigiert.pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub recipient_domain: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "email.stud.uni-goettingen.de".to_string(),
            port: 587,
            username: "${UNI_USER}".to_string(),
            password: "${UNI_PW}".to_string(),
            from: "${UNI_ADDRESS}".to_string(),
            recipient_domain: "stud.uni-goettingen.de".to_string(),
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_seconds: 5,
        }
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub subject: String,
    pub body: String,
    pub sender_name: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            subject: "AGLA1 Blatt {sheet} Korrektur".to_string(),
            body: "Hallo {first_name},\n\nanbei findest Du deinen korrigierten Zettel.\n\nViele Grüße,\n{sender_name}".to_string(),
            sender_name: "Sang".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub max_attempts: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MailerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: TomlConfig =
            toml::from_str(content).map_err(|e| MailerError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.substitute_env_vars();
        Ok(config)
    }

    /// Replaces `${VAR}` in the string fields that commonly carry secrets or
    /// machine-specific paths. Defaults reference variables too, so this runs
    /// after deserialization instead of on the raw text.
    fn substitute_env_vars(&mut self) {
        for field in [
            &mut self.roster.path,
            &mut self.sheets.root,
            &mut self.mail.host,
            &mut self.mail.username,
            &mut self.mail.password,
            &mut self.mail.from,
            &mut self.message.sender_name,
        ] {
            *field = substitute_env(field);
        }
    }

    /// `<root>/<directory_prefix><sheet>`
    pub fn sheet_directory(&self, sheet_number: &str) -> PathBuf {
        Path::new(&self.sheets.root).join(format!("{}{}", self.sheets.directory_prefix, sheet_number))
    }

    /// Checks that only matter when mail is really sent.
    pub fn validate_credentials(&self) -> Result<()> {
        validation::validate_substituted("mail.username", &self.mail.username)?;
        validation::validate_substituted("mail.password", &self.mail.password)?;
        validation::validate_substituted("mail.from", &self.mail.from)?;
        validation::validate_non_empty_string("mail.from", &self.mail.from)?;
        validation::validate_non_empty_string("mail.username", &self.mail.username)?;
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("roster.path", &self.roster.path)?;
        validation::validate_single_char("roster.delimiter", &self.roster.delimiter)?;
        for (field, column) in [
            ("roster.username_column", &self.roster.username_column),
            ("roster.surname_column", &self.roster.surname_column),
            ("roster.first_name_column", &self.roster.first_name_column),
        ] {
            validation::validate_non_empty_string(field, column)?;
        }

        validation::validate_path("sheets.root", &self.sheets.root)?;
        validation::validate_single_char("sheets.delimiter", &self.sheets.delimiter)?;
        validation::validate_non_empty_string("sheets.suffix", &self.sheets.suffix)?;

        validation::validate_non_empty_string("mail.host", &self.mail.host)?;
        validation::validate_range("mail.port", self.mail.port, 1, u16::MAX)?;
        validation::validate_domain("mail.recipient_domain", &self.mail.recipient_domain)?;
        validation::validate_range("mail.timeout_seconds", self.mail.timeout_seconds, 1, 600)?;
        validation::validate_range("mail.retry_attempts", self.mail.retry_attempts, 0, 10)?;

        validation::validate_non_empty_string("message.subject", &self.message.subject)?;
        validation::validate_positive_number("prompt.max_attempts", self.prompt.max_attempts, 1)?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 替換環境變數 (例如 ${UNI_PW})，未設定的變數保持原樣
pub fn substitute_env(content: &str) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
