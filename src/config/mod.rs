pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sheet-mailer")]
#[command(about = "Mail corrected homework sheets to the students named in their file names")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sheet-mailer.toml")]
    pub config: String,

    /// Sheet number; asked for interactively when omitted
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Read sheets from this directory instead of <root>/<prefix><sheet>
    #[arg(long)]
    pub dir: Option<String>,

    /// Match and compose every message without sending anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary_json: Option<String>,

    /// Log as JSON lines instead of compact text
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Pads a one-digit sheet number to two digits (`5` -> `05`).
pub fn normalize_sheet_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() == 1 {
        format!("0{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sheet_number() {
        assert_eq!(normalize_sheet_number("5"), "05");
        assert_eq!(normalize_sheet_number(" 7\n"), "07");
        assert_eq!(normalize_sheet_number("12"), "12");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_defaults() {
        let cli = CliConfig::parse_from(["sheet-mailer", "--sheet", "3", "--dry-run"]);
        assert_eq!(cli.config, "sheet-mailer.toml");
        assert_eq!(cli.sheet.as_deref(), Some("3"));
        assert!(cli.dry_run);
        assert!(cli.dir.is_none());
    }
}
