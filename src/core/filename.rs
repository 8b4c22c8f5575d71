use crate::config::toml_config::SheetsConfig;
use crate::domain::model::ParsedSheetName;
use crate::utils::error::{MailerError, Result};
use crate::utils::validation::validate_single_char;

/// `<sheet-number><delimiter><surname>[<delimiter><surname>...]<suffix>`
///
/// `prefix_len` covers the sheet number and the delimiter after it, so
/// `05_Meier_Schmidt_korrigiert.pdf` has a prefix of 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPattern {
    prefix_len: usize,
    delimiter: char,
    suffix: String,
}

impl SheetPattern {
    pub fn new(prefix_len: usize, delimiter: char, suffix: impl Into<String>) -> Self {
        Self {
            prefix_len,
            delimiter,
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &SheetsConfig) -> Result<Self> {
        let delimiter = validate_single_char("sheets.delimiter", &config.delimiter)?;
        Ok(Self::new(config.prefix_len, delimiter, config.suffix.clone()))
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
    }

    pub fn parse(&self, file_name: &str) -> Result<ParsedSheetName> {
        let fail = |reason: String| MailerError::FilenameError {
            file_name: file_name.to_string(),
            reason,
        };

        let stem = file_name
            .strip_suffix(self.suffix.as_str())
            .ok_or_else(|| fail(format!("does not end with '{}'", self.suffix)))?;

        let split_at = match stem.char_indices().nth(self.prefix_len) {
            Some((idx, _)) => idx,
            None if stem.chars().count() == self.prefix_len => stem.len(),
            None => {
                return Err(fail(format!(
                    "shorter than the {}-character sheet prefix",
                    self.prefix_len
                )))
            }
        };
        let (prefix, names) = stem.split_at(split_at);

        let sheet_number = match prefix.strip_suffix(self.delimiter) {
            Some(sheet) if !sheet.contains(self.delimiter) => sheet,
            _ => {
                return Err(fail(format!(
                    "sheet prefix must be {} characters ending in '{}'",
                    self.prefix_len, self.delimiter
                )))
            }
        };
        if sheet_number.is_empty() {
            return Err(fail("missing sheet number".to_string()));
        }
        if names.is_empty() {
            return Err(fail("no surname between prefix and suffix".to_string()));
        }

        let surnames: Vec<String> = names.split(self.delimiter).map(str::to_string).collect();
        if surnames.iter().any(String::is_empty) {
            return Err(fail(format!("empty surname between '{}' delimiters", self.delimiter)));
        }

        Ok(ParsedSheetName {
            sheet_number: sheet_number.to_string(),
            surnames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrected() -> SheetPattern {
        SheetPattern::new(3, '_', "_corrected.pdf")
    }

    #[test]
    fn test_parse_group_submission() {
        let parsed = corrected().parse("05_Meier_Schmidt_corrected.pdf").unwrap();

        assert_eq!(parsed.sheet_number, "05");
        assert_eq!(parsed.surnames, vec!["Meier", "Schmidt"]);
    }

    #[test]
    fn test_parse_single_author_with_default_config() {
        let pattern = SheetPattern::from_config(&SheetsConfig::default()).unwrap();
        let parsed = pattern.parse("11_Nguyen_korrigiert.pdf").unwrap();

        assert_eq!(parsed.sheet_number, "11");
        assert_eq!(parsed.surnames, vec!["Nguyen"]);
    }

    #[test]
    fn test_matches_only_on_suffix() {
        let pattern = corrected();

        assert!(pattern.matches("05_Meier_corrected.pdf"));
        assert!(!pattern.matches("05_Meier.pdf"));
        assert!(!pattern.matches("05_Meier_corrected.pdf.bak"));
    }

    #[test]
    fn test_malformed_names_fail_clearly() {
        let pattern = corrected();

        for name in [
            "05_Meier.pdf",
            "05_corrected.pdf",
            "5_corrected.pdf",
            "05_Meier__Schmidt_corrected.pdf",
            "05_Meier__corrected.pdf",
            "5_Meier_corrected.pdf",
            "05Meier_corrected.pdf",
            "0__Meier_corrected.pdf",
        ] {
            let err = pattern.parse(name).unwrap_err();
            assert!(
                matches!(err, MailerError::FilenameError { ref file_name, .. } if file_name == name),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn test_prefix_must_end_in_delimiter() {
        let pattern = SheetPattern::new(3, '_', "_korrigiert.pdf");

        for name in ["5_Meier_korrigiert.pdf", "05Meier_korrigiert.pdf"] {
            match pattern.parse(name) {
                Err(MailerError::FilenameError { reason, .. }) => {
                    assert_eq!(reason, "sheet prefix must be 3 characters ending in '_'");
                }
                other => panic!("{name} should not parse: {other:?}"),
            }
        }
    }

    #[test]
    fn test_prefix_counts_characters() {
        let parsed = corrected().parse("05_Müller_Öztürk_corrected.pdf").unwrap();
        assert_eq!(parsed.surnames, vec!["Müller", "Öztürk"]);

        let parsed = corrected().parse("Ü1_Meier_corrected.pdf").unwrap();
        assert_eq!(parsed.sheet_number, "Ü1");
        assert_eq!(parsed.surnames, vec!["Meier"]);
    }
}
