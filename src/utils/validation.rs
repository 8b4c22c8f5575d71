use crate::utils::error::{MailerError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Returns the single character of a one-character string.
pub fn validate_single_char(field_name: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be exactly one character".to_string(),
        }),
    }
}

pub fn validate_domain(field_name: &str, domain: &str) -> Result<()> {
    validate_non_empty_string(field_name, domain)?;

    if domain.contains('@') || domain.chars().any(char::is_whitespace) {
        return Err(MailerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: domain.to_string(),
            reason: "Domain must not contain '@' or whitespace".to_string(),
        });
    }
    Ok(())
}

/// Catches `${VAR}` placeholders whose variable was not set at load time.
pub fn validate_substituted(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(MailerError::MissingConfigError {
            field: format!("{} (unresolved placeholder {})", field_name, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("roster.path", "Punkteliste.csv").is_ok());
        assert!(validate_path("roster.path", "").is_err());
        assert!(validate_path("roster.path", "a\0b").is_err());
    }

    #[test]
    fn test_validate_single_char() {
        assert_eq!(validate_single_char("roster.delimiter", ";").unwrap(), ';');
        assert!(validate_single_char("roster.delimiter", "").is_err());
        assert!(validate_single_char("roster.delimiter", ";;").is_err());
    }

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("mail.recipient_domain", "stud.uni-goettingen.de").is_ok());
        assert!(validate_domain("mail.recipient_domain", "@stud.uni-goettingen.de").is_err());
        assert!(validate_domain("mail.recipient_domain", " ").is_err());
    }

    #[test]
    fn test_validate_range_and_substitution() {
        assert!(validate_range("mail.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("mail.timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_substituted("mail.password", "${UNI_PW}").is_err());
        assert!(validate_substituted("mail.password", "hunter2").is_ok());
    }
}
