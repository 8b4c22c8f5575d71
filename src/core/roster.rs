use crate::config::toml_config::RosterConfig;
use crate::domain::model::StudentRecord;
use crate::utils::error::{MailerError, Result};
use crate::utils::validation::validate_single_char;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Students loaded from the roster export. Read-only after loading.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<StudentRecord>,
    duplicates: BTreeSet<String>,
}

impl Roster {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        let duplicates = duplicate_surnames(&records);
        Self {
            records,
            duplicates,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, config: &RosterConfig) -> Result<Self> {
        tracing::debug!("Loading roster from {}", path.as_ref().display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    pub fn from_reader<R: Read>(reader: R, config: &RosterConfig) -> Result<Self> {
        let delimiter = validate_single_char("roster.delimiter", &config.delimiter)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim(), idx))
            .collect();

        let wanted = [
            &config.username_column,
            &config.surname_column,
            &config.first_name_column,
        ];
        let missing: Vec<String> = wanted
            .iter()
            .filter(|column| !position.contains_key(column.as_str()))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MailerError::DataFormatError { missing });
        }

        let username_idx = position[config.username_column.as_str()];
        let surname_idx = position[config.surname_column.as_str()];
        let first_name_idx = position[config.first_name_column.as_str()];

        let mut records = Vec::new();
        let mut seen_usernames = HashSet::new();
        for row in reader.records() {
            let row = row?;
            let cell = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();
            let record = StudentRecord {
                surname: cell(surname_idx),
                first_name: cell(first_name_idx),
                username_fragment: cell(username_idx),
            };

            if record.surname.is_empty()
                && record.first_name.is_empty()
                && record.username_fragment.is_empty()
            {
                continue;
            }
            if !seen_usernames.insert(record.username_fragment.clone()) {
                tracing::warn!(
                    "Username '{}' appears more than once in the roster",
                    record.username_fragment
                );
            }
            records.push(record);
        }

        let roster = Self::new(records);
        tracing::info!(
            "Loaded {} students, {} ambiguous surnames",
            roster.len(),
            roster.duplicates.len()
        );
        Ok(roster)
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicate_surnames(&self) -> &BTreeSet<String> {
        &self.duplicates
    }

    pub fn is_ambiguous(&self, surname: &str) -> bool {
        self.duplicates.contains(surname)
    }

    /// Every record with exactly this surname, in roster order.
    pub fn find_by_surname(&self, surname: &str) -> Vec<&StudentRecord> {
        self.records
            .iter()
            .filter(|record| record.surname == surname)
            .collect()
    }
}

fn duplicate_surnames(records: &[StudentRecord]) -> BTreeSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.surname.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(surname, _)| surname.to_string())
        .collect()
}
