use crate::core::filename::SheetPattern;
use crate::core::roster::Roster;
use crate::domain::model::{
    MatchReport, ResolvedTarget, SheetFile, SkippedFile, StudentRecord, UnresolvedName,
};
use crate::domain::ports::ChoicePrompter;
use crate::utils::error::{MailerError, Result};

/// Turns sheet file names into (student, file) pairs.
pub struct Matcher<'a, P: ChoicePrompter> {
    roster: &'a Roster,
    pattern: &'a SheetPattern,
    prompter: P,
    max_attempts: usize,
    expected_sheet: Option<String>,
}

impl<'a, P: ChoicePrompter> Matcher<'a, P> {
    pub fn new(roster: &'a Roster, pattern: &'a SheetPattern, prompter: P) -> Self {
        Self {
            roster,
            pattern,
            prompter,
            max_attempts: 3,
            expected_sheet: None,
        }
    }

    /// How often an out-of-range choice is asked again before giving up.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Warn about files whose sheet number differs from the current run.
    pub fn with_expected_sheet(mut self, sheet_number: impl Into<String>) -> Self {
        self.expected_sheet = Some(sheet_number.into());
        self
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Resolves every surname of every file, in file order and then in the
    /// order the surnames appear in the file name.
    ///
    /// Unknown surnames and malformed file names are collected in the report.
    /// Only a disambiguation that cannot be answered aborts the run.
    pub fn match_files(&mut self, files: &[SheetFile]) -> Result<MatchReport> {
        let mut report = MatchReport::default();

        for file in files {
            let parsed = match self.pattern.parse(&file.file_name) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file.file_name, e);
                    report.skipped.push(SkippedFile {
                        file_name: file.file_name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Some(expected) = &self.expected_sheet {
                if &parsed.sheet_number != expected {
                    tracing::warn!(
                        "{} is labelled sheet {} but this run is sheet {}",
                        file.file_name,
                        parsed.sheet_number,
                        expected
                    );
                }
            }

            for surname in &parsed.surnames {
                match self.resolve(surname)? {
                    Some(student) => {
                        tracing::debug!(
                            "{} -> {} {} ({})",
                            file.file_name,
                            student.first_name,
                            student.surname,
                            student.username_fragment
                        );
                        report.targets.push(ResolvedTarget {
                            student,
                            file: file.clone(),
                        });
                    }
                    None => {
                        tracing::warn!("Unknown name '{}' in {}", surname, file.file_name);
                        report.unresolved.push(UnresolvedName {
                            surname: surname.clone(),
                            file_name: file.file_name.clone(),
                        });
                    }
                }
            }
        }

        Ok(report)
    }

    /// `None` when nobody in the roster has this surname.
    pub fn resolve(&mut self, surname: &str) -> Result<Option<StudentRecord>> {
        let candidates = self.roster.find_by_surname(surname);

        if candidates.is_empty() {
            return Ok(None);
        }
        if !self.roster.is_ambiguous(surname) {
            return Ok(Some(candidates[0].clone()));
        }

        for attempt in 1..=self.max_attempts {
            match self.prompter.resolve_ambiguity(surname, &candidates)? {
                Some(choice) => {
                    if let Some(student) = candidates.get(choice) {
                        return Ok(Some((*student).clone()));
                    }
                    tracing::warn!(
                        "Choice {} for '{}' is out of range 0..{} (attempt {}/{})",
                        choice,
                        surname,
                        candidates.len(),
                        attempt,
                        self.max_attempts
                    );
                }
                None => tracing::warn!(
                    "No number given for '{}' (attempt {}/{})",
                    surname,
                    attempt,
                    self.max_attempts
                ),
            }
        }

        Err(MailerError::SelectionError {
            surname: surname.to_string(),
            message: format!(
                "no valid choice among {} candidates after {} attempts",
                candidates.len(),
                self.max_attempts
            ),
        })
    }
}
