use crate::core::dispatcher::Dispatcher;
use crate::core::filename::SheetPattern;
use crate::core::matcher::Matcher;
use crate::core::roster::Roster;
use crate::domain::model::{RunSummary, SheetFile};
use crate::domain::ports::{ChoicePrompter, MailTransport, SheetSource};
use crate::utils::error::Result;
use std::path::Path;

/// One sheet, start to finish: discover, match, send, summarize.
pub struct MailRun<T: MailTransport, S: SheetSource> {
    roster: Roster,
    pattern: SheetPattern,
    dispatcher: Dispatcher<T, S>,
    max_prompt_attempts: usize,
    dry_run: bool,
}

impl<T: MailTransport, S: SheetSource> MailRun<T, S> {
    pub fn new(roster: Roster, pattern: SheetPattern, dispatcher: Dispatcher<T, S>) -> Self {
        Self {
            roster,
            pattern,
            dispatcher,
            max_prompt_attempts: 3,
            dry_run: false,
        }
    }

    pub fn with_max_prompt_attempts(mut self, max_attempts: usize) -> Self {
        self.max_prompt_attempts = max_attempts;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Files in the sheet source that carry the configured suffix.
    pub async fn discover(&self) -> Result<Vec<SheetFile>> {
        let names = self.dispatcher.source().list_files().await?;
        let total = names.len();
        let sheets: Vec<SheetFile> = names
            .into_iter()
            .filter(|name| self.pattern.matches(name))
            .map(SheetFile::new)
            .collect();
        tracing::debug!(
            "{} of {} files end with '{}'",
            sheets.len(),
            total,
            self.pattern.suffix()
        );
        Ok(sheets)
    }

    pub async fn run<P: ChoicePrompter>(&self, sheet_number: &str, prompter: P) -> Result<RunSummary> {
        let sheets = self.discover().await?;
        println!("There are {} corrected sheets.", sheets.len());

        let report = Matcher::new(&self.roster, &self.pattern, prompter)
            .with_max_attempts(self.max_prompt_attempts)
            .with_expected_sheet(sheet_number)
            .match_files(&sheets)?;
        tracing::info!(
            "{} recipients, {} unknown names, {} skipped files",
            report.targets.len(),
            report.unresolved.len(),
            report.skipped.len()
        );

        let dispatch = if self.dry_run {
            self.dispatcher.preview(sheet_number, &report.targets).await
        } else {
            self.dispatcher.dispatch(sheet_number, &report.targets).await
        };

        let summary = RunSummary {
            sheet_number: sheet_number.to_string(),
            files_found: sheets.len(),
            targets: report.targets.len(),
            sent: dispatch.sent,
            failed: dispatch.failed,
            unresolved: report.unresolved,
            skipped: report.skipped,
            dry_run: dispatch.dry_run,
            finished_at: chrono::Local::now(),
        };
        print_summary(&summary);
        Ok(summary)
    }
}

/// Pretty-printed JSON, for keeping a record of who got which sheet.
pub fn write_summary<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn print_summary(summary: &RunSummary) {
    if summary.dry_run {
        println!(
            "Dry run for sheet {}: {} messages composed, nothing sent.",
            summary.sheet_number,
            summary.targets - summary.failed.len()
        );
    } else {
        println!(
            "Sheet {}: {} of {} messages sent.",
            summary.sheet_number,
            summary.sent.len(),
            summary.targets
        );
    }

    for failed in &summary.failed {
        println!("Failed: {} ({}): {}", failed.recipient, failed.file_name, failed.error);
    }
    for skipped in &summary.skipped {
        println!("Skipped file: {}", skipped.file_name);
    }
    if summary.unresolved.is_empty() {
        println!("All names were found in the roster.");
    } else {
        let names: Vec<&str> = summary
            .unresolved
            .iter()
            .map(|name| name.surname.as_str())
            .collect();
        println!("Unknown names: {}", names.join(", "));
    }
}
