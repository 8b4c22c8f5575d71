use crate::adapters::smtp::build_message;
use crate::config::toml_config::{MailConfig, MessageConfig};
use crate::domain::model::{DispatchReport, FailedSend, OutgoingMail, ResolvedTarget, SentMail};
use crate::domain::ports::{MailTransport, SheetSource};
use crate::utils::error::{MailerError, Result};
use std::time::Duration;

/// Sender identity, templates and retry budget for one run.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub from: String,
    pub recipient_domain: String,
    pub subject_template: String,
    pub body_template: String,
    pub sender_name: String,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl DispatchSettings {
    pub fn from_config(mail: &MailConfig, message: &MessageConfig) -> Self {
        Self {
            from: mail.from.clone(),
            recipient_domain: mail.recipient_domain.clone(),
            subject_template: message.subject.clone(),
            body_template: message.body.clone(),
            sender_name: message.sender_name.clone(),
            retry_attempts: mail.retry_attempts,
            retry_delay: mail.retry_delay(),
        }
    }
}

pub struct Dispatcher<T: MailTransport, S: SheetSource> {
    transport: T,
    source: S,
    settings: DispatchSettings,
}

impl<T: MailTransport, S: SheetSource> Dispatcher<T, S> {
    pub fn new(transport: T, source: S, settings: DispatchSettings) -> Self {
        Self {
            transport,
            source,
            settings,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fills `{sheet}`, `{first_name}`, `{surname}` and `{sender_name}`.
    fn render(&self, template: &str, sheet_number: &str, target: &ResolvedTarget) -> String {
        template
            .replace("{sheet}", sheet_number)
            .replace("{first_name}", &target.student.first_name)
            .replace("{surname}", &target.student.surname)
            .replace("{sender_name}", &self.settings.sender_name)
    }

    pub fn compose(
        &self,
        sheet_number: &str,
        target: &ResolvedTarget,
        attachment: Vec<u8>,
    ) -> OutgoingMail {
        OutgoingMail {
            from: self.settings.from.clone(),
            to: target.student.email_address(&self.settings.recipient_domain),
            subject: self.render(&self.settings.subject_template, sheet_number, target),
            body: self.render(&self.settings.body_template, sheet_number, target),
            attachment_name: target.file.file_name.clone(),
            attachment,
        }
    }

    async fn prepare(&self, sheet_number: &str, target: &ResolvedTarget) -> Result<OutgoingMail> {
        let attachment = self.source.read_file(&target.file.file_name).await?;
        tracing::debug!(
            "Read {} ({} bytes)",
            target.file.file_name,
            attachment.len()
        );
        Ok(self.compose(sheet_number, target, attachment))
    }

    /// Returns the number of attempts used, or the last error with it. Only
    /// transport failures are retried; a bad address fails on the first try.
    async fn send_with_retries(&self, mail: &OutgoingMail) -> (u32, Result<()>) {
        let budget = self.settings.retry_attempts + 1;
        let mut attempt = 1;
        loop {
            match self.transport.send(mail).await {
                Ok(()) => return (attempt, Ok(())),
                Err(e @ MailerError::TransportError { .. }) if attempt < budget => {
                    tracing::warn!(
                        "Sending to {} failed (attempt {}/{}): {}",
                        mail.to,
                        attempt,
                        budget,
                        e
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return (attempt, Err(e)),
            }
        }
    }

    /// Sends one message per target, one after another. A failing message is
    /// recorded and the batch moves on.
    pub async fn dispatch(&self, sheet_number: &str, targets: &[ResolvedTarget]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for target in targets {
            let recipient = target.student.email_address(&self.settings.recipient_domain);

            let mail = match self.prepare(sheet_number, target).await {
                Ok(mail) => mail,
                Err(e) => {
                    tracing::error!("Cannot prepare mail for {}: {}", recipient, e);
                    report.failed.push(FailedSend {
                        recipient,
                        file_name: target.file.file_name.clone(),
                        attempts: 0,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let (attempts, outcome) = self.send_with_retries(&mail).await;
            match outcome {
                Ok(()) => {
                    tracing::info!("Sent {} to {}", mail.attachment_name, recipient);
                    println!(
                        "E-Mail to {} ({}) was sent successfully.",
                        target.student.first_name, recipient
                    );
                    report.sent.push(SentMail {
                        recipient,
                        first_name: target.student.first_name.clone(),
                        file_name: target.file.file_name.clone(),
                        attempts,
                        sent_at: chrono::Local::now(),
                    });
                }
                Err(e) => {
                    tracing::error!(
                        "Giving up on {} after {} attempts: {}",
                        recipient,
                        attempts,
                        e
                    );
                    println!("E-Mail to {} ({}) FAILED: {}", target.student.first_name, recipient, e);
                    report.failed.push(FailedSend {
                        recipient,
                        file_name: target.file.file_name.clone(),
                        attempts,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Reads, composes and builds every message without handing it to the
    /// transport, so bad addresses show up before the real run.
    pub async fn preview(&self, sheet_number: &str, targets: &[ResolvedTarget]) -> DispatchReport {
        let mut report = DispatchReport {
            dry_run: true,
            ..DispatchReport::default()
        };

        for target in targets {
            let prepared = self
                .prepare(sheet_number, target)
                .await
                .and_then(|mail| build_message(&mail).map(|_| mail));
            match prepared {
                Ok(mail) => {
                    println!(
                        "[dry run] {} -> {} \"{}\" ({} bytes)",
                        mail.attachment_name,
                        mail.to,
                        mail.subject,
                        mail.attachment.len()
                    );
                }
                Err(e) => {
                    tracing::error!("Cannot prepare {}: {}", target.file.file_name, e);
                    report.failed.push(FailedSend {
                        recipient: target.student.email_address(&self.settings.recipient_domain),
                        file_name: target.file.file_name.clone(),
                        attempts: 0,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SheetFile, StudentRecord};
    use crate::utils::error::MailerError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
    }

    impl MemorySource {
        fn with(files: &[(&str, &[u8])]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(name, data)| (name.to_string(), data.to_vec()))
                    .collect(),
            }
        }
    }

    impl SheetSource for MemorySource {
        async fn list_files(&self) -> Result<Vec<String>> {
            let mut names: Vec<String> = self.files.keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn read_file(&self, name: &str) -> Result<Vec<u8>> {
            self.files.get(name).cloned().ok_or_else(|| {
                MailerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", name),
                ))
            })
        }
    }

    /// Records every mail; fails the first `failures` sends to the given address.
    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<OutgoingMail>>>,
        failing_address: Option<String>,
        failures: Arc<AtomicU32>,
    }

    impl RecordingTransport {
        fn failing(address: &str, failures: u32) -> Self {
            Self {
                failing_address: Some(address.to_string()),
                failures: Arc::new(AtomicU32::new(failures)),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            if self.failing_address.as_deref() == Some(mail.to.as_str())
                && self
                    .failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(MailerError::TransportError {
                    message: "421 service not available".to_string(),
                });
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn settings() -> DispatchSettings {
        DispatchSettings {
            from: "tutor@uni-goettingen.de".to_string(),
            recipient_domain: "stud.uni-goettingen.de".to_string(),
            subject_template: "AGLA1 Blatt {sheet} Korrektur".to_string(),
            body_template: "Hallo {first_name},\n\nViele Grüße,\n{sender_name}".to_string(),
            sender_name: "Sang".to_string(),
            retry_attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }

    fn target(surname: &str, first_name: &str, username: &str, file: &str) -> ResolvedTarget {
        ResolvedTarget {
            student: StudentRecord::new(surname, first_name, username),
            file: SheetFile::new(file),
        }
    }

    const GROUP_FILE: &str = "05_Meier_Schmidt_korrigiert.pdf";

    fn group_targets() -> Vec<ResolvedTarget> {
        vec![
            target("Meier", "Anna", "anna.meier", GROUP_FILE),
            target("Schmidt", "Ben", "ben.schmidt", GROUP_FILE),
        ]
    }

    #[tokio::test]
    async fn test_dispatch_composes_one_mail_per_target() {
        let transport = RecordingTransport::default();
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(transport.clone(), source, settings());

        let report = dispatcher.dispatch("05", &group_targets()).await;

        assert_eq!(report.sent.len(), 2);
        assert!(report.failed.is_empty());

        let sent = transport.sent();
        assert_eq!(sent[0].to, "anna.meier@stud.uni-goettingen.de");
        assert_eq!(sent[1].to, "ben.schmidt@stud.uni-goettingen.de");
        assert_eq!(sent[0].subject, "AGLA1 Blatt 05 Korrektur");
        assert_eq!(sent[0].body, "Hallo Anna,\n\nViele Grüße,\nSang");
        assert_eq!(sent[1].body, "Hallo Ben,\n\nViele Grüße,\nSang");
        for mail in &sent {
            assert_eq!(mail.attachment_name, GROUP_FILE);
            assert_eq!(mail.attachment, b"%PDF");
            assert_eq!(mail.from, "tutor@uni-goettingen.de");
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let transport = RecordingTransport::failing("anna.meier@stud.uni-goettingen.de", 1);
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(transport.clone(), source, settings());

        let report = dispatcher.dispatch("05", &group_targets()).await;

        assert!(report.failed.is_empty());
        assert_eq!(report.sent[0].attempts, 2);
        assert_eq!(report.sent[1].attempts, 1);
    }

    #[tokio::test]
    async fn test_persistent_failure_is_isolated() {
        let transport = RecordingTransport::failing("anna.meier@stud.uni-goettingen.de", 10);
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(transport.clone(), source, settings());

        let report = dispatcher.dispatch("05", &group_targets()).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, "anna.meier@stud.uni-goettingen.de");
        assert_eq!(report.failed[0].attempts, 2);
        assert_eq!(report.sent.len(), 1);
        assert_eq!(transport.sent()[0].to, "ben.schmidt@stud.uni-goettingen.de");
    }

    #[tokio::test]
    async fn test_missing_file_is_recorded_as_failure() {
        let transport = RecordingTransport::default();
        let dispatcher = Dispatcher::new(transport.clone(), MemorySource::default(), settings());

        let report = dispatcher.dispatch("05", &group_targets()).await;

        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].attempts, 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_preview_never_touches_transport() {
        let transport = RecordingTransport::default();
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(transport.clone(), source, settings());

        let report = dispatcher.preview("05", &group_targets()).await;

        assert!(report.dry_run);
        assert!(report.failed.is_empty());
        assert!(transport.sent().is_empty());
    }

    /// Rejects every mail the way message building rejects a bad mailbox.
    #[derive(Clone, Default)]
    struct AddressRejectingTransport {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl MailTransport for AddressRejectingTransport {
        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MailerError::AddressError {
                address: mail.to.clone(),
                reason: "invalid user".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_address_errors_are_not_retried() {
        let transport = AddressRejectingTransport::default();
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(
            transport.clone(),
            source,
            DispatchSettings {
                retry_attempts: 3,
                retry_delay: Duration::from_secs(60),
                ..settings()
            },
        );

        let report = dispatcher.dispatch("05", &group_targets()).await;

        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|failed| failed.attempts == 1));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_preview_reports_invalid_address() {
        let transport = RecordingTransport::default();
        let source = MemorySource::with(&[(GROUP_FILE, b"%PDF")]);
        let dispatcher = Dispatcher::new(transport.clone(), source, settings());
        let targets = vec![
            target("Meier", "Anna", "", GROUP_FILE),
            target("Schmidt", "Ben", "ben.schmidt", GROUP_FILE),
        ];

        let report = dispatcher.preview("05", &targets).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, "@stud.uni-goettingen.de");
        assert!(report.failed[0].error.contains("Invalid email address"));
        assert!(transport.sent().is_empty());
    }
}
