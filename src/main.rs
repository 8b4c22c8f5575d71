use clap::Parser;
use sheet_mailer::core::run::write_summary;
use sheet_mailer::utils::error::{ErrorSeverity, MailerError};
use sheet_mailer::utils::{logger, validation::Validate};
use sheet_mailer::{
    normalize_sheet_number, CliConfig, ConsolePrompter, DispatchSettings, Dispatcher,
    LocalSheetDirectory, MailRun, Roster, SheetPattern, SmtpMailer, TomlConfig,
};
use std::path::PathBuf;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &MailerError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()).max(1));
}

fn load_config(args: &CliConfig) -> TomlConfig {
    let config = if std::path::Path::new(&args.config).exists() {
        tracing::info!("📁 Loading configuration from: {}", args.config);
        match TomlConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
                eprintln!("💡 Make sure the file is valid TOML");
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!("{} not found, using built-in defaults", args.config);
        match TomlConfig::from_toml_str("") {
            Ok(config) => config,
            Err(e) => fail(&e),
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }
    if !args.dry_run {
        if let Err(e) = config.validate_credentials() {
            fail(&e);
        }
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("Starting sheet-mailer");

    let config = load_config(&args);
    tracing::debug!("Config: {:?}", config.sheets);

    let mut prompter =
        ConsolePrompter::stdio().with_max_attempts(config.prompt.max_attempts);

    let sheet_number = match &args.sheet {
        Some(sheet) => normalize_sheet_number(sheet),
        None => match prompter.ask_sheet_number() {
            Ok(sheet) => normalize_sheet_number(&sheet),
            Err(e) => fail(&e),
        },
    };

    let roster = match Roster::load(&config.roster.path, &config.roster) {
        Ok(roster) => roster,
        Err(e) => fail(&e),
    };
    let pattern = match SheetPattern::from_config(&config.sheets) {
        Ok(pattern) => pattern,
        Err(e) => fail(&e),
    };

    let source = LocalSheetDirectory::new(
        args.dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.sheet_directory(&sheet_number)),
    );
    tracing::info!("📂 Sheet directory: {}", source.path().display());

    let transport = match SmtpMailer::new(&config.mail) {
        Ok(transport) => transport,
        Err(e) => fail(&e),
    };
    if !args.dry_run {
        match transport.test_connection().await {
            Ok(true) => tracing::info!("🔌 Mail relay {} accepted the login", config.mail.host),
            Ok(false) => fail(&MailerError::TransportError {
                message: format!("relay {} refused the connection", config.mail.host),
            }),
            Err(e) => fail(&e),
        }
    }
    let dispatcher = Dispatcher::new(
        transport,
        source,
        DispatchSettings::from_config(&config.mail, &config.message),
    );

    let run = MailRun::new(roster, pattern, dispatcher)
        .with_max_prompt_attempts(config.prompt.max_attempts)
        .with_dry_run(args.dry_run);

    let summary = match run.run(&sheet_number, prompter).await {
        Ok(summary) => summary,
        Err(e) => fail(&e),
    };

    if let Some(path) = &args.summary_json {
        if let Err(e) = write_summary(&summary, path) {
            fail(&e);
        }
        tracing::info!("📝 Summary written to {}", path);
    }

    if summary.has_failures() {
        std::process::exit(exit_code(ErrorSeverity::Medium));
    }

    Ok(())
}
