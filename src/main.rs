use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collector;
mod commands;
mod domain;
mod services;

use cli::Cli;
use collector::CollectError;
use domain::models::{ErrorBody, ErrorOut};
use services::inference::RuleError;
use services::pipeline::EngineError;
use services::settings::{load_rules, load_settings};
use services::storage::StorageError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        let (code, exit) = classify(&e);
        if cli.json {
            let out = ErrorOut {
                ok: false,
                error: ErrorBody {
                    code,
                    message: format!("{:#}", e),
                },
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&out)
                    .unwrap_or_else(|_| r#"{"ok":false}"#.to_string())
            );
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(exit);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings()?;
    let rules = load_rules(cli.rules.as_deref())?;
    commands::handle_commands(cli, &settings, &rules)
}

/// Maps error kinds onto the stable `--json` error codes and exit
/// statuses: 0 success, 2 no-such-user, 1 anything else.
fn classify(e: &anyhow::Error) -> (&'static str, i32) {
    if let Some(collect) = e.downcast_ref::<CollectError>() {
        return match collect {
            CollectError::UserNotFound(_) => ("USER_NOT_FOUND", 2),
            CollectError::RateLimited => ("RATE_LIMITED", 1),
            _ => ("INTERNAL", 1),
        };
    }
    if let Some(engine) = e.downcast_ref::<EngineError>() {
        return match engine {
            EngineError::InsufficientData => ("INSUFFICIENT_DATA", 1),
            EngineError::Rule(_) => ("RULE_CONFIG", 1),
        };
    }
    if e.downcast_ref::<RuleError>().is_some() {
        return ("RULE_CONFIG", 1);
    }
    if e.downcast_ref::<StorageError>().is_some() {
        return ("REPORT_WRITE", 1);
    }
    ("INTERNAL", 1)
}
