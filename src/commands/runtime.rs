use crate::cli::{Cli, Commands, RuleCommands};
use crate::collector;
use crate::domain::models::{AnalyzeOutcome, RuleCheckItem};
use crate::services::inference::RuleTable;
use crate::services::interests::Tokenizer;
use crate::services::output::{print_one, print_out};
use crate::services::pipeline;
use crate::services::report::{render_text, report_filename};
use crate::services::sentiment::SentimentScorer;
use crate::services::settings::Settings;
use crate::services::storage::{audit, write_report};

/// Capture the clock once per run. `REDSONA_GENERATED_AT` (RFC 3339) pins
/// the timestamp so identical inputs reproduce identical report bytes.
fn generation_timestamp() -> chrono::DateTime<chrono::Utc> {
    if let Ok(raw) = std::env::var("REDSONA_GENERATED_AT") {
        if let Ok(pinned) = chrono::DateTime::parse_from_rfc3339(&raw) {
            return pinned.with_timezone(&chrono::Utc);
        }
    }
    chrono::Utc::now()
}

pub fn handle_commands(cli: &Cli, settings: &Settings, rules: &RuleTable) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Analyze { target, limit } => {
            let username = collector::extract_username(target)?;
            let items = match &cli.activity_file {
                Some(path) => collector::load_activity_file(path)?,
                None => collector::fetch_user_activity(
                    &username,
                    limit.unwrap_or(settings.fetch_limit),
                )?,
            };

            let scorer = SentimentScorer::default();
            let tokenizer = Tokenizer::new(&settings.extra_stopwords, settings.min_token_len);
            let report = pipeline::run(
                &username,
                &items,
                settings,
                rules,
                &scorer,
                &tokenizer,
                generation_timestamp(),
            )?;

            let out_dir = cli
                .out_dir
                .clone()
                .unwrap_or_else(|| settings.output_dir.clone());
            let text = render_text(&report);
            let path = write_report(&out_dir, &report_filename(&username), &text)?;
            audit(
                "analyze",
                serde_json::json!({
                    "user": username,
                    "items": report.total_items,
                    "excluded": report.excluded_items,
                    "output": &path,
                }),
            );

            let outcome = AnalyzeOutcome {
                output: path,
                report,
            };
            print_one(cli.json, outcome, |o| {
                format!("persona saved to {}", o.output.display())
            })?;
        }
        Commands::Rules { command } => match command {
            RuleCommands::List => {
                print_out(cli.json, &rules.rules, |r| {
                    format!("{}\t{:?}", r.label, r.predicate)
                })?;
            }
            RuleCommands::Check => {
                // the table was parsed and validated at load, so every
                // rule that made it here is well-formed
                let report: Vec<RuleCheckItem> = rules
                    .rules
                    .iter()
                    .map(|r| RuleCheckItem {
                        label: r.label.clone(),
                        status: "ok".to_string(),
                    })
                    .collect();
                print_out(cli.json, &report, |c| format!("{}\t{}", c.label, c.status))?;
            }
        },
    }

    Ok(())
}
