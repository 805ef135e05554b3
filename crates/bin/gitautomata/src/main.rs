//! # gitautomata — GitHub automation server and CLI
//!
//! Composition root that wires the built-in automations, the GitHub client
//! and the HTTP adapter together.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, `.env`, env vars)
//! - Install the `tracing` subscriber
//! - Construct the GitHub client (REST or dry-run) and the automation runner
//! - `serve`: build the axum router, bind and serve until SIGTERM/SIGINT
//! - `run`, `list`, `init`, `test`: one-shot commands
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod commands;
mod config;
mod templates;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::templates::Template;

#[derive(Debug, Parser)]
#[command(name = "gitautomata", version)]
#[command(about = "Automate GitHub with webhook and manual workflows")]
struct Cli {
    /// Configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "GITAUTOMATA_CONFIG",
        default_value = config::CONFIG_FILE
    )]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server (health, automation API and webhook endpoint).
    Serve,
    /// Run an automation's manual entry point.
    Run {
        /// Automation name.
        automation: String,
        /// Arguments as a JSON array, e.g. `["octo", "hello", 42]`.
        #[arg(short, long)]
        args: Option<String>,
    },
    /// List registered automations.
    List,
    /// Print a source template for a new automation.
    Init {
        /// Automation name.
        name: Option<String>,
        #[arg(short, long, value_enum, default_value_t = Template::Basic)]
        template: Template,
        /// Write `<name>.rs` into this directory instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dispatch a synthetic webhook event without contacting GitHub.
    Test {
        /// Event type, e.g. `push` or `pull_request`.
        #[arg(short, long, default_value = "push")]
        event: String,
        /// JSON object merged over the synthetic payload.
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.filter);

    match execute(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter '{filter}' ({err}), falling back to 'info'");
        EnvFilter::new("info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn execute(command: Command, config: &Config) -> anyhow::Result<ExitCode> {
    match command {
        Command::Serve => commands::serve(config).await,
        Command::Run { automation, args } => {
            commands::run(config, &automation, args.as_deref()).await
        }
        Command::List => commands::list(config),
        Command::Init {
            name,
            template,
            output,
        } => commands::init(name.as_deref(), template, output.as_deref()),
        Command::Test { event, data } => commands::test(config, &event, data.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn should_have_consistent_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_run_with_args() {
        let argv = ["gitautomata", "run", "auto-label", "--args", r#"["o","r",1]"#];
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Run { automation, args } => {
                assert_eq!(automation, "auto-label");
                assert_eq!(args.as_deref(), Some(r#"["o","r",1]"#));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn should_default_init_to_basic_template() {
        let cli = Cli::try_parse_from(["gitautomata", "init"]).unwrap();
        match cli.command {
            Command::Init {
                name,
                template,
                output,
            } => {
                assert_eq!(name, None);
                assert_eq!(template, Template::Basic);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn should_reject_unknown_template() {
        let argv = ["gitautomata", "init", "bot", "--template", "fancy"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn should_default_test_event_to_push() {
        let cli = Cli::try_parse_from(["gitautomata", "test"]).unwrap();
        match cli.command {
            Command::Test { event, data } => {
                assert_eq!(event, "push");
                assert_eq!(data, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
