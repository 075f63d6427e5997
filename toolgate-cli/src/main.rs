use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use toolgate_events::JsonlEventEmitter;
use toolgate_policy::{FeatureFlags, PolicyGateEngine};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Command};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read model output from stdin")?;
    Ok(buf)
}

fn run(cli: Cli) -> Result<Value> {
    match cli.command {
        Command::Gate {
            tool,
            args,
            run_id,
            root_session_id,
            invocation_id,
        } => {
            let flags = FeatureFlags::from_env();
            let sink = JsonlEventEmitter::from_env();
            commands::gate(
                &flags,
                &PolicyGateEngine::default(),
                &sink,
                &commands::GateArgs {
                    tool: &tool,
                    args: args.as_deref(),
                    run_id: &run_id,
                    root_session_id: &root_session_id,
                    invocation_id: &invocation_id,
                },
            )
        }
        Command::Classify { text } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            Ok(commands::classify(&text))
        }
        Command::IdemKey {
            root_session_id,
            invocation_id,
            fingerprint,
            payload,
            risk_tier,
        } => commands::idem_key(
            &root_session_id,
            &invocation_id,
            fingerprint.as_deref(),
            payload.as_deref(),
            risk_tier.as_deref(),
        ),
        Command::Flags => commands::flags(&FeatureFlags::from_env()),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = run(cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
