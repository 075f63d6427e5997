use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "toolgate",
    version,
    about = "Policy gate, output classifier and idempotency keys for agent tool calls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the execution gate for one tool call
    Gate {
        /// Tool name as requested by the model
        #[arg(long)]
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
        #[arg(long)]
        run_id: String,
        #[arg(long)]
        root_session_id: String,
        #[arg(long)]
        invocation_id: String,
    },
    /// Classify a model output message (reads stdin when --text is absent)
    Classify {
        #[arg(long)]
        text: Option<String>,
    },
    /// Derive an idempotency key and its TTL
    IdemKey {
        #[arg(long)]
        root_session_id: String,
        #[arg(long)]
        invocation_id: String,
        /// Operation fingerprint as a JSON object
        #[arg(long)]
        fingerprint: Option<String>,
        /// Operation payload as JSON
        #[arg(long)]
        payload: Option<String>,
        /// Risk tier used for the TTL (T0..T3)
        #[arg(long)]
        risk_tier: Option<String>,
    },
    /// Print the feature flags loaded from the environment
    Flags,
}
