use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use voiceops_bridge::logs::summary::{extract_sessions, LogSummary};

/// Summarize recent Vocal Bridge call logs via the `vb` CLI.
///
/// Requires `vb` on PATH and an authenticated session (`vb auth login`).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of logs to fetch
    #[arg(long, default_value_t = 20)]
    n: u32,
    #[arg(long, default_value_t = 0)]
    offset: u32,
    /// Filter by status (e.g. completed|failed)
    #[arg(long)]
    status: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cmd = Command::new("vb");
    cmd.args(["logs", "list", "-n", &args.n.to_string(), "--offset", &args.offset.to_string(), "--json"]);
    if let Some(status) = &args.status {
        cmd.args(["--status", status]);
    }

    let output = cmd.output().context("failed to run `vb`; is it installed and on PATH?")?;
    if !output.status.success() {
        bail!(
            "Command failed ({}): vb logs list\n{}",
            output.status.code().map(|c| c.to_string()).unwrap_or_else(|| "signal".into()),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let payload: Value = serde_json::from_slice(&output.stdout).map_err(|_| {
        anyhow!("vb output was not valid JSON. Try running without --json to inspect output.")
    })?;

    let sessions = extract_sessions(&payload);
    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }
    print!("{}", LogSummary::from_sessions(&sessions));
    Ok(())
}
