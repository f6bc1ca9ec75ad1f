//! `reimburse` command line entry point.
//!
//! ```text
//! reimburse <DAYS> <MILES> <RECEIPTS> [--policy DIR] [--explain]
//! reimburse serve [--host H] [--port P] [--policy DIR]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use reimbursement_engine::ReimbursementEngine;
use reimbursement_engine::api::{AppState, create_router};
use reimbursement_engine::config::ConfigLoader;
use reimbursement_engine::error::EngineResult;
use reimbursement_engine::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "reimburse",
    about = "Calculate the travel reimbursement for a completed trip",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Trip length in whole days
    #[arg(value_name = "DAYS", required = true, allow_negative_numbers = true)]
    days: Option<String>,

    /// Miles traveled
    #[arg(value_name = "MILES", required = true, allow_negative_numbers = true)]
    miles: Option<String>,

    /// Total receipts amount
    #[arg(value_name = "RECEIPTS", required = true, allow_negative_numbers = true)]
    receipts: Option<String>,

    /// Directory holding the policy YAML files (builtin policy if absent)
    #[arg(long, value_name = "DIR")]
    policy: Option<PathBuf>,

    /// Print the full calculation as JSON instead of the amount
    #[arg(long)]
    explain: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Directory holding the policy YAML files (builtin policy if absent)
    #[arg(long, value_name = "DIR")]
    policy: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();

    let level = if cli.command.is_some() { "info" } else { "warn" };
    if let Err(err) = telemetry::init(level) {
        eprintln!("{err}");
    }

    let outcome = match cli.command.take() {
        Some(Command::Serve(args)) => serve(args).await,
        None => calculate(&cli),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_engine(policy: Option<&Path>) -> EngineResult<ReimbursementEngine> {
    let loader = match policy {
        Some(dir) => ConfigLoader::load(dir)?,
        None => ConfigLoader::builtin()?,
    };
    Ok(ReimbursementEngine::from_loader(&loader))
}

fn calculate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let engine = load_engine(cli.policy.as_deref())?;
    let reimbursement = engine.calculate_raw(
        cli.days.as_deref().unwrap_or_default(),
        cli.miles.as_deref().unwrap_or_default(),
        cli.receipts.as_deref().unwrap_or_default(),
    )?;

    if cli.explain {
        println!("{}", serde_json::to_string_pretty(&reimbursement)?);
    } else {
        println!("{}", reimbursement.result);
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = load_engine(args.policy.as_deref())?;
    let metadata = engine.policy().metadata().clone();
    let app = create_router(AppState::new(engine));

    let address = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        address = %address,
        policy_code = %metadata.code,
        policy_version = %metadata.version,
        "Reimbursement service listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
