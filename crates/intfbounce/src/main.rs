//! intfbounce entry point.
//!
//! Parses the command line, initializes logging, loads configuration and
//! inventory, and runs either the two-stage rollout or the report converter.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sonic_bounce_common::{BounceConfig, HostKeyPolicyKind, Inventory, Pacing};
use sonic_intfbounce::{DryRunConnector, SshConnector, StageOrchestrator};

/// Default configuration file location.
const DEFAULT_CONFIG_PATH: &str = "/etc/intfbounce.toml";

/// Default inventory document name.
const DEFAULT_INVENTORY_PATH: &str = "switch_interfaces.json";

/// Shut down, then re-enable, interfaces across a fleet of switches
#[derive(Parser, Debug)]
#[command(name = "intfbounce")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run Stage 1 (shutdown) then Stage 2 (no shutdown) over the inventory
    Run(RunArgs),
    /// Build the inventory document from an interface report (CSV)
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Inventory document (JSON)
    #[arg(short = 'i', long, default_value = DEFAULT_INVENTORY_PATH)]
    inventory: PathBuf,

    /// Configuration file (TOML); defaults apply when missing
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Login name, overriding the configuration file
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Trust any SSH host key presented by a switch
    #[arg(long)]
    accept_unknown_host_keys: bool,

    /// Log the commands instead of connecting to switches
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Interface report with `Switch IP` and `Interface` columns
    #[arg(long)]
    csv: PathBuf,

    /// Inventory document to write
    #[arg(short = 'o', long, default_value = DEFAULT_INVENTORY_PATH)]
    output: PathBuf,
}

/// Initialize tracing/logging.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Applies command-line settings on top of the loaded configuration.
fn apply_overrides(config: &mut BounceConfig, args: &RunArgs) {
    if let Some(username) = &args.username {
        config.credentials.username = username.clone();
    }
    if args.accept_unknown_host_keys {
        config.ssh.host_key_policy = HostKeyPolicyKind::AcceptAny;
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = BounceConfig::load_or_default(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?
        .with_password_from_env();
    apply_overrides(&mut config, &args);
    config.validate()?;

    let inventory = Inventory::load(&args.inventory)
        .with_context(|| format!("loading inventory {}", args.inventory.display()))?;

    // Per-switch failures are logged and summarised by the orchestrator;
    // they do not affect the exit status.
    if args.dry_run {
        info!("Dry run: no switch will be contacted");
        StageOrchestrator::new(DryRunConnector::new(), Pacing::immediate())
            .run(&inventory)
            .await;
    } else {
        let connector = SshConnector::new(&config)?;
        StageOrchestrator::new(connector, config.pacing.pacing())
            .run(&inventory)
            .await;
    }

    Ok(())
}

fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let inventory = Inventory::from_csv_path(&args.csv)
        .with_context(|| format!("converting report {}", args.csv.display()))?;
    inventory.write(&args.output)?;

    info!(
        "CSV file {} has been successfully converted to {}.",
        args.csv.display(),
        args.output.display()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Convert(args) => convert(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("intfbounce error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = BounceConfig::default();
        config.credentials.username = "netops".to_string();

        apply_overrides(&mut config, &run_args(&["intfbounce", "run"]));

        assert_eq!(config.credentials.username, "netops");
        assert_eq!(config.ssh.host_key_policy, HostKeyPolicyKind::KnownHosts);
    }

    #[test]
    fn test_username_override() {
        let mut config = BounceConfig::default();

        apply_overrides(&mut config, &run_args(&["intfbounce", "run", "-u", "operator"]));

        assert_eq!(config.credentials.username, "operator");
    }

    #[test]
    fn test_accept_unknown_host_keys_override() {
        let mut config = BounceConfig::default();

        apply_overrides(
            &mut config,
            &run_args(&["intfbounce", "run", "--accept-unknown-host-keys"]),
        );

        assert_eq!(config.ssh.host_key_policy, HostKeyPolicyKind::AcceptAny);
    }

    #[test]
    fn test_run_defaults() {
        let args = run_args(&["intfbounce", "run"]);

        assert_eq!(args.inventory, PathBuf::from(DEFAULT_INVENTORY_PATH));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!args.dry_run);
    }
}
