//! teamsync command-line tool.
//!
//! Keeps a local TOML description of an organization's teams in sync with
//! GitHub: pull the remote layout, edit it locally, preview the differences
//! and apply them.

mod style;
mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use teamsync_core::config::AppConfig;
use teamsync_core::reconcile::{add_remote_teams, ExecutionMode, Reconciler};
use teamsync_core::{state, GitHubClient, Organization};

use terminal::TerminalOperator;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// teamsync command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "teamsync",
    version,
    about = "Reconcile a local team layout with a GitHub organization"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "teamsync.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply the local team layout to GitHub.
    Sync {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        force: bool,

        /// Show what would change without touching GitHub or the state file.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how the local layout differs from GitHub.
    Diff,

    /// Replace the state file with the current GitHub layout.
    Pull,

    /// Add teams that exist on GitHub to the local layout.
    AddTeam {
        /// Team slugs (or names).
        #[arg(required = true)]
        slugs: Vec<String>,
    },

    /// Replace the members of a local team.
    SetTeam {
        /// Team name.
        team: String,

        /// Member logins.
        users: Vec<String>,
    },

    /// Add members to a local team.
    AddMembers {
        /// Team name.
        team: String,

        /// Member logins.
        #[arg(required = true)]
        users: Vec<String>,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./teamsync.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    debug!(config = %cli.config.display(), command = ?cli.command, "running command");
    match cli.command {
        Commands::Init { output } => cmd_init(&output),
        Commands::Validate => cmd_validate(&cli.config),
        command => {
            let config = load_config(&cli.config)?;
            match command {
                Commands::Sync { force, dry_run } => {
                    cmd_sync(&config, ExecutionMode { force, dry_run }).await
                }
                Commands::Diff => cmd_diff(&config).await,
                Commands::Pull => cmd_pull(&config).await,
                Commands::AddTeam { slugs } => cmd_add_team(&config, &slugs).await,
                Commands::SetTeam { team, users } => cmd_set_team(&config, &team, users),
                Commands::AddMembers { team, users } => cmd_add_members(&config, &team, users),
                Commands::Init { .. } | Commands::Validate => unreachable!(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config and state helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load_and_resolve(path).context("failed to load configuration file")
}

fn github_client(config: &AppConfig) -> Result<GitHubClient> {
    GitHubClient::from_config(config).context("failed to create GitHub client")
}

fn load_state(config: &AppConfig) -> Result<Organization> {
    state::load(&config.state.path).with_context(|| {
        format!(
            "failed to load team layout (run `teamsync pull` to create {})",
            config.state.path.display()
        )
    })
}

fn store_state(config: &AppConfig, org: &Organization) -> Result<()> {
    state::store(&config.state.path, org).context("failed to write team layout")
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

async fn cmd_sync(config: &AppConfig, mode: ExecutionMode) -> Result<()> {
    let local = load_state(config)?;
    let client = github_client(config)?;
    let operator = TerminalOperator;

    let outcome = Reconciler::new(&client, &operator, mode)
        .sync_teams(local)
        .await
        .context("sync failed")?;

    terminal::print_report(&outcome.report);
    if mode.dry_run {
        println!("{}", style::dim("Dry run: state file left unchanged."));
    } else {
        store_state(config, &outcome.organization)?;
    }

    if outcome.report.has_failures() {
        anyhow::bail!("some teams could not be synchronized");
    }
    Ok(())
}

async fn cmd_diff(config: &AppConfig) -> Result<()> {
    let local = load_state(config)?;
    let client = github_client(config)?;
    let operator = TerminalOperator;

    let diff = Reconciler::new(&client, &operator, ExecutionMode::default())
        .diff(&local)
        .await
        .context("failed to compute differences")?;

    if diff.drift.is_empty() {
        println!("{}", style::success("Local layout matches GitHub."));
        return Ok(());
    }

    print!("{}", diff.drift_summary());
    if !diff.is_empty() {
        println!();
        println!("{}", terminal::changes_table(&diff));
    }
    Ok(())
}

async fn cmd_pull(config: &AppConfig) -> Result<()> {
    let client = github_client(config)?;
    let operator = TerminalOperator;

    let mut remote = Reconciler::new(&client, &operator, ExecutionMode::default())
        .fetch_remote(&config.github.organization)
        .await
        .context("failed to fetch remote teams")?;

    if config.state.path.exists() {
        let previous = load_state(config)?;
        remote.carry_local_only_fields(&previous);
    }
    store_state(config, &remote)?;

    println!(
        "{}",
        style::success(&format!(
            "Wrote {} team(s) and {} member(s) to {}",
            remote.teams.len(),
            remote.members.len(),
            config.state.path.display()
        ))
    );
    Ok(())
}

async fn cmd_add_team(config: &AppConfig, slugs: &[String]) -> Result<()> {
    let mut org = load_state(config)?;
    let client = github_client(config)?;

    let added = add_remote_teams(&client, &mut org, slugs)
        .await
        .context("failed to add teams")?;
    store_state(config, &org)?;

    for name in added {
        println!("{}", style::success(&format!("Added team {}", name)));
    }
    Ok(())
}

fn cmd_set_team(config: &AppConfig, team: &str, users: Vec<String>) -> Result<()> {
    let mut org = load_state(config)?;
    org.set_team_members(team, users)
        .with_context(|| format!("failed to set members of team '{}'", team))?;
    store_state(config, &org)?;

    println!("{}", style::success(&format!("Updated team {}", team)));
    Ok(())
}

fn cmd_add_members(config: &AppConfig, team: &str, users: Vec<String>) -> Result<()> {
    let mut org = load_state(config)?;
    org.add_team_members(team, users)
        .with_context(|| format!("failed to add members to team '{}'", team))?;
    store_state(config, &org)?;

    println!("{}", style::success(&format!("Updated team {}", team)));
    Ok(())
}

fn cmd_init(output: &Path) -> Result<()> {
    let default_config = r#"# teamsync configuration

[github]
api_url = "https://api.github.com"
# graphql_url = "https://api.github.com/graphql"
organization = "my-org"
token_env = "GITHUB_TOKEN"

[state]
path = "team-assignments.toml"

[sync]
page_size = 100
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set your organization name in the config file");
    println!("  2. Export a token with org admin rights as GITHUB_TOKEN");
    println!(
        "  3. Fetch the current layout: teamsync --config {} pull",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    let _ = config.resolve_env_vars();
    println!("  [OK] Environment variable references processed");

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All required fields are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Organization : {}", config.github.organization);
    println!("  API URL      : {}", config.github.api_url);
    println!("  GraphQL URL  : {}", config.github.graphql_endpoint());
    println!(
        "  GitHub token : {}",
        if config.github.token.is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!("  State file   : {}", config.state.path.display());
    println!("  Page size    : {}", config.sync.page_size);
    println!();
    println!("Configuration is valid.");

    Ok(())
}
