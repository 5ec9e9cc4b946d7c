//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::session::Session;
use super::{config_cmd, list, plugin_cmd};
use crate::discovery::SortKey;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PROJ_LOG";

#[derive(Parser)]
#[command(name = "proj")]
#[command(author, version, about = "Find, inspect and jump between local projects")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default
    #[arg(long, global = true, env = "PROJ_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Set the directory scanned for projects
    SetPath {
        path: PathBuf,
    },

    /// Show the effective configuration
    Config,

    /// List projects
    List {
        /// Sort order (defaults to display.sort_by)
        #[arg(long, short)]
        sort: Option<SortKey>,

        /// Only show entries whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Scan this directory instead of the configured one
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print (or hand to the shell) the path of a project
    Jump {
        /// Project name; exact matches win over partial ones
        name: String,
    },

    /// List plugin actions for a project
    Actions {
        project: String,
    },

    /// Run a plugin action on a project
    Run {
        /// Action ID
        action: String,

        project: String,
    },

    /// Manage plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(cli.format, cli.verbose);
    output.verbose("proj starting");

    match cli.command {
        Commands::Init { force } => {
            let path = Session::resolve_path(cli.config)?;
            config_cmd::init(&output, &path, force)?
        }
        Commands::SetPath { path } => {
            let session = Session::load(cli.config)?;
            config_cmd::set_path(&output, session, &path)?
        }
        Commands::Config => {
            let session = Session::load(cli.config)?;
            config_cmd::show(&output, &session)?
        }

        Commands::List { sort, filter, root } => {
            let session = Session::load(cli.config)?;
            output.verbose_ctx("list", &format!("sort={:?}, filter={:?}, root={:?}", sort, filter, root));
            list::list(&session, &output, sort, filter.as_deref(), root.as_deref())?
        }
        Commands::Jump { name } => {
            let session = Session::load(cli.config)?;
            list::jump(&session, &output, &name)?
        }

        Commands::Actions { project } => {
            let session = Session::load(cli.config)?;
            plugin_cmd::actions(&session, &output, &project)?
        }
        Commands::Run { action, project } => {
            let session = Session::load(cli.config)?;
            output.verbose_ctx("run", &format!("Running {} on {}", action, project));
            plugin_cmd::run_action(&session, &output, &action, &project)?
        }
        Commands::Plugin(cmd) => {
            let session = Session::load(cli.config)?;
            plugin_cmd::run(cmd, &session, &output)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Logs go to stderr so stdout stays parseable
fn init_logging(verbose: bool) {
    let default = if verbose { "proj_cli=debug" } else { "proj_cli=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
