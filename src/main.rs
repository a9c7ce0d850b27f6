use anyhow::Result;
use clap::Parser;
use pkgmon::commands::{self, GlobalOptions, ListOptions};
use std::path::PathBuf;

/// pkgmon - Python package update monitor
///
/// Tracks the distributions installed in a Python environment and checks the
/// package index for newer releases that still satisfy every installed
/// package's requirements.
///
/// Examples:
///   pkgmon refresh              # Check every tracked package for updates
///   pkgmon list --outdated      # Show packages with a newer release
///   pkgmon install-command      # Print a pip command upgrading them
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGMON_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON)
    #[arg(
        long,
        short = 'c',
        env = "PKGMON_CONFIG",
        value_name = "PATH",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// State file holding refresh results
    #[arg(long, env = "PKGMON_STATE", value_name = "PATH", global = true)]
    pub state: Option<PathBuf>,

    /// Package index base URL (defaults to https://pypi.org/pypi)
    #[arg(long = "index-url", env = "PKGMON_INDEX_URL", value_name = "URL", global = true)]
    pub index_url: Option<String>,

    /// Python interpreter to inspect
    #[arg(long, env = "PKGMON_PYTHON", value_name = "PATH", global = true)]
    pub python: Option<String>,

    /// Site-packages directory to scan (repeatable; skips interpreter discovery)
    #[arg(long = "site-packages", value_name = "PATH", global = true)]
    pub site_packages: Vec<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the package index for updates and store the results
    Refresh(RefreshArgs),

    /// List stored packages
    List(ListArgs),

    /// Print a pip command installing the latest version of each package
    InstallCommand,

    /// Notify about packages with a new release
    Notify(NotifyArgs),
}

#[derive(clap::Args, Debug)]
pub struct RefreshArgs {
    /// Query the index one package at a time
    #[arg(long)]
    pub sequential: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only show packages with a newer release
    #[arg(long)]
    pub outdated: bool,

    /// Show every stored package, ignoring visibility settings
    #[arg(long)]
    pub all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct NotifyArgs {
    /// Notify again about versions already notified
    #[arg(long)]
    pub repeat: bool,
}

impl Cli {
    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            state: self.state.clone(),
            index_url: self.index_url.clone(),
            python: self.python.clone(),
            site_packages: self.site_packages.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pkgmon::runtime::RealRuntime;
    let options = cli.global_options();

    match cli.command {
        Commands::Refresh(args) => commands::refresh(runtime, options, args.sequential).await?,
        Commands::List(args) => commands::list(
            runtime,
            options,
            ListOptions {
                outdated: args.outdated,
                all: args.all,
                json: args.json,
            },
        )?,
        Commands::InstallCommand => commands::install_command(runtime, options)?,
        Commands::Notify(args) => commands::notify(runtime, options, args.repeat)?,
    }
    Ok(())
}
