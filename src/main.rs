use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use change_revision::cli::{open_repository, run_bump, BumpArgs};
use change_revision::config::{self, Backend, Config};
use change_revision::domain::BuildContext;
use change_revision::ui;

#[derive(clap::Parser)]
#[command(
    name = "change-revision",
    about = "Stamp the git commit count into a project's version metadata"
)]
struct Args {
    #[arg(help = "Build configuration name (e.g. Release or Debug)")]
    configuration: Option<String>,

    #[arg(help = "Project name; <PROJECT>.csproj is searched from the working directory")]
    project: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short = 'C', long, help = "Directory to start from instead of the current one")]
    working_dir: Option<PathBuf>,

    #[arg(long, help = "Resolve the new version without writing any file")]
    dry_run: bool,

    #[arg(long, help = "Abort unless the primary branch is checked out")]
    require_primary_branch: bool,

    #[arg(long, help = "Branch whose commit count becomes the revision")]
    primary_branch: Option<String>,

    #[arg(long, help = "Repository backend: cli or libgit2")]
    backend: Option<Backend>,

    #[arg(long, help = "Seconds to wait for each git invocation")]
    timeout_secs: Option<u64>,

    #[arg(short, long, help = "Print debug logs and error details")]
    verbose: bool,

    #[arg(short = 'V', long, help = "Print version information")]
    version: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if args.require_primary_branch {
        config.policy.require_primary_branch = true;
    }
    if let Some(branch) = &args.primary_branch {
        config.git.primary_branch = branch.clone();
    }
    if let Some(backend) = args.backend {
        config.git.backend = backend;
    }
    if let Some(secs) = args.timeout_secs {
        config.git.timeout_secs = secs;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("change-revision {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(args.verbose);

    let positionals = args.configuration.iter().chain(args.project.iter()).cloned();
    let context = match BuildContext::from_args(positionals) {
        Ok(context) => context,
        Err(e) => {
            ui::display_error(&e.to_string());
            eprintln!("{}", Args::command().render_usage());
            std::process::exit(2);
        }
    };

    let working_dir = match &args.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Cannot read current directory")?,
    };

    // Load configuration
    let mut config = match config::load_config(args.config.as_deref(), &working_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);

    let bump = BumpArgs {
        context,
        working_dir,
        dry_run: args.dry_run,
    };

    let result = open_repository(&config, &bump.working_dir)
        .and_then(|repo| run_bump(repo.as_ref(), &bump, &config))
        .with_context(|| {
            format!(
                "{} ({})",
                bump.context.project, bump.context.configuration
            )
        });

    match result {
        Ok(outcome) => {
            ui::display_outcome(&outcome, args.dry_run);
            Ok(())
        }
        Err(e) => {
            ui::report_failure(&e, args.verbose);
            std::process::exit(1);
        }
    }
}
