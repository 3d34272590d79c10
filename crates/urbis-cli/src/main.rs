use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("urb error: {error:#}");
        std::process::exit(commands::shared::exit::exit_code(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    // Commands that never touch the store.
    if let cli::Commands::Validate(args) = &cli.command {
        return commands::validate::handle(args, &flags);
    }

    let project_root = resolve_project_root(flags.project.as_deref())?;
    if let Some(path) = urbis_config::UrbisConfig::load_dotenv(&project_root)? {
        tracing::debug!(path = %path.display(), "loaded dotenv file");
    }
    let mut config = urbis_config::UrbisConfig::load_from(&project_root)
        .context("failed to load urbis configuration")?;
    if let Some(store) = &flags.store {
        config.store.path.clone_from(store);
    }
    context::warn_unconfigured(&config);

    let ctx = context::AppContext::init(&project_root, config)
        .await
        .context("failed to initialize urbis application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("URBIS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == urbis_config::PROJECT_DIR)
        {
            return explicit
                .parent()
                .map(std::path::Path::to_path_buf)
                .context("invalid --project path: '.urbis' directory has no parent");
        }
        if explicit.is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    Ok(context::find_project_root(&start).unwrap_or(start))
}
