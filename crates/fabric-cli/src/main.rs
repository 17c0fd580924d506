use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fabric",
    about = "Request fabric — two-tier load balancing simulator",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print the end-of-run report.
    ///
    /// Without --config the built-in defaults are used. --cycles and
    /// --seed override the values from the config file.
    Run {
        /// Path to fabric.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of cycles to simulate
        #[arg(long)]
        cycles: Option<u64>,
        /// Seed for a reproducible request stream
        #[arg(long)]
        seed: Option<u64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write a fabric.toml with the default settings
    Init {
        #[arg(short, long, default_value = "fabric.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    match cli.command {
        Commands::Run {
            config,
            cycles,
            seed,
            format,
        } => commands::run::run(config.as_deref(), cycles, seed, &format),
        Commands::Init { path, force } => commands::init::init(&path, force),
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("fabric=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
