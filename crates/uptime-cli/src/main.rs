use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uptime_cli::{cmd, root};

#[derive(Parser)]
#[command(
    name = "uptime",
    about = "Store uptime and downtime reports over business hours",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from uptime.yaml)
    #[arg(long, global = true, env = "UPTIME_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the report API with background workers
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Worker count (overrides uptime.yaml)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Compute the report once and print it or write it to a file
    Report {
        /// Write CSV here instead of printing a table
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load the data files and summarize what was accepted and rejected
    Check,

    /// Show a report job from the job database
    Status { report_id: String },

    /// Write a synthetic store_status.csv for the stores in the data dir
    Generate {
        /// Extra stores with random ids
        #[arg(long)]
        stores: Option<usize>,
        /// RNG seed for a reproducible feed
        #[arg(long)]
        seed: Option<u64>,
        /// Last instant of the simulated week (default: now)
        #[arg(long)]
        end: Option<String>,
        /// Replace an existing store_status.csv
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { port, workers } => cmd::serve::run(&root, port, workers),
        Commands::Report { out } => cmd::report::run(&root, out.as_deref(), cli.json),
        Commands::Check => cmd::check::run(&root, cli.json),
        Commands::Status { report_id } => cmd::status::run(&root, &report_id, cli.json),
        Commands::Generate {
            stores,
            seed,
            end,
            force,
        } => cmd::generate::run(
            &root,
            cmd::generate::GenerateArgs {
                stores,
                seed,
                end: end.as_deref(),
                force,
            },
            cli.json,
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
