use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use notes_core::{config::Config, run, run_async, server, state::AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Notes backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Price a CSV of `customer,storage` rows and print the quotes as CSV
    Quote {
        /// Input CSV file
        path: PathBuf,
        /// Stream the file through the async runner
        #[arg(long = "async")]
        use_async: bool,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so quotes on stdout stay clean CSV.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_app().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Serve => server::start_server(AppState::with_ledger(config)).await?,
        Command::Quote { path, use_async } => {
            if use_async {
                run_async(path, std::io::stdout(), config.pricing).await?;
            } else {
                run(path, std::io::stdout(), config.pricing).map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}
