use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use freebies::app::seed::seed;
use freebies::app::session::Session;
use freebies::app::shell;
use freebies::config::{DB_FILE, DB_PATH_ENV, DEFAULT_LOG_FILTER};
use freebies::db::Database;
use freebies::error::AppError;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// `SQLite` database file.
    #[arg(long, global = true, env = DB_PATH_ENV, default_value = DB_FILE)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the database contents with the sample companies, devs and
    /// freebies.
    Seed,
    /// Open an interactive shell against the database.
    Debug,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("{err}");

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), AppError> {
    let database = Database::open(&cli.db)?;
    let mut session = Session::open(database)?;

    match cli.command {
        Command::Seed => {
            seed(&mut session)?;
            writeln!(io::stdout(), "Database seeded successfully!")?;
        }
        Command::Debug => {
            let stdin = io::stdin();
            shell::run(&mut session, stdin.lock(), &mut io::stdout())?;
        }
    }

    Ok(())
}
