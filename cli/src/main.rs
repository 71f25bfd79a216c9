mod commands;
pub mod persistence;

use std::{
    fs::{self, File},
    io::IsTerminal,
    process::ExitCode,
    sync::OnceLock,
};

use clap::Parser;
use commands::Commands;

static INTERACTIVE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match commands::execute(&cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn is_interactive() -> bool {
    *INTERACTIVE.get_or_init(|| std::io::stdout().is_terminal())
}

/// Logs go to a file so they never mix with command output
fn init_logging() {
    let Some(dir) = persistence::config_dir() else { return };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(file) = File::create(dir.join("default.log")) {
        let pipe = env_logger::Target::Pipe(Box::new(file));
        env_logger::Builder::from_default_env().target(pipe).init();
    }
}
