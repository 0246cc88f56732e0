//! issuestar CLI entry point.

use clap::Parser;

use issuestar::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = issuestar::cli::execute(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
