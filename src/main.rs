use clap::Parser;
use tracing::error;

use takehome::config::{self, Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = takehome::run_http_server(&args).await {
                error!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}
