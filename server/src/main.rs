use std::path::PathBuf;

use clap::Parser;
use todo_server::{lifecycle, telemetry, Config};

#[derive(Parser)]
#[command(name = "todo-server", version, about = "Todo list REST API")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    telemetry::init(&config.logging);
    lifecycle::run(config).await
}
