use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "shalom-health")]
#[command(about = "Query the health endpoints of a running Shalom API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process liveness only
    Live,
    /// Database readiness
    Db,
    /// Redis readiness
    Redis,
    /// Every probe (default)
    All,
}

impl Commands {
    fn paths(&self) -> &'static [&'static str] {
        match self {
            Commands::Live => &["/health"],
            Commands::Db => &["/health/db"],
            Commands::Redis => &["/health/redis"],
            Commands::All => &["/health", "/health/db", "/health/redis"],
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut healthy = true;
    for path in cli.command.unwrap_or(Commands::All).paths() {
        let res = client.get(format!("{}{}", base, path)).send().await?;
        let status = res.status();
        if !status.is_success() {
            eprintln!("{}: server returned status {}", path, status);
            healthy = false;
            continue;
        }

        let body: Value = res.json().await?;
        if body.get("status").and_then(Value::as_str) != Some("ok") {
            healthy = false;
        }
        println!("{}: {}", path, serde_json::to_string_pretty(&body)?);
    }

    if !healthy {
        std::process::exit(1);
    }
    Ok(())
}
