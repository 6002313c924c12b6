use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "percept-cli")]
#[command(about = "Query a running Percept gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Largest holders of a token mint
    Holders {
        mint: String,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// SPL token accounts owned by a wallet
    Tokens {
        owner: String,
        /// Skip the per-token supply lookups
        #[arg(long)]
        no_details: bool,
    },
    /// Recent transactions of an address with activity analytics
    Transactions {
        address: String,
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
    /// Check gateway liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Holders { mint, limit } => {
            client.get(format!("{}/api/token-holders/{}/{}", base, mint, limit))
        }
        Commands::Tokens { owner, no_details } => client
            .get(format!("{}/api/wallet/tokens/{}", base, owner))
            .query(&[("include_details", (!no_details).to_string())]),
        Commands::Transactions {
            address,
            limit,
            before,
            until,
        } => {
            let mut query = vec![("limit", limit.to_string())];
            if let Some(before) = before {
                query.push(("before", before));
            }
            if let Some(until) = until {
                query.push(("until", until));
            }
            client
                .get(format!("{}/api/transactions/{}", base, address))
                .query(&query)
        }
        Commands::Health => client.get(format!("{}/health", base)),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
