use clap::{Parser, Subcommand};
use serde_json::Value;

use route_gate::client::{AdminClient, ClientError};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the route access gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "GATE_ADMIN_API_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show the route rule sets
    Rules,
    /// Show how a path would be handled
    Classify {
        path: String,
        /// Assume the request carries an API key
        #[arg(long)]
        api_key: bool,
        /// Assume the request carries a valid session
        #[arg(long)]
        session: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = AdminClient::new(&cli.url)?.with_token(cli.key);

    let path = match cli.command {
        Commands::Status => "/admin/status".to_string(),
        Commands::Rules => "/admin/rules".to_string(),
        Commands::Classify {
            path,
            api_key,
            session,
        } => {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("path", &path)
                .append_pair("api_key", &api_key.to_string())
                .append_pair("session", &session.to_string())
                .finish();
            format!("/admin/classify?{query}")
        }
    };

    match client.get_json::<Value>(&path).await {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(ClientError::SessionExpired) => {
            eprintln!("Error: admin key rejected");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
