use clap::{Parser, Subcommand};
use serde_json::Value;

use parking_gateway::observability::logging;
use parking_gateway::parking::{EntityKind, GatewayClient};
use parking_gateway::tree::{render, render_text, LazyExpansion, NodeKey, TableLevel};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Browse parking data through the admin gateway", long_about = None)]
struct Cli {
    /// Gateway origin.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Mount prefix of the forwarding route.
    #[arg(short, long, default_value = "/api/proxy")]
    prefix: String,

    /// Bearer token, when the gateway requires one.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List every record of an entity type
    List {
        /// parking-lot, area, floor or parking-space (type name or resource path)
        entity: EntityKind,
    },
    /// Show an entity table with selected rows expanded one level
    Tree {
        entity: EntityKind,

        /// Parent ids to expand
        #[arg(short, long)]
        expand: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging("warn");
    let cli = Cli::parse();

    let origin = cli.url.trim_end_matches('/');
    let mut client = GatewayClient::new(format!("{}{}", origin, cli.prefix));
    if let Some(token) = &cli.token {
        client = client.with_token(token)?;
    }

    match cli.command {
        Commands::Status => {
            let res = reqwest::get(format!("{}/healthz", origin)).await?;
            if !res.status().is_success() {
                eprintln!("Error: gateway returned status {}", res.status());
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::List { entity } => {
            let rows = client.list(entity).await?;
            print_table(&entity.level(0), &rows, &LazyExpansion::new(client));
        }
        Commands::Tree { entity, expand } => {
            let rows = client.list(entity).await?;
            let level = entity.level(1);

            let mut controller = LazyExpansion::new(client);
            if let Some(child) = entity.child() {
                for id in &expand {
                    controller.toggle(&NodeKey::new(Some(child.name()), id)).await;
                }
            } else if !expand.is_empty() {
                eprintln!("{} has no child entities, ignoring --expand", entity);
            }

            print_table(&level, &rows, &controller);
        }
    }

    Ok(())
}

fn print_table(level: &TableLevel, rows: &[Value], controller: &LazyExpansion<Value, GatewayClient>) {
    let view = render(level, rows, false, controller.store());
    print!("{}", render_text(&view));
}
