use anyhow::Context;
use bookstore::App;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Bookstore catalog service")]
struct Cli {
    /// Database URL, overriding the configured `database.url`
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bootstrap the database and serve the HTTP API (default)
    Serve {
        /// Port to listen on, overriding `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ensure the schema exists and seed empty tables, then exit
    InitDb,
    /// Print the resolved configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load().with_context(|| "failed to load bookstore settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookstore_telemetry::init(&settings.telemetry);
            tracing::info!(env = ?settings.environment, "bookstore serve starting");

            App::bootstrap(settings).await?.serve().await
        }
        Command::InitDb => {
            bookstore_telemetry::init(&settings.telemetry);
            let url = settings.database.url.clone();

            App::bootstrap(settings).await?.close().await;
            println!("database ready: {}", url);
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render configuration")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
