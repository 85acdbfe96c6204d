use anyhow::Context;
use clap::{Parser, Subcommand};
use parley_config::{load as load_config, AppConfig};
use parley_gateway::build_router;
use parley_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "parley-server", version, about = "Direct-message chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP and websocket server (default).
    Serve,
    /// Register a user that chats can reference by username.
    CreateUser {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing()?;

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, services).await,
        Command::CreateUser {
            username,
            display_name,
        } => {
            let user = services
                .create_user(&username, display_name.as_deref())
                .await?;
            println!("{} {}", user.public_id, user.username);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig, services: BackendServices) -> anyhow::Result<()> {
    info!("starting Parley backend");

    let app = build_router(services.state.clone());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("backend shut down");
    Ok(())
}
