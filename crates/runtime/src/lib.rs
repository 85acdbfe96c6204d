use anyhow::{Context, Result};
use parley_config::AppConfig;
use parley_database::{initialize_database, CreateUserRequest, User, UserRepository};
use parley_gateway::AppState;
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the server needs once configuration is loaded: a migrated
/// pool and the shared HTTP/websocket state built on top of it.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub state: AppState,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let state = AppState::new(db_pool.clone(), &config.realtime);
        info!(
            channel_capacity = config.realtime.channel_capacity,
            outbound_buffer = config.realtime.outbound_buffer,
            "realtime hub ready"
        );

        Ok(Self { db_pool, state })
    }

    /// Register an identity that chats can refer to by username.
    pub async fn create_user(&self, username: &str, display_name: Option<&str>) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            anyhow::bail!("username must not be empty");
        }

        let user = UserRepository::new(self.db_pool.clone())
            .create(&CreateUserRequest {
                username: username.to_string(),
                display_name: display_name.map(str::to_string),
            })
            .await
            .with_context(|| format!("failed to create user {username}"))?;

        info!(username = %user.username, public_id = %user.public_id, "user created");
        Ok(user)
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
