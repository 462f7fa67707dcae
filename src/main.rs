use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chirpd::config::ServerConfig;
use chirpd::server::{AppState, create_router};
use chirpd::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "chirpd")]
#[command(about = "A microblogging server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and uploaded media
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

/// Fixed seed accounts guaranteed to exist after startup. The api key
/// doubles as the account name.
const SEED_USERS: &[(&str, &str)] = &[("test", "test"), ("test_two", "test_two")];

/// Runs schema creation and seed-user insertion before the listener
/// binds. Safe to run on every start: existing rows are left alone.
fn bootstrap(store: &dyn Store) -> anyhow::Result<()> {
    store.initialize()?;

    for (name, api_key) in SEED_USERS {
        if store.get_user_by_api_key(api_key)?.is_none() {
            store.create_user(name, api_key)?;
            info!("Created seed user '{name}'");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chirpd=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            fs::create_dir_all(&config.data_dir)?;

            let store = SqliteStore::new(config.db_path())?;
            bootstrap(&store)?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
                data_dir: config.data_dir.clone(),
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
