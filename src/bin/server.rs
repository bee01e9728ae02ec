use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pairplan::db;
use pairplan::notifications::senders::{PushSender, web_push::WebPushSender};
use pairplan::notifications::service::NotificationDispatcher;
use pairplan::server::config::ServerConfig;
use pairplan::version::VERSION;
use pairplan::web;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a bcrypt hash to use as ADMIN_PASSWORD_HASH
    HashPassword { password: String },
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "pairplan.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C.");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = args.command {
        println!("{}", bcrypt::hash(password, bcrypt::DEFAULT_COST)?);
        return Ok(());
    }

    // --- Server Config Setup ---
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting server, version: {}", VERSION);

    // --- Database Setup ---
    let db_pool = db::connect(&server_config.database_url, 10).await?;
    db::schema::ensure_schema(&db_pool).await?;
    info!("Database connected and schema ensured.");

    // --- Push Sender Setup ---
    let push_sender: Option<Arc<dyn PushSender>> = match server_config.vapid_credentials() {
        Ok(Some(credentials)) => Some(Arc::new(WebPushSender::new(credentials))),
        Ok(None) => {
            warn!("VAPID keys are not configured. Sending notifications is disabled.");
            None
        }
        Err(e) => {
            error!(error = %e, "Invalid VAPID configuration.");
            return Err(e.into());
        }
    };
    let dispatcher = Arc::new(NotificationDispatcher::new(
        db_pool.clone(),
        push_sender,
        server_config.app_name.clone(),
    ));

    // --- HTTP Server ---
    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let app = web::create_axum_router(db_pool.clone(), dispatcher, server_config.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await?;
    info!("Server stopped.");
    Ok(())
}
