pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, TrainingCommands, UserCommands};
pub use config::Config;
use models::training::NewTraining;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        return cli::cmd_init();
    }

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "facegate")?
            .extra_field("env", config.observability.environment.clone())?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, prometheus_handle).await,
        Commands::Init => cli::cmd_init(),
        Commands::Check => cli::cmd_check(&config).await,
        Commands::Training { command } => match command {
            TrainingCommands::Add {
                title,
                category,
                duration,
                description,
                image_url,
            } => {
                let training = NewTraining {
                    title,
                    description,
                    category,
                    duration,
                    image_url,
                };
                cli::cmd_training_add(&config, training).await
            }
            TrainingCommands::List { category } => {
                cli::cmd_training_list(&config, category.as_deref()).await
            }
            TrainingCommands::Remove { id } => cli::cmd_training_remove(&config, &id).await,
        },
        Commands::User { command } => match command {
            UserCommands::Show { query } => cli::cmd_user_show(&config, &query).await,
        },
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Starting Facegate v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        config.server.port
    );

    let port = config.server.port;
    let api_prefix = config.server.api_prefix.clone();

    let app_state = api::create_app_state_from_config(config, prometheus_handle)
        .await
        .context("Failed to initialise application state")?;
    let app = api::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://0.0.0.0:{port}{api_prefix}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
