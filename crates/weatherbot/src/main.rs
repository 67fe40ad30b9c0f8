use anyhow::Result;
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tokio::signal;

use weatherbot::cli::{Cli, Commands};
use weatherbot::server::{metrics::start_metrics_server, router, AppState, Credentials};
use weatherbot::telegram::{create_bot, register_webhook, setup_bot_commands};
use weathercore::config::{self, ApiSettings, Settings};
use weathercore::core::{init_logger, metrics};
use weathercore::storage::{create_pool, run_migrations, PgStore};
use weathercore::{Dispatcher, WeatherApiClient};

/// Main entry point for the weather bot
///
/// # Errors
/// Returns an error if startup fails: missing configuration, unreachable
/// database, failed migrations, or a rejected bot token or API key.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_LEVEL, config::LOG_FILE_PATH.as_deref())?;

    // Each subcommand validates only the configuration it uses
    match cli.command {
        Some(Commands::Migrate) => migrate(&config::database_url()?).await,
        Some(Commands::Check) => check(&ApiSettings::from_env()?).await,
        Some(Commands::Run) | None => run(Settings::from_env()?).await,
    }
}

async fn migrate(database_url: &SecretString) -> Result<()> {
    let pool = create_pool(database_url.expose_secret()).await?;
    run_migrations(&pool).await?;
    log::info!("Migrations applied");
    Ok(())
}

/// Validates the bot token and the weather API key, then exits.
async fn check(api: &ApiSettings) -> Result<()> {
    let bot = create_bot(&api.bot_token)?;
    let me = bot.get_me().await?;
    log::info!("Bot token OK: @{}", me.username());

    let weather = WeatherApiClient::new(&api.weather_api_url, api.weather_api_key.clone())?;
    weather.check_api_key().await?;
    log::info!("Weather API key OK");

    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    log::info!("Starting weatherbot v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(settings.database_url.expose_secret()).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(PgStore::new(pool));

    let bot = create_bot(&settings.api.bot_token)?;
    let me = bot.get_me().await?;
    log::info!("Authorized as @{}", me.username());

    let weather = Arc::new(WeatherApiClient::new(
        &settings.api.weather_api_url,
        settings.api.weather_api_key.clone(),
    )?);
    weather.check_api_key().await?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to publish the command menu: {}", e);
    }

    match settings.webhook_url() {
        Some(url) => register_webhook(&bot, &url, &settings.webhook_secret).await?,
        None => log::warn!("APP_DOMAIN is not set, webhook is not registered"),
    }

    if *config::metrics::ENABLED {
        metrics::init_metrics();
        let port = *config::metrics::PORT;
        tokio::spawn(async move {
            if let Err(e) = start_metrics_server(port).await {
                log::error!("Metrics server stopped: {}", e);
            }
        });
    }

    let analytics = Credentials::from_parts(settings.analytics_user.clone(), settings.analytics_password.clone());
    if analytics.is_none() {
        log::warn!("ANALYTICS_USER/ANALYTICS_PASSWORD not set, analytics endpoints reject every request");
    }

    let state = AppState {
        dispatcher: Dispatcher::new(store.clone(), store.clone(), weather),
        statistics: store,
        bot,
        webhook_secret: settings.webhook_secret.clone(),
        analytics,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Listening for webhook deliveries on http://{}{}", addr, config::webhook::PATH);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            log::info!("Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
