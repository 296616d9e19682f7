use std::sync::Arc;

use homework_bot::config::AppConfig;
use homework_bot::domain::homework::PraktikumClient;
use homework_bot::domain::telegram::TelegramClient;
use homework_bot::poller::Poller;
use homework_bot::shutdown::shutdown_signal;
use homework_bot::utils::logging;

#[tokio::main]
async fn main() {
    // 1. Load environment
    dotenvy::dotenv().ok();

    // 2. Initialize logging (guard must outlive the loop)
    let _guard = logging::init_logging();

    // 3. Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    // 4. Build the collaborators
    let api = Arc::new(PraktikumClient::new(
        config.api_url.clone(),
        config.praktikum_token.clone(),
    ));
    let telegram = Arc::new(TelegramClient::new(
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    ));

    // 5. Startup probe: resolve the bot name, keep going if Telegram is slow
    match telegram.me().await {
        Ok(username) => tracing::info!(bot = %username, "Bot started"),
        Err(e) => tracing::warn!(error = %e, "Could not resolve bot name at startup"),
    }

    // 6. Poll until a shutdown signal arrives
    let start_cursor = chrono::Utc::now().timestamp();
    let poller = Poller::new(api, telegram, start_cursor, &config);

    tokio::select! {
        _ = poller.run() => {},
        _ = shutdown_signal() => {},
    }
}
