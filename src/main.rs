use admin_panel_backend::app::App;
use admin_panel_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file before anything reads them
    let dotenv_result = dotenv();

    // Held for the whole process so the file writers keep flushing
    let _logger = match Logger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            Logger::console_only();
            warn!("File logging unavailable, console only: {}", e);
            None
        }
    };

    info!("🚀 Starting Admin Panel Backend");
    match dotenv_result {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
