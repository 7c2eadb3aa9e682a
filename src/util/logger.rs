use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_STEM: &str = "admin-panel-backend";

/// Keeps the background writers of the rolling log files alive.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Console plus daily-rolling files under `LOG_DIR` (default `logs`).
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let guards = Self::setup_logging(Path::new(&log_dir))?;
        Ok(Logger { guards })
    }

    /// Console-only subscriber, used when the log directory is unusable.
    pub fn console_only() {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,admin_panel_backend=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init();
    }

    pub fn setup_logging(log_dir: &Path) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let error_dir = log_dir.join("error");
        let json_dir = log_dir.join("json");
        let error_json_dir = error_dir.join("json");
        for dir in [log_dir, error_dir.as_path(), json_dir.as_path(), error_json_dir.as_path()] {
            std::fs::create_dir_all(dir)?;
        }

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,admin_panel_backend=debug"));
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let (general, general_guard) = non_blocking(rolling::daily(log_dir, format!("{LOG_FILE_STEM}.log")));
        let (errors, error_guard) = non_blocking(rolling::daily(&error_dir, format!("{LOG_FILE_STEM}-error.log")));
        let (general_json, json_guard) = non_blocking(rolling::daily(&json_dir, format!("{LOG_FILE_STEM}.json")));
        let (errors_json, error_json_guard) =
            non_blocking(rolling::daily(&error_json_dir, format!("{LOG_FILE_STEM}-error.json")));

        tracing_subscriber::registry()
            .with(
                // Console output - pretty format for development
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(general_json)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(errors_json)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .try_init()?;

        Ok(vec![general_guard, error_guard, json_guard, error_json_guard])
    }
}
