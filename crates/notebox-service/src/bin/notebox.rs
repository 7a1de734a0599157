//! Notebox Service Binary Entry Point

use std::path::PathBuf;

use notebox_core::NoteboxConfig;
use tokio::io::BufReader;

const CONFIG_ENV: &str = "NOTEBOX_CONFIG";
const DEFAULT_CONFIG: &str = "notebox.yaml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = match NoteboxConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {:?}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Notebox service starting, notes at {:?}", config.storage.notes_dir);
    log::info!("Listening on stdin/stdout...");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    if let Err(e) = notebox_service::serve(config, stdin, stdout).await {
        log::error!("Service stopped: {}", e);
        std::process::exit(1);
    }
}
