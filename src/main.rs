use tracing::{error, info};

use cloudrive::backend::Backend;
use cloudrive::drive::DriveSettings;
use cloudrive::web::{AppState, WebServer};
use cloudrive::{mail, Config, Database};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = cloudrive::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        cloudrive::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> cloudrive::Result<()> {
    config.validate()?;

    info!("cloudrive {}", env!("CARGO_PKG_VERSION"));
    info!(
        mode = ?config.backend.mode,
        endpoint = %config.backend.endpoint,
        "Using managed backend"
    );

    let backend = Backend::from_config(&config.backend)?;
    let db = Database::open(&config.database.path).await?;
    let mailer = mail::create_mailer(&config.mail)?;

    let state = AppState::new(
        backend,
        db,
        mailer,
        DriveSettings::from_config(&config),
        &config.web.jwt_secret,
        config.web.jwt_access_token_expiry_secs,
    );

    let server = WebServer::new(&config.web, state)?;
    info!("Web API configured on {}", server.addr());
    server.run().await
}
