//! Main entry point for the Portico control plane server.

use std::sync::Arc;

use clap::Parser;
use portico_auth::TokenService;
use portico_persistence::{
    ExternalDbPersistService, MemoryPersistService, PersistenceService, StorageMode,
};
use portico_server::{
    AppState, Configuration,
    middleware::{auth::Authentication, rate_limit},
    model::config::Cli,
    startup,
};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let configuration = Configuration::from_cli(&args)?;
    let auth_settings = configuration.auth_settings();

    if let Some(subject) = &args.issue_token {
        let tokens = TokenService::from_settings(&auth_settings)?;
        println!("{}", tokens.issue(subject)?);
        return Ok(());
    }

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let storage = configuration.storage_settings()?;
    info!(
        "Persistence mode: {}, storage timeout: {}ms",
        storage.mode,
        storage.timeout.as_millis()
    );

    let persistence: Arc<dyn PersistenceService> = match storage.mode {
        StorageMode::Memory => Arc::new(MemoryPersistService::new()),
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            let service = ExternalDbPersistService::new(db);
            service.ensure_schema().await?;
            Arc::new(service)
        }
    };

    let authentication = Authentication::new(&auth_settings)?;
    if !authentication.is_enabled() {
        warn!("Authentication is disabled (demo mode): every management request is accepted");
    }

    let traffic = configuration.traffic_settings();
    info!(
        window_secs = traffic.window.as_secs(),
        delay_after = traffic.delay_after,
        delay_ms = traffic.delay_increment.as_millis() as u64,
        "Traffic shaping configured"
    );
    let governor = rate_limit::TrafficGovernor::new(traffic);
    let _traffic_cleanup_handle = rate_limit::start_cleanup_task(governor.state());

    let app_state = Arc::new(AppState::new(persistence, storage.timeout));

    let address = configuration.server_address();
    let port = configuration.server_port();
    info!("Starting Portico management API on {}:{}", address, port);

    startup::main_server(
        app_state,
        authentication,
        governor,
        configuration.server_context_path(),
        address,
        port,
    )?
    .await?;

    Ok(())
}
