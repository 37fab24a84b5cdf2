use classbook::logging::init_tracing;
use classbook::router::init_router;
use classbook::state::init_app_state;
use classbook_config::ServerConfig;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e.error, "Failed to initialize application state");
            std::process::exit(1);
        }
    };
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %address, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(address = %address, "Server running");
    println!("🚀 Server running on http://{}", address);
    println!("📚 Swagger UI available at http://{}/swagger-ui", address);
    println!("📖 Scalar UI available at http://{}/scalar", address);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
