use product_api::{
    app::{
        create_routes,
        product::{handler::AppState, service::ProductService},
    },
    build_repository,
    infrastructure::{config::AppConfig, logger::Logger},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = AppConfig::load()?;
    let _log_guard = Logger::init(&config.logging)?;

    match source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    info!("Starting product API...");

    let repository = build_repository(&config.database).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;
    let product_service = ProductService::new(repository);
    info!("Storage backend: {}", product_service.storage_backend());

    let state = AppState::new(product_service);
    let app = create_routes(state, &config.http);

    let listener =
        TcpListener::bind((config.http.bind_address.as_str(), config.http.port)).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Product API running on http://{}", addr);
    info!("📖 Available endpoints:");
    info!("   GET    /health                 - Health check");
    info!("   GET    /products               - List products");
    info!("   POST   /products               - Create product");
    info!("   GET    /products/:id           - Get product by ID");
    info!("   PUT    /products/:id           - Update product");
    info!("   DELETE /products/:id           - Delete product");
    info!("   GET    /products/search/:name  - Search products by name");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
