#[tokio::main]
async fn main() {
    agrobase_observability::init();

    let services = match agrobase_api::app::services::build_services().await {
        Ok(s) => std::sync::Arc::new(s),
        Err(e) => {
            tracing::error!("failed to build services: {e}");
            std::process::exit(1);
        }
    };

    let app = agrobase_api::app::build_app(services);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
