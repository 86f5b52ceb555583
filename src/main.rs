use dotenvy::dotenv;
use slateworks::config::server::ServerConfig;
use slateworks::logging::init_tracing;
use slateworks::router::init_router;
use slateworks::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let addr = server_config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    println!("🚀 Server running on http://{}", addr);
    println!("📚 Swagger UI available at http://{}/docs", addr);
    println!("📖 Scalar UI available at http://{}/scalar", addr);
    axum::serve(listener, app).await.unwrap();
}
