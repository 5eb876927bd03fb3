use dotenvy::dotenv;
use market_data_api::{config::AppConfig, routes::register_routes, state::AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = AppConfig::from_env().expect("should have loaded config.");
    let port = config.app_server_port;

    let app = register_routes(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();

    println!("Listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
