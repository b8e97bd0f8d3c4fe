/* demos/axum.rs */

use axum::{Router, extract::ConnectInfo, http::HeaderMap, response::Json, routing::get};
use real_ip_depth::{Config, RealIp, RealIpLayer};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = create_app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip            - Real IP with depth 1 (last hop)");
    println!("  • GET /two-hops/ip   - Real IP with depth 2");
    println!("  • GET /debug         - Forwarding headers as seen by the handler");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Forwarded-For: 198.51.100.1, 192.168.1.1' http://localhost:3000/ip");
    println!("  curl -H 'X-Forwarded-For: 198.51.100.1, 192.168.1.1' http://localhost:3000/two-hops/ip");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> Router {
    let one_hop = Router::new()
        .route("/ip", get(ip_handler))
        .route("/debug", get(debug_handler))
        .layer(RealIpLayer::new(&Config::default(), "one-hop"));

    let two_hops = Router::new()
        .route("/ip", get(ip_handler))
        .layer(RealIpLayer::new(
            &Config::new().with_forwarded_for_depth(2),
            "two-hops",
        ));

    one_hop.nest("/two-hops", two_hops)
}

/// Handler that returns the stamped IP in JSON format
async fn ip_handler(real_ip: RealIp) -> Json<serde_json::Value> {
    Json(json!({
        "real_ip": real_ip.as_str(),
        "is_ip_address": real_ip.ip().is_some(),
    }))
}

/// Debug handler showing the forwarding headers after the layer ran
async fn debug_handler(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    Json(json!({
        "remote_addr": addr.to_string(),
        "x_forwarded_for": header("x-forwarded-for"),
        "x_real_ip": header("x-real-ip"),
    }))
}
