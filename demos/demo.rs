/* demos/demo.rs */

use real_ip_depth::{Config, HeaderMap, RealIpOverwriter, resolve_real_ip};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Real IP Depth Examples ===\n");

    // Example 1: Depth 1 takes the last hop
    example_1_default_depth();

    // Example 2: Deeper trust
    example_2_deeper_trust();

    // Example 3: Missing or blank header
    example_3_missing_header();

    // Example 4: Configuration from a host manifest
    example_4_manifest();

    println!("=== All examples completed! ===");
}

fn show(overwriter: &RealIpOverwriter<fn(&mut HeaderMap)>, chain: Option<&str>) {
    let mut headers = HeaderMap::new();
    if let Some(chain) = chain {
        headers.insert("x-forwarded-for".to_string(), chain.to_string());
    }

    overwriter.intercept(&mut headers);
    match headers.get("x-real-ip") {
        Some(ip) => println!("  {:?} -> X-Real-Ip: {}", chain, ip),
        None => println!("  {:?} -> X-Real-Ip not set", chain),
    }
}

fn passthrough(_: &mut HeaderMap) {}

fn overwriter(depth: usize) -> RealIpOverwriter<fn(&mut HeaderMap)> {
    let config = Config::new().with_forwarded_for_depth(depth);
    RealIpOverwriter::new(passthrough as fn(&mut HeaderMap), &config, "demo")
}

fn example_1_default_depth() {
    println!("Example 1: Default depth (1)");
    show(&overwriter(1), Some("203.0.113.1, 10.0.0.5"));
    println!();
}

fn example_2_deeper_trust() {
    println!("Example 2: Depth 2 and a depth longer than the chain");
    let chain = Some("203.0.113.1, 192.168.1.10, 10.0.0.5");
    show(&overwriter(2), chain);
    show(&overwriter(5), chain);
    println!();
}

fn example_3_missing_header() {
    println!("Example 3: Missing or blank X-Forwarded-For");
    show(&overwriter(1), None);
    show(&overwriter(1), Some("   "));
    println!();
}

fn example_4_manifest() {
    println!("Example 4: Configuration from a manifest");

    match Config::from_toml("forwardedForDepth = 2\n") {
        Ok(config) => println!("  Loaded depth {}", config.forwarded_for_depth),
        Err(err) => println!("  Failed: {}", err),
    }
    match Config::from_json(r#"{"forwardedForDepth": -1}"#) {
        Ok(config) => println!("  Loaded depth {}", config.forwarded_for_depth),
        Err(err) => println!("  Rejected: {}", err),
    }

    println!(
        "  resolve_real_ip(\"10.0.0.1, 192.168.1.1\", 2) = {:?}",
        resolve_real_ip("10.0.0.1, 192.168.1.1", 2)
    );
    println!();
}
