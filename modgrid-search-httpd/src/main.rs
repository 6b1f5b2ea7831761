//! Modgrid Search Gateway CLI
//!
//! Run with: `cargo run -p modgrid-search-httpd -- --help`

use clap::Parser;
use modgrid_search_httpd::{build_router, AppState, Args};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("modgrid_search_httpd=info".parse().unwrap())
                .add_directive("modgrid_search_service=info".parse().unwrap())
                .add_directive("tower_http=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %args.listen,
        upstream = %args.upstream_url,
        page_cap = args.page_cap,
        batch_size = args.batch_size,
        "Starting Modgrid search gateway"
    );

    let state = Arc::new(AppState::from_args(&args));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .expect("Failed to bind address");

    info!(address = %args.listen, "Server listening");

    axum::serve(listener, app).await.expect("Server error");
}
