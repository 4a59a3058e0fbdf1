pub mod api;
pub mod config;
pub mod db;
pub mod filter;
pub mod frontend;
pub mod import;
pub mod models;
pub mod search;
pub mod state;

/// Install the tracing subscriber (RUST_LOG overrides the default filter) / 初始化日志
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipes_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
