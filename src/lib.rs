pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

/// Console logging with `RUST_LOG`-style filtering; the harness and local
/// tooling call this once at startup.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comunidade=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
