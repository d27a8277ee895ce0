//! Logging initialization for binaries and ad-hoc debugging
//!
//! The library itself only emits `tracing` events; embedders that want them
//! on stderr call this once at startup. `RUST_LOG` overrides the default.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pethome_crawler=debug,info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}
