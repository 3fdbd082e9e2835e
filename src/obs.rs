//! Tracing bootstrap for the broker binary.

// crates.io
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the fmt subscriber, honoring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	fmt().with_env_filter(filter).init();
}
