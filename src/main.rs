//! Binary entry point: load configuration, initialize tracing, serve.

// crates.io
use tracing::error;
// self
use oauth_popup_broker::{config::BrokerConfig, obs, server};

#[tokio::main]
async fn main() {
	obs::init_tracing();

	let config = match BrokerConfig::from_env() {
		Ok(config) => config,
		Err(err) => {
			error!("configuration error: {err}");
			std::process::exit(1);
		},
	};

	if let Err(err) = server::run(config).await {
		error!("fatal: {err}");
		std::process::exit(1);
	}
}
