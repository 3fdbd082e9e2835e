//! Shared scaffolding for broker integration tests.

#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use axum_test::TestServer;
use httpmock::MockServer;
use url::Url;
// self
use oauth_popup_broker::{
	config::BrokerConfig,
	server::{self, BrokerState},
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const HOST: &str = "broker.example.com";
pub const CALLBACK: &str = "https://broker.example.com/oauth";

/// Configuration pointed at a mock provider.
pub fn mock_config(provider: &MockServer) -> BrokerConfig {
	config_with_endpoints(
		Url::parse(&provider.url("/authorize")).expect("Mock authorize endpoint should parse."),
		Url::parse(&provider.url("/token")).expect("Mock token endpoint should parse."),
	)
}

/// Configuration with explicit provider endpoints.
pub fn config_with_endpoints(authorize_url: Url, token_url: Url) -> BrokerConfig {
	BrokerConfig {
		client_id: CLIENT_ID.into(),
		client_secret: CLIENT_SECRET.into(),
		scope: "public_repo".into(),
		listen_addr: "127.0.0.1:0".parse().expect("Loopback listen address should parse."),
		exchange_timeout: Duration::from_secs(5),
		authorize_url: Some(authorize_url),
		token_url: Some(token_url),
	}
}

/// Configuration for tests that never reach the provider.
pub fn offline_config() -> BrokerConfig {
	config_with_endpoints(
		Url::parse("https://provider.invalid/authorize")
			.expect("Placeholder authorize endpoint should parse."),
		Url::parse("https://provider.invalid/token")
			.expect("Placeholder token endpoint should parse."),
	)
}

/// Boots an in-process broker; no real TCP needed.
pub fn test_server(config: BrokerConfig) -> TestServer {
	let state = Arc::new(BrokerState::new(config).expect("Broker state should build from test config."));

	TestServer::new(server::build_router(state)).expect("Failed to create test server.")
}
