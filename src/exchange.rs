//! Server-to-server token exchange with the provider.
//!
//! The outbound call is the only blocking operation in the broker, so it runs
//! under a bounded timeout; a slow or unresponsive provider folds into the
//! exchange error taxonomy instead of hanging the request. Token requests never
//! follow redirects, matching OAuth 2.0 guidance that token endpoints return
//! results directly instead of delegating to another URI.

// std
use std::time::Duration;
// crates.io
use reqwest::{Client, header::ACCEPT, redirect::Policy};
// self
use crate::{
	error::{ConfigError, ExchangeError},
	provider::{ExchangeParams, ProviderAdapter, TokenResult},
};

/// HTTP client wrapper used for every outbound provider request.
#[derive(Clone, Debug)]
pub struct ExchangeClient {
	http: Client,
}
impl ExchangeClient {
	/// Builds a client with the given per-request deadline.
	pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
		let http = Client::builder()
			.redirect(Policy::none())
			.timeout(timeout)
			.build()
			.map_err(|source| ConfigError::HttpClientBuild { source })?;

		Ok(Self { http })
	}

	/// Exchanges an authorization code for an access token via the adapter's
	/// request and response shapes.
	///
	/// There is no retry here: replays are the user's responsibility, expressed
	/// by reopening the popup, and the provider guarantees codes are single-use.
	pub async fn exchange_code(
		&self,
		adapter: &dyn ProviderAdapter,
		params: &ExchangeParams<'_>,
	) -> Result<TokenResult, ExchangeError> {
		let form = adapter.exchange_form(params);
		let response = self
			.http
			.post(adapter.token_endpoint().clone())
			.header(ACCEPT, "application/json")
			.form(&form)
			.send()
			.await
			.map_err(classify_transport)?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(classify_transport)?;

		tracing::debug!(provider = adapter.id(), status, "token endpoint responded");

		adapter.parse_token_response(status, &body)
	}
}

fn classify_transport(source: reqwest::Error) -> ExchangeError {
	if source.is_timeout() {
		ExchangeError::Timeout { source }
	} else {
		ExchangeError::Transport { source }
	}
}
