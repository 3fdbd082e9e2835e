//! HTTP surface: the single `/oauth` route and its two legs.
//!
//! Requests are handled independently with no shared mutable state; the CSRF
//! token lives entirely in the client's cookie, so concurrent sessions need no
//! coordination. Every error kind is caught at this boundary and converted to
//! the uniform error page.

// std
use std::sync::Arc;
// crates.io
use axum::{
	Router,
	extract::{Query, State},
	http::{HeaderMap, header},
	response::{Html, IntoResponse, Response},
	routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
// self
use crate::{
	_prelude::*,
	config::BrokerConfig,
	error::ConfigError,
	exchange::ExchangeClient,
	pages,
	provider::{ExchangeParams, GitHub, ProviderAdapter},
	session,
};

/// Path the broker is mounted on; also the scope of the state cookie.
pub const OAUTH_PATH: &str = "/oauth";

/// Shared per-process state: immutable configuration, the provider adapter, and
/// a cloned HTTP client. Nothing here is mutated after startup.
pub struct BrokerState {
	config: BrokerConfig,
	adapter: Arc<dyn ProviderAdapter>,
	exchange: ExchangeClient,
}
impl BrokerState {
	/// Builds the process state from validated configuration.
	pub fn new(config: BrokerConfig) -> Result<Self> {
		let adapter = Arc::new(GitHub::from_config(&config)?);
		let exchange = ExchangeClient::new(config.exchange_timeout)?;

		Ok(Self { config, adapter, exchange })
	}
}

/// Query parameters accepted by the `/oauth` endpoint; the presence of `code`
/// selects leg 2.
#[derive(Debug, Deserialize)]
pub struct OauthQuery {
	/// Authorization code returned by the provider (leg 2 only).
	pub code: Option<String>,
	/// CSRF state echoed back by the provider (leg 2 only).
	pub state: Option<String>,
	/// Requested scope override (leg 1 only).
	pub scope: Option<String>,
}

/// Builds the broker router.
pub fn build_router(state: Arc<BrokerState>) -> Router {
	Router::new()
		.route(OAUTH_PATH, get(oauth_entry))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds the configured listener and serves until ctrl-c.
pub async fn run(config: BrokerConfig) -> Result<()> {
	let addr = config.listen_addr;
	let state = Arc::new(BrokerState::new(config)?);
	let router = build_router(state);
	let listener =
		TcpListener::bind(addr).await.map_err(|source| ConfigError::Bind { addr, source })?;

	info!(%addr, "broker listening");

	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(|source| ConfigError::Serve { source })?;

	Ok(())
}

async fn shutdown_signal() {
	let _ = tokio::signal::ctrl_c().await;
}

async fn oauth_entry(
	State(state): State<Arc<BrokerState>>,
	jar: CookieJar,
	Query(query): Query<OauthQuery>,
	headers: HeaderMap,
) -> Response {
	let provider = state.adapter.id();

	match dispatch(&state, jar, &query, &headers).await {
		Ok(response) => response,
		Err(err) => {
			// The rendered message reaches the opener; tokens never appear in
			// errors, so this cannot leak one.
			warn!(provider, %err, "oauth request failed");

			html_response(pages::error(provider, &err.to_string())).into_response()
		},
	}
}

async fn dispatch(
	state: &BrokerState,
	jar: CookieJar,
	query: &OauthQuery,
	headers: &HeaderMap,
) -> Result<Response> {
	let site_origin = site_origin(headers)?;

	match &query.code {
		None => start_authorization(state, jar, &site_origin, query.scope.as_deref()),
		Some(code) => finish_authorization(state, &jar, &site_origin, code, query.state.as_deref())
			.await,
	}
}

/// Leg 1: issue a fresh state cookie and the handshake page.
fn start_authorization(
	state: &BrokerState,
	jar: CookieJar,
	site_origin: &str,
	scope_override: Option<&str>,
) -> Result<Response> {
	let redirect_uri = callback_url(site_origin)?;
	let scope = scope_override.filter(|value| !value.is_empty()).unwrap_or(&state.config.scope);
	let csrf_state = session::generate_state();
	let authorize_url =
		state.adapter.authorize_url(&state.config.client_id, &redirect_uri, &csrf_state, scope);
	let body = pages::handshake(state.adapter.id(), site_origin, &authorize_url);
	let jar = jar.add(session::issue_cookie(csrf_state, OAUTH_PATH));

	info!(provider = state.adapter.id(), scope, "starting authorization");

	Ok((jar, html_response(body)).into_response())
}

/// Leg 2: validate CSRF state, exchange the code, and answer with the success
/// page. Validation happens strictly before any network call.
async fn finish_authorization(
	state: &BrokerState,
	jar: &CookieJar,
	site_origin: &str,
	code: &str,
	returned_state: Option<&str>,
) -> Result<Response> {
	session::validate_state(jar, returned_state)?;

	// validate_state only succeeds when the query value is present.
	let csrf_state = returned_state.unwrap_or_default();
	let redirect_uri = callback_url(site_origin)?;
	let params = ExchangeParams {
		client_id: &state.config.client_id,
		client_secret: &state.config.client_secret,
		code,
		redirect_uri: &redirect_uri,
		state: csrf_state,
	};
	let token = state.exchange.exchange_code(state.adapter.as_ref(), &params).await?;

	info!(provider = state.adapter.id(), "token exchange succeeded");

	Ok(html_response(pages::success(site_origin, &token)).into_response())
}

/// Derives the site origin from the inbound request so the same deployment
/// works across preview and production hosts, including behind proxies.
///
/// The broker always sits behind TLS (the state cookie is marked Secure), so
/// the scheme defaults to `https` when no proxy header is present.
fn site_origin(headers: &HeaderMap) -> Result<String, ConfigError> {
	let host = headers
		.get(header::HOST)
		.and_then(|value| value.to_str().ok())
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::MissingHost)?;
	let proto = headers
		.get("x-forwarded-proto")
		.and_then(|value| value.to_str().ok())
		.filter(|value| !value.is_empty())
		.unwrap_or("https");

	Ok(format!("{proto}://{host}"))
}

/// Callback URL for both legs; byte-identical for a given host because both
/// derive it from the same origin string and constant path.
fn callback_url(site_origin: &str) -> Result<Url, ConfigError> {
	Url::parse(&format!("{site_origin}{OAUTH_PATH}"))
		.map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn html_response(body: String) -> impl IntoResponse {
	([(header::CACHE_CONTROL, "no-store")], Html(body))
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::http::HeaderValue;
	// self
	use super::*;

	fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
		let mut map = HeaderMap::new();

		for (name, value) in pairs {
			map.insert(
				axum::http::HeaderName::try_from(*name)
					.expect("Header name fixture should be valid."),
				HeaderValue::from_str(value).expect("Header value fixture should be valid."),
			);
		}

		map
	}

	#[test]
	fn origin_defaults_to_https() {
		let origin = site_origin(&headers(&[("host", "broker.example.com")]))
			.expect("Host header should be sufficient to derive the origin.");

		assert_eq!(origin, "https://broker.example.com");
	}

	#[test]
	fn origin_honors_forwarded_proto() {
		let origin = site_origin(&headers(&[
			("host", "localhost:8788"),
			("x-forwarded-proto", "http"),
		]))
		.expect("Forwarded proto should be honored.");

		assert_eq!(origin, "http://localhost:8788");
	}

	#[test]
	fn missing_host_fails_closed() {
		let err = site_origin(&headers(&[])).expect_err("Missing Host header must be rejected.");

		assert!(matches!(err, ConfigError::MissingHost));
	}

	#[test]
	fn callback_url_is_stable_for_a_given_origin() {
		let first = callback_url("https://broker.example.com")
			.expect("Callback URL should build from a well-formed origin.");
		let second = callback_url("https://broker.example.com")
			.expect("Callback URL should build from a well-formed origin.");

		assert_eq!(first.as_str(), "https://broker.example.com/oauth");
		assert_eq!(first.as_str(), second.as_str());
	}
}
