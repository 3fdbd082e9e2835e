//! Environment-derived broker configuration.
//!
//! Provider credentials are required and the broker fails closed without them.
//! The site base URL is deliberately absent: it is derived per request from the
//! `Host` and `X-Forwarded-Proto` headers so one deployment works across
//! preview and production hosts.

// std
use std::{env, net::SocketAddr, time::Duration};
// self
use crate::{_prelude::*, error::ConfigError};

const CLIENT_ID_VAR: &str = "OAUTH_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "OAUTH_CLIENT_SECRET";
const SCOPE_VAR: &str = "OAUTH_SCOPE";
const LISTEN_ADDR_VAR: &str = "BROKER_LISTEN_ADDR";
const EXCHANGE_TIMEOUT_VAR: &str = "OAUTH_EXCHANGE_TIMEOUT_SECS";
const AUTHORIZE_URL_VAR: &str = "OAUTH_AUTHORIZE_URL";
const TOKEN_URL_VAR: &str = "OAUTH_TOKEN_URL";

const DEFAULT_SCOPE: &str = "public_repo";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8788";
const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for one broker deployment.
#[derive(Clone)]
pub struct BrokerConfig {
	/// OAuth application client identifier.
	pub client_id: String,
	/// OAuth application client secret, used only in the server-to-server exchange.
	pub client_secret: String,
	/// Scope requested when the leg-1 caller supplies none.
	pub scope: String,
	/// Socket address the broker binds to.
	pub listen_addr: SocketAddr,
	/// Upper bound on the outbound token-exchange call.
	pub exchange_timeout: Duration,
	/// Override for the provider's authorization endpoint.
	pub authorize_url: Option<Url>,
	/// Override for the provider's token endpoint.
	pub token_url: Option<Url>,
}
impl BrokerConfig {
	/// Reads configuration from process environment variables, honoring a local
	/// `.env` file when present.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Builds configuration from an arbitrary variable lookup.
	///
	/// Split out of [`from_env`](Self::from_env) so validation can be tested
	/// without mutating process-wide environment state.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let client_id = require(&lookup, CLIENT_ID_VAR)?;
		let client_secret = require(&lookup, CLIENT_SECRET_VAR)?;
		let scope = lookup(SCOPE_VAR)
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_SCOPE.into());
		let listen_addr = lookup(LISTEN_ADDR_VAR)
			.unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into())
			.parse()
			.map_err(|err: std::net::AddrParseError| ConfigError::InvalidVar {
				name: LISTEN_ADDR_VAR,
				reason: err.to_string(),
			})?;
		let exchange_timeout = match lookup(EXCHANGE_TIMEOUT_VAR) {
			Some(raw) => Duration::from_secs(raw.parse().map_err(
				|err: std::num::ParseIntError| ConfigError::InvalidVar {
					name: EXCHANGE_TIMEOUT_VAR,
					reason: err.to_string(),
				},
			)?),
			None => Duration::from_secs(DEFAULT_EXCHANGE_TIMEOUT_SECS),
		};
		let authorize_url = parse_override(&lookup, AUTHORIZE_URL_VAR)?;
		let token_url = parse_override(&lookup, TOKEN_URL_VAR)?;

		Ok(Self {
			client_id,
			client_secret,
			scope,
			listen_addr,
			exchange_timeout,
			authorize_url,
			token_url,
		})
	}
}
impl Debug for BrokerConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BrokerConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("scope", &self.scope)
			.field("listen_addr", &self.listen_addr)
			.field("exchange_timeout", &self.exchange_timeout)
			.field("authorize_url", &self.authorize_url)
			.field("token_url", &self.token_url)
			.finish()
	}
}

fn require(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
) -> Result<String, ConfigError> {
	lookup(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingVar { name })
}

fn parse_override(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
) -> Result<Option<Url>, ConfigError> {
	lookup(name)
		.map(|raw| Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { source }))
		.transpose()
}
