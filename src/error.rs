//! Error taxonomy shared by both legs of the broker.
//!
//! Every variant is caught at the single request-handling boundary in
//! [`server`](crate::server) and converted into the uniform error page; nothing
//! here crashes the process or leaks an unhandled fault to the client.

// std
use std::net::SocketAddr;
// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error surfaced at the request-handling boundary.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Deployment configuration problem; fatal for the deployment, not per-request.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Callback failed CSRF state validation; terminal before any network call.
	#[error(transparent)]
	Csrf(#[from] CsrfError),
	/// Token exchange with the provider failed; transport failures fold in here.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
}

/// Configuration and deployment failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent; the broker fails closed.
	#[error("Missing required environment variable {name}.")]
	MissingVar {
		/// Name of the absent variable.
		name: &'static str,
	},
	/// An environment variable was present but could not be parsed.
	#[error("Environment variable {name} is invalid: {reason}.")]
	InvalidVar {
		/// Name of the offending variable.
		name: &'static str,
		/// Human-readable parse failure.
		reason: String,
	},
	/// A provider endpoint or callback URL could not be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The inbound request carried no `Host` header, so the callback URL cannot
	/// be derived.
	#[error("Request is missing a Host header; cannot derive the callback URL.")]
	MissingHost,
	/// Outbound HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying builder failure.
		#[source]
		source: reqwest::Error,
	},
	/// The listener socket could not be bound.
	#[error("Failed to bind {addr}.")]
	Bind {
		/// Configured listen address.
		addr: SocketAddr,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The accept loop failed after startup.
	#[error("Server error while accepting connections.")]
	Serve {
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}

/// CSRF state validation failures raised before any network call in leg 2.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CsrfError {
	/// No state cookie accompanied the callback (cross-browser or expired session).
	#[error("No OAuth state cookie accompanied the callback. Please try again.")]
	MissingCookie,
	/// The callback query string carried no `state` parameter.
	#[error("The callback carried no OAuth state parameter. Please try again.")]
	MissingState,
	/// The returned `state` did not exactly equal the cookie value.
	#[error("OAuth state mismatch. Please try again.")]
	Mismatch,
}

/// Token-exchange failures, distinct from CSRF failures.
///
/// Transport errors (network, timeout) are folded into this taxonomy per the
/// broker's propagation policy: they surface as exchange failures, never as
/// unhandled faults.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the exchange with an explicit error or non-success status.
	#[error("Token endpoint rejected the exchange: {message}.")]
	Provider {
		/// Provider-supplied error text when present, else an HTTP-status-coded message.
		message: String,
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Token endpoint returned a success status with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Token endpoint answered successfully but omitted the access token field.
	#[error("Token endpoint response did not include an access token.")]
	MissingAccessToken {
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Network failure while calling the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Underlying transport failure.
		#[source]
		source: reqwest::Error,
	},
	/// The token endpoint did not answer within the configured deadline.
	#[error("Token endpoint did not respond within the configured timeout.")]
	Timeout {
		/// Underlying timeout failure.
		#[source]
		source: reqwest::Error,
	},
}
