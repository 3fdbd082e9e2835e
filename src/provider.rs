//! Provider adapter seam: one OAuth provider's authorize-URL and token-exchange
//! shape behind a small trait, so the flow state machine never touches
//! provider-specific request or response formats.

pub mod github;

pub use github::GitHub;

// self
use crate::{_prelude::*, error::ExchangeError};

/// Provider-issued bearer token; formatters are redacted so the secret can
/// never reach logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must keep this string out of logs;
	/// the only legitimate sink is the one success response body.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Result of a successful code exchange, owned solely by the HTTP response that
/// carries it back to the browser.
#[derive(Clone, Debug)]
pub struct TokenResult {
	/// Provider-issued bearer token.
	pub access_token: AccessToken,
	/// Provider identifier, paired with the token so the opener can select the
	/// correct backend.
	pub provider: &'static str,
}

/// Inputs to the server-to-server code exchange.
#[derive(Clone, Debug)]
pub struct ExchangeParams<'a> {
	/// OAuth application client identifier.
	pub client_id: &'a str,
	/// OAuth application client secret.
	pub client_secret: &'a str,
	/// Authorization code returned by the provider.
	pub code: &'a str,
	/// Callback URL; must be byte-identical to the one used in leg 1.
	pub redirect_uri: &'a Url,
	/// CSRF state value, already validated against the cookie.
	pub state: &'a str,
}

/// Adapter encapsulating one OAuth provider's authorize-URL and token-exchange
/// shape.
///
/// Additional providers plug in by implementing this trait; the present
/// deployment carries a single concrete adapter ([`GitHub`]).
pub trait ProviderAdapter: Send + Sync {
	/// Identifier used in the postMessage wire strings and the fallback payload.
	fn id(&self) -> &'static str;

	/// Builds the leg-1 authorization URL.
	fn authorize_url(&self, client_id: &str, redirect_uri: &Url, state: &str, scope: &str) -> Url;

	/// Token endpoint the exchange POSTs to.
	fn token_endpoint(&self) -> &Url;

	/// Form parameters for the code exchange, in the body encoding this provider
	/// requires.
	fn exchange_form(&self, params: &ExchangeParams<'_>) -> Vec<(&'static str, String)>;

	/// Parses and classifies the token endpoint's response.
	fn parse_token_response(&self, status: u16, body: &[u8]) -> Result<TokenResult, ExchangeError>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn access_token_formatters_redact() {
		let token = AccessToken::new("gho_secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.expose(), "gho_secret");
	}

	#[test]
	fn token_result_debug_never_contains_the_token() {
		let result = TokenResult { access_token: AccessToken::new("gho_secret"), provider: "github" };

		assert!(!format!("{result:?}").contains("gho_secret"));
	}
}
