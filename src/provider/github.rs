//! GitHub web-application flow adapter.
//!
//! GitHub's token endpoint wants a form-encoded body and answers JSON only when
//! asked via `Accept: application/json`. It also reports bad verification codes
//! with a `200` status and an `error` field in the body, so classification here
//! inspects the body before trusting the status code.

// self
use crate::{
	_prelude::*,
	config::BrokerConfig,
	error::{ConfigError, ExchangeError},
	provider::{AccessToken, ExchangeParams, ProviderAdapter, TokenResult},
};

const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";

/// GitHub provider adapter.
#[derive(Clone, Debug)]
pub struct GitHub {
	authorize_endpoint: Url,
	token_endpoint: Url,
}
impl GitHub {
	/// Builds the adapter, honoring the configuration's endpoint overrides.
	pub fn from_config(config: &BrokerConfig) -> Result<Self, ConfigError> {
		let authorize_endpoint = match &config.authorize_url {
			Some(url) => url.clone(),
			None => parse_endpoint(AUTHORIZE_ENDPOINT)?,
		};
		let token_endpoint = match &config.token_url {
			Some(url) => url.clone(),
			None => parse_endpoint(TOKEN_ENDPOINT)?,
		};

		Ok(Self { authorize_endpoint, token_endpoint })
	}
}
impl ProviderAdapter for GitHub {
	fn id(&self) -> &'static str {
		"github"
	}

	fn authorize_url(&self, client_id: &str, redirect_uri: &Url, state: &str, scope: &str) -> Url {
		let mut url = self.authorize_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", client_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());
		pairs.append_pair("state", state);
		pairs.append_pair("scope", scope);

		drop(pairs);

		url
	}

	fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	fn exchange_form(&self, params: &ExchangeParams<'_>) -> Vec<(&'static str, String)> {
		vec![
			("client_id", params.client_id.to_owned()),
			("client_secret", params.client_secret.to_owned()),
			("code", params.code.to_owned()),
			("redirect_uri", params.redirect_uri.as_str().to_owned()),
			("state", params.state.to_owned()),
		]
	}

	fn parse_token_response(&self, status: u16, body: &[u8]) -> Result<TokenResult, ExchangeError> {
		let deserializer = &mut serde_json::Deserializer::from_slice(body);

		match serde_path_to_error::deserialize::<_, TokenResponse>(deserializer) {
			Ok(parsed) => {
				if let Some(message) = parsed.error_message() {
					return Err(ExchangeError::Provider { message, status });
				}
				if let Some(access_token) = parsed.access_token.filter(|token| !token.is_empty()) {
					return Ok(TokenResult {
						access_token: AccessToken::new(access_token),
						provider: self.id(),
					});
				}

				Err(ExchangeError::MissingAccessToken { status })
			},
			Err(source) if (200..300).contains(&status) =>
				Err(ExchangeError::MalformedResponse { source, status }),
			Err(_) => Err(ExchangeError::Provider { message: format!("HTTP {status}"), status }),
		}
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: Option<String>,
	error: Option<String>,
	error_description: Option<String>,
}
impl TokenResponse {
	/// Provider error text: the `error` code, enriched with the description when
	/// the provider supplies one.
	fn error_message(&self) -> Option<String> {
		match (&self.error, &self.error_description) {
			(Some(error), Some(description)) => Some(format!("{error}: {description}")),
			(Some(error), None) => Some(error.clone()),
			(None, Some(description)) => Some(description.clone()),
			(None, None) => None,
		}
	}
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { source })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn adapter() -> GitHub {
		let config = BrokerConfig::from_lookup(|name| match name {
			"OAUTH_CLIENT_ID" => Some("client-id".into()),
			"OAUTH_CLIENT_SECRET" => Some("client-secret".into()),
			_ => None,
		})
		.expect("Test configuration should build successfully.");

		GitHub::from_config(&config).expect("GitHub adapter should build from defaults.")
	}

	#[test]
	fn authorize_url_carries_the_four_required_parameters() {
		let redirect_uri = Url::parse("https://site.example.com/oauth")
			.expect("Redirect URI fixture should parse successfully.");
		let url = adapter().authorize_url("client-id", &redirect_uri, "state-1", "public_repo");

		assert_eq!(url.host_str(), Some("github.com"));
		assert_eq!(url.path(), "/login/oauth/authorize");

		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("client_id"), Some(&"client-id".into()));
		assert_eq!(pairs.get("redirect_uri"), Some(&redirect_uri.as_str().into()));
		assert_eq!(pairs.get("state"), Some(&"state-1".into()));
		assert_eq!(pairs.get("scope"), Some(&"public_repo".into()));
	}

	#[test]
	fn endpoint_overrides_replace_the_defaults() {
		let config = BrokerConfig::from_lookup(|name| match name {
			"OAUTH_CLIENT_ID" => Some("client-id".into()),
			"OAUTH_CLIENT_SECRET" => Some("client-secret".into()),
			"OAUTH_AUTHORIZE_URL" => Some("https://mock.test/authorize".into()),
			"OAUTH_TOKEN_URL" => Some("https://mock.test/token".into()),
			_ => None,
		})
		.expect("Test configuration should build successfully.");
		let github =
			GitHub::from_config(&config).expect("GitHub adapter should honor endpoint overrides.");

		assert_eq!(github.token_endpoint().as_str(), "https://mock.test/token");

		let redirect_uri = Url::parse("https://site.example.com/oauth")
			.expect("Redirect URI fixture should parse successfully.");
		let url = github.authorize_url("client-id", &redirect_uri, "s", "repo");

		assert_eq!(url.host_str(), Some("mock.test"));
	}

	#[test]
	fn successful_body_yields_the_token() {
		let result = adapter()
			.parse_token_response(200, br#"{"access_token":"T1","token_type":"bearer"}"#)
			.expect("Well-formed success body should parse.");

		assert_eq!(result.access_token.expose(), "T1");
		assert_eq!(result.provider, "github");
	}

	#[test]
	fn error_body_wins_even_with_success_status() {
		let err = adapter()
			.parse_token_response(
				200,
				br#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
			)
			.expect_err("Error body must be classified as a provider rejection.");

		match err {
			ExchangeError::Provider { message, status } => {
				assert!(message.contains("bad_verification_code"));
				assert!(message.contains("incorrect or expired"));
				assert_eq!(status, 200);
			},
			other => panic!("Expected a provider rejection, got {other:?}."),
		}
	}

	#[test]
	fn bare_error_code_is_surfaced_verbatim() {
		let err = adapter()
			.parse_token_response(400, br#"{"error":"bad_verification_code"}"#)
			.expect_err("Error body must be classified as a provider rejection.");

		match err {
			ExchangeError::Provider { message, .. } =>
				assert_eq!(message, "bad_verification_code"),
			other => panic!("Expected a provider rejection, got {other:?}."),
		}
	}

	#[test]
	fn missing_access_token_is_its_own_failure() {
		let err = adapter()
			.parse_token_response(200, br#"{"token_type":"bearer"}"#)
			.expect_err("A body without an access token must fail.");

		assert!(matches!(err, ExchangeError::MissingAccessToken { status: 200 }));
	}

	#[test]
	fn unparseable_bodies_classify_by_status() {
		let err = adapter()
			.parse_token_response(200, b"<!doctype html>")
			.expect_err("Malformed success body must fail.");

		assert!(matches!(err, ExchangeError::MalformedResponse { status: 200, .. }));

		let err = adapter()
			.parse_token_response(502, b"Bad Gateway")
			.expect_err("Non-success status with opaque body must fail.");

		match err {
			ExchangeError::Provider { message, status } => {
				assert_eq!(message, "HTTP 502");
				assert_eq!(status, 502);
			},
			other => panic!("Expected a provider rejection, got {other:?}."),
		}
	}
}
