//! Stateless CSRF session carried entirely by the client's cookie.
//!
//! The broker keeps no server-side session table: leg 1 hands the client an
//! opaque random token inside an HTTP-only cookie, and leg 2 only ever compares
//! that token against the `state` query parameter. The token is never decoded
//! or trusted for content, and single use falls out of the flow shape (a fresh
//! popup always starts with a fresh token).

// crates.io
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::error::CsrfError;

/// Cookie that transports the CSRF state between the two legs.
pub const STATE_COOKIE: &str = "oauth_state";

// 32 alphanumeric characters carry well above the 16 bytes of entropy the
// state token must provide.
const STATE_LEN: usize = 32;

/// Generates a fresh random state token, unique per popup lifecycle.
pub fn generate_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

/// Builds the session cookie for a freshly issued state value.
///
/// HTTP-only, Secure, `SameSite=Lax`, path-scoped to the broker's endpoint, and
/// no expiry beyond the browser session; the whole flow is expected to complete
/// in under a minute.
pub fn issue_cookie(state: String, path: &str) -> Cookie<'static> {
	Cookie::build((STATE_COOKIE, state))
		.path(path.to_owned())
		.http_only(true)
		.secure(true)
		.same_site(SameSite::Lax)
		.build()
}

/// Validates the callback's `state` parameter against the cookie.
///
/// Ordered, fail fast: the cookie must exist and be non-empty, then the query
/// value must exist, be non-empty, and be exactly equal (string equality, no
/// normalization). Any failure is terminal for the request.
pub fn validate_state(jar: &CookieJar, returned_state: Option<&str>) -> Result<(), CsrfError> {
	let cookie_state = jar
		.get(STATE_COOKIE)
		.map(Cookie::value)
		.filter(|value| !value.is_empty())
		.ok_or(CsrfError::MissingCookie)?;
	let returned = returned_state.filter(|value| !value.is_empty()).ok_or(CsrfError::MissingState)?;

	if returned != cookie_state {
		return Err(CsrfError::Mismatch);
	}

	Ok(())
}
