//! HTML documents that drive the popup-window handshake.
//!
//! Each leg of the flow answers with a small page whose inline script talks to
//! the opener window. The wire messages are string-typed rather than structured
//! objects for broad compatibility with the editor's authentication library:
//!
//! - handshake: `authorizing:<provider>`
//! - success: `authorization:<provider>:success:` + JSON `{token, provider}`
//! - error: `authorization:<provider>:error:` + JSON `{error}`

// self
use crate::{_prelude::*, provider::TokenResult};

/// Well-known localStorage key the editor reads on load when no popup message
/// was ever received; holds `{token, backendName}`.
pub const FALLBACK_STORAGE_KEY: &str = "netlify-cms-user";
/// Editor admin path the popup navigates into when there is no opener window.
pub const ADMIN_PATH: &str = "/admin/";

// Liveness fallback, not a security gate: if the opener never echoes the
// handshake, navigate to the provider anyway.
const HANDSHAKE_TIMEOUT_MS: u32 = 500;

/// Handshake request the popup posts to the opener before navigating.
pub fn handshake_message(provider: &str) -> String {
	format!("authorizing:{provider}")
}

/// Prefix of the success message posted to the opener.
pub fn success_prefix(provider: &str) -> String {
	format!("authorization:{provider}:success:")
}

/// Prefix of the error message posted to the opener.
pub fn error_prefix(provider: &str) -> String {
	format!("authorization:{provider}:error:")
}

/// Leg-1 page: handshake with the opener, then navigate to the provider.
///
/// The script is a small state machine with states waiting-for-echo and
/// navigating: one message handler, one timer, and a single cancellation of
/// both on whichever transition fires first. Without an opener (direct
/// navigation) it navigates immediately.
pub fn handshake(provider: &str, site_origin: &str, authorize_url: &Url) -> String {
	let authorize_json = script_str(authorize_url.as_str());
	let origin_json = script_str(site_origin);
	let message_json = script_str(&handshake_message(provider));

	format!(
		r#"<!doctype html><html><head><meta charset="utf-8"><title>Authorizing</title></head><body>
<script>
(function () {{
	var authorizeUrl = {authorize_json};
	var siteOrigin = {origin_json};
	var handshake = {message_json};
	var navigated = false;
	var timer = null;

	function navigate() {{
		if (navigated) return;
		navigated = true;
		if (timer !== null) clearTimeout(timer);
		window.removeEventListener("message", onEcho);
		document.location.href = authorizeUrl;
	}}
	function onEcho(event) {{
		if (event.data === handshake) navigate();
	}}

	if (!window.opener || !window.opener.postMessage) {{
		navigate();
		return;
	}}
	window.addEventListener("message", onEcho, false);
	window.opener.postMessage(handshake, siteOrigin);
	timer = setTimeout(navigate, {HANDSHAKE_TIMEOUT_MS});
}})();
</script>
</body></html>"#
	)
}

/// Leg-2 success page: persist the fallback record, post the token to the
/// opener, and close; with no opener, navigate into the editor instead.
pub fn success(site_origin: &str, token: &TokenResult) -> String {
	let payload_json = script_value(&serde_json::json!({
		"token": token.access_token.expose(),
		"provider": token.provider,
	}));
	let prefix_json = script_str(&success_prefix(token.provider));
	let origin_json = script_str(site_origin);
	let storage_key_json = script_str(FALLBACK_STORAGE_KEY);
	let admin_json = script_str(ADMIN_PATH);

	format!(
		r#"<!doctype html><html><head><meta charset="utf-8"><title>Authorized</title></head><body>
<script>
(function () {{
	var payload = {payload_json};
	var msg = {prefix_json} + JSON.stringify(payload);

	try {{
		localStorage.setItem(
			{storage_key_json},
			JSON.stringify({{ token: payload.token, backendName: payload.provider }})
		);
	}} catch (e) {{}}

	if (window.opener && window.opener.postMessage) {{
		window.opener.postMessage(msg, {origin_json});
		window.close();
		return;
	}}
	document.location.href = {admin_json};
}})();
</script>
</body></html>"#
	)
}

/// Error page for any validation or exchange failure: leave a message for the
/// opener when one exists, otherwise render the message as visible page text.
/// The flow terminates here; errors never redirect back to the provider.
pub fn error(provider: &str, message: &str) -> String {
	let payload_json = script_value(&serde_json::json!({ "error": message }));
	let prefix_json = script_str(&error_prefix(provider));
	let message_json = script_str(message);

	format!(
		r#"<!doctype html><html><head><meta charset="utf-8"><title>Authorization error</title></head><body>
<script>
(function () {{
	var msg = {prefix_json} + JSON.stringify({payload_json});

	if (window.opener && window.opener.postMessage) {{
		window.opener.postMessage(msg, "*");
		window.close();
		return;
	}}
	document.body.innerText = {message_json};
}})();
</script>
</body></html>"#
	)
}

/// Encodes a string as a JavaScript string literal safe for an inline script.
fn script_str(value: &str) -> String {
	escape_for_script(serde_json::Value::String(value.to_owned()).to_string())
}

/// Encodes a JSON value as a JavaScript expression safe for an inline script.
fn script_value(value: &serde_json::Value) -> String {
	escape_for_script(value.to_string())
}

// JSON is not HTML-safe: a hostile token or provider error text could carry
// `</script>` and break out of the inline block. Escape the delimiters to
// their `\uXXXX` forms, which mean the same thing inside a JSON string.
fn escape_for_script(json: String) -> String {
	json.replace('<', "\\u003c").replace('>', "\\u003e").replace('&', "\\u0026")
}
