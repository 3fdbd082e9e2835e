//! Popup OAuth authorization broker for a browser-based CMS editor.
//!
//! The broker serves a single `/oauth` endpoint that implements both legs of the
//! OAuth authorization-code dance for a popup window: leg 1 issues a CSRF state
//! cookie and a handshake page that redirects the popup to the provider, leg 2
//! validates the returned state, exchanges the authorization code for an access
//! token, and posts the result back to the opener window. The broker is
//! stateless across requests; the cookie is the session.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod obs;
pub mod pages;
pub mod provider;
pub mod server;
pub mod session;

mod _prelude {
	pub use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use {axum_test as _, cookie as _, httpmock as _};
