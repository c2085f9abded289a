//! OAuth2 client-credentials authentication for the OpenSky data API.
//!
//! [`OAuth2Client`] owns the token lifecycle: it fetches on demand, treats a
//! token as stale a configurable margin before it expires, and lets only
//! one refresh run at a time.

pub mod client;
pub mod credentials;

pub use client::OAuth2Client;
pub use credentials::ClientCredentials;
