//! GitHub OAuth login routes for a package registry, for Axum.
//!
//! The callback exchanges the authorization code for a GitHub access token,
//! looks up the login, seals `"<login>:<token>"` into a registry credential,
//! issues a session token and redirects to the frontend with all three.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use registry_oauth::RegistrySealer;
//! use registry_oauth::middleware::{CallbackConfig, oauth_routes};
//!
//! // 1. Client id/secret from env (values may name other env vars)
//! let config = CallbackConfig::from_env()?;
//!
//! // 2. The registry's sealer
//! let sealer = RegistrySealer::from_hex_key(&key_hex, signing_secret)?;
//!
//! // 3. Mount GET /-/oauth/authorize and GET /-/oauth/callback
//! let app = axum::Router::new().merge(oauth_routes(config, sealer));
//! ```

mod config;
mod error;
mod orchestrator;
mod routes;
mod traits;

pub use config::CallbackConfig;
pub use error::AuthError;
pub use orchestrator::{
    CallbackOrchestrator, REGISTRY_CREDENTIAL_PARAM, SESSION_TOKEN_PARAM, USERNAME_PARAM,
};
pub use routes::oauth_routes;
pub use traits::CodeExchanger;
