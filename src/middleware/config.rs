use super::error::AuthError;
use crate::oauth::{AuthClient, OAuthConfig};

/// Settings shared by the orchestrator and the route handlers.
#[derive(Debug, Clone)]
pub(crate) struct CallbackSettings {
    /// Configured client id: a literal, or the name of an env var holding it.
    pub(crate) client_id: String,
    /// Configured client secret: a literal, or the name of an env var holding it.
    pub(crate) client_secret: String,
    pub(crate) frontend_root: String,
    pub(crate) oauth_path: String,
    pub(crate) redirect_uri: Option<String>,
    pub(crate) scopes: Vec<String>,
}

impl CallbackSettings {
    pub(crate) fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            frontend_root: "/".into(),
            oauth_path: "/-/oauth".into(),
            redirect_uri: None,
            scopes: Vec::new(),
        }
    }
}

/// OAuth callback configuration.
///
/// `client_id` and `client_secret` are resolved on every request: if an
/// environment variable with the configured name exists its value is used,
/// otherwise the configured string is the value itself. This lets the
/// registry config name a variable instead of embedding the secret.
///
/// Use [`from_env()`](CallbackConfig::from_env) for convention-based setup,
/// or [`new()`](CallbackConfig::new) with `with_*` methods for full control.
pub struct CallbackConfig<E = AuthClient> {
    pub(super) exchanger: E,
    pub(super) settings: CallbackSettings,
}

impl CallbackConfig<AuthClient> {
    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OAUTH_CLIENT_ID`: client id, or the name of the env var holding it
    /// - `OAUTH_CLIENT_SECRET`: client secret, or the name of the env var holding it
    ///
    /// # Optional env vars
    /// - `OAUTH_USER_AGENT`: `User-Agent` sent to the provider (default: crate name)
    /// - `OAUTH_FRONTEND_ROOT`: where the callback redirects to (default: `/`)
    /// - `OAUTH_REDIRECT_URI`: callback URL registered with the provider
    /// - `OAUTH_SCOPES`: comma-separated scopes requested on authorize
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if a required env var is missing.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = std::env::var("OAUTH_CLIENT_ID")
            .map_err(|_| AuthError::Config("OAUTH_CLIENT_ID is required".into()))?;
        let client_secret = std::env::var("OAUTH_CLIENT_SECRET")
            .map_err(|_| AuthError::Config("OAUTH_CLIENT_SECRET is required".into()))?;
        let user_agent = std::env::var("OAUTH_USER_AGENT")
            .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());

        let mut config = CallbackConfig::new(
            AuthClient::new(OAuthConfig::new(user_agent)),
            client_id,
            client_secret,
        );

        if let Ok(root) = std::env::var("OAUTH_FRONTEND_ROOT") {
            config = config.with_frontend_root(root);
        }
        if let Ok(uri) = std::env::var("OAUTH_REDIRECT_URI") {
            config = config.with_redirect_uri(uri);
        }
        if let Ok(scopes) = std::env::var("OAUTH_SCOPES") {
            config = config.with_scopes(
                scopes
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        Ok(config)
    }
}

impl<E> CallbackConfig<E> {
    /// Create config with the required code exchanger and client credentials.
    #[must_use]
    pub fn new(
        exchanger: E,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            exchanger,
            settings: CallbackSettings::new(client_id.into(), client_secret.into()),
        }
    }

    /// Frontend location the callback redirects to (default: `/`).
    #[must_use]
    pub fn with_frontend_root(mut self, root: impl Into<String>) -> Self {
        self.settings.frontend_root = root.into();
        self
    }

    /// Path prefix for the OAuth routes (default: `/-/oauth`).
    #[must_use]
    pub fn with_oauth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.oauth_path = path.into();
        self
    }

    /// Callback URL sent to the provider on authorize.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.settings.redirect_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.settings.scopes = scopes;
        self
    }
}
