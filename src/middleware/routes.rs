use axum::Router;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::get;
use serde::Deserialize;

use super::config::CallbackConfig;
use super::error::AuthError;
use super::orchestrator::CallbackOrchestrator;
use super::traits::CodeExchanger;
use crate::sealer::CredentialSealer;
use crate::secret::require_secret;
use crate::types::AuthorizationCode;

/// Create the OAuth router: `{oauth_path}/authorize` and `{oauth_path}/callback`.
pub fn oauth_routes<E, S>(config: CallbackConfig<E>, sealer: S) -> Router
where
    E: CodeExchanger,
    S: CredentialSealer,
{
    let oauth_path = config.settings.oauth_path.trim_end_matches('/').to_string();
    let orchestrator = CallbackOrchestrator::new(config, sealer);

    Router::new()
        .route(&format!("{oauth_path}/authorize"), get(authorize::<E, S>))
        .route(&format!("{oauth_path}/callback"), get(callback::<E, S>))
        .with_state(orchestrator)
}

// ── Authorize ──────────────────────────────────────────────────────

async fn authorize<E: CodeExchanger, S: CredentialSealer>(
    State(orchestrator): State<CallbackOrchestrator<E, S>>,
) -> Result<Redirect, AuthError> {
    let settings = orchestrator.settings();
    let client_id = require_secret("client-id", &settings.client_id)?;

    let url = orchestrator.exchanger().authorization_url(
        &client_id,
        settings.redirect_uri.as_deref(),
        &settings.scopes,
    );

    Ok(Redirect::to(&url))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback<E: CodeExchanger, S: CredentialSealer>(
    State(orchestrator): State<CallbackOrchestrator<E, S>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AuthError> {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from provider");
        return Err(AuthError::UpstreamAuth(format!("{error}: {desc}")));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .map(AuthorizationCode)
        .ok_or(AuthError::MissingCode)?;

    let target = orchestrator.complete(&code).await?;

    Ok(Redirect::to(&target))
}
