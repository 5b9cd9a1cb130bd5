use std::sync::Arc;

use url::form_urlencoded;

use super::config::{CallbackConfig, CallbackSettings};
use super::traits::CodeExchanger;
use crate::error::Error;
use crate::sealer::CredentialSealer;
use crate::secret::require_secret;
use crate::types::{AuthorizationCode, SessionClaims};

/// Query parameter carrying the session token.
pub const SESSION_TOKEN_PARAM: &str = "jwtToken";
/// Query parameter carrying the sealed registry credential.
pub const REGISTRY_CREDENTIAL_PARAM: &str = "npmToken";
/// Query parameter carrying the provider login.
pub const USERNAME_PARAM: &str = "username";

/// Drives one callback from authorization code to frontend redirect.
///
/// Stateless per call: client credentials are resolved at call time and
/// nothing is persisted. A failure at any step aborts the exchange and is
/// returned as-is; the user retries by starting consent again.
pub struct CallbackOrchestrator<E, S> {
    exchanger: Arc<E>,
    sealer: Arc<S>,
    settings: CallbackSettings,
}

// Manual Clone: avoid derive adding `E: Clone, S: Clone` bounds.
impl<E, S> Clone for CallbackOrchestrator<E, S> {
    fn clone(&self) -> Self {
        Self {
            exchanger: self.exchanger.clone(),
            sealer: self.sealer.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<E: CodeExchanger, S: CredentialSealer> CallbackOrchestrator<E, S> {
    #[must_use]
    pub fn new(config: CallbackConfig<E>, sealer: S) -> Self {
        Self {
            exchanger: Arc::new(config.exchanger),
            sealer: Arc::new(sealer),
            settings: config.settings,
        }
    }

    pub(crate) fn settings(&self) -> &CallbackSettings {
        &self.settings
    }

    pub(crate) fn exchanger(&self) -> &E {
        &self.exchanger
    }

    /// Run the exchange for `code` and return the frontend redirect target.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCode`] if `code` is empty
    /// - [`Error::Config`] if the client id or secret cannot be resolved
    /// - [`Error::UpstreamAuth`] / [`Error::Http`] if either provider call fails
    /// - [`Error::Seal`] if sealing or signing fails
    pub async fn complete(&self, code: &AuthorizationCode) -> Result<String, Error> {
        if code.as_str().is_empty() {
            return Err(Error::MissingCode);
        }

        let client_id = require_secret("client-id", &self.settings.client_id)?;
        let client_secret = require_secret("client-secret", &self.settings.client_secret)?;

        let token = self
            .exchanger
            .request_access_token(code, &client_id, &client_secret)
            .await?;
        let user = self.exchanger.request_user(&token.access_token).await?;
        let login = user.login.as_str();

        let registry_auth = format!("{login}:{}", token.access_token.as_str());
        let sealed = self.sealer.seal(registry_auth.as_bytes())?;
        let session = self.sealer.issue_session(&SessionClaims::new(login))?;

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(SESSION_TOKEN_PARAM, session.as_str())
            .append_pair(REGISTRY_CREDENTIAL_PARAM, sealed.as_str())
            .append_pair(USERNAME_PARAM, login)
            .finish();

        tracing::info!(username = %login, "OAuth callback exchange completed");

        Ok(frontend_url(&self.settings.frontend_root, &query))
    }
}

fn frontend_url(root: &str, query: &str) -> String {
    let separator = if root.contains('?') { '&' } else { '?' };
    format!("{root}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::oauth::{ProviderUser, TokenResponse};
    use crate::types::{
        ProviderAccessToken, ProviderIdentity, SealedRegistryCredential, SessionToken,
    };

    #[derive(Default)]
    struct StubExchanger {
        reject_code: bool,
        reject_token: bool,
        calls: Mutex<Vec<String>>,
    }

    impl CodeExchanger for StubExchanger {
        async fn request_access_token(
            &self,
            code: &AuthorizationCode,
            client_id: &str,
            client_secret: &str,
        ) -> Result<TokenResponse, Error> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("token:{code}:{client_id}:{client_secret}"));
            if self.reject_code {
                return Err(Error::UpstreamAuth {
                    operation: "token exchange",
                    status: None,
                    detail: "bad_verification_code".into(),
                });
            }
            Ok(TokenResponse {
                access_token: ProviderAccessToken("gho_token".into()),
                token_type: Some("bearer".into()),
                scope: None,
            })
        }

        async fn request_user(
            &self,
            access_token: &ProviderAccessToken,
        ) -> Result<ProviderUser, Error> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("user:{}", access_token.as_str()));
            if self.reject_token {
                return Err(Error::UpstreamAuth {
                    operation: "user request",
                    status: Some(401),
                    detail: "Bad credentials".into(),
                });
            }
            Ok(ProviderUser {
                login: ProviderIdentity("Octo Cat&co".into()),
            })
        }

        fn authorization_url(&self, _: &str, _: Option<&str>, _: &[String]) -> String {
            String::new()
        }
    }

    /// Reversible fake: prefixes instead of encrypting.
    struct StubSealer;

    impl CredentialSealer for StubSealer {
        fn seal(&self, plaintext: &[u8]) -> Result<SealedRegistryCredential, Error> {
            Ok(SealedRegistryCredential(format!(
                "sealed({})",
                String::from_utf8_lossy(plaintext)
            )))
        }

        fn issue_session(&self, claims: &SessionClaims) -> Result<SessionToken, Error> {
            Ok(SessionToken(format!("h.{}.s", claims.name)))
        }
    }

    fn orchestrator(exchanger: StubExchanger) -> CallbackOrchestrator<StubExchanger, StubSealer> {
        CallbackOrchestrator::new(
            CallbackConfig::new(exchanger, "literal-id", "literal-secret"),
            StubSealer,
        )
    }

    fn query_pairs(target: &str) -> Vec<(String, String)> {
        let (_, query) = target.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[tokio::test]
    async fn redirect_carries_exactly_three_params() {
        let orch = orchestrator(StubExchanger::default());
        let target = orch.complete(&"abc".into()).await.unwrap();

        assert!(target.starts_with("/?"));
        let pairs = query_pairs(&target);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("jwtToken".into(), "h.Octo Cat&co.s".into())));
        assert!(pairs.contains(&("npmToken".into(), "sealed(Octo Cat&co:gho_token)".into())));
        assert!(pairs.contains(&("username".into(), "Octo Cat&co".into())));
    }

    #[tokio::test]
    async fn calls_are_sequential_with_resolved_credentials() {
        let orch = orchestrator(StubExchanger::default());
        orch.complete(&"abc".into()).await.unwrap();

        let calls = orch.exchanger.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "token:abc:literal-id:literal-secret".to_string(),
                "user:gho_token".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn rejected_code_skips_identity_lookup() {
        let orch = orchestrator(StubExchanger {
            reject_code: true,
            ..Default::default()
        });
        let err = orch.complete(&"used".into()).await.unwrap_err();

        assert!(matches!(err, Error::UpstreamAuth { .. }));
        assert_eq!(orch.exchanger.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_token_fails() {
        let orch = orchestrator(StubExchanger {
            reject_token: true,
            ..Default::default()
        });
        let err = orch.complete(&"abc".into()).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth { status: Some(401), .. }));
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_any_call() {
        let orch = orchestrator(StubExchanger::default());
        let err = orch.complete(&"".into()).await.unwrap_err();
        assert!(matches!(err, Error::MissingCode));
        assert!(orch.exchanger.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_secret_is_config_error() {
        let orch = CallbackOrchestrator::new(
            CallbackConfig::new(StubExchanger::default(), "literal-id", ""),
            StubSealer,
        );
        let err = orch.complete(&"abc".into()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(orch.exchanger.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn frontend_url_appends_to_existing_query() {
        assert_eq!(frontend_url("/", "a=1"), "/?a=1");
        assert_eq!(frontend_url("/ui?tab=login", "a=1"), "/ui?tab=login&a=1");
    }
}
