use std::future::Future;

use crate::error::Error;
use crate::oauth::{AuthClient, ProviderUser, TokenResponse};
use crate::types::{AuthorizationCode, ProviderAccessToken};

/// Provider-side half of the callback: code → access token → identity.
///
/// [`AuthClient`] is the GitHub implementation. Implement it yourself to
/// front a different provider client or to stub the provider in tests.
pub trait CodeExchanger: Send + Sync + 'static {
    /// Exchange an authorization code for an access token.
    fn request_access_token(
        &self,
        code: &AuthorizationCode,
        client_id: &str,
        client_secret: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send;

    /// Look up the account an access token belongs to.
    fn request_user(
        &self,
        access_token: &ProviderAccessToken,
    ) -> impl Future<Output = Result<ProviderUser, Error>> + Send;

    /// Provider consent URL for the authorize redirect.
    fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: Option<&str>,
        scopes: &[String],
    ) -> String;
}

impl CodeExchanger for AuthClient {
    fn request_access_token(
        &self,
        code: &AuthorizationCode,
        client_id: &str,
        client_secret: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send {
        AuthClient::request_access_token(self, code, client_id, client_secret)
    }

    fn request_user(
        &self,
        access_token: &ProviderAccessToken,
    ) -> impl Future<Output = Result<ProviderUser, Error>> + Send {
        AuthClient::request_user(self, access_token)
    }

    fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: Option<&str>,
        scopes: &[String],
    ) -> String {
        AuthClient::authorization_url(self, client_id, redirect_uri, scopes)
    }
}
