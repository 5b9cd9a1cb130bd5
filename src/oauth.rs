use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::types::{AuthorizationCode, ProviderAccessToken, ProviderIdentity};

/// GitHub `OAuth2` endpoint configuration.
///
/// Defaults target github.com. Override the URLs for GitHub Enterprise:
///
/// ```rust,ignore
/// use registry_oauth::OAuthConfig;
///
/// let config = OAuthConfig::new("my-registry")
///     .with_token_url("https://ghe.example.com/login/oauth/access_token".parse()?)
///     .with_user_url("https://ghe.example.com/api/v3/user".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) user_agent: String,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) user_url: Url,
}

impl OAuthConfig {
    /// Create a configuration for github.com.
    ///
    /// GitHub rejects API requests without a `User-Agent`, so it is required here.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            auth_url: "https://github.com/login/oauth/authorize"
                .parse()
                .expect("valid default URL"),
            token_url: "https://github.com/login/oauth/access_token"
                .parse()
                .expect("valid default URL"),
            user_url: "https://api.github.com/user"
                .parse()
                .expect("valid default URL"),
        }
    }

    /// Override the consent (authorize) endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the code exchange endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the authenticated-user endpoint.
    #[must_use]
    pub fn with_user_url(mut self, url: Url) -> Self {
        self.user_url = url;
        self
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn user_url(&self) -> &Url {
        &self.user_url
    }
}

/// Token response from the provider's code exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: ProviderAccessToken,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Error body GitHub returns (with a 200 status) for rejected codes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenReply {
    Token(TokenResponse),
    Error(ErrorBody),
}

/// Authenticated provider account.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct ProviderUser {
    pub login: ProviderIdentity,
}

/// HTTP client for the GitHub `OAuth2` endpoints.
pub struct AuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl AuthClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for timeouts, connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the provider consent URL the browser is sent to.
    #[must_use]
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: Option<&str>,
        scopes: &[String],
    ) -> String {
        let mut url = self.config.auth_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", client_id);
            if let Some(redirect_uri) = redirect_uri {
                pairs.append_pair("redirect_uri", redirect_uri);
            }
            if !scopes.is_empty() {
                pairs.append_pair("scope", &scopes.join(" "));
            }
        }
        url.into()
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::UpstreamAuth`] if
    /// the provider rejects the code (expired, already used, wrong client).
    pub async fn request_access_token(
        &self,
        code: &AuthorizationCode,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, Error> {
        let params = [
            ("code", code.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange").await?;
        match response.json::<TokenReply>().await? {
            TokenReply::Token(token) => Ok(token),
            TokenReply::Error(body) => Err(Error::UpstreamAuth {
                operation: "token exchange",
                status: None,
                detail: body.error_description.unwrap_or(body.error),
            }),
        }
    }

    /// Fetch the account the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::UpstreamAuth`] if
    /// the token is invalid or expired.
    pub async fn request_user(
        &self,
        access_token: &ProviderAccessToken,
    ) -> Result<ProviderUser, Error> {
        let response = self
            .http
            .get(self.config.user_url.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .bearer_auth(access_token.as_str())
            .send()
            .await?;

        let response = Self::ensure_success(response, "user request").await?;
        response.json::<ProviderUser>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::UpstreamAuth {
            operation,
            status: Some(status),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AuthClient {
        let config = OAuthConfig::new("registry-oauth-tests")
            .with_token_url(format!("{}/login/oauth/access_token", server.uri()).parse().unwrap())
            .with_user_url(format!("{}/user", server.uri()).parse().unwrap());
        AuthClient::new(config)
    }

    #[test]
    fn test_config_defaults_to_github() {
        let config = OAuthConfig::new("ua");
        assert_eq!(
            config.token_url().as_str(),
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(config.user_url().as_str(), "https://api.github.com/user");
        assert_eq!(config.user_agent(), "ua");
    }

    #[test]
    fn test_authorization_url() {
        let client = AuthClient::new(OAuthConfig::new("ua"));
        let url = client.authorization_url(
            "my-client",
            Some("https://registry.example.com/-/oauth/callback"),
            &["read:org".to_string()],
        );

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fregistry.example.com%2F-%2Foauth%2Fcallback"));
        assert!(url.contains("scope=read%3Aorg"));
    }

    #[test]
    fn test_authorization_url_omits_empty_scope() {
        let client = AuthClient::new(OAuthConfig::new("ua"));
        let url = client.authorization_url("my-client", None, &[]);
        assert!(!url.contains("scope="));
        assert!(!url.contains("redirect_uri="));
    }

    #[tokio::test]
    async fn test_request_access_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_token",
                "token_type": "bearer",
                "scope": ""
            })))
            .mount(&server)
            .await;

        let token = client_for(&server)
            .request_access_token(&"abc".into(), "id", "shh")
            .await
            .unwrap();
        assert_eq!(token.access_token.as_str(), "gho_token");
    }

    #[tokio::test]
    async fn test_request_access_token_error_in_ok_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .request_access_token(&"used".into(), "id", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth { status: None, .. }));
        assert!(err.to_string().contains("incorrect or expired"));
    }

    #[tokio::test]
    async fn test_request_user_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .request_user(&ProviderAccessToken::from("revoked".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UpstreamAuth {
                status: Some(401),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_request_user_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_token"))
            .and(header("user-agent", "registry-oauth-tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "octocat",
                "id": 1
            })))
            .mount(&server)
            .await;

        let user = client_for(&server)
            .request_user(&ProviderAccessToken::from("gho_token".to_string()))
            .await
            .unwrap();
        assert_eq!(user.login.as_str(), "octocat");
    }
}
