// Identity client
// Email/password and federated sign-in against the identity toolkit REST API

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::error::AppResult;
use crate::services::storage::KeyValueStore;

pub const SESSION_KEY: &str = "crackalgo_auth_session";

/// Authentication failures, with the messages shown to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("No account found with this email address")]
    UserNotFound,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Too many failed attempts. Please try again later")]
    TooManyRequests,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("An account with this email already exists")]
    EmailAlreadyInUse,

    #[error("Password is too weak. Please choose a stronger password")]
    WeakPassword,

    #[error("Email/password accounts are not enabled. Please contact support")]
    OperationNotAllowed,

    #[error("Sign-in is not configured: no identity API key")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Maps a REST error code such as `EMAIL_NOT_FOUND` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`
    pub fn from_code(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyRequests,
            "USER_DISABLED" => AuthError::UserDisabled,
            "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                AuthError::OperationNotAllowed
            }
            _ => AuthError::Other(message.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Used as `requestUri` for federated sign-in
    pub request_uri: String,
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            request_uri: "http://localhost".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Signed-in user, persisted as the current session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub provider_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: String,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    provider_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl From<AuthResponse> for AuthUser {
    fn from(resp: AuthResponse) -> Self {
        Self {
            uid: resp.local_id,
            email: resp.email.filter(|e| !e.is_empty()),
            display_name: resp.display_name.filter(|n| !n.is_empty()),
            id_token: resp.id_token,
            refresh_token: resp.refresh_token,
            provider_id: resp.provider_id,
        }
    }
}

/// Current session in the key-value store
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn current(&self) -> AppResult<Option<AuthUser>> {
        match self.store.get_item(SESSION_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, user: &AuthUser) -> AppResult<()> {
        let json = serde_json::to_string(user)?;
        self.store.set_item(SESSION_KEY, &json)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove_item(SESSION_KEY)
    }
}

pub struct IdentityClient {
    config: IdentityConfig,
    http_client: Arc<reqwest::Client>,
    session: SessionStore,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            config,
            http_client: Arc::new(http_client),
            session: SessionStore::new(store),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().map_or(false, |k| !k.is_empty())
    }

    pub fn current_user(&self) -> AppResult<Option<AuthUser>> {
        self.session.current()
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        log::info!("signing in {}", email);
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let user = self.call("accounts:signInWithPassword", &body).await?;
        self.session.save(&user)?;
        Ok(user)
    }

    pub async fn sign_up_with_email(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        log::info!("creating account {}", email);
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let user = self.call("accounts:signUp", &body).await?;
        self.session.save(&user)?;
        Ok(user)
    }

    /// Exchanges a provider id token (e.g. `google.com`) for a session
    pub async fn sign_in_with_idp(&self, provider_id: &str, id_token: &str) -> AppResult<AuthUser> {
        log::info!("signing in with {}", provider_id);
        let body = IdpRequest {
            post_body: idp_post_body(provider_id, id_token)?,
            request_uri: self.config.request_uri.clone(),
            return_secure_token: true,
            return_idp_credential: true,
        };
        let user = self.call("accounts:signInWithIdp", &body).await?;
        self.session.save(&user)?;
        Ok(user)
    }

    pub fn sign_out(&self) -> AppResult<()> {
        self.session.clear()
    }

    async fn call<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<AuthUser, AuthError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AuthError::MissingApiKey),
        };

        let url = format!(
            "{}/{}?key={}",
            self.config.base_url.trim_end_matches('/'),
            endpoint,
            api_key
        );

        let response = self.http_client.post(&url).json(body).send().await?;

        if response.status().is_success() {
            let auth = response.json::<AuthResponse>().await?;
            return Ok(auth.into());
        }

        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => {
                log::warn!("{} failed: {}", endpoint, envelope.error.message);
                Err(AuthError::from_code(&envelope.error.message))
            }
            Err(_) => Err(AuthError::Other(format!("{} returned {}", endpoint, status))),
        }
    }
}

/// Form-encoded `postBody` for `signInWithIdp`
fn idp_post_body(provider_id: &str, id_token: &str) -> Result<String, AuthError> {
    let url = Url::parse_with_params(
        "http://localhost/",
        &[("id_token", id_token), ("providerId", provider_id)],
    )
    .map_err(|e| AuthError::Other(e.to_string()))?;
    Ok(url.query().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::storage::MemoryStore;

    fn user() -> AuthUser {
        AuthUser {
            uid: "abc123".to_string(),
            email: Some("coder@example.com".to_string()),
            display_name: None,
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            provider_id: None,
        }
    }

    #[test]
    fn test_error_codes_map_to_messages() {
        assert_eq!(
            AuthError::from_code("EMAIL_NOT_FOUND").to_string(),
            "No account found with this email address"
        );
        assert_eq!(AuthError::from_code("INVALID_PASSWORD"), AuthError::WrongPassword);
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters")
                .to_string(),
            "Password is too weak. Please choose a stronger password"
        );
        assert_eq!(
            AuthError::from_code("EMAIL_EXISTS").to_string(),
            "An account with this email already exists"
        );
        assert_eq!(
            AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER").to_string(),
            "Too many failed attempts. Please try again later"
        );
        assert_eq!(
            AuthError::from_code("SOMETHING_NEW").to_string(),
            "SOMETHING_NEW"
        );
    }

    #[test]
    fn test_session_roundtrip() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(session.current().unwrap().is_none());

        session.save(&user()).unwrap();
        assert_eq!(session.current().unwrap(), Some(user()));

        session.clear().unwrap();
        assert!(session.current().unwrap().is_none());
    }

    #[test]
    fn test_idp_post_body_is_encoded() {
        let body = idp_post_body("google.com", "a+b=c").unwrap();
        assert_eq!(body, "id_token=a%2Bb%3Dc&providerId=google.com");
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_request() {
        let config = IdentityConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..IdentityConfig::default()
        };
        let client = IdentityClient::new(config, Arc::new(MemoryStore::new()));
        assert!(!client.is_configured());

        let err = client
            .sign_in_with_email("coder@example.com", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::MissingApiKey)));
        assert!(client.current_user().unwrap().is_none());
    }

    #[test]
    fn test_sign_out_clears_session() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SessionStore::new(store.clone()).save(&user()).unwrap();

        let client = IdentityClient::new(IdentityConfig::default(), store);
        assert_eq!(client.current_user().unwrap().unwrap().uid, "abc123");
        client.sign_out().unwrap();
        assert!(client.current_user().unwrap().is_none());
    }
}
