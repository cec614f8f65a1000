// Auth commands
// Login page and session

use serde::{Deserialize, Serialize};

use super::AppState;
use crate::services::AuthUser;

/// Session info without tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserDto {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: Option<String>,
}

impl From<AuthUser> for AuthUserDto {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            provider_id: user.provider_id,
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("Email and password are required".to_string());
    }
    Ok(())
}

pub async fn login(
    email: String,
    password: String,
    state: &AppState,
) -> Result<AuthUserDto, String> {
    validate_credentials(&email, &password)?;
    state
        .identity
        .sign_in_with_email(email.trim(), &password)
        .await
        .map(AuthUserDto::from)
        .map_err(|e| e.to_string())
}

pub async fn signup(
    email: String,
    password: String,
    state: &AppState,
) -> Result<AuthUserDto, String> {
    validate_credentials(&email, &password)?;
    state
        .identity
        .sign_up_with_email(email.trim(), &password)
        .await
        .map(AuthUserDto::from)
        .map_err(|e| e.to_string())
}

/// Signs in with an id token issued by `provider_id`, e.g. `google.com`
pub async fn login_with_provider(
    provider_id: String,
    id_token: String,
    state: &AppState,
) -> Result<AuthUserDto, String> {
    state
        .identity
        .sign_in_with_idp(&provider_id, &id_token)
        .await
        .map(AuthUserDto::from)
        .map_err(|e| e.to_string())
}

pub async fn logout(state: &AppState) -> Result<(), String> {
    state.identity.sign_out().map_err(|e| e.to_string())
}

pub async fn get_current_user(state: &AppState) -> Result<Option<AuthUserDto>, String> {
    state
        .identity
        .current_user()
        .map(|user| user.map(AuthUserDto::from))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{test_state, GUEST_USER_ID};
    use crate::services::SessionStore;

    #[tokio::test]
    async fn test_login_validation() {
        let state = test_state();
        assert_eq!(
            login("".to_string(), "pw".to_string(), &state).await.unwrap_err(),
            "Email and password are required"
        );
    }

    #[tokio::test]
    async fn test_login_without_api_key() {
        let state = test_state();
        let err = login("a@b.co".to_string(), "secret".to_string(), &state)
            .await
            .unwrap_err();
        assert_eq!(err, "Sign-in is not configured: no identity API key");
        assert_eq!(get_current_user(&state).await.unwrap(), None);
        assert_eq!(state.current_user_id().unwrap(), GUEST_USER_ID);
    }

    #[tokio::test]
    async fn test_session_drives_current_user() {
        let state = test_state();

        // a stored session switches the active user id
        let session = AuthUser {
            uid: "uid-42".to_string(),
            email: Some("a@b.co".to_string()),
            display_name: None,
            id_token: "t".to_string(),
            refresh_token: "r".to_string(),
            provider_id: None,
        };
        SessionStore::new(state.store.clone()).save(&session).unwrap();

        assert_eq!(state.current_user_id().unwrap(), "uid-42");
        let dto = get_current_user(&state).await.unwrap().unwrap();
        assert_eq!(dto.email.as_deref(), Some("a@b.co"));

        logout(&state).await.unwrap();
        assert_eq!(state.current_user_id().unwrap(), GUEST_USER_ID);
    }
}
