use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};

#[derive(Debug)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeAuthService {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal fake for local development: tokens are plain `fake-*-token:<email>` strings
// and nothing is ever revoked.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        Ok(LoginResult {
            member_id: get_fake_id(&request.email),
            tokens: get_fake_tokens(&request.email),
        })
    }

    async fn verify_token(&self, token: &str) -> Result<MemberId, AuthError> {
        if let Some(email) = token.strip_prefix("fake-access-token:") {
            Ok(get_fake_id(email))
        } else {
            Err(TokenError::Malformed.into())
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        if let Some(email) = refresh_token.strip_prefix("fake-refresh-token:") {
            Ok(get_fake_tokens(email))
        } else {
            Err(TokenError::Malformed.into())
        }
    }

    async fn logout(&self, _member_id: MemberId) -> Result<(), AuthError> {
        Ok(())
    }

    async fn revoke_access_token(
        &self,
        _member_id: MemberId,
        _token: &str,
    ) -> Result<bool, AuthError> {
        Ok(false)
    }
}

fn get_fake_id(email: &str) -> MemberId {
    MemberId(uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        email.as_bytes(),
    ))
}

fn get_fake_tokens(email: &str) -> AuthTokens {
    let now = Utc::now();
    AuthTokens {
        access_token: AccessToken(format!("fake-access-token:{}", email)),
        access_token_expires_at: now + Duration::days(1), // 1 day
        refresh_token: RefreshToken(format!("fake-refresh-token:{}", email)),
        refresh_token_expires_at: now + Duration::days(7), // 7 days
    }
}
