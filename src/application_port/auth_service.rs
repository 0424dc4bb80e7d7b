use super::TokenError;
use crate::domain_model::*;
use crate::domain_port::DirectoryError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("directory error: {0}")]
    Directory(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<DirectoryError> for AuthError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::Unavailable(e) => AuthError::Directory(e),
            DirectoryError::Corrupted(e) => AuthError::InternalError(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub member_id: MemberId,
    pub tokens: AuthTokens,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Resolve the member behind an access token.
    async fn verify_token(&self, token: &str) -> Result<MemberId, AuthError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;
    /// Drop every token of the member. Idempotent.
    async fn logout(&self, member_id: MemberId) -> Result<(), AuthError>;
    /// Drop a single access token, leaving the member's other sessions alive.
    async fn revoke_access_token(
        &self,
        member_id: MemberId,
        token: &str,
    ) -> Result<bool, AuthError>;
}
