use super::{RefreshCoordinator, TokenIssuer, TokenValidator};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealAuthService {
    directory: Arc<dyn MemberDirectory>,
    credential_hasher: Arc<dyn CredentialHasher>,
    store: Arc<dyn TokenStore>,
    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
    coordinator: RefreshCoordinator,
}

impl RealAuthService {
    pub fn new(
        directory: Arc<dyn MemberDirectory>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(token_codec.clone(), store.clone()));
        let validator = Arc::new(TokenValidator::new(token_codec, store.clone()));
        let coordinator =
            RefreshCoordinator::new(validator.clone(), store.clone(), issuer.clone());
        Self {
            directory,
            credential_hasher,
            store,
            issuer,
            validator,
            coordinator,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;

        let rec = self
            .directory
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !rec.is_active {
            debug!(member_id = %rec.member_id, "login refused for inactive member");
            return Err(AuthError::InvalidCredentials);
        }

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issuer.issue(rec.member_id, Utc::now()).await?;
        info!(member_id = %rec.member_id, "member logged in");

        Ok(LoginResult {
            member_id: rec.member_id,
            tokens,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<MemberId, AuthError> {
        let member_id = self
            .validator
            .validate(token, TokenKind::Access, Utc::now())
            .await?;
        Ok(member_id)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let tokens = self.coordinator.refresh(refresh_token, Utc::now()).await?;
        Ok(tokens)
    }

    async fn logout(&self, member_id: MemberId) -> Result<(), AuthError> {
        self.store
            .remove_all(member_id)
            .await
            .map_err(TokenError::from)?;
        info!(%member_id, "member logged out");
        Ok(())
    }

    async fn revoke_access_token(
        &self,
        member_id: MemberId,
        token: &str,
    ) -> Result<bool, AuthError> {
        let removed = self
            .store
            .remove(member_id, TokenKind::Access, token)
            .await
            .map_err(TokenError::from)?;
        debug!(%member_id, removed, "access token revoked");
        Ok(removed)
    }
}
