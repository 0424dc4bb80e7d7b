use super::{TokenIssuer, TokenValidator};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Exchanges a refresh token for a new pair, consuming the old one.
///
/// The old refresh entry is taken out with a compare-and-delete before anything is
/// issued, so of several callers presenting the same token at most one wins.
pub struct RefreshCoordinator {
    validator: Arc<TokenValidator>,
    store: Arc<dyn TokenStore>,
    issuer: Arc<TokenIssuer>,
}

impl RefreshCoordinator {
    pub fn new(
        validator: Arc<TokenValidator>,
        store: Arc<dyn TokenStore>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        RefreshCoordinator {
            validator,
            store,
            issuer,
        }
    }

    /// A correctly signed refresh token that is no longer in the store is reported as
    /// `StaleRefresh`, not `Revoked`; other validation errors are returned unchanged.
    pub async fn refresh(
        &self,
        old_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthTokens, TokenError> {
        let member_id = match self
            .validator
            .validate(old_refresh_token, TokenKind::Refresh, now)
            .await
        {
            Ok(member_id) => member_id,
            // a signed refresh token missing from the store was already rotated or revoked
            Err(TokenError::Revoked) => return Err(TokenError::StaleRefresh),
            Err(e) => return Err(e),
        };

        let removed = self
            .store
            .remove(member_id, TokenKind::Refresh, old_refresh_token)
            .await?;
        if !removed {
            debug!(%member_id, "lost refresh race");
            return Err(TokenError::StaleRefresh);
        }

        let tokens = self.issuer.issue(member_id, now).await?;
        info!(%member_id, "refresh token rotated");
        Ok(tokens)
    }
}
