use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Mints access/refresh pairs and registers them in the token store.
pub struct TokenIssuer {
    codec: Arc<dyn TokenCodec>,
    store: Arc<dyn TokenStore>,
}

impl TokenIssuer {
    pub fn new(codec: Arc<dyn TokenCodec>, store: Arc<dyn TokenStore>) -> Self {
        TokenIssuer { codec, store }
    }

    /// Issue a fresh pair for `member_id`. The new refresh token replaces any previous one.
    ///
    /// Either both tokens are registered or the call fails; a pair is never returned
    /// half-registered.
    pub async fn issue(
        &self,
        member_id: MemberId,
        now: DateTime<Utc>,
    ) -> Result<AuthTokens, TokenError> {
        let access = self.codec.mint(member_id, TokenKind::Access, now)?;
        let refresh = self.codec.mint(member_id, TokenKind::Refresh, now)?;

        self.register(member_id, &access, now).await?;

        if let Err(e) = self.register(member_id, &refresh, now).await {
            warn!(%member_id, error = %e, "refresh token save failed, withdrawing access token");
            if let Err(cleanup) = self
                .store
                .remove(member_id, TokenKind::Access, &access.token)
                .await
            {
                // the orphan expires with the access ttl
                warn!(%member_id, error = %cleanup, "could not withdraw access token");
            }
            return Err(e);
        }

        debug!(%member_id, "token pair issued");

        Ok(AuthTokens {
            access_token: AccessToken(access.token),
            refresh_token: RefreshToken(refresh.token),
            access_token_expires_at: access.claims.expires_at,
            refresh_token_expires_at: refresh.claims.expires_at,
        })
    }

    async fn register(
        &self,
        member_id: MemberId,
        minted: &MintedToken,
        now: DateTime<Utc>,
    ) -> Result<(), TokenError> {
        let ttl = Self::ttl_until(minted.claims.expires_at, now);
        self.store
            .save(member_id, minted.claims.kind, &minted.token, ttl)
            .await?;
        Ok(())
    }

    fn ttl_until(until: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let secs = (until - now).num_seconds();
        if secs <= 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(secs as u64)
        }
    }
}
