use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Two-phase token check: signature and expiry first, then store membership.
pub struct TokenValidator {
    codec: Arc<dyn TokenCodec>,
    store: Arc<dyn TokenStore>,
}

impl TokenValidator {
    pub fn new(codec: Arc<dyn TokenCodec>, store: Arc<dyn TokenStore>) -> Self {
        TokenValidator { codec, store }
    }

    pub async fn validate(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<MemberId, TokenError> {
        let claims = self.codec.decode(token, now)?;
        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        if !self.store.exists(claims.subject, claims.kind, token).await? {
            return Err(TokenError::Revoked);
        }

        Ok(claims.subject)
    }
}
