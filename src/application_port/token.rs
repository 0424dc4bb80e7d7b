use crate::domain_model::*;
use crate::domain_port::TokenStoreError;
use chrono::{DateTime, Utc};

/// Why a token was refused, or why the token machinery could not answer.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TokenError {
    #[error("token malformed")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("expected {expected} token, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("token revoked")]
    Revoked,
    #[error("refresh token already used or rotated")]
    StaleRefresh,
    #[error("token store unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl TokenError {
    /// Transient failures worth retrying; everything else is final for the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::Unavailable(_))
    }

    /// True when the token itself was refused (as opposed to an infrastructure failure).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed
                | TokenError::Expired
                | TokenError::WrongKind { .. }
                | TokenError::Revoked
                | TokenError::StaleRefresh
        )
    }
}

impl From<TokenStoreError> for TokenError {
    fn from(error: TokenStoreError) -> Self {
        match error {
            TokenStoreError::Unavailable(e) => TokenError::Unavailable(e),
        }
    }
}

pub trait TokenCodec: Send + Sync {
    /// Mint a signed token for `subject` valid from `now` for the configured TTL of `kind`.
    fn mint(
        &self,
        subject: MemberId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<MintedToken, TokenError>;

    /// Check signature and expiry against `now` and return the embedded claims.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}
