use super::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// An exclusive kind keeps at most one live token per member:
    /// saving a new one replaces the old.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, TokenKind::Refresh)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims embedded in a token, as seen after a successful decode.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Claims {
    pub subject: MemberId,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_id: String,
}

impl Claims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

/// A freshly minted token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_only_refresh_is_exclusive() {
        assert!(TokenKind::Refresh.is_exclusive());
        assert!(!TokenKind::Access.is_exclusive());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let claims = Claims {
            subject: MemberId::new_v4(),
            kind: TokenKind::Access,
            issued_at: now,
            expires_at: now + Duration::seconds(300),
            token_id: "jti".to_string(),
        };
        assert!(!claims.is_expired_at(now + Duration::seconds(300)));
        assert!(claims.is_expired_at(now + Duration::seconds(301)));
    }
}
