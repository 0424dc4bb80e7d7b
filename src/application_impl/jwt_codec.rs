use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_SIGNING_KEY_LEN: usize = 32;
pub const MAX_REFRESH_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Process-wide token settings, built once at startup and shared read-only.
#[derive(Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenConfigError {
    #[error("signing key too short: {0} bytes, need at least 32")]
    SigningKeyTooShort(usize),
    #[error("access ttl must be at least one second")]
    AccessTtlTooShort,
    #[error("access ttl ({access:?}) must be shorter than refresh ttl ({refresh:?})")]
    TtlOrder { access: Duration, refresh: Duration },
    #[error("refresh ttl ({0:?}) exceeds the maximum of 366 days")]
    RefreshTtlTooLong(Duration),
}

impl TokenConfig {
    pub fn validate(&self) -> Result<(), TokenConfigError> {
        if self.signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(TokenConfigError::SigningKeyTooShort(self.signing_key.len()));
        }
        if self.access_ttl.as_secs() == 0 {
            return Err(TokenConfigError::AccessTtlTooShort);
        }
        if self.refresh_ttl > MAX_REFRESH_TTL {
            return Err(TokenConfigError::RefreshTtlTooLong(self.refresh_ttl));
        }
        if self.access_ttl >= self.refresh_ttl {
            return Err(TokenConfigError::TtlOrder {
                access: self.access_ttl,
                refresh: self.refresh_ttl,
            });
        }
        Ok(())
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String, // member id as string
    typ: TokenKind,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // keeps tokens minted in the same second distinct
}

pub struct JwtHs256Codec {
    cfg: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn try_new(cfg: TokenConfig) -> Result<Self, TokenConfigError> {
        cfg.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against the caller's clock in `decode`
        validation.validate_exp = false;
        validation.set_audience(&[cfg.audience.clone()]);
        validation.set_issuer(&[cfg.issuer.clone()]);

        Ok(JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(&cfg.signing_key),
            decoding_key: DecodingKey::from_secret(&cfg.signing_key),
            validation,
            cfg,
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.cfg
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    #[inline]
    fn parse_member_id(sub: &str) -> Result<MemberId, TokenError> {
        sub.parse::<MemberId>().map_err(|_| TokenError::Malformed)
    }

    #[inline]
    fn parse_timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
        DateTime::from_timestamp(secs, 0).ok_or(TokenError::Malformed)
    }
}

impl TokenCodec for JwtHs256Codec {
    fn mint(
        &self,
        subject: MemberId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<MintedToken, TokenError> {
        let iat = now.timestamp();
        let exp = i64::try_from(self.cfg.ttl(kind).as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| TokenError::InternalError(format!("{} ttl out of range", kind)))?;
        let jwt_claims = JwtClaims {
            sub: subject.to_string(),
            typ: kind,
            exp,
            iat,
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Self::gen_jti(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &jwt_claims, &self.encoding_key)
            .map_err(|e| TokenError::InternalError(e.to_string()))?;

        let claims = Claims {
            subject,
            kind,
            issued_at: Self::parse_timestamp(iat).map_err(|_| {
                TokenError::InternalError(format!("issued-at out of range: {}", iat))
            })?,
            expires_at: Self::parse_timestamp(exp).map_err(|_| {
                TokenError::InternalError(format!("expiry out of range: {}", exp))
            })?,
            token_id: jwt_claims.jti,
        };
        Ok(MintedToken { token, claims })
    }

    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Malformed)?;
        let jwt_claims = data.claims;

        let claims = Claims {
            subject: Self::parse_member_id(&jwt_claims.sub)?,
            kind: jwt_claims.typ,
            issued_at: Self::parse_timestamp(jwt_claims.iat)?,
            expires_at: Self::parse_timestamp(jwt_claims.exp)?,
            token_id: jwt_claims.jti,
        };
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn test_config() -> TokenConfig {
        TokenConfig {
            issuer: "authgate.test".to_string(),
            audience: "test-client".to_string(),
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(10 * 24 * 60 * 60),
            signing_key: b"0123456789abcdef0123456789abcdef".to_vec(),
        }
    }

    fn test_codec() -> JwtHs256Codec {
        JwtHs256Codec::try_new(test_config()).unwrap()
    }

    #[test]
    fn test_mint_then_decode_returns_claims() {
        let codec = test_codec();
        let member = MemberId::new_v4();
        let now = Utc::now();

        let minted = codec.mint(member, TokenKind::Access, now).unwrap();
        let claims = codec.decode(&minted.token, now).unwrap();

        assert_eq!(claims, minted.claims);
        assert_eq!(claims.subject, member);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(
            claims.expires_at - claims.issued_at,
            ChronoDuration::seconds(300)
        );
    }

    #[test]
    fn test_refresh_lives_longer_than_access() {
        let codec = test_codec();
        let member = MemberId::new_v4();
        let now = Utc::now();

        let access = codec.mint(member, TokenKind::Access, now).unwrap();
        let refresh = codec.mint(member, TokenKind::Refresh, now).unwrap();
        assert!(access.claims.expires_at < refresh.claims.expires_at);
        assert_eq!(refresh.claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_tokens_minted_in_same_second_differ() {
        let codec = test_codec();
        let member = MemberId::new_v4();
        let now = Utc::now();

        let a = codec.mint(member, TokenKind::Refresh, now).unwrap();
        let b = codec.mint(member, TokenKind::Refresh, now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_decode_expired() {
        let codec = test_codec();
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        let minted = codec.mint(MemberId::new_v4(), TokenKind::Access, now).unwrap();

        assert!(codec.decode(&minted.token, now + ChronoDuration::seconds(299)).is_ok());
        assert!(codec.decode(&minted.token, now + ChronoDuration::seconds(300)).is_ok());
        assert_eq!(
            codec.decode(&minted.token, now + ChronoDuration::seconds(301)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let codec = test_codec();
        let now = Utc::now();
        assert_eq!(codec.decode("", now), Err(TokenError::Malformed));
        assert_eq!(codec.decode("not-a-token", now), Err(TokenError::Malformed));
        assert_eq!(codec.decode("a.b.c", now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_decode_spliced_payload_is_malformed() {
        let codec = test_codec();
        let now = Utc::now();
        let victim = codec.mint(MemberId::new_v4(), TokenKind::Access, now).unwrap();
        let attacker = codec.mint(MemberId::new_v4(), TokenKind::Access, now).unwrap();

        let v: Vec<&str> = victim.token.split('.').collect();
        let a: Vec<&str> = attacker.token.split('.').collect();
        let forged = format!("{}.{}.{}", v[0], a[1], v[2]);

        assert_eq!(codec.decode(&forged, now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_decode_foreign_key_is_malformed() {
        let codec = test_codec();
        let mut other_cfg = test_config();
        other_cfg.signing_key = b"fedcba9876543210fedcba9876543210".to_vec();
        let other = JwtHs256Codec::try_new(other_cfg).unwrap();
        let now = Utc::now();

        let minted = other.mint(MemberId::new_v4(), TokenKind::Access, now).unwrap();
        assert_eq!(codec.decode(&minted.token, now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_decode_foreign_audience_is_malformed() {
        let codec = test_codec();
        let mut other_cfg = test_config();
        other_cfg.audience = "someone-else".to_string();
        let other = JwtHs256Codec::try_new(other_cfg).unwrap();
        let now = Utc::now();

        let minted = other.mint(MemberId::new_v4(), TokenKind::Access, now).unwrap();
        assert_eq!(codec.decode(&minted.token, now), Err(TokenError::Malformed));
    }

    #[test]
    fn test_config_rejects_short_key() {
        let mut cfg = test_config();
        cfg.signing_key = b"short".to_vec();
        assert!(matches!(
            JwtHs256Codec::try_new(cfg),
            Err(TokenConfigError::SigningKeyTooShort(5))
        ));
    }

    #[test]
    fn test_config_rejects_access_not_shorter_than_refresh() {
        let mut cfg = test_config();
        cfg.access_ttl = cfg.refresh_ttl;
        assert!(matches!(
            JwtHs256Codec::try_new(cfg),
            Err(TokenConfigError::TtlOrder { .. })
        ));
    }

    #[test]
    fn test_config_rejects_unbounded_refresh_ttl() {
        let mut cfg = test_config();
        cfg.refresh_ttl = Duration::from_secs(u64::MAX);
        assert!(matches!(
            JwtHs256Codec::try_new(cfg),
            Err(TokenConfigError::RefreshTtlTooLong(_))
        ));

        let mut cfg = test_config();
        cfg.refresh_ttl = MAX_REFRESH_TTL;
        let codec = JwtHs256Codec::try_new(cfg).unwrap();
        let now = Utc::now();
        let minted = codec.mint(MemberId::new_v4(), TokenKind::Refresh, now).unwrap();
        assert!(minted.claims.expires_at > now);
        assert!(codec.decode(&minted.token, now).is_ok());
    }

    #[test]
    fn test_config_debug_hides_key() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
