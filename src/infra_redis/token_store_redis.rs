use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use sha2::{Digest, Sha256};
use std::time::Duration;

const TOKEN_SAVE: &str = include_str!("token_save.lua");
const TOKEN_EXISTS: &str = include_str!("token_exists.lua");
const TOKEN_REMOVE: &str = include_str!("token_remove.lua");

/// Redis-backed token store.
///
/// Refresh tokens live in a plain string key (`SET PX`), access tokens in a sorted set
/// scored by expiry so one member can hold several. Only SHA-256 digests of the tokens
/// are written. Every keyed operation is a single Lua script, hence atomic per key.
pub struct RedisTokenStore {
    conn: ConnectionManager,
    prefix: String,
    save_script: Script,
    exists_script: Script,
    remove_script: Script,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisTokenStore {
            conn,
            prefix: prefix.into(),
            save_script: Script::new(TOKEN_SAVE),
            exists_script: Script::new(TOKEN_EXISTS),
            remove_script: Script::new(TOKEN_REMOVE),
        }
    }

    fn key(&self, member_id: MemberId, kind: TokenKind) -> String {
        format!("{}:{}:{}", self.prefix, member_id, kind)
    }

    fn digest(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    #[inline]
    fn exclusive_flag(kind: TokenKind) -> &'static str {
        if kind.is_exclusive() { "1" } else { "0" }
    }
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn save(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
        ttl: Duration,
    ) -> Result<(), TokenStoreError> {
        let key = self.key(member_id, kind);
        let mut conn = self.conn.clone();
        let ttl_ms = ttl.as_millis().max(1) as u64;
        let _: i64 = self
            .save_script
            .key(&key)
            .arg(Self::digest(token))
            .arg(ttl_ms)
            .arg(Self::exclusive_flag(kind))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn exists(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError> {
        let key = self.key(member_id, kind);
        let mut conn = self.conn.clone();
        let found: i64 = self
            .exists_script
            .key(&key)
            .arg(Self::digest(token))
            .arg(Self::exclusive_flag(kind))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))?;
        Ok(found == 1)
    }

    async fn remove(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError> {
        let key = self.key(member_id, kind);
        let mut conn = self.conn.clone();
        let removed: i64 = self
            .remove_script
            .key(&key)
            .arg(Self::digest(token))
            .arg(Self::exclusive_flag(kind))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))?;
        Ok(removed == 1)
    }

    async fn remove_all(&self, member_id: MemberId) -> Result<(), TokenStoreError> {
        let keys: Vec<String> = TokenKind::ALL
            .iter()
            .map(|kind| self.key(member_id, *kind))
            .collect();
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(&keys)
            .await
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
