use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Ephemeral index of the tokens a member currently holds, keyed by (member, kind).
///
/// Every keyed operation is atomic with respect to the others on the same key.
/// Entries expire on their own after the TTL given at save time.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Register `token`. For exclusive kinds (refresh) any previous token is replaced;
    /// access tokens accumulate, one entry per token value.
    async fn save(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
        ttl: Duration,
    ) -> Result<(), TokenStoreError>;

    /// True only if exactly `token` is registered and not yet expired.
    async fn exists(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError>;

    /// Compare-and-delete: remove the entry only if it holds `token`.
    /// Returns whether something was removed.
    async fn remove(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError>;

    /// Remove every token of every kind held by the member.
    async fn remove_all(&self, member_id: MemberId) -> Result<(), TokenStoreError>;
}
