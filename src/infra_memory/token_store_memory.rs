use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct Entry {
    token: String,
    deadline: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// In-process token store for development and tests.
///
/// Each (member, kind) key lives in one dashmap shard, so every operation on a key
/// runs under that shard's lock and is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    entries: DashMap<(MemberId, TokenKind), Vec<Entry>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        InMemoryTokenStore {
            entries: DashMap::new(),
        }
    }

    /// Drop expired entries and empty keys. Returns how many tokens were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut dropped = 0;
        self.entries.retain(|_, slot| {
            let before = slot.len();
            slot.retain(|e| e.is_live(now));
            dropped += before - slot.len();
            !slot.is_empty()
        });
        dropped
    }

    /// Periodically purge expired entries until `cancel` fires.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let dropped = self.purge_expired();
                        if dropped > 0 {
                            debug!(dropped, "purged expired tokens");
                        }
                    }
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn save(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
        ttl: Duration,
    ) -> Result<(), TokenStoreError> {
        let now = Instant::now();
        let mut slot = self.entries.entry((member_id, kind)).or_default();
        if kind.is_exclusive() {
            slot.clear();
        } else {
            slot.retain(|e| e.is_live(now) && e.token != token);
        }
        slot.push(Entry {
            token: token.to_string(),
            deadline: now + ttl,
        });
        Ok(())
    }

    async fn exists(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError> {
        let now = Instant::now();
        let found = self
            .entries
            .get(&(member_id, kind))
            .map(|slot| slot.iter().any(|e| e.token == token && e.is_live(now)))
            .unwrap_or(false);
        Ok(found)
    }

    async fn remove(
        &self,
        member_id: MemberId,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, TokenStoreError> {
        let now = Instant::now();
        let key = (member_id, kind);
        let removed = match self.entries.get_mut(&key) {
            Some(mut slot) => {
                // expired entries count as already gone
                slot.retain(|e| e.is_live(now));
                let live = slot.len();
                slot.retain(|e| e.token != token);
                slot.len() < live
            }
            None => false,
        };
        self.entries.remove_if(&key, |_, slot| slot.is_empty());
        Ok(removed)
    }

    async fn remove_all(&self, member_id: MemberId) -> Result<(), TokenStoreError> {
        for kind in TokenKind::ALL {
            self.entries.remove(&(member_id, kind));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_exists_requires_exact_match() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Access, "abc", TTL).await.unwrap();

        assert!(store.exists(member, TokenKind::Access, "abc").await.unwrap());
        assert!(!store.exists(member, TokenKind::Access, "abd").await.unwrap());
        assert!(!store.exists(member, TokenKind::Refresh, "abc").await.unwrap());
        assert!(
            !store
                .exists(MemberId::new_v4(), TokenKind::Access, "abc")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_refresh_save_replaces_previous() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Refresh, "r1", TTL).await.unwrap();
        store.save(member, TokenKind::Refresh, "r2", TTL).await.unwrap();

        assert!(!store.exists(member, TokenKind::Refresh, "r1").await.unwrap());
        assert!(store.exists(member, TokenKind::Refresh, "r2").await.unwrap());
    }

    #[tokio::test]
    async fn test_access_tokens_accumulate() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Access, "a1", TTL).await.unwrap();
        store.save(member, TokenKind::Access, "a2", TTL).await.unwrap();

        assert!(store.exists(member, TokenKind::Access, "a1").await.unwrap());
        assert!(store.exists(member, TokenKind::Access, "a2").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_is_compare_and_delete() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Refresh, "r1", TTL).await.unwrap();

        assert!(!store.remove(member, TokenKind::Refresh, "other").await.unwrap());
        assert!(store.exists(member, TokenKind::Refresh, "r1").await.unwrap());

        assert!(store.remove(member, TokenKind::Refresh, "r1").await.unwrap());
        assert!(!store.remove(member, TokenKind::Refresh, "r1").await.unwrap());
        assert!(!store.exists(member, TokenKind::Refresh, "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_one_access_keeps_the_others() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Access, "a1", TTL).await.unwrap();
        store.save(member, TokenKind::Access, "a2", TTL).await.unwrap();

        assert!(store.remove(member, TokenKind::Access, "a1").await.unwrap());
        assert!(!store.exists(member, TokenKind::Access, "a1").await.unwrap());
        assert!(store.exists(member, TokenKind::Access, "a2").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_all_is_idempotent() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        let other = MemberId::new_v4();
        store.save(member, TokenKind::Access, "a1", TTL).await.unwrap();
        store.save(member, TokenKind::Refresh, "r1", TTL).await.unwrap();
        store.save(other, TokenKind::Access, "a9", TTL).await.unwrap();

        store.remove_all(member).await.unwrap();
        store.remove_all(member).await.unwrap();
        store.remove_all(MemberId::new_v4()).await.unwrap();

        assert!(!store.exists(member, TokenKind::Access, "a1").await.unwrap());
        assert!(!store.exists(member, TokenKind::Refresh, "r1").await.unwrap());
        assert!(store.exists(other, TokenKind::Access, "a9").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_without_removal() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store
            .save(member, TokenKind::Refresh, "r1", Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.exists(member, TokenKind::Refresh, "r1").await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!store.exists(member, TokenKind::Refresh, "r1").await.unwrap());
        assert!(!store.remove(member, TokenKind::Refresh, "r1").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = InMemoryTokenStore::new();
        let member = MemberId::new_v4();
        store
            .save(member, TokenKind::Access, "short", Duration::from_secs(5))
            .await
            .unwrap();
        store
            .save(member, TokenKind::Access, "long", Duration::from_secs(500))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.purge_expired(), 1);
        assert!(store.exists(member, TokenKind::Access, "long").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_remove_has_one_winner() {
        let store = Arc::new(InMemoryTokenStore::new());
        let member = MemberId::new_v4();
        store.save(member, TokenKind::Refresh, "r1", TTL).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.remove(member, TokenKind::Refresh, "r1").await.unwrap()
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
