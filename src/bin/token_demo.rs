//! Walks a member through the token lifecycle against a live store.
//!
//! Uses Redis when `REDIS_URL` is set, the in-process store otherwise.
//! $ REDIS_URL=redis://127.0.0.1:6379 cargo run --bin token_demo
use authgate::application_impl::*;
use authgate::application_port::*;
use authgate::domain_model::*;
use authgate::domain_port::*;
use authgate::infra_memory::InMemoryTokenStore;
use authgate::infra_redis::RedisTokenStore;
use authgate::logger::*;
use chrono::{Duration, Utc};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logger = Logger::new_bootstrap();

    let store: Arc<dyn TokenStore> = match std::env::var("REDIS_URL") {
        Ok(dsn) => {
            let client = redis::Client::open(dsn)?;
            let manager = client.get_connection_manager().await?;
            Arc::new(RedisTokenStore::new(manager, "authgate:demo"))
        }
        Err(_) => Arc::new(InMemoryTokenStore::new()),
    };

    let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::try_new(TokenConfig {
        issuer: "authgate.demo".to_string(),
        audience: "demo-client".to_string(),
        access_ttl: std::time::Duration::from_secs(300),
        refresh_ttl: std::time::Duration::from_secs(10 * 24 * 60 * 60),
        signing_key: b"demo-signing-key-demo-signing-key".to_vec(),
    })?);

    let issuer = Arc::new(TokenIssuer::new(codec.clone(), store.clone()));
    let validator = Arc::new(TokenValidator::new(codec, store.clone()));
    let coordinator = RefreshCoordinator::new(validator.clone(), store.clone(), issuer.clone());

    let member = MemberId::new_v4();
    let t0 = Utc::now();
    let tokens = issuer.issue(member, t0).await?;
    info!(%member, "issued");

    let at = |secs: i64| t0 + Duration::seconds(secs);
    let access = &tokens.access_token.0;
    let refresh = &tokens.refresh_token.0;

    let early = validator.validate(access, TokenKind::Access, at(299)).await;
    info!("access at t=299: {:?}", early);
    let late = validator.validate(access, TokenKind::Access, at(301)).await;
    info!("access at t=301: {:?}", late);
    let crossed = validator.validate(refresh, TokenKind::Access, at(1)).await;
    info!("refresh as access: {:?}", crossed);

    let (a, b) = tokio::join!(
        coordinator.refresh(refresh, at(301)),
        coordinator.refresh(refresh, at(301))
    );
    info!("concurrent refresh: first ok={}, second ok={}", a.is_ok(), b.is_ok());

    let rotated = a.or(b)?;
    store.remove_all(member).await?;
    let after_logout = validator
        .validate(&rotated.access_token.0, TokenKind::Access, at(302))
        .await;
    info!("rotated access after logout: {:?}", after_logout);

    Ok(())
}
