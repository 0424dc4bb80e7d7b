use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{self, Settings};
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub gate: Arc<AuthenticationGate>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<Pool<MySql>>,
}

/// Build the token settings from the parsed file plus the signing key from the environment.
pub fn load_token_config(token: &settings::Token) -> anyhow::Result<TokenConfig> {
    let signing_key = std::env::var(&token.signing_key_env)
        .map_err(|_| anyhow!("signing key variable {} is not set", token.signing_key_env))?
        .into_bytes();
    let cfg = TokenConfig {
        issuer: token.issuer.clone(),
        audience: token.audience.clone(),
        access_ttl: Duration::from_secs(token.access_ttl_secs),
        refresh_ttl: Duration::from_secs(token.refresh_ttl_secs),
        signing_key,
    };
    cfg.validate()?;
    Ok(cfg)
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let cancel = CancellationToken::new();
        let mut sweeper_handle = None;
        let mut pool = None;

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => {
                let token_codec: Arc<dyn TokenCodec> =
                    Arc::new(JwtHs256Codec::try_new(load_token_config(&settings.token)?)?);

                let token_store: Arc<dyn TokenStore> = match settings.store.backend.as_str() {
                    "redis" => {
                        let redis_client = redis::Client::open(settings.store.redis_dsn.as_str())?;
                        let redis_manager = redis_client.get_connection_manager().await?;
                        Arc::new(RedisTokenStore::new(
                            redis_manager,
                            settings.store.prefix.clone(),
                        ))
                    }
                    "memory" => {
                        let store = Arc::new(InMemoryTokenStore::new());
                        sweeper_handle = Some(store.clone().spawn_sweeper(
                            Duration::from_secs(settings.store.sweep_interval_secs.max(1)),
                            cancel.clone(),
                        ));
                        store
                    }
                    other => return Err(anyhow!("Unknown store backend: {}", other)),
                };

                let mysql_pool = Pool::<MySql>::connect(&settings.directory.mysql_dsn).await?;
                let directory: Arc<dyn MemberDirectory> =
                    Arc::new(MySqlMemberDirectory::new(mysql_pool.clone()));
                pool = Some(mysql_pool);

                let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

                Arc::new(RealAuthService::new(
                    directory,
                    credential_hasher,
                    token_codec,
                    token_store,
                ))
            }
            other => return Err(anyhow!("Unknown auth backend: {}", other)),
        };

        info!(
            auth = %settings.auth.backend,
            store = %settings.store.backend,
            "server started"
        );

        let mut server = Self::with_auth_service(auth_service);
        server.sweeper_handle = Mutex::new(sweeper_handle);
        server.cancel = cancel;
        server.pool = pool;
        Ok(server)
    }

    /// A server around an already-built auth service, with no background tasks.
    pub fn with_auth_service(auth_service: Arc<dyn AuthService>) -> Self {
        let gate = Arc::new(AuthenticationGate::new(auth_service.clone()));
        Self {
            auth_service,
            gate,
            sweeper_handle: Mutex::new(None),
            cancel: CancellationToken::new(),
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = match self.sweeper_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
