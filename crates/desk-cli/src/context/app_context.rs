use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use desk_auth::{RoleAuthority, TokenStore, resolve_token};
use desk_config::{DatabaseConfig, DeskConfig};
use desk_core::identity::Identity;
use desk_db::service::DeskService;
use desk_support::{LogNotifier, MessageThread, ReplyError, ReplyGateway};

use crate::cli::GlobalFlags;

/// The gateway as wired by the binary: libSQL store and sessions, logged
/// invalidations.
pub type Gateway = ReplyGateway<Arc<DeskService>, Arc<DeskService>, LogNotifier>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<DeskService>,
    pub gateway: Gateway,
    pub config: DeskConfig,
    pub token_store: Option<TokenStore>,
    pub token: Option<String>,
}

impl AppContext {
    /// Open the database, wire the gateway, and resolve the session token.
    pub async fn init(config: DeskConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        ensure_database_dir(&config.database)?;

        let service = Arc::new(
            DeskService::new_local(&config.database.path, config.tickets.clone())
                .await
                .with_context(|| format!("failed to open database at {}", config.database.path))?,
        );

        let gateway = ReplyGateway::new(
            RoleAuthority::new(Arc::clone(&service)),
            MessageThread::new(Arc::clone(&service), config.tickets.max_message_len),
            LogNotifier,
            config.retry.clone(),
        );

        let token_store = match TokenStore::default_location() {
            Ok(store) => Some(store),
            Err(error) => {
                tracing::warn!(%error, "credentials file unavailable; use --token or DESK_TOKEN");
                None
            }
        };
        let token = resolve_token(flags.token.as_deref(), token_store.as_ref());

        Ok(Self {
            service,
            gateway,
            config,
            token_store,
            token,
        })
    }

    /// The caller behind the resolved token.
    pub async fn identity(&self) -> anyhow::Result<Identity> {
        self.gateway
            .authority()
            .resolve(self.token.as_deref())
            .await
            .map_err(|error| ReplyError::from(error).into())
    }

    /// How many rows a listing returns: the command's own `--limit`, then the
    /// global one, then `general.default_limit`.
    pub fn list_limit(&self, local: Option<u32>, flags: &GlobalFlags) -> anyhow::Result<u32> {
        match local.or(flags.limit) {
            Some(0) => anyhow::bail!("--limit must be at least 1"),
            Some(limit) => Ok(limit),
            None => Ok(self.config.general.default_limit),
        }
    }

    /// The caller, who must be staff.
    pub async fn require_staff(&self) -> anyhow::Result<Identity> {
        let identity = self.identity().await?;
        if !identity.is_staff() {
            return Err(ReplyError::Forbidden.into());
        }
        Ok(identity)
    }
}

/// Create the directory holding an on-disk database.
pub fn ensure_database_dir(database: &DatabaseConfig) -> anyhow::Result<()> {
    if database.is_in_memory() {
        return Ok(());
    }
    if let Some(parent) = Path::new(&database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
