use std::path::{Path, PathBuf};

use anyhow::Context;
use desk_config::DeskConfig;
use desk_db::service::DeskService;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::ensure_database_dir;
use crate::output::output;

const CONFIG_PATH: &str = ".desk/config.toml";

#[derive(Debug, Serialize)]
struct InitResponse {
    database: String,
    config_path: PathBuf,
    config_written: bool,
}

/// Handle `desk init`.
pub async fn handle(args: &InitArgs, config: &DeskConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config_path = PathBuf::from(CONFIG_PATH);
    let config_written = write_config(&config_path, config, args.force)?;

    ensure_database_dir(&config.database)?;
    DeskService::new_local(&config.database.path, config.tickets.clone())
        .await
        .with_context(|| format!("failed to initialize database at {}", config.database.path))?;

    tracing::info!(database = %config.database.path, config_written, "desk initialized");
    output(
        &InitResponse {
            database: config.database.path.clone(),
            config_path,
            config_written,
        },
        flags.format,
    )
}

/// Write `config` as TOML to `path` unless a file is already there.
fn write_config(path: &Path, config: &DeskConfig, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, config_template(config))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

fn config_template(config: &DeskConfig) -> String {
    format!(
        "[database]\n\
         path = \"{path}\"\n\
         \n\
         [tickets]\n\
         max_message_len = {max_message_len}\n\
         max_title_len = {max_title_len}\n\
         \n\
         [sessions]\n\
         ttl_secs = {ttl_secs}\n\
         \n\
         [retry]\n\
         max_attempts = {max_attempts}\n\
         base_delay_ms = {base_delay_ms}\n\
         max_delay_ms = {max_delay_ms}\n\
         \n\
         [general]\n\
         default_limit = {default_limit}\n",
        path = config.database.path.escape_default(),
        max_message_len = config.tickets.max_message_len,
        max_title_len = config.tickets.max_title_len,
        ttl_secs = config.sessions.ttl_secs,
        max_attempts = config.retry.max_attempts,
        base_delay_ms = config.retry.base_delay_ms,
        max_delay_ms = config.retry.max_delay_ms,
        default_limit = config.general.default_limit,
    )
}
