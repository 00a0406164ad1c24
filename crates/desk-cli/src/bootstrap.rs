use anyhow::Context;
use desk_config::DeskConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered configuration, then apply CLI overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<DeskConfig> {
    let mut config = DeskConfig::load_with_dotenv().context("failed to load desk configuration")?;

    if let Some(path) = &flags.database {
        config.database.path.clone_from(path);
        config
            .validate()
            .with_context(|| format!("invalid --db '{path}'"))?;
    }

    tracing::debug!(database = %config.database.path, "configuration loaded");
    Ok(config)
}
