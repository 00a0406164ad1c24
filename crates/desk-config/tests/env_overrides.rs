use desk_config::DeskConfig;
use figment::Jail;
use pretty_assertions::assert_eq;

#[test]
fn env_vars_override_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("DESK_DATABASE__PATH", "/tmp/desk-env.db");
        jail.set_env("DESK_TICKETS__MAX_MESSAGE_LEN", "1234");
        jail.set_env("DESK_SESSIONS__TTL_SECS", "60");

        let config = DeskConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database.path, "/tmp/desk-env.db");
        assert_eq!(config.tickets.max_message_len, 1234);
        assert_eq!(config.sessions.ttl_secs, 60);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".desk")?;
        jail.create_file(
            ".desk/config.toml",
            r"
[general]
default_limit = 5
",
        )?;
        jail.set_env("DESK_GENERAL__DEFAULT_LIMIT", "9");

        let config = DeskConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.general.default_limit, 9);
        Ok(())
    });
}

#[test]
fn token_and_log_vars_are_not_config() {
    Jail::expect_with(|jail| {
        jail.set_env("DESK_TOKEN", "5e3b1f");
        jail.set_env("DESK_LOG", "debug");

        let config = DeskConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.general.default_limit, 20);
        Ok(())
    });
}
