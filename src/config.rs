use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `KEYGATE_DATABASE_URL`.
pub const ENV_PREFIX: &str = "KEYGATE_";

/// Process-wide configuration, read on first access. Binaries load `.env`
/// before touching it.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("invalid keygate configuration: {e}"))
});

/// Runtime configuration: built-in defaults, overridden by `KEYGATE_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub query_timeout_secs: u64,
    pub max_connections: u32,
    /// Remote ticket validator (`POST .../validate`); in-process when unset.
    pub ticket_validator_url: Option<String>,
    /// Remote credential service (`GET .../credentials`); in-process when unset.
    pub credential_service_url: Option<String>,
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:passwords.db".to_string(),
            listen_addr: "0.0.0.0:4000".to_string(),
            loglevel: "info".to_string(),
            query_timeout_secs: 5,
            max_connections: 8,
            ticket_validator_url: None,
            credential_service_url: None,
            upstream_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Upper bound for a single store access, including pool acquisition.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }

    /// Upper bound for each step of a ticket-based retrieval.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_env() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load()?;
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.query_timeout(), Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("KEYGATE_DATABASE_URL", "sqlite:/var/lib/keygate/fleet.db");
            jail.set_env("KEYGATE_QUERY_TIMEOUT_SECS", "2");
            jail.set_env("KEYGATE_LISTEN_ADDR", "127.0.0.1:4100");
            let cfg = Config::load()?;
            assert_eq!(cfg.database_url, "sqlite:/var/lib/keygate/fleet.db");
            assert_eq!(cfg.listen_addr, "127.0.0.1:4100");
            assert_eq!(cfg.query_timeout(), Duration::from_secs(2));
            assert_eq!(cfg.loglevel, "info");
            assert_eq!(cfg.ticket_validator_url, None);
            Ok(())
        });
    }

    #[test]
    fn upstream_urls_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("KEYGATE_TICKET_VALIDATOR_URL", "http://tickets.internal:8000/validate");
            jail.set_env("KEYGATE_CREDENTIAL_SERVICE_URL", "http://vault.internal:4000/credentials");
            jail.set_env("KEYGATE_UPSTREAM_TIMEOUT_SECS", "3");
            let cfg = Config::load()?;
            assert_eq!(
                cfg.ticket_validator_url.as_deref(),
                Some("http://tickets.internal:8000/validate")
            );
            assert_eq!(
                cfg.credential_service_url.as_deref(),
                Some("http://vault.internal:4000/credentials")
            );
            assert_eq!(cfg.upstream_timeout(), Duration::from_secs(3));
            Ok(())
        });
    }

    #[test]
    fn static_config_matches_loader() {
        Jail::expect_with(|_jail| {
            assert_eq!(CONFIG.upstream_timeout_secs, Config::default().upstream_timeout_secs);
            assert_eq!(CONFIG.query_timeout_secs, Config::default().query_timeout_secs);
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = Config {
            query_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(cfg.query_timeout(), Duration::from_secs(1));
    }
}
