use std::env;
use std::fmt;
use std::path::Path;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Shortest accepted HMAC signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: 30 days.
pub const MAX_EXPIRATION_MINUTES: i64 = 30 * 24 * 60;

/// Secret shipped in `config/development.toml` and `config/test.toml`.
pub const DEVELOPMENT_SECRET: &str = "change-me-development-secret-at-least-32-bytes";

/// Run modes allowed to sign tokens with [`DEVELOPMENT_SECRET`].
const LOCAL_RUN_MODES: [&str; 2] = ["development", "test"];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

fn default_expiration_minutes() -> i64 {
    20
}

impl JwtConfig {
    /// Token lifetime as a duration.
    ///
    /// # Errors
    /// * `Message` - `expiration_minutes` is not in `1..=MAX_EXPIRATION_MINUTES`
    pub fn ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must be between 1 and {}, got {}",
                MAX_EXPIRATION_MINUTES, self.expiration_minutes
            )));
        }

        chrono::Duration::try_minutes(self.expiration_minutes).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_minutes out of range: {}",
                self.expiration_minutes
            ))
        })
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::load_from(
            Path::new("config"),
            &run_mode,
            Environment::default().separator("__"),
        )
    }

    /// Build the layered configuration from `config_dir` and `environment`,
    /// then validate it for `run_mode`.
    pub fn load_from(
        config_dir: &Path,
        run_mode: &str,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let run_mode_file = config_dir.join(format!("{}.toml", run_mode));

        let configuration = ConfigBuilder::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(run_mode_file).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;
        config.ensure_deployable(run_mode)?;

        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                self.jwt.secret.len()
            )));
        }

        self.jwt.ttl()?;

        if self.database.backend == StorageBackend::Postgres {
            if self.database.url.is_empty() {
                return Err(ConfigError::Message(
                    "database.url is required for the postgres backend".to_string(),
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigError::Message(
                    "database.max_connections must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Refuse the published development secret outside local run modes.
    pub fn ensure_deployable(&self, run_mode: &str) -> Result<(), ConfigError> {
        if self.jwt.secret == DEVELOPMENT_SECRET && !LOCAL_RUN_MODES.contains(&run_mode) {
            return Err(ConfigError::Message(format!(
                "jwt.secret is the development secret; set JWT__SECRET for run mode {}",
                run_mode
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use config::Map;

    use super::*;

    const ENV_SECRET: &str = "secret-from-the-environment-0123456789";

    fn config() -> Config {
        Config {
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: "postgresql://localhost/users".to_string(),
                max_connections: 5,
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: "a".repeat(MIN_SECRET_BYTES),
                expiration_minutes: 20,
            },
        }
    }

    fn config_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
    }

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let vars: Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::default().separator("__").source(Some(vars))
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_short_secret() {
        let mut config = config();
        config.jwt.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_non_positive_expiration() {
        let mut config = config();
        config.jwt.expiration_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_expiration_is_an_error_not_a_panic() {
        let mut config = config();
        config.jwt.expiration_minutes = i64::MAX / 1000;
        assert!(config.jwt.ttl().is_err());
        assert!(config.validate().is_err());

        config.jwt.expiration_minutes = MAX_EXPIRATION_MINUTES + 1;
        assert!(config.validate().is_err());

        config.jwt.expiration_minutes = MAX_EXPIRATION_MINUTES;
        assert_eq!(config.jwt.ttl().unwrap(), chrono::Duration::days(30));
    }

    #[test]
    fn test_validate_memory_backend_needs_no_url() {
        let mut config = config();
        config.database.backend = StorageBackend::Memory;
        config.database.url = String::new();
        assert!(config.validate().is_ok());

        config.database.backend = StorageBackend::Postgres;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_jwt_debug_redacts_secret() {
        let rendered = format!("{:?}", config().jwt);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains(&"a".repeat(MIN_SECRET_BYTES)));
    }

    #[test]
    fn test_load_test_run_mode_from_files() {
        let config = Config::load_from(&config_dir(), "test", environment(&[])).unwrap();

        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.jwt.secret, DEVELOPMENT_SECRET);
        assert_eq!(config.jwt.expiration_minutes, 20);
    }

    #[test]
    fn test_load_environment_overrides_files() {
        let config = Config::load_from(
            &config_dir(),
            "test",
            environment(&[
                ("JWT__SECRET", ENV_SECRET),
                ("SERVER__HTTP_PORT", "9999"),
                ("DATABASE__BACKEND", "postgres"),
                ("DATABASE__URL", "postgresql://db.internal:5432/users"),
            ]),
        )
        .unwrap();

        assert_eq!(config.jwt.secret, ENV_SECRET);
        assert_eq!(config.server.http_port, 9999);
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.database.url, "postgresql://db.internal:5432/users");
    }

    #[test]
    fn test_load_production_requires_secret_from_environment() {
        // default.toml carries no secret
        let missing = Config::load_from(&config_dir(), "production", environment(&[]));
        assert!(missing.is_err());

        let published = Config::load_from(
            &config_dir(),
            "production",
            environment(&[("JWT__SECRET", DEVELOPMENT_SECRET)]),
        );
        assert!(published.is_err());

        let config = Config::load_from(
            &config_dir(),
            "production",
            environment(&[("JWT__SECRET", ENV_SECRET)]),
        )
        .unwrap();
        assert_eq!(config.jwt.secret, ENV_SECRET);
    }

    #[test]
    fn test_load_rejects_out_of_range_expiration_from_environment() {
        let result = Config::load_from(
            &config_dir(),
            "test",
            environment(&[("JWT__EXPIRATION_MINUTES", "99999999999999")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_storage_backend_deserializes_lowercase() {
        let source = ConfigBuilder::builder()
            .set_override("backend", "memory")
            .unwrap()
            .build()
            .unwrap();

        #[derive(Deserialize)]
        struct Holder {
            backend: StorageBackend,
        }

        let holder: Holder = source.try_deserialize().unwrap();
        assert_eq!(holder.backend, StorageBackend::Memory);
    }
}
