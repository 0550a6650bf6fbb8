//! Layered configuration for the Play catalog services.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. `config/default.{toml,yaml,json}` (optional)
//! 2. `config/{RUN_ENV}.{toml,yaml,json}` (optional, `RUN_ENV` defaults to `debug`)
//! 3. environment variables prefixed with `PLAY`, using `__` as the separator,
//!    e.g. `PLAY__DATABASE__URL=mongodb://localhost:27017`
//!
//! A `.env` file is loaded into the process environment once before the
//! sources are read.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::*;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "PLAY";

/// Separator between path segments in configuration environment variables.
pub const ENV_SEPARATOR: &str = "__";

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the application configuration from the default locations.
///
/// The configuration directory is `config/` relative to the working directory
/// unless `CONFIG_DIR` points elsewhere.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(&config_dir, &run_env, default_environment())
}

/// Loads the application configuration from an explicit directory and
/// environment source.
///
/// Missing files are skipped. The `environment` source is applied last.
pub fn load_config_from(
    config_dir: &Path,
    run_env: &str,
    environment: Environment,
) -> Result<AppConfig, ConfigError> {
    let default_path = path_str(&config_dir.join("default"))?;
    let env_path = path_str(&config_dir.join(run_env))?;

    debug!("Loading configuration: default={default_path}, env={env_path}");

    let builder = Config::builder()
        .add_source(File::with_name(&default_path).required(false))
        .add_source(File::with_name(&env_path).required(false))
        .add_source(environment);

    builder.build()?.try_deserialize()
}

/// The environment source used by [`load_config`].
pub fn default_environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR)
}

fn path_str(path: &Path) -> Result<String, ConfigError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Message(format!("non UTF-8 config path: {}", path.display())))
}

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file named by `DOTENV_OVERRIDE` is used when set, otherwise `.env`.
/// Loading happens at most once per process; a missing file is not an error.
///
/// Returns the path that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn env_source(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        default_environment().source(Some(map))
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(dir.path(), "debug", env_source(&[])).expect("config");

        assert_eq!(config.database, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_run_env_file_overrides_default_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("default.toml"),
            r#"
[database]
url = "mongodb://localhost:27017"
database = "catalog"

[logging]
level = "warn"
"#,
        )
        .expect("write default");
        fs::write(
            dir.path().join("test.toml"),
            r#"
[database]
url = "mongodb://db.internal:27017"
database = "catalog_test"
max_pool_size = 4
"#,
        )
        .expect("write env");

        let config = load_config_from(dir.path(), "test", env_source(&[])).expect("config");
        let db = config.database.expect("database section");

        assert_eq!(db.url, "mongodb://db.internal:27017");
        assert_eq!(db.database, "catalog_test");
        assert_eq!(db.max_pool_size, Some(4));
        assert_eq!(db.app_name, None);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("default.toml"),
            r#"
[database]
url = "mongodb://localhost:27017"
database = "catalog"
"#,
        )
        .expect("write default");

        let config = load_config_from(
            dir.path(),
            "debug",
            env_source(&[
                ("PLAY__DATABASE__URL", "mongodb://override:27017"),
                ("PLAY__LOGGING__LEVEL", "debug"),
            ]),
        )
        .expect("config");

        let db = config.database.expect("database section");
        assert_eq!(db.url, "mongodb://override:27017");
        assert_eq!(db.database, "catalog");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_incomplete_database_section_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("default.toml"),
            "[database]\nurl = \"mongodb://localhost:27017\"\n",
        )
        .expect("write default");

        let result = load_config_from(dir.path(), "debug", env_source(&[]));
        assert!(result.is_err(), "database name is mandatory");
    }
}
