//! Configuration service implementation.
//!
//! Loads backend connection settings from the configuration file
//! (~/.config/gatehouse/config.toml), with environment variables taking
//! precedence so deployments can inject the values without a file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use gatehouse_core::config::BackendConfig;
use gatehouse_core::error::Result;

use crate::paths::GatehousePaths;

/// Environment variable overriding the backend base URL.
pub const ENV_BACKEND_URL: &str = "GATEHOUSE_BACKEND_URL";
/// Environment variable overriding the backend anon key.
pub const ENV_ANON_KEY: &str = "GATEHOUSE_ANON_KEY";

/// On-disk configuration layout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    backend: BackendConfig,
}

/// Configuration service that loads and caches the backend settings.
///
/// Resolution order per value: environment variable, then config file.
/// The file is read once and cached to avoid repeated I/O.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    cached: Arc<RwLock<Option<FileConfig>>>,
    path: PathBuf,
}

impl ConfigService {
    /// Creates a ConfigService over the default config file location.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the config directory cannot be
    /// determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(GatehousePaths::config_file()?))
    }

    /// Creates a ConfigService over an explicit config file path.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            cached: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Resolves the backend configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when neither the environment nor the config
    /// file yields a complete, well-formed configuration.
    pub fn backend_config(&self) -> Result<BackendConfig> {
        let file = self.load_file()?;

        let url = env_non_empty(ENV_BACKEND_URL).unwrap_or_else(|| file.backend.url.clone());
        let anon_key = env_non_empty(ENV_ANON_KEY).unwrap_or_else(|| file.backend.anon_key.clone());

        BackendConfig::new(url, anon_key).normalized()
    }

    /// Invalidates the file cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.cached.write().unwrap();
        *write_lock = None;
    }

    /// The config file path this service reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_file(&self) -> Result<FileConfig> {
        // Check if already cached
        {
            let read_lock = self.cached.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        // Missing file is not an error: the environment may carry everything.
        let loaded = if self.path.exists() {
            let raw = std::fs::read_to_string(&self.path)?;
            toml::from_str(&raw)?
        } else {
            FileConfig::default()
        };

        {
            let mut write_lock = self.cached.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_env<T>(url: Option<&str>, key: Option<&str>, test: impl FnOnce() -> T) -> T {
        let lock = ENV_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous_url = std::env::var(ENV_BACKEND_URL).ok();
        let previous_key = std::env::var(ENV_ANON_KEY).ok();

        set_or_clear(ENV_BACKEND_URL, url);
        set_or_clear(ENV_ANON_KEY, key);

        let result = test();

        set_or_clear(ENV_BACKEND_URL, previous_url.as_deref());
        set_or_clear(ENV_ANON_KEY, previous_key.as_deref());

        result
    }

    fn set_or_clear(name: &str, value: Option<&str>) {
        if let Some(value) = value {
            unsafe { std::env::set_var(name, value) };
        } else {
            unsafe { std::env::remove_var(name) };
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp config file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_loads_from_file() {
        with_env(None, None, || {
            let file = write_config(
                "[backend]\nurl = \"https://gate.example.com\"\nanon_key = \"public-key\"\n",
            );
            let service = ConfigService::with_path(file.path());

            let config = service.backend_config().expect("config");
            assert_eq!(config.url, "https://gate.example.com");
            assert_eq!(config.anon_key, "public-key");
        });
    }

    #[test]
    fn test_env_overrides_file() {
        with_env(Some("https://staging.example.com/"), None, || {
            let file = write_config(
                "[backend]\nurl = \"https://gate.example.com\"\nanon_key = \"public-key\"\n",
            );
            let service = ConfigService::with_path(file.path());

            let config = service.backend_config().expect("config");
            assert_eq!(config.url, "https://staging.example.com");
        });
    }

    #[test]
    fn test_missing_everything_is_a_config_error() {
        with_env(None, None, || {
            let dir = tempfile::tempdir().expect("temp dir");
            let service = ConfigService::with_path(dir.path().join("config.toml"));

            let err = service.backend_config().expect_err("expected config error");
            assert!(err.is_config());
        });
    }

    #[test]
    fn test_env_alone_is_sufficient() {
        with_env(
            Some("https://gate.example.com"),
            Some("public-key"),
            || {
                let dir = tempfile::tempdir().expect("temp dir");
                let service = ConfigService::with_path(dir.path().join("config.toml"));

                let config = service.backend_config().expect("config");
                assert_eq!(config.anon_key, "public-key");
            },
        );
    }
}
