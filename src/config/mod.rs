use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the application configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "kanalearn.yaml";

/// Prefix of environment variables that override the configuration file
pub const ENV_PREFIX: &str = "KANALEARN";

/// Configuration manager for loading and saving the YAML configuration file.
///
/// Loading layers `kanalearn.yaml` (optional) under `KANALEARN_*` environment
/// variables; nested keys use a double underscore, e.g.
/// `KANALEARN_SPEECH__COMMAND=espeak-ng`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    app_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `kanalearn.yaml`; created if missing
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            app_config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the application configuration from file and environment.
    ///
    /// # Returns
    /// The loaded AppConfig; defaults fill every key neither source sets
    pub fn load_app_config(&self) -> Result<AppConfig> {
        self.load_app_config_with(environment_layer())
    }

    fn load_app_config_with(&self, environment: Environment) -> Result<AppConfig> {
        if !self.app_config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.app_config_path
            );
        }

        let config: AppConfig = Config::builder()
            .add_source(
                File::from(self.app_config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read config: {}", self.app_config_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.app_config_path))?;

        tracing::info!("Loaded config from {}", self.app_config_path);
        Ok(config)
    }

    /// Save the application configuration file.
    ///
    /// # Arguments
    /// * `config` - The AppConfig to save
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.app_config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.app_config_path))?;

        tracing::info!("Saved config to {}", self.app_config_path);
        Ok(())
    }

    /// Resolve a configured path against the config directory when relative
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn app_config_path(&self) -> &Utf8Path {
        &self.app_config_path
    }
}

/// `KANALEARN_DEBUG`, `KANALEARN_SPEECH__COMMAND`, ...
fn environment_layer() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
