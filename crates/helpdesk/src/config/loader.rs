use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::secrets::{expand_home, has_secret_source, resolve_secret};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "HELPDESK_CONFIG";

/// Returns the config file path: `$HELPDESK_CONFIG`, else `~/.helpdesk/config.json`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(expand_home(path.trim())));
        }
    }
    helpdesk_home().map(|dir| dir.join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.imap_host.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "imap_host must not be empty".to_string(),
        });
    }

    if config.imap_port == 0 {
        return Err(ConfigError::Validation {
            message: "imap_port must not be 0".to_string(),
        });
    }

    if config.username.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "username must not be empty".to_string(),
        });
    }

    if config.folder.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "folder must not be empty".to_string(),
        });
    }

    if !has_secret_source(
        config.password.as_deref(),
        config.password_file.as_deref(),
        config.password_env_var.as_deref(),
    ) {
        return Err(ConfigError::Validation {
            message: "one of password, password_file or password_env_var is required".to_string(),
        });
    }

    Ok(())
}

impl Config {
    /// Resolves the mailbox password from its configured source.
    pub fn resolve_password(&self) -> Result<SecretString, ConfigError> {
        if self.password.as_deref().is_some_and(|p| !p.is_empty()) {
            log::warn!(
                "Using a direct password value from the config file is not recommended. \
                 Consider password_file or password_env_var instead."
            );
        }
        Ok(resolve_secret(
            self.password.as_deref(),
            self.password_file.as_deref(),
            self.password_env_var.as_deref(),
        )?)
    }

    /// Database path, defaulting to `~/.helpdesk/data/helpdesk.db`.
    pub fn resolved_database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(expand_path(path)),
            None => helpdesk_home().map(|dir| dir.join("data").join("helpdesk.db")),
        }
    }

    /// Attachments root, defaulting to `~/.helpdesk/attachments`.
    pub fn resolved_attachments_directory(&self) -> Result<PathBuf, ConfigError> {
        match &self.attachments_directory {
            Some(path) => Ok(expand_path(path)),
            None => helpdesk_home().map(|dir| dir.join("attachments")),
        }
    }
}

fn helpdesk_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".helpdesk"))
        .ok_or(ConfigError::NoHomeDirectory)
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_home(s)),
        None => path.to_path_buf(),
    }
}
