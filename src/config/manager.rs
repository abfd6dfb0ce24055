use crate::config::models::{ApiAlias, Config};
use crate::constants;
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::spec::parser::is_url;
use std::path::{Path, PathBuf};

/// Reads and writes the API alias store
pub struct ConfigManager<F: FileSystem> {
    fs: F,
    config_file: PathBuf,
}

impl ConfigManager<OsFileSystem> {
    /// Creates a new `ConfigManager` with the default filesystem and config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, Error> {
        let config_dir = get_config_dir()?;
        Ok(Self::with_fs(OsFileSystem, config_dir))
    }
}

impl<F: FileSystem> ConfigManager<F> {
    /// Manager for `config.toml` inside `config_dir`
    pub fn with_fs(fs: F, config_dir: PathBuf) -> Self {
        Self {
            fs,
            config_file: config_dir.join(constants::CONFIG_FILENAME),
        }
    }

    /// Manager for an explicitly chosen config file (`--config`)
    pub const fn with_config_file(fs: F, config_file: PathBuf) -> Self {
        Self { fs, config_file }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Directory relative document paths are resolved against
    pub fn config_dir(&self) -> &Path {
        self.config_file.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Loads the config file. A missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Config, Error> {
        if !self.fs.exists(&self.config_file) {
            tracing::debug!(
                file = %self.config_file.display(),
                "config file does not exist, using default configuration"
            );
            return Ok(Config::default());
        }
        let content = self.fs.read_to_string(&self.config_file)?;
        toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "unable to decode config file at {}: {e}",
                self.config_file.display()
            ))
        })
    }

    /// Writes the config file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save(&self, config: &Config) -> Result<(), Error> {
        self.fs.create_dir_all(self.config_dir())?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::invalid_config(format!("failed to write config file: {e}")))?;
        self.fs.write_all(&self.config_file, content.as_bytes())?;
        Ok(())
    }

    /// Stores `api` under its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, an alias with that name exists
    /// and `overwrite` is false, or the config cannot be read or written.
    pub fn add_api(&self, api: ApiAlias, overwrite: bool) -> Result<(), Error> {
        if api.name.trim().is_empty() {
            return Err(Error::invalid_config("api name cannot be empty"));
        }
        for header in &api.headers {
            crate::engine::executor::parse_header(header)?;
        }
        let mut config = self.load()?;
        if config.apis.contains_key(&api.name) && !overwrite {
            return Err(Error::api_exists(&api.name));
        }
        config.apis.insert(api.name.clone(), api);
        self.save(&config)
    }

    /// Looks up an alias by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no alias with that name exists or the config
    /// cannot be loaded.
    pub fn get_api(&self, name: &str) -> Result<ApiAlias, Error> {
        self.find_api(name)?
            .ok_or_else(|| Error::api_not_found(name))
    }

    /// Like [`Self::get_api`] but a missing alias is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn find_api(&self, name: &str) -> Result<Option<ApiAlias>, Error> {
        Ok(self.load()?.apis.remove(name))
    }

    /// All aliases, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn list_apis(&self) -> Result<Vec<ApiAlias>, Error> {
        Ok(self.load()?.apis.into_values().collect())
    }

    /// Where the alias' document is loaded from: URLs and absolute paths as
    /// given, `~` expanded, anything else relative to the config directory.
    #[must_use]
    pub fn resolve_openapi_path(&self, api: &ApiAlias) -> String {
        if is_url(&api.openapi_path) {
            return api.openapi_path.clone();
        }
        let expanded = shellexpand::tilde(&api.openapi_path).into_owned();
        let path = Path::new(&expanded);
        if path.is_absolute() {
            expanded
        } else {
            self.config_dir().join(path).to_string_lossy().into_owned()
        }
    }
}

/// Gets the default configuration directory path.
///
/// `AEPCLI_CONFIG_DIR` takes precedence over `~/.config/aepcli`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var(constants::ENV_AEPCLI_CONFIG_DIR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
        }
    }
    let home_dir = dirs::home_dir().ok_or_else(Error::home_directory_not_found)?;
    Ok(home_dir.join(".config").join(constants::CONFIG_DIR_NAME))
}
