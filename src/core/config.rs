//! Configuration module for `Akiko`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

const DIR_VARIABLE: &str = "$AKIKO";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Input and output locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Course catalog CSV
    #[serde(default)]
    pub catalog: String,
    /// Credit requirement table (TOML)
    #[serde(default)]
    pub requirements: String,
    /// Classification rules (TOML)
    #[serde(default)]
    pub rules: String,
    /// Directory for credit stats CSV files
    #[serde(default)]
    pub out_dir: String,
}

const fn yes() -> bool {
    true
}

/// Student context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentConfig {
    /// Native to the program (`false` for transfer students)
    #[serde(default = "yes")]
    pub native: bool,
    /// Fail when a course lands in a cell without a requirement entry
    #[serde(default = "yes")]
    pub strict: bool,
}

impl Default for StudentConfig {
    fn default() -> Self {
        Self {
            native: true,
            strict: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Student settings
    #[serde(default)]
    pub student: StudentConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override catalog path
    pub catalog: Option<String>,
    /// Override requirement table path
    pub requirements: Option<String>,
    /// Override rules path
    pub rules: Option<String>,
    /// Override output directory
    pub out_dir: Option<String>,
    /// Override native/transfer status
    pub native: Option<bool>,
}

fn merge_field(field: &mut String, default: &str) -> bool {
    if field.is_empty() && !default.is_empty() {
        default.clone_into(field);
        true
    } else {
        false
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    value
        .parse::<bool>()
        .map_err(|_| format!("Invalid boolean value for '{key}': '{value}'"))
}

impl Config {
    /// Get the `$AKIKO` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/akiko`
    /// - macOS: `~/Library/Application Support/akiko`
    /// - Windows: `%APPDATA%\akiko`
    #[must_use]
    pub fn get_akiko_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("akiko")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only string fields that are empty here and non-empty in `defaults` are
    /// filled, so settings added in a newer release reach old config files.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let fields = [
            (&mut self.logging.level, &defaults.logging.level),
            (&mut self.logging.file, &defaults.logging.file),
            (&mut self.paths.catalog, &defaults.paths.catalog),
            (&mut self.paths.requirements, &defaults.paths.requirements),
            (&mut self.paths.rules, &defaults.paths.rules),
            (&mut self.paths.out_dir, &defaults.paths.out_dir),
        ];

        fields
            .into_iter()
            .fold(false, |changed, (field, default)| {
                merge_field(field, default) || changed
            })
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides last for this run only; the configuration file is untouched.
    /// Only non-`None` values replace config values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(catalog) = &overrides.catalog {
            self.paths.catalog.clone_from(catalog);
        }
        if let Some(requirements) = &overrides.requirements {
            self.paths.requirements.clone_from(requirements);
        }
        if let Some(rules) = &overrides.rules {
            self.paths.rules.clone_from(rules);
        }
        if let Some(out_dir) = &overrides.out_dir {
            self.paths.out_dir.clone_from(out_dir);
        }

        if let Some(native) = overrides.native {
            self.student.native = native;
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_akiko_dir`].
    ///
    /// [`get_akiko_dir`]: Self::get_akiko_dir
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_akiko_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$AKIKO` in a string to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let akiko_dir = Self::get_akiko_dir();
            value.replace(DIR_VARIABLE, akiko_dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Expands `$AKIKO` in every path. Missing fields take their serde defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = Config::from_toml(r#"
    /// [logging]
    /// level = "info"
    /// file = "$AKIKO/akiko.log"
    /// "#)?;
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        for field in [
            &mut config.logging.file,
            &mut config.paths.catalog,
            &mut config.paths.requirements,
            &mut config.paths.rules,
            &mut config.paths.out_dir,
        ] {
            *field = Self::expand_variables(field);
        }

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// Debug builds use `DefaultCLIConfigDebug.toml`, release builds
    /// `DefaultCLIConfigRelease.toml`.
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// An existing file gets missing fields merged in from the defaults and is
    /// saved back. On first run the defaults are written out. Any read or
    /// parse error falls back to the defaults.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized, the directory
    /// cannot be created, or the file cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `catalog`, `requirements`,
    /// `rules`, `out_dir` (or `out-dir`), `native`, `strict`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "catalog" => Some(self.paths.catalog.clone()),
            "requirements" => Some(self.paths.requirements.clone()),
            "rules" => Some(self.paths.rules.clone()),
            "out_dir" | "out-dir" => Some(self.paths.out_dir.clone()),
            "native" => Some(self.student.native.to_string()),
            "strict" => Some(self.student.strict.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config only; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or a boolean value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => self.logging.verbose = parse_bool(key, value)?,
            "catalog" => self.paths.catalog = value.to_string(),
            "requirements" => self.paths.requirements = value.to_string(),
            "rules" => self.paths.rules = value.to_string(),
            "out_dir" | "out-dir" => self.paths.out_dir = value.to_string(),
            "native" => self.student.native = parse_bool(key, value)?,
            "strict" => self.student.strict = parse_bool(key, value)?,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to its value in `defaults`)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "catalog" => self.paths.catalog.clone_from(&defaults.paths.catalog),
            "requirements" => self
                .paths
                .requirements
                .clone_from(&defaults.paths.requirements),
            "rules" => self.paths.rules.clone_from(&defaults.paths.rules),
            "out_dir" | "out-dir" => self.paths.out_dir.clone_from(&defaults.paths.out_dir),
            "native" => self.student.native = defaults.student.native,
            "strict" => self.student.strict = defaults.student.strict,
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file so the next [`load()`](Config::load)
    /// recreates it. Succeeds if there is no file.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  catalog = \"{}\"", self.paths.catalog)?;
        writeln!(f, "  requirements = \"{}\"", self.paths.requirements)?;
        writeln!(f, "  rules = \"{}\"", self.paths.rules)?;
        writeln!(f, "  out_dir = \"{}\"", self.paths.out_dir)?;

        writeln!(f, "\n[student]")?;
        writeln!(f, "  native = {}", self.student.native)?;
        writeln!(f, "  strict = {}", self.student.strict)?;

        Ok(())
    }
}
