// Configuration loading and parsing (config/picker.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::carousel::{
    CarouselOptions, DEFAULT_HORIZONTAL_PADDING, DEFAULT_SWIPE_THRESHOLD,
};
use crate::votes::{DATABASE_FILE_NAME, DEFAULT_VOTES_KEY};

/// Environment variable that overrides `submission.endpoint`.
pub const ENDPOINT_ENV: &str = "JERSEY_PICKER_ENDPOINT";

pub const CONFIG_FILE_NAME: &str = "picker.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub autoplay_interval_ms: u64,
    pub swipe_threshold: f64,
    pub horizontal_padding: f64,
    /// How many carousel units one terminal column represents.
    pub units_per_cell: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        CarouselConfig {
            autoplay_interval_ms: 4000,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            horizontal_padding: DEFAULT_HORIZONTAL_PADDING,
            units_per_cell: 8.0,
        }
    }
}

impl CarouselConfig {
    pub fn options(&self) -> CarouselOptions {
        CarouselOptions {
            autoplay_interval: Duration::from_millis(self.autoplay_interval_ms),
            swipe_threshold: self.swipe_threshold,
            horizontal_padding: self.horizontal_padding,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Form-collection endpoint. Submission is disabled when absent.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub fields: FieldNames,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        SubmissionConfig {
            endpoint: None,
            timeout_secs: 15,
            fields: FieldNames::default(),
        }
    }
}

impl SubmissionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Names of the form-encoded fields the endpoint expects.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub jersey_name: String,
    pub player_name: String,
    pub opinion: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames {
            jersey_name: "jerseyName".into(),
            player_name: "playerName".into(),
            opinion: "opinion".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub votes_key: String,
    /// Directory holding persisted state. Defaults to the platform data
    /// directory.
    pub data_dir: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            votes_key: DEFAULT_VOTES_KEY.into(),
            data_dir: None,
        }
    }
}

impl StorageConfig {
    /// Configured directory, else the per-user data directory, else `./data`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return PathBuf::from(dir);
        }
        directories::ProjectDirs::from("", "", "jersey-picker")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// SQLite database holding the persisted votes.
    pub fn database_path(&self) -> PathBuf {
        self.resolve_data_dir().join(DATABASE_FILE_NAME)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate a config document.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `config/picker.toml` relative to `base_dir`. Does not copy defaults
/// and does not consult the environment.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE_NAME);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    parse_config(&text, &path)
}

/// Copy `defaults/picker.toml` into `config/` when it is missing there.
/// Returns the path that was written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let defaults = base_dir.join("defaults").join(CONFIG_FILE_NAME);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE_NAME);

    if target.exists() {
        return Ok(None);
    }
    if !defaults.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root",
                defaults.display(),
                target.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&defaults, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", defaults.display()),
    })?;
    Ok(Some(target))
}

/// Apply an endpoint override (normally the value of [`ENDPOINT_ENV`]).
/// Blank values are ignored.
pub fn apply_endpoint_override(
    config: &mut Config,
    endpoint: Option<String>,
) -> Result<(), ConfigError> {
    let Some(endpoint) = endpoint.map(|e| e.trim().to_string()) else {
        return Ok(());
    };
    if endpoint.is_empty() {
        return Ok(());
    }
    config.submission.endpoint = Some(endpoint);
    validate(config)
}

/// Convenience wrapper: copies defaults if needed, loads config relative to
/// the current working directory and applies the environment override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_endpoint_override(&mut config, std::env::var(ENDPOINT_ENV).ok())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let carousel = &config.carousel;
    if carousel.autoplay_interval_ms == 0 {
        return Err(invalid("carousel.autoplay_interval_ms", "must be greater than 0"));
    }
    if !(carousel.swipe_threshold > 0.0) {
        return Err(invalid(
            "carousel.swipe_threshold",
            format!("must be > 0, got {}", carousel.swipe_threshold),
        ));
    }
    if !(carousel.horizontal_padding >= 0.0) {
        return Err(invalid(
            "carousel.horizontal_padding",
            format!("must be >= 0, got {}", carousel.horizontal_padding),
        ));
    }
    if !(carousel.units_per_cell > 0.0) {
        return Err(invalid(
            "carousel.units_per_cell",
            format!("must be > 0, got {}", carousel.units_per_cell),
        ));
    }

    let submission = &config.submission;
    if submission.timeout_secs == 0 {
        return Err(invalid("submission.timeout_secs", "must be greater than 0"));
    }
    if let Some(endpoint) = &submission.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(invalid(
                "submission.endpoint",
                format!("must be an http(s) URL, got `{endpoint}`"),
            ));
        }
    }
    let fields = [
        ("submission.fields.jersey_name", &submission.fields.jersey_name),
        ("submission.fields.player_name", &submission.fields.player_name),
        ("submission.fields.opinion", &submission.fields.opinion),
    ];
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(invalid(name, "must not be empty"));
        }
    }

    if config.storage.votes_key.trim().is_empty() {
        return Err(invalid("storage.votes_key", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
