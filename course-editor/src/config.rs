use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    /// Request timeout; `0` disables it.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct EditorSettings {
    /// Course opened when `--course` is not given.
    #[serde(default)]
    pub course_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LogSettings {
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "course_editor=info,lms_client=info".to_string(),
        }
    }
}

/// Directory holding `base.yaml` and the per-environment files.
///
/// `./config` wins when it exists, otherwise the crate's own `config/`.
pub fn config_directory() -> PathBuf {
    let local = std::env::current_dir()
        .map(|dir| dir.join("config"))
        .unwrap_or_else(|_| PathBuf::from("config"));
    if local.is_dir() {
        return local;
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
}

pub fn app_environment() -> Result<Environment, config::ConfigError> {
    let raw = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    Environment::from_str(&raw)
        .map_err(|_| config::ConfigError::Message(format!("Failed to parse APP_ENVIRONMENT: {}", raw)))
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    build_settings(&config_directory(), &app_environment()?)
}

pub fn build_settings(
    config_directory: &Path,
    environment: &Environment,
) -> Result<Settings, config::ConfigError> {
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("LMS")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
