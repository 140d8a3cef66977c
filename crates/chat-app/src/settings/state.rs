use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use paperwhisperer_llm::{DEFAULT_OPENAI_MODEL, ProviderConfig};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::chat::{CompletionProfile, ContextBuilder, default_guide_path};

pub const DEFAULT_PROVIDER_ID: &str = "openai";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_TITLE: &str = "GPT4 32k Chat";
pub const SETTINGS_DIRECTORY_NAME: &str = "paperwhisperer";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_PATH_ENV: &str = "PAPERWHISPERER_SETTINGS";
pub const ENV_PREFIX: &str = "PAPERWHISPERER_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default = "default_guide_path")]
    pub guide_path: PathBuf,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: None,
            max_tokens: None,
            guide_path: default_guide_path(),
            title: default_title(),
        }
    }
}

impl AppSettings {
    /// Always returns a config; an empty key is rejected by the provider itself.
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(&self.provider_id, &self.api_key, &self.endpoint)
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn completion_profile(&self) -> CompletionProfile {
        CompletionProfile::new(self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    pub fn context_builder(&self) -> ContextBuilder {
        ContextBuilder::new(self.guide_path.clone())
    }

    /// Fills unset fields from the conventional OpenAI variables.
    pub fn with_openai_environment<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if self.api_key.trim().is_empty()
            && let Some(api_key) = read("OPENAI_API_KEY")
        {
            self.api_key = api_key;
        }

        if matches!(self.endpoint.trim(), "" | DEFAULT_ENDPOINT)
            && let Some(endpoint) = read("OPENAI_BASE_URL")
        {
            self.endpoint = endpoint;
        }

        self
    }

    pub fn normalized(mut self) -> Self {
        self.provider_id = non_blank_or(&self.provider_id, default_provider_id);
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = non_blank_or(&self.endpoint, default_endpoint);
        self.model = non_blank_or(&self.model, default_model);
        self.title = non_blank_or(&self.title, default_title);
        if self.guide_path.as_os_str().is_empty() {
            self.guide_path = default_guide_path();
        }
        // Zero means "no limit" in hand-written settings files.
        self.max_tokens = self.max_tokens.filter(|value| *value > 0);
        self
    }
}

/// Layers defaults, the optional JSON settings file, and environment variables.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    config_path: PathBuf,
    read_environment: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        let config_path = std::env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        Self::new(config_path)
    }
}

impl SettingsLoader {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".paperwhisperer"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            read_environment: true,
        }
    }

    /// Skips both the prefixed and the OpenAI environment variables.
    pub fn without_environment(mut self) -> Self {
        self.read_environment = false;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppSettings::default()));

        if self.config_path.exists() {
            figment = figment.merge(Json::file(&self.config_path));
        } else {
            tracing::info!(
                path = ?self.config_path,
                "settings file not found, using defaults"
            );
        }

        if self.read_environment {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["settings"]));
        }

        figment
    }

    pub fn load(&self) -> SettingsResult<AppSettings> {
        let mut settings = self
            .figment()
            .extract::<AppSettings>()
            .context(ExtractSnafu {
                stage: "extract-settings",
                path: self.config_path.clone(),
            })?;

        if self.read_environment {
            settings = settings.with_openai_environment(|name| std::env::var(name).ok());
        }

        let settings = settings.normalized();

        tracing::info!(
            path = ?self.config_path,
            provider_id = %settings.provider_id,
            model_id = %settings.model,
            has_api_key = settings.is_valid(),
            "settings loaded"
        );

        Ok(settings)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to load settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        source: figment::Error,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

fn non_blank_or(value: &str, fallback: fn() -> String) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback()
    } else {
        value.to_string()
    }
}

fn default_provider_id() -> String {
    DEFAULT_PROVIDER_ID.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
