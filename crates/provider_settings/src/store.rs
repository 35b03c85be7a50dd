use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use gpui::{App, AppContext as _, Context, Entity};
use serde_json::Value;

use crate::{ENABLED, FieldPath, LlmSettings, ModelProvider, ProviderSettings, SettingsPatch};

/// Environment variable overriding the settings file location.
pub const SETTINGS_PATH_ENV: &str = "LLM_PROVIDER_SETTINGS_PATH";

/// Read selectors and write commands over the shared LLM settings.
///
/// Implementors call `cx.notify()` after a write, the form observes the store
/// and re-renders with the new derived state.
pub trait SettingsStore: Sized + 'static {
    fn is_provider_enabled(&self, provider: ModelProvider) -> bool;
    fn is_provider_fetch_on_client(&self, provider: ModelProvider) -> bool;
    fn is_provider_endpoint_not_empty(&self, provider: ModelProvider) -> bool;
    fn provider_settings(&self, provider: ModelProvider) -> ProviderSettings;

    /// Merge a partial settings object into the current settings.
    fn set_settings(&mut self, patch: SettingsPatch, cx: &mut Context<Self>);

    fn toggle_provider_enabled(
        &mut self,
        provider: ModelProvider,
        enabled: bool,
        cx: &mut Context<Self>,
    );
}

/// A JSON file holding [`LlmSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file from `LLM_PROVIDER_SETTINGS_PATH`, or
    /// `<config dir>/llm-provider-settings/settings.json`.
    pub fn default_location() -> Option<Self> {
        if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
            return Some(Self::new(path));
        }

        dirs::config_dir().map(|dir| Self::new(dir.join("llm-provider-settings/settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, a missing file yields the defaults.
    pub fn load(&self) -> Result<LlmSettings> {
        if !self.path.exists() {
            return Ok(LlmSettings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    pub fn save(&self, settings: &LlmSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// The default [`SettingsStore`], optionally persisted to a [`SettingsFile`].
pub struct UserSettingsStore {
    settings: LlmSettings,
    file: Option<SettingsFile>,
}

impl UserSettingsStore {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            file: None,
        }
    }

    /// Load the store from the file, every write is saved back to it.
    pub fn load(file: SettingsFile) -> Result<Self> {
        let settings = file.load()?;
        Ok(Self {
            settings,
            file: Some(file),
        })
    }

    pub fn view(self, cx: &mut App) -> Entity<Self> {
        cx.new(|_| self)
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    fn apply(&mut self, patch: SettingsPatch, cx: &mut Context<Self>) {
        if let Err(err) = self.settings.apply(&patch) {
            tracing::error!("failed to apply settings patch: {:?}", err);
            return;
        }
        tracing::debug!("settings updated: {}", patch.as_value());

        if let Some(file) = &self.file {
            if let Err(err) = file.save(&self.settings) {
                tracing::error!("failed to save settings: {:?}", err);
            }
        }

        cx.notify();
    }
}

impl SettingsStore for UserSettingsStore {
    fn is_provider_enabled(&self, provider: ModelProvider) -> bool {
        self.settings.is_provider_enabled(provider)
    }

    fn is_provider_fetch_on_client(&self, provider: ModelProvider) -> bool {
        self.settings.is_provider_fetch_on_client(provider)
    }

    fn is_provider_endpoint_not_empty(&self, provider: ModelProvider) -> bool {
        self.settings.is_provider_endpoint_not_empty(provider)
    }

    fn provider_settings(&self, provider: ModelProvider) -> ProviderSettings {
        self.settings.provider(provider)
    }

    fn set_settings(&mut self, patch: SettingsPatch, cx: &mut Context<Self>) {
        self.apply(patch, cx);
    }

    fn toggle_provider_enabled(
        &mut self,
        provider: ModelProvider,
        enabled: bool,
        cx: &mut Context<Self>,
    ) {
        let path = FieldPath::provider(provider, ENABLED);
        self.apply(SettingsPatch::at(&path, Value::Bool(enabled)), cx);
    }
}
