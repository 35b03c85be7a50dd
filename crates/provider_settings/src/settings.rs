use std::collections::BTreeMap;

use anyhow::{Context as _, Result};
use gpui::SharedString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::ModelProvider;

/// The settings key that holds the per-provider configuration map.
pub const LLM_CONFIG_KEY: &str = "languageModel";
pub const API_KEY: &str = "apiKey";
pub const ENDPOINT: &str = "endpoint";
pub const ENABLED_MODELS: &str = "enabledModels";
pub const FETCH_ON_CLIENT: &str = "fetchOnClient";
pub const ENABLED: &str = "enabled";

/// The configuration of a single provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_on_client: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Provider specific keys, e.g. `apiVersion` for Azure.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// All LLM settings, keyed by provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    #[serde(default)]
    pub language_model: BTreeMap<ModelProvider, ProviderSettings>,
}

impl LlmSettings {
    /// Returns the settings of the provider, or the defaults if never configured.
    pub fn provider(&self, provider: ModelProvider) -> ProviderSettings {
        self.language_model
            .get(&provider)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_provider_enabled(&self, provider: ModelProvider) -> bool {
        self.language_model
            .get(&provider)
            .and_then(|config| config.enabled)
            .unwrap_or_else(|| provider.enabled_by_default())
    }

    pub fn is_provider_fetch_on_client(&self, provider: ModelProvider) -> bool {
        self.language_model
            .get(&provider)
            .and_then(|config| config.fetch_on_client)
            .unwrap_or(false)
    }

    pub fn is_provider_endpoint_not_empty(&self, provider: ModelProvider) -> bool {
        self.language_model
            .get(&provider)
            .and_then(|config| config.endpoint.as_deref())
            .map_or(false, |endpoint| !endpoint.trim().is_empty())
    }

    /// Deep merge the patch into the settings.
    ///
    /// The settings are left untouched if the merged value does not deserialize.
    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<()> {
        let mut value = serde_json::to_value(&*self).context("failed to serialize settings")?;
        deep_merge(&mut value, patch.as_value());
        *self = serde_json::from_value(value).context("failed to apply settings patch")?;
        Ok(())
    }
}

/// An ordered key sequence into the nested settings mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(SmallVec<[SharedString; 3]>);

impl FieldPath {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SharedString>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Path to a key of the provider config: `[languageModel, <provider>, <key>]`.
    pub fn provider(provider: ModelProvider, key: impl Into<SharedString>) -> Self {
        Self::new([
            SharedString::new_static(LLM_CONFIG_KEY),
            provider.into(),
            key.into(),
        ])
    }

    /// Read the value at this path from a value tree.
    pub fn get<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(tree, |value, key| {
            let key: &str = key;
            value.get(key)
        })
    }

    /// Write the value at this path, creating intermediate objects as needed.
    ///
    /// Non-object values found along the path are replaced by objects.
    pub fn set(&self, tree: &mut Value, value: Value) {
        let Some((last, parents)) = self.0.split_last() else {
            *tree = value;
            return;
        };

        let mut current = tree;
        for key in parents {
            current = ensure_object(current)
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(current).insert(last.to_string(), value);
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.0.iter().map(|k| k.as_str()).collect();
        f.write_str(&keys.join("."))
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// A partial settings object, merged into the current settings by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsPatch(Value);

impl Default for SettingsPatch {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl SettingsPatch {
    /// A patch that sets a single value at the path.
    pub fn at(path: &FieldPath, value: Value) -> Self {
        let mut patch = Self::default();
        path.set(&mut patch.0, value);
        patch
    }

    /// `{ languageModel: { <provider>: { fetchOnClient: <value> } } }`
    pub fn fetch_on_client(provider: ModelProvider, value: bool) -> Self {
        Self::at(
            &FieldPath::provider(provider, FETCH_ON_CLIENT),
            Value::Bool(value),
        )
    }

    /// A patch carrying a whole form value tree.
    pub fn from_values(values: Value) -> Self {
        Self(values)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Merge `patch` into `target`.
///
/// Objects are merged key by key, any other value (arrays and null included)
/// replaces the target value.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                        continue;
                    }
                    _ => {}
                }
                target.insert(key.clone(), value.clone());
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
