use gpui::{Pixels, SharedString, px};

use crate::{API_KEY, ENABLED_MODELS, ENDPOINT, FieldPath, ModelProvider, SettingsStore, tr};

/// Default minimum width of an input control.
pub const ITEM_MIN_WIDTH: Pixels = px(400.);

/// What a field is, independent of how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFieldKind {
    ApiKey,
    Endpoint,
    FetchOnClient,
    ModelList,
    Checker,
    /// A descriptor supplied by the caller.
    Custom,
}

/// Options passed through to the model list selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelListOptions {
    pub placeholder: Option<SharedString>,
    pub not_found_content: Option<SharedString>,
    pub azure_deploy_name: bool,
    pub show_model_fetcher: bool,
}

impl ModelListOptions {
    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn not_found_content(mut self, content: impl Into<SharedString>) -> Self {
        self.not_found_content = Some(content.into());
        self
    }

    pub fn azure_deploy_name(mut self, azure_deploy_name: bool) -> Self {
        self.azure_deploy_name = azure_deploy_name;
        self
    }

    pub fn show_model_fetcher(mut self, show_model_fetcher: bool) -> Self {
        self.show_model_fetcher = show_model_fetcher;
        self
    }
}

/// The input control rendered for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    /// A masked text input.
    Password { placeholder: SharedString },
    Text {
        placeholder: SharedString,
        cleanable: bool,
    },
    /// Writes `fetchOnClient` straight to the store, it has no bound path.
    FetchOnClientSwitch { checked: bool },
    ModelList(ModelListOptions),
    /// Read only connectivity check against the given model.
    Checker { model: Option<SharedString> },
}

/// One row of the provider form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub kind: ProviderFieldKind,
    pub label: SharedString,
    pub description: Option<SharedString>,
    /// Where the value lives in the settings, `None` for unbound fields.
    pub path: Option<FieldPath>,
    pub control: FieldControl,
    pub min_width: Option<Pixels>,
}

impl FieldDescriptor {
    /// Create a custom field, e.g. for an `api_key_items` override.
    pub fn new(label: impl Into<SharedString>, control: FieldControl) -> Self {
        Self {
            kind: ProviderFieldKind::Custom,
            label: label.into(),
            description: None,
            path: None,
            control,
            min_width: Some(ITEM_MIN_WIDTH),
        }
    }

    pub fn description(mut self, description: impl Into<SharedString>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn path(mut self, path: FieldPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn min_width(mut self, min_width: Option<Pixels>) -> Self {
        self.min_width = min_width;
        self
    }

    fn kind(mut self, kind: ProviderFieldKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Values derived from the store, read on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderState {
    pub enabled: bool,
    pub fetch_on_client: bool,
    pub endpoint_not_empty: bool,
}

impl ProviderState {
    pub fn read<S: SettingsStore>(store: &S, provider: ModelProvider) -> Self {
        Self {
            enabled: store.is_provider_enabled(provider),
            fetch_on_client: store.is_provider_fetch_on_client(provider),
            endpoint_not_empty: store.is_provider_endpoint_not_empty(provider),
        }
    }
}

/// Caller supplied options of a provider form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: ModelProvider,
    pub title: SharedString,
    pub show_api_key: bool,
    pub api_key_items: Option<Vec<FieldDescriptor>>,
    pub show_endpoint: bool,
    pub show_browser_request: bool,
    pub check_model: Option<SharedString>,
    pub checker_item: Option<FieldDescriptor>,
    pub model_list: ModelListOptions,
    pub can_deactivate: bool,
}

impl ProviderConfig {
    pub fn new(provider: ModelProvider, title: impl Into<SharedString>) -> Self {
        Self {
            provider,
            title: title.into(),
            show_api_key: true,
            api_key_items: None,
            show_endpoint: false,
            show_browser_request: false,
            check_model: None,
            checker_item: None,
            model_list: ModelListOptions::default(),
            can_deactivate: true,
        }
    }

    /// Set whether to show the API key field, default is `true`.
    pub fn show_api_key(mut self, show_api_key: bool) -> Self {
        self.show_api_key = show_api_key;
        self
    }

    /// Replace the default API key field with these fields.
    pub fn api_key_items(mut self, items: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.api_key_items = Some(items.into_iter().collect());
        self
    }

    pub fn show_endpoint(mut self, show_endpoint: bool) -> Self {
        self.show_endpoint = show_endpoint;
        self
    }

    /// Always show the fetch on client switch, even without an endpoint.
    pub fn show_browser_request(mut self, show_browser_request: bool) -> Self {
        self.show_browser_request = show_browser_request;
        self
    }

    pub fn check_model(mut self, model: impl Into<SharedString>) -> Self {
        self.check_model = Some(model.into());
        self
    }

    pub fn checker_item(mut self, item: FieldDescriptor) -> Self {
        self.checker_item = Some(item);
        self
    }

    pub fn model_list(mut self, options: ModelListOptions) -> Self {
        self.model_list = options;
        self
    }

    /// Set whether the provider can be turned off, default is `true`.
    pub fn can_deactivate(mut self, can_deactivate: bool) -> Self {
        self.can_deactivate = can_deactivate;
        self
    }

    pub fn shows_fetch_on_client(&self, state: &ProviderState) -> bool {
        self.show_browser_request || (self.show_endpoint && state.endpoint_not_empty)
    }

    /// Build the ordered field list for the current state.
    pub fn fields(&self, state: &ProviderState) -> Vec<FieldDescriptor> {
        let provider = self.provider;
        let mut fields = Vec::new();

        if self.show_api_key {
            match &self.api_key_items {
                Some(items) => fields.extend(items.iter().cloned()),
                None => fields.push(
                    FieldDescriptor::new(
                        tr(&provider.i18n_key("token.title")),
                        FieldControl::Password {
                            placeholder: tr(&provider.i18n_key("token.placeholder")),
                        },
                    )
                    .kind(ProviderFieldKind::ApiKey)
                    .description(tr(&provider.i18n_key("token.desc")))
                    .path(FieldPath::provider(provider, API_KEY)),
                ),
            }
        }

        if self.show_endpoint {
            fields.push(
                FieldDescriptor::new(
                    tr(&provider.i18n_key("endpoint.title")),
                    FieldControl::Text {
                        placeholder: tr(&provider.i18n_key("endpoint.placeholder")),
                        cleanable: true,
                    },
                )
                .kind(ProviderFieldKind::Endpoint)
                .description(tr(&provider.i18n_key("endpoint.desc")))
                .path(FieldPath::provider(provider, ENDPOINT)),
            );
        }

        if self.shows_fetch_on_client(state) {
            fields.push(
                FieldDescriptor::new(
                    tr("setting.llm.fetchOnClient.title"),
                    FieldControl::FetchOnClientSwitch {
                        checked: state.fetch_on_client,
                    },
                )
                .kind(ProviderFieldKind::FetchOnClient)
                .description(tr("setting.llm.fetchOnClient.desc"))
                .min_width(None),
            );
        }

        let mut model_list = self.model_list.clone();
        model_list.placeholder = model_list
            .placeholder
            .or_else(|| Some(tr("setting.llm.modelList.placeholder")));
        fields.push(
            FieldDescriptor::new(
                tr("setting.llm.modelList.title"),
                FieldControl::ModelList(model_list),
            )
            .kind(ProviderFieldKind::ModelList)
            .description(tr("setting.llm.modelList.desc"))
            .path(FieldPath::provider(provider, ENABLED_MODELS)),
        );

        match &self.checker_item {
            Some(item) => fields.push(item.clone()),
            None => fields.push(
                FieldDescriptor::new(
                    tr("setting.llm.checker.title"),
                    FieldControl::Checker {
                        model: self.check_model.clone(),
                    },
                )
                .kind(ProviderFieldKind::Checker)
                .description(tr("setting.llm.checker.desc"))
                .min_width(None),
            ),
        }

        fields
    }
}
