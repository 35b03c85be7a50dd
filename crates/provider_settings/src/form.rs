use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use gpui::{
    AnyElement, App, AppContext as _, Context, Entity, EventEmitter, InteractiveElement as _,
    IntoElement, ParentElement as _, Render, SharedString, Styled as _, Subscription, Window, div,
    prelude::FluentBuilder as _,
};
use gpui_component::{
    ActiveTheme as _, IconName, Sizable as _, StyledExt as _,
    button::{Button, ButtonVariants as _},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    switch::Switch,
    v_flex,
};
use serde_json::{Map, Value, json};

use crate::{
    Checker, ConnectivityCheck, Debounce, FieldControl, FieldDescriptor, FieldPath, LLM_CONFIG_KEY,
    ModelListEvent, ModelListSelect, ModelProvider, ProviderConfig, ProviderSettings,
    ProviderState, SettingsPatch, SettingsStore, UserSettingsStore,
};

/// The settings form of one model provider.
///
/// Bound fields are written into a local value tree, which is committed to the
/// store as a whole once the form has been idle for [`crate::PROVIDER_FORM_DEBOUNCE`].
/// The fetch on client switch and the enable switch in the header write
/// through immediately.
///
/// Store changes are synced back into the tree and the inputs, except for
/// paths with an edit waiting to be committed.
pub struct ProviderConfigForm<S: SettingsStore = UserSettingsStore> {
    config: ProviderConfig,
    store: Entity<S>,
    values: Value,
    open: bool,
    debounce: Debounce,
    /// Paths edited since the last commit.
    pending: HashSet<FieldPath>,
    checker: Entity<Checker>,
    inputs: HashMap<FieldPath, Entity<InputState>>,
    model_inputs: HashMap<FieldPath, Entity<InputState>>,
    _subscriptions: Vec<Subscription>,
}

impl<S: SettingsStore> EventEmitter<ModelListEvent> for ProviderConfigForm<S> {}

impl<S: SettingsStore> ProviderConfigForm<S> {
    pub fn new(config: ProviderConfig, store: Entity<S>, cx: &mut Context<Self>) -> Self {
        let provider = config.provider;
        let state = ProviderState::read(store.read(cx), provider);
        let fields = config.fields(&state);

        let values = seed_values(&fields, provider, store.read(cx).provider_settings(provider));
        let model = fields.iter().find_map(|field| match &field.control {
            FieldControl::Checker { model } => Some(model.clone()),
            _ => None,
        });
        let checker = cx.new(|_| Checker::new(provider, model.flatten()));
        let open = !config.can_deactivate || state.enabled;

        let _subscriptions = vec![cx.observe(&store, |this, _, cx| {
            this.sync_from_store(cx)
        })];

        Self {
            config,
            store,
            values,
            open,
            debounce: Debounce::default(),
            pending: HashSet::new(),
            checker,
            inputs: HashMap::new(),
            model_inputs: HashMap::new(),
            _subscriptions,
        }
    }

    pub fn view(config: ProviderConfig, store: Entity<S>, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(config, store, cx))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn set_connectivity_check(&mut self, check: Rc<dyn ConnectivityCheck>, cx: &mut App) {
        self.checker
            .update(cx, |checker, _| checker.set_connectivity_check(check));
    }

    /// The store derived state, e.g. whether the provider is enabled.
    pub fn state(&self, cx: &App) -> ProviderState {
        ProviderState::read(self.store.read(cx), self.config.provider)
    }

    /// The form value tree, only bound paths are present.
    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_open(&mut self, cx: &mut Context<Self>) {
        self.open = !self.open;
        cx.notify();
    }

    /// Write a bound field and schedule the debounced commit of the whole tree.
    pub fn set_value(&mut self, path: &FieldPath, value: Value, cx: &mut Context<Self>) {
        path.set(&mut self.values, value);
        self.pending.insert(path.clone());
        self.debounce.schedule(cx, |this: &mut Self, cx| {
            this.pending.clear();
            let patch = SettingsPatch::from_values(this.values.clone());
            this.store
                .update(cx, |store, cx| store.set_settings(patch, cx));
        });
        cx.notify();
    }

    /// The model ids currently in the tree at `path`.
    pub fn models(&self, path: &FieldPath) -> Vec<SharedString> {
        path.get(&self.values)
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|model| SharedString::from(model.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Re-read the bound values from the store, keeping uncommitted edits.
    fn sync_from_store(&mut self, cx: &mut Context<Self>) {
        let provider = self.config.provider;
        let fields = self.config.fields(&self.state(cx));
        let settings = self.store.read(cx).provider_settings(provider);
        let mut values = seed_values(&fields, provider, settings);
        for path in &self.pending {
            if let Some(value) = path.get(&self.values) {
                path.set(&mut values, value.clone());
            }
        }

        if values != self.values {
            tracing::debug!("{} form synced from store", provider);
            self.values = values;
        }
        cx.notify();
    }

    /// Push the tree into inputs that drifted from it, e.g. after an external write.
    fn sync_inputs(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        for (path, input) in &self.inputs {
            if self.pending.contains(path) {
                continue;
            }

            let value = path
                .get(&self.values)
                .and_then(Value::as_str)
                .unwrap_or_default();
            let current = input.read(cx).value();
            if current.as_str() != value {
                let value = value.to_string();
                input.update(cx, |input, cx| input.set_value(value, window, cx));
            }
        }
    }

    fn shows_enable_switch(&self) -> bool {
        self.config.can_deactivate
    }

    fn is_header_dimmed(state: &ProviderState) -> bool {
        !state.enabled
    }

    pub fn set_fetch_on_client(&mut self, fetch_on_client: bool, cx: &mut Context<Self>) {
        let patch = SettingsPatch::fetch_on_client(self.config.provider, fetch_on_client);
        self.store
            .update(cx, |store, cx| store.set_settings(patch, cx));
    }

    pub fn set_enabled(&mut self, enabled: bool, cx: &mut Context<Self>) {
        let provider = self.config.provider;
        self.store.update(cx, |store, cx| {
            store.toggle_provider_enabled(provider, enabled, cx)
        });
    }

    fn ensure_input(
        &mut self,
        path: &FieldPath,
        placeholder: SharedString,
        masked: bool,
        bind: bool,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Entity<InputState> {
        let cached = if bind {
            self.inputs.get(path)
        } else {
            self.model_inputs.get(path)
        };
        if let Some(input) = cached {
            return input.clone();
        }

        let value = if bind {
            path.get(&self.values)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        };
        let input = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(placeholder)
                .masked(masked)
                .default_value(value)
        });

        if bind {
            let path = path.clone();
            self._subscriptions.push(cx.subscribe_in(
                &input,
                window,
                move |this, input, event: &InputEvent, _, cx| {
                    if let InputEvent::Change = event {
                        let value = input.read(cx).value();
                        let stored = path.get(&this.values).and_then(Value::as_str);
                        if stored.unwrap_or_default() == value.as_str() {
                            return;
                        }
                        this.set_value(&path, Value::String(value.to_string()), cx);
                    }
                },
            ));
        }

        if bind {
            self.inputs.insert(path.clone(), input.clone());
        } else {
            self.model_inputs.insert(path.clone(), input.clone());
        }
        input
    }

    fn render_control(
        &mut self,
        ix: usize,
        field: &FieldDescriptor,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        match (&field.control, &field.path) {
            (FieldControl::Password { placeholder }, Some(path)) => {
                let input = self.ensure_input(path, placeholder.clone(), true, true, window, cx);
                Input::new(&input).mask_toggle().into_any_element()
            }
            (
                FieldControl::Text {
                    placeholder,
                    cleanable,
                },
                Some(path),
            ) => {
                let input = self.ensure_input(path, placeholder.clone(), false, true, window, cx);
                Input::new(&input).cleanable(*cleanable).into_any_element()
            }
            (FieldControl::FetchOnClientSwitch { checked }, _) => Switch::new(("fetch-on-client", ix))
                .checked(*checked)
                .on_click(cx.listener(|this, checked: &bool, _, cx| {
                    this.set_fetch_on_client(*checked, cx)
                }))
                .into_any_element(),
            (FieldControl::ModelList(options), Some(path)) => {
                let placeholder = options.placeholder.clone().unwrap_or_default();
                let input = self.ensure_input(path, placeholder, false, false, window, cx);
                let models = self.models(path);

                let provider = self.config.provider;
                let path = path.clone();
                let view = cx.entity();
                ModelListSelect::new(("model-list", ix), &input, models, options.clone())
                    .on_change({
                        let view = view.clone();
                        move |models, _, cx| {
                            let value = json!(models.iter().map(|m| m.to_string()).collect::<Vec<_>>());
                            view.update(cx, |this, cx| this.set_value(&path, value, cx));
                        }
                    })
                    .on_fetch(move |_, _, cx| {
                        view.update(cx, |_, cx| cx.emit(ModelListEvent::FetchModels(provider)));
                    })
                    .into_any_element()
            }
            (FieldControl::Checker { .. }, _) => self.checker.clone().into_any_element(),
            (_, None) => {
                tracing::error!("field {} has no settings path", field.label);
                div().into_any_element()
            }
        }
    }

    fn render_header(&self, state: &ProviderState, cx: &mut Context<Self>) -> impl IntoElement {
        let icon = if self.open {
            IconName::ChevronDown
        } else {
            IconName::ChevronRight
        };

        h_flex()
            .id("header")
            .gap_2()
            .justify_between()
            .child(
                h_flex()
                    .gap_1()
                    .child(
                        Button::new("toggle")
                            .icon(icon)
                            .ghost()
                            .xsmall()
                            .on_click(cx.listener(|this, _, _, cx| this.toggle_open(cx))),
                    )
                    .child(
                        Label::new(self.config.title.clone())
                            .font_semibold()
                            .when(Self::is_header_dimmed(state), |this| {
                                this.opacity(0.66)
                                    .text_color(cx.theme().muted_foreground)
                            }),
                    ),
            )
            .when(self.shows_enable_switch(), |this| {
                this.child(
                    Switch::new("enabled")
                        .checked(state.enabled)
                        .on_click(cx.listener(|this, checked: &bool, _, cx| {
                            this.set_enabled(*checked, cx)
                        })),
                )
            })
    }
}

impl<S: SettingsStore> Render for ProviderConfigForm<S> {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.sync_inputs(window, cx);

        let state = self.state(cx);
        let fields = if self.open {
            self.config.fields(&state)
        } else {
            vec![]
        };

        let rows = fields
            .iter()
            .enumerate()
            .map(|(ix, field)| {
                let control = self.render_control(ix, field, window, cx);
                h_flex()
                    .id(("field", ix))
                    .gap_4()
                    .justify_between()
                    .child(
                        v_flex()
                            .gap_1()
                            .child(Label::new(field.label.clone()))
                            .when_some(field.description.clone(), |this, description| {
                                this.child(
                                    Label::new(description)
                                        .text_sm()
                                        .text_color(cx.theme().muted_foreground),
                                )
                            }),
                    )
                    .child(
                        div()
                            .flex_shrink_0()
                            .when_some(field.min_width, |this, min_width| this.min_w(min_width))
                            .child(control),
                    )
            })
            .collect::<Vec<_>>();

        let header = self.render_header(&state, cx).into_any_element();

        v_flex()
            .gap_4()
            .p_4()
            .border_1()
            .border_color(cx.theme().border)
            .rounded(cx.theme().radius)
            .child(header)
            .when(self.open, |this| this.child(v_flex().gap_4().children(rows)))
    }
}

/// The stored value of every bound field, as a value tree.
fn seed_values(
    fields: &[FieldDescriptor],
    provider: ModelProvider,
    settings: ProviderSettings,
) -> Value {
    let provider_path =
        FieldPath::new([SharedString::new_static(LLM_CONFIG_KEY), provider.into()]);
    let mut values = Value::Object(Map::new());
    let mut stored = Value::Object(Map::new());
    provider_path.set(
        &mut stored,
        serde_json::to_value(settings).unwrap_or_default(),
    );

    for path in fields.iter().filter_map(|field| field.path.as_ref()) {
        if let Some(value) = path.get(&stored) {
            path.set(&mut values, value.clone());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gpui::{AppContext as _, Context, Entity, TestAppContext};
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::{API_KEY, ENABLED, ENABLED_MODELS, ENDPOINT, LlmSettings, ModelProvider};

    #[derive(Default)]
    struct RecordingStore {
        settings: LlmSettings,
        patches: Vec<Value>,
        toggles: Vec<(ModelProvider, bool)>,
    }

    impl SettingsStore for RecordingStore {
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
            self.settings.apply(&patch).unwrap();
            self.patches.push(patch.into_value());
            cx.notify();
        }

        fn toggle_provider_enabled(
            &mut self,
            provider: ModelProvider,
            enabled: bool,
            cx: &mut Context<Self>,
        ) {
            self.settings
                .apply(&SettingsPatch::at(
                    &FieldPath::provider(provider, ENABLED),
                    json!(enabled),
                ))
                .unwrap();
            self.toggles.push((provider, enabled));
            cx.notify();
        }
    }

    fn store(cx: &mut TestAppContext, settings: &str) -> Entity<RecordingStore> {
        let settings = serde_json::from_str(settings).unwrap();
        cx.new(|_| RecordingStore {
            settings,
            ..Default::default()
        })
    }

    fn form(
        cx: &mut TestAppContext,
        config: ProviderConfig,
        store: &Entity<RecordingStore>,
    ) -> Entity<ProviderConfigForm<RecordingStore>> {
        let store = store.clone();
        cx.new(|cx| ProviderConfigForm::new(config, store, cx))
    }

    #[gpui::test]
    fn test_edits_are_debounced_into_one_write(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let config = ProviderConfig::new(ModelProvider::OpenAI, "OpenAI").show_endpoint(true);
        let form = form(cx, config, &store);
        let api_key = FieldPath::provider(ModelProvider::OpenAI, API_KEY);
        let endpoint = FieldPath::provider(ModelProvider::OpenAI, ENDPOINT);

        form.update(cx, |form, cx| form.set_value(&api_key, json!("s"), cx));
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(50));
        form.update(cx, |form, cx| {
            form.set_value(&api_key, json!("sk-1"), cx);
            form.set_value(&endpoint, json!("https://proxy.example.com/v1"), cx);
        });
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(60));
        cx.run_until_parked();
        store.read_with(cx, |store, _| assert!(store.patches.is_empty()));

        cx.executor().advance_clock(Duration::from_millis(50));
        cx.run_until_parked();
        store.read_with(cx, |store, _| {
            assert_eq!(
                store.patches,
                vec![json!({
                    "languageModel": {
                        "openai": {
                            "apiKey": "sk-1",
                            "endpoint": "https://proxy.example.com/v1",
                        }
                    }
                })]
            );
            assert!(store.is_provider_endpoint_not_empty(ModelProvider::OpenAI));
        });

        // The fetch on client switch now shows up, it follows the committed endpoint.
        form.read_with(cx, |form, cx| {
            let state = form.state(cx);
            assert!(form.config().shows_fetch_on_client(&state));
        });
    }

    #[gpui::test]
    fn test_fetch_on_client_writes_immediately(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let config = ProviderConfig::new(ModelProvider::Ollama, "Ollama")
            .show_api_key(false)
            .show_browser_request(true);
        let form = form(cx, config, &store);

        form.update(cx, |form, cx| form.set_fetch_on_client(true, cx));
        store.read_with(cx, |store, _| {
            assert_eq!(
                store.patches,
                vec![json!({ "languageModel": { "ollama": { "fetchOnClient": true } } })]
            );
        });
        form.read_with(cx, |form, cx| assert!(form.state(cx).fetch_on_client));
    }

    #[gpui::test]
    fn test_enable_switch_writes_immediately(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let form = form(
            cx,
            ProviderConfig::new(ModelProvider::Anthropic, "Anthropic"),
            &store,
        );

        form.update(cx, |form, cx| form.set_enabled(true, cx));
        store.read_with(cx, |store, _| {
            assert_eq!(store.toggles, vec![(ModelProvider::Anthropic, true)]);
            assert!(store.patches.is_empty());
        });
        form.read_with(cx, |form, cx| assert!(form.state(cx).enabled));
    }

    #[gpui::test]
    fn test_initial_open_state(cx: &mut TestAppContext) {
        let store = store(cx, "{}");

        let anthropic = form(
            cx,
            ProviderConfig::new(ModelProvider::Anthropic, "Anthropic"),
            &store,
        );
        anthropic.read_with(cx, |form, _| assert!(!form.is_open()));

        let openai = form(cx, ProviderConfig::new(ModelProvider::OpenAI, "OpenAI"), &store);
        openai.read_with(cx, |form, _| assert!(form.is_open()));

        let always_on = form(
            cx,
            ProviderConfig::new(ModelProvider::Anthropic, "Anthropic").can_deactivate(false),
            &store,
        );
        always_on.read_with(cx, |form, _| assert!(form.is_open()));

        anthropic.update(cx, |form, cx| form.toggle_open(cx));
        anthropic.read_with(cx, |form, _| assert!(form.is_open()));
    }

    #[gpui::test]
    fn test_values_seeded_from_bound_fields(cx: &mut TestAppContext) {
        let store = store(
            cx,
            indoc! {r#"
                {
                    "languageModel": {
                        "azure": {
                            "apiKey": "az-1",
                            "apiVersion": "2024-02-01",
                            "endpoint": "https://example.openai.azure.com",
                            "fetchOnClient": true,
                            "enabled": true,
                            "enabledModels": ["gpt-35-turbo"]
                        }
                    }
                }
            "#},
        );
        let config = ProviderConfig::new(ModelProvider::Azure, "Azure")
            .api_key_items([
                FieldDescriptor::new(
                    "API Key",
                    FieldControl::Password {
                        placeholder: "Azure API Key".into(),
                    },
                )
                .path(FieldPath::provider(ModelProvider::Azure, API_KEY)),
                FieldDescriptor::new(
                    "API Version",
                    FieldControl::Text {
                        placeholder: "2024-02-01".into(),
                        cleanable: false,
                    },
                )
                .path(FieldPath::provider(ModelProvider::Azure, "apiVersion")),
            ])
            .show_endpoint(true);
        let form = form(cx, config, &store);

        form.read_with(cx, |form, _| {
            assert_eq!(
                form.values(),
                &json!({
                    "languageModel": {
                        "azure": {
                            "apiKey": "az-1",
                            "apiVersion": "2024-02-01",
                            "endpoint": "https://example.openai.azure.com",
                            "enabledModels": ["gpt-35-turbo"],
                        }
                    }
                })
            );
        });

        // Committing the tree must not touch the unbound keys.
        let models = FieldPath::provider(ModelProvider::Azure, ENABLED_MODELS);
        form.update(cx, |form, cx| {
            form.set_value(&models, json!(["gpt-35-turbo", "gpt-4o"]), cx)
        });
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(100));
        cx.run_until_parked();
        store.read_with(cx, |store, _| {
            let azure = store.provider_settings(ModelProvider::Azure);
            assert_eq!(azure.fetch_on_client, Some(true));
            assert_eq!(azure.enabled, Some(true));
            assert_eq!(
                azure.enabled_models,
                Some(vec!["gpt-35-turbo".to_string(), "gpt-4o".to_string()])
            );
        });
    }

    #[test]
    fn test_seed_values_reads_provider_slice() {
        let fields = vec![
            FieldDescriptor::new(
                "Proxy",
                FieldControl::Text {
                    placeholder: "".into(),
                    cleanable: false,
                },
            )
            .path(FieldPath::new(["proxy", "azure", "url"])),
            FieldDescriptor::new("Models", FieldControl::ModelList(Default::default()))
                .path(FieldPath::provider(ModelProvider::Azure, ENABLED_MODELS)),
        ];
        let settings = ProviderSettings {
            enabled_models: Some(vec!["gpt-4o".to_string()]),
            ..Default::default()
        };

        assert_eq!(
            seed_values(&fields, ModelProvider::Azure, settings),
            json!({ "languageModel": { "azure": { "enabledModels": ["gpt-4o"] } } })
        );
    }

    #[gpui::test]
    fn test_fetch_models_event(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let form = form(cx, ProviderConfig::new(ModelProvider::Groq, "Groq"), &store);
        let events = Rc::new(std::cell::RefCell::new(vec![]));

        cx.update(|cx| {
            let events = events.clone();
            cx.subscribe(&form, move |_, event: &ModelListEvent, _| {
                events.borrow_mut().push(*event)
            })
            .detach();
        });
        form.update(cx, |_, cx| cx.emit(ModelListEvent::FetchModels(ModelProvider::Groq)));

        assert_eq!(
            *events.borrow(),
            vec![ModelListEvent::FetchModels(ModelProvider::Groq)]
        );
    }

    #[gpui::test]
    fn test_external_store_change_survives_commit(cx: &mut TestAppContext) {
        let store = store(
            cx,
            r#"{ "languageModel": { "openai": { "endpoint": "https://old.example.com" } } }"#,
        );
        let config = ProviderConfig::new(ModelProvider::OpenAI, "OpenAI").show_endpoint(true);
        let form = form(cx, config, &store);
        let api_key = FieldPath::provider(ModelProvider::OpenAI, API_KEY);
        let endpoint = FieldPath::provider(ModelProvider::OpenAI, ENDPOINT);

        store.update(cx, |store, cx| {
            store.set_settings(
                SettingsPatch::at(&endpoint, json!("https://new.example.com")),
                cx,
            )
        });
        cx.run_until_parked();
        form.read_with(cx, |form, _| {
            assert_eq!(
                endpoint.get(form.values()),
                Some(&json!("https://new.example.com"))
            );
        });

        form.update(cx, |form, cx| form.set_value(&api_key, json!("sk-1"), cx));
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(100));
        cx.run_until_parked();

        store.read_with(cx, |store, _| {
            let openai = store.provider_settings(ModelProvider::OpenAI);
            assert_eq!(openai.api_key.as_deref(), Some("sk-1"));
            assert_eq!(openai.endpoint.as_deref(), Some("https://new.example.com"));
        });
    }

    #[gpui::test]
    fn test_store_change_keeps_uncommitted_edit(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let config = ProviderConfig::new(ModelProvider::OpenAI, "OpenAI").show_endpoint(true);
        let form = form(cx, config, &store);
        let api_key = FieldPath::provider(ModelProvider::OpenAI, API_KEY);
        let endpoint = FieldPath::provider(ModelProvider::OpenAI, ENDPOINT);

        form.update(cx, |form, cx| form.set_value(&api_key, json!("sk-draft"), cx));
        store.update(cx, |store, cx| {
            store.set_settings(
                SettingsPatch::at(&api_key, json!("sk-other")),
                cx,
            );
            store.set_settings(
                SettingsPatch::at(&endpoint, json!("https://new.example.com")),
                cx,
            );
        });
        cx.run_until_parked();
        form.read_with(cx, |form, _| {
            assert_eq!(api_key.get(form.values()), Some(&json!("sk-draft")));
            assert_eq!(
                endpoint.get(form.values()),
                Some(&json!("https://new.example.com"))
            );
        });

        cx.executor().advance_clock(Duration::from_millis(100));
        cx.run_until_parked();
        store.read_with(cx, |store, _| {
            let openai = store.provider_settings(ModelProvider::OpenAI);
            assert_eq!(openai.api_key.as_deref(), Some("sk-draft"));
            assert_eq!(openai.endpoint.as_deref(), Some("https://new.example.com"));
        });
    }

    #[gpui::test]
    fn test_model_list_edits_within_debounce(cx: &mut TestAppContext) {
        let store = store(
            cx,
            r#"{ "languageModel": { "openai": { "enabledModels": ["gpt-4o"] } } }"#,
        );
        let form = form(cx, ProviderConfig::new(ModelProvider::OpenAI, "OpenAI"), &store);
        let models = FieldPath::provider(ModelProvider::OpenAI, ENABLED_MODELS);
        let notified = Rc::new(std::cell::Cell::new(0));
        cx.update(|cx| {
            let notified = notified.clone();
            cx.observe(&form, move |_, _| notified.set(notified.get() + 1))
                .detach();
        });

        for model in ["gpt-4o-mini", "o1"] {
            form.update(cx, |form, cx| {
                let list = crate::add_model(&form.models(&models), model).unwrap();
                let list = list.iter().map(|m| m.to_string()).collect::<Vec<_>>();
                form.set_value(&models, json!(list), cx);
            });
            cx.run_until_parked();
        }
        assert!(notified.get() >= 2);
        form.read_with(cx, |form, _| {
            assert_eq!(
                form.models(&models),
                vec![
                    SharedString::from("gpt-4o"),
                    SharedString::from("gpt-4o-mini"),
                    SharedString::from("o1"),
                ]
            );
        });

        cx.executor().advance_clock(Duration::from_millis(100));
        cx.run_until_parked();
        store.read_with(cx, |store, _| {
            assert_eq!(store.patches.len(), 1);
            assert_eq!(
                store.provider_settings(ModelProvider::OpenAI).enabled_models,
                Some(vec![
                    "gpt-4o".to_string(),
                    "gpt-4o-mini".to_string(),
                    "o1".to_string(),
                ])
            );
        });
    }

    #[gpui::test]
    fn test_header_without_deactivate(cx: &mut TestAppContext) {
        let store = store(cx, "{}");
        let always_on = form(
            cx,
            ProviderConfig::new(ModelProvider::Anthropic, "Anthropic").can_deactivate(false),
            &store,
        );
        let deactivatable = form(
            cx,
            ProviderConfig::new(ModelProvider::Anthropic, "Anthropic"),
            &store,
        );

        always_on.read_with(cx, |form, cx| {
            assert!(!form.shows_enable_switch());
            assert!(ProviderConfigForm::<RecordingStore>::is_header_dimmed(
                &form.state(cx)
            ));
        });
        deactivatable.read_with(cx, |form, _| assert!(form.shows_enable_switch()));

        store.update(cx, |store, cx| {
            store.toggle_provider_enabled(ModelProvider::Anthropic, true, cx)
        });
        always_on.read_with(cx, |form, cx| {
            assert!(!form.shows_enable_switch());
            assert!(!ProviderConfigForm::<RecordingStore>::is_header_dimmed(
                &form.state(cx)
            ));
        });
    }

    #[gpui::test]
    fn test_typing_commits_bound_path(cx: &mut TestAppContext) {
        cx.update(gpui_component::init);
        let store = store(cx, "{}");
        let config = ProviderConfig::new(ModelProvider::OpenAI, "OpenAI").show_endpoint(true);
        let (form, cx) =
            cx.add_window_view(|_, cx| ProviderConfigForm::new(config, store.clone(), cx));
        let endpoint = FieldPath::provider(ModelProvider::OpenAI, ENDPOINT);

        let input = form.update_in(cx, |form, window, cx| {
            form.ensure_input(&endpoint, "".into(), false, true, window, cx)
        });
        input.update_in(cx, |input, window, cx| {
            input.set_value("https://proxy.example.com/v1", window, cx);
            cx.emit(InputEvent::Change);
        });
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(100));
        cx.run_until_parked();

        store.read_with(cx, |store, _| {
            assert_eq!(
                store.patches,
                vec![json!({
                    "languageModel": {
                        "openai": { "endpoint": "https://proxy.example.com/v1" }
                    }
                })]
            );
        });
    }
}
