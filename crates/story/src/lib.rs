use std::{rc::Rc, time::Duration};

use anyhow::{Result, anyhow};
use gpui::{
    AnyView, App, AppContext as _, Bounds, Context, Entity, InteractiveElement as _, IntoElement,
    ParentElement as _, Render, SharedString, StatefulInteractiveElement as _, Styled as _,
    Subscription, Task, Window, WindowBounds, WindowOptions, px, size,
};
use gpui_component::{ActiveTheme as _, Root, v_flex};
use llm_provider_settings::{
    ConnectivityCheck, FieldControl, FieldDescriptor, FieldPath, ModelListEvent, ModelListOptions,
    ModelProvider, ProviderConfig, ProviderConfigForm, SettingsFile, SettingsStore as _,
    UserSettingsStore, API_KEY,
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Pretends to probe the provider, passing once an API key is configured.
struct StoreCheck {
    store: Entity<UserSettingsStore>,
}

impl ConnectivityCheck for StoreCheck {
    fn check(&self, provider: ModelProvider, model: SharedString, cx: &mut App) -> Task<Result<()>> {
        let settings = self.store.read(cx).provider_settings(provider);
        let has_key = settings
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if provider != ModelProvider::Ollama && !has_key {
            return Task::ready(Err(anyhow!("missing API key for {}", provider.label())));
        }

        tracing::info!("checking {} with {}", provider, model);
        let timer = cx.background_executor().timer(Duration::from_millis(600));
        cx.background_spawn(async move {
            timer.await;
            Ok(())
        })
    }
}

fn configs() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(ModelProvider::OpenAI, "OpenAI")
            .show_endpoint(true)
            .check_model("gpt-4o-mini")
            .model_list(ModelListOptions::default().show_model_fetcher(true)),
        ProviderConfig::new(ModelProvider::Ollama, "Ollama")
            .show_api_key(false)
            .show_endpoint(true)
            .show_browser_request(true)
            .check_model("llama3")
            .can_deactivate(false),
        ProviderConfig::new(ModelProvider::Azure, "Azure OpenAI")
            .api_key_items([
                FieldDescriptor::new(
                    "API Key",
                    FieldControl::Password {
                        placeholder: "Azure API Key".into(),
                    },
                )
                .description("Find it in the Keys & Endpoint section of your Azure resource")
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
            .show_endpoint(true)
            .check_model("gpt-35-turbo")
            .model_list(
                ModelListOptions::default()
                    .azure_deploy_name(true)
                    .not_found_content("Add the deployment names of your models"),
            ),
        ProviderConfig::new(ModelProvider::Anthropic, "Anthropic")
            .show_endpoint(true)
            .check_model("claude-3-haiku-20240307"),
        ProviderConfig::new(ModelProvider::Groq, "Groq").check_model("llama3-8b-8192"),
    ]
}

pub struct LlmSettingsStory {
    forms: Vec<Entity<ProviderConfigForm>>,
    _subscriptions: Vec<Subscription>,
}

impl LlmSettingsStory {
    pub fn view(store: Entity<UserSettingsStore>, _: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(store, cx))
    }

    fn new(store: Entity<UserSettingsStore>, cx: &mut Context<Self>) -> Self {
        let check: Rc<dyn ConnectivityCheck> = Rc::new(StoreCheck {
            store: store.clone(),
        });

        let mut _subscriptions = vec![];
        let forms = configs()
            .into_iter()
            .map(|config| {
                let form = ProviderConfigForm::view(config, store.clone(), cx);
                form.update(cx, |form, cx| form.set_connectivity_check(check.clone(), cx));
                _subscriptions.push(cx.subscribe(&form, |_, _, event: &ModelListEvent, _| {
                    let ModelListEvent::FetchModels(provider) = event;
                    tracing::info!("fetch models requested for {}", provider);
                }));
                form
            })
            .collect();

        Self {
            forms,
            _subscriptions,
        }
    }
}

impl Render for LlmSettingsStory {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        v_flex()
            .id("llm-settings")
            .size_full()
            .p_4()
            .gap_4()
            .overflow_y_scroll()
            .bg(cx.theme().background)
            .children(self.forms.iter().cloned())
    }
}

pub fn init(cx: &mut App) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("llm_provider_settings=debug".parse().unwrap()),
        )
        .init();

    gpui_component::init(cx);
}

/// Load the user store, falling back to an in-memory one.
pub fn load_store(cx: &mut App) -> Entity<UserSettingsStore> {
    let store = match SettingsFile::default_location() {
        Some(file) => {
            tracing::info!("settings file: {}", file.path().display());
            UserSettingsStore::load(file).unwrap_or_else(|err| {
                tracing::error!("failed to load settings: {:?}", err);
                UserSettingsStore::new(Default::default())
            })
        }
        None => UserSettingsStore::new(Default::default()),
    };
    store.view(cx)
}

pub fn create_new_window<F, E>(title: &str, crate_view_fn: F, cx: &mut App)
where
    E: Into<AnyView>,
    F: FnOnce(&mut Window, &mut App) -> E + 'static,
{
    let mut window_size = size(px(900.0), px(1000.0));
    if let Some(display) = cx.primary_display() {
        let display_size = display.bounds().size;
        window_size.width = window_size.width.min(display_size.width * 0.85);
        window_size.height = window_size.height.min(display_size.height * 0.85);
    }
    let window_bounds = Bounds::centered(None, window_size, cx);
    let title = SharedString::from(title.to_string());

    cx.spawn(async move |cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(window_bounds)),
            window_min_size: Some(gpui::Size {
                width: px(480.),
                height: px(480.),
            }),
            ..Default::default()
        };

        let window = cx.open_window(options, |window, cx| {
            let view = crate_view_fn(window, cx);
            cx.new(|cx| Root::new(view.into(), window, cx))
        })?;

        window.update(cx, |_, window, _| {
            window.activate_window();
            window.set_window_title(&title);
        })?;

        Ok::<_, anyhow::Error>(())
    })
    .detach();
}
